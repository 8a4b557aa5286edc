#![allow(dead_code)]

use std::fs;
use std::process::{Command, Output};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use reqwest::StatusCode;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use storefront::{
    CatalogClient, Item, ListLatestParams, ListingPage, Result, SearchPage, SearchParams,
    StorefrontError,
};

/// A request the fake catalog received
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Latest(ListLatestParams),
    Search(SearchParams),
}

impl Call {
    pub fn page(&self) -> u32 {
        match self {
            Call::Latest(params) => params.page,
            Call::Search(params) => params.page,
        }
    }

    pub fn query(&self) -> Option<&str> {
        match self {
            Call::Latest(_) => None,
            Call::Search(params) => Some(&params.query),
        }
    }
}

/// What the fake sends back
#[derive(Debug, Clone)]
pub enum Reply {
    Page { items: Vec<Item>, total: usize },
    Fail(StatusCode),
}

/// How one call plays out
#[derive(Debug, Clone)]
pub struct Script {
    pub delay: Duration,
    pub reply: Reply,
    /// When false the fake keeps going after its token fires, like a
    /// transport that cannot abort mid-flight
    pub honor_cancel: bool,
}

impl Script {
    pub fn page(items: Vec<Item>, total: usize) -> Self {
        Self {
            delay: Duration::from_millis(20),
            reply: Reply::Page { items, total },
            honor_cancel: true,
        }
    }

    pub fn fail(status: StatusCode) -> Self {
        Self {
            delay: Duration::from_millis(20),
            reply: Reply::Fail(status),
            honor_cancel: true,
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn ignoring_cancel(mut self) -> Self {
        self.honor_cancel = false;
        self
    }
}

type Responder = dyn Fn(&Call) -> Script + Send + Sync;

/// In-memory `CatalogClient` that records calls and answers from a script.
///
/// Clones share the call log, so keep one to inspect after handing the
/// other to an orchestrator.
#[derive(Clone)]
pub struct ScriptedCatalog {
    calls: Arc<Mutex<Vec<Call>>>,
    responder: Arc<Responder>,
}

impl ScriptedCatalog {
    /// Full pages everywhere: searches report 100 matches, listings return
    /// bare arrays.
    pub fn new() -> Self {
        Self::with_responder(|call| match call {
            Call::Latest(params) => Script::page(
                items(&format!("latest-p{}", params.page), params.limit as usize),
                params.limit as usize,
            ),
            Call::Search(params) => Script::page(
                items(
                    &format!("{}-p{}", params.query, params.page),
                    params.limit as usize,
                ),
                100,
            ),
        })
    }

    pub fn with_responder(responder: impl Fn(&Call) -> Script + Send + Sync + 'static) -> Self {
        Self {
            calls: Arc::default(),
            responder: Arc::new(responder),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn record(&self, call: Call) -> Script {
        let script = (self.responder)(&call);
        self.calls.lock().push(call);
        script
    }

    async fn play(script: Script, cancel: CancellationToken) -> Result<SearchPage> {
        if script.honor_cancel {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(StorefrontError::Canceled),
                _ = tokio::time::sleep(script.delay) => {}
            }
        } else {
            tokio::time::sleep(script.delay).await;
        }

        match script.reply {
            Reply::Page { items, total } => Ok(SearchPage { items, total }),
            Reply::Fail(status) => Err(StorefrontError::Http {
                status,
                message: format!("scripted failure {}", status.as_u16()),
            }),
        }
    }
}

impl CatalogClient for ScriptedCatalog {
    async fn list_latest(
        &self,
        params: ListLatestParams,
        cancel: CancellationToken,
    ) -> Result<ListingPage> {
        let script = self.record(Call::Latest(params));
        let page = Self::play(script, cancel).await?;
        Ok(ListingPage::Bare(page.items))
    }

    async fn search(&self, params: SearchParams, cancel: CancellationToken) -> Result<SearchPage> {
        let script = self.record(Call::Search(params));
        Self::play(script, cancel).await
    }
}

/// `n` items with ids `{prefix}-0 .. {prefix}-{n-1}`
pub fn items(prefix: &str, n: usize) -> Vec<Item> {
    (0..n)
        .map(|i| Item::new(format!("{prefix}-{i}"), format!("{prefix} item {i}")))
        .collect()
}

/// Helper struct to run storefront commands in an isolated temp directory
pub struct StorefrontTest {
    pub temp_dir: TempDir,
    binary_path: &'static str,
}

impl StorefrontTest {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        StorefrontTest {
            temp_dir,
            binary_path: env!("CARGO_BIN_EXE_storefront"),
        }
    }

    pub fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new(self.binary_path);
        command
            .args(args)
            .current_dir(self.temp_dir.path())
            .env_remove("STOREFRONT_ROOT")
            .env_remove("STOREFRONT_API_URL")
            .env_remove("STOREFRONT_API_TOKEN")
            .env("NO_COLOR", "1");
        command
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.command(args)
            .output()
            .expect("Failed to execute storefront command")
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Expected command {:?} to fail, but it succeeded",
            args
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }

    pub fn read_config(&self) -> String {
        let path = self.temp_dir.path().join(".storefront").join("config.yaml");
        fs::read_to_string(path).expect("Failed to read config file")
    }

    pub fn write_config(&self, content: &str) {
        let dir = self.temp_dir.path().join(".storefront");
        fs::create_dir_all(&dir).expect("Failed to create .storefront directory");
        fs::write(dir.join("config.yaml"), content).expect("Failed to write config file");
    }
}
