use clap::Parser;
use std::process::ExitCode;

use storefront::cli::{Cli, Commands, ConfigAction};
use storefront::commands::{
    ListingRequest, cmd_browse, cmd_config_path, cmd_config_set, cmd_config_show, cmd_search,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    storefront::logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Search {
            query,
            paging,
            sort,
        } => cmd_search(ListingRequest::from_paging(query, paging, sort)).await,
        Commands::Browse { paging } => {
            cmd_browse(ListingRequest::from_paging(String::new(), paging, None)).await
        }

        // Configuration commands
        Commands::Config { action } => match action {
            ConfigAction::Show { json } => cmd_config_show(json),
            ConfigAction::Set { key, value, json } => cmd_config_set(&key, &value, json),
            ConfigAction::Path => cmd_config_path(),
        },
    };

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
