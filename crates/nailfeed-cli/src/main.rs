mod commands;
mod config;

use std::sync::Arc;

use clap::Parser;
use tokio::sync::broadcast::Receiver;
use tracing::info;

use nailfeed_api::StrapiClient;
use nailfeed_core::{Notifier, Session};
use nailfeed_types::Notice;

use crate::commands::Command;
use crate::config::Config;

#[derive(Debug, Parser)]
#[command(name = "nailfeed", about = "Browse and interact with the nail art feed")]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging; stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nailfeed=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let session = match cli.config.viewer()? {
        Some(viewer) => Session::signed_in(viewer),
        None => Session::anonymous(),
    };
    let session = Arc::new(session);
    info!(
        "Using {} as {}",
        cli.config.api_url,
        session
            .viewer()
            .map(|v| v.username)
            .unwrap_or_else(|| "anonymous".into())
    );

    let notifier = Notifier::new();
    let mut notices = notifier.subscribe();
    let services = StrapiClient::new(cli.config.api_url.clone(), session).into_services(notifier);

    let result = commands::run(cli.command, services, cli.config.page_size.max(1)).await;
    print_notices(&mut notices);
    result
}

fn print_notices(notices: &mut Receiver<Notice>) {
    while let Ok(notice) = notices.try_recv() {
        match notice {
            Notice::LoginRequired { action } => {
                eprintln!("! sign in to {} (set NAILFEED_JWT and NAILFEED_USER_ID)", action)
            }
            Notice::Error { message } => eprintln!("! {}", message),
            Notice::Success { message } | Notice::Info { message } => println!("* {}", message),
        }
    }
}
