use clap::Parser;

use review_notify::cli::{
    Cli, CommandOutcome, execute_command, init_logger_from_settings, load_and_merge_config,
};
use review_notify::runtime::Listener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = load_and_merge_config(&cli)?;
    init_logger_from_settings(&settings)?;

    match execute_command(&cli, settings.clone()).await {
        Ok(CommandOutcome::Listen) => Listener::new(settings).run().await,
        Ok(CommandOutcome::Done) => Ok(()),
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            Err(e.into())
        }
    }
}
