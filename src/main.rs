use aquarian::cli::{Cli, Commands};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aquarian=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init { path, name }) => {
            aquarian::cli::init::run(path, name).await?;
        }
        Some(Commands::Serve { host, port }) => {
            aquarian::cli::serve::run(&cli.config, host, port).await?;
        }
        Some(Commands::Migrate { command }) => {
            aquarian::cli::migrate::run(&cli.config, command).await?;
        }
        Some(Commands::Seed) => {
            aquarian::cli::seed::run(&cli.config).await?;
        }
        Some(Commands::Check) => {
            aquarian::cli::check::run(&cli.config).await?;
        }
        Some(Commands::Media { command }) => {
            aquarian::cli::media::run(&cli.config, command).await?;
        }
        Some(Commands::Token { raw }) => {
            aquarian::cli::token::run(&raw).await?;
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
        }
    }

    Ok(())
}
