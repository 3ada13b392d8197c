use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marine_axis::cli::{self, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marine_axis=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => cli::commands::init().await,
        Commands::Login { email, password } => cli::commands::login(&email, password).await,
        Commands::Logout => cli::commands::logout().await,
        Commands::Whoami => cli::commands::whoami().await,
        Commands::List {
            resource,
            filters,
            format,
        } => cli::commands::list(resource, filters, format).await,
        Commands::Get { resource, id } => cli::commands::get(resource, &id).await,
        Commands::Create { resource, data } => cli::commands::create(resource, &data).await,
        Commands::Update { resource, id, data } => {
            cli::commands::update(resource, &id, &data).await
        }
        Commands::Delete {
            resource,
            id,
            force,
        } => cli::commands::delete(resource, &id, force).await,
        Commands::Stats => cli::commands::stats().await,
        Commands::Prefs {
            theme,
            sidebar_collapsed,
        } => cli::commands::prefs(theme, sidebar_collapsed).await,
    }
}
