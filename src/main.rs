use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use platescout::app::AppContext;
use platescout::cli::{commands, Cli, Commands};
use platescout::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_config_path()?,
    };
    let config = Config::load_from(&config_path)?;

    match cli.command {
        Commands::Compare { names, dry_run } => {
            let ctx = if dry_run {
                AppContext::in_memory(config)?
            } else {
                AppContext::new(cli.db, config)?
            };
            commands::compare(&ctx, names.as_deref(), dry_run).await?;
        }
        Commands::Maps { names, output } => {
            let ctx = AppContext::new(cli.db, config)?;
            commands::maps(&ctx, names.as_deref(), output.as_deref()).await?;
        }
        Commands::Show { name } => {
            let ctx = AppContext::new(cli.db, config)?;
            commands::show(&ctx, &name)?;
        }
        Commands::List => {
            let ctx = AppContext::new(cli.db, config)?;
            commands::list(&ctx)?;
        }
        Commands::Config => {
            println!("{}", config_path.display());
        }
    }

    Ok(())
}
