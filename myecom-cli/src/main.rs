//! `myecom`: command-line front-end for the MyEcom storefront.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use shared::config::Config;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

mod commands;

use commands::{
    account::AccountCommand, admin::AdminCommand, app::App, catalog::CatalogCommand,
    checkout::CheckoutArgs, config::ConfigFormat, session::SessionCommand,
};

/// MyEcom CLI
#[derive(Parser, Debug)]
#[command(name = "myecom", version)]
#[command(about = "Browse the MyEcom catalog, place orders and manage the store", long_about = None)]
pub struct Cli {
    /// Path to a configuration file (`.yaml`, `.yml` or `.json`).
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// API origin, overriding the configuration (e.g. `http://localhost:8000/`).
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<Url>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in, log out and show the signed-in user
    #[command(subcommand)]
    Session(SessionCommand),

    /// Register and manage your account
    #[command(subcommand)]
    Account(AccountCommand),

    /// Browse and search products
    #[command(subcommand)]
    Catalog(CatalogCommand),

    /// Buy products with cash on delivery
    Checkout(CheckoutArgs),

    /// Show your order history
    Orders,

    /// Dashboard: products, orders, users and supplier approvals
    #[command(subcommand)]
    Admin(AdminCommand),

    /// Generate a configuration file with default values
    Config {
        /// Format of the configuration file to generate.
        #[arg(long, short, value_enum, default_value_t = ConfigFormat::Yaml)]
        format: ConfigFormat,

        /// Where to write the file (defaults to `config.<format>` in the current directory).
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Generate shell completion scripts for the CLI
    Completion {
        /// The shell to generate the completion script for.
        #[arg(long, short, value_enum)]
        shell: clap_complete::Shell,
    },
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Completion { shell } => {
            commands::completion::generate_completion(shell);
            Ok(())
        }
        Commands::Config { format, output } => {
            commands::config::generate_config(format, output.as_deref())
        }
        command => {
            let config = Config::load_config(cli.config, cli.api_url)
                .context("failed to load configuration")?;
            init_tracing(&config.log_level);
            let app = App::start(config).await?;
            dispatch(&app, command).await
        }
    }
}

async fn dispatch(app: &App, command: Commands) -> Result<()> {
    match command {
        Commands::Session(command) => commands::session::run(app, command).await,
        Commands::Account(command) => commands::account::run(app, command).await,
        Commands::Catalog(command) => commands::catalog::run(app, command).await,
        Commands::Checkout(args) => commands::checkout::run(app, args).await,
        Commands::Orders => commands::orders::run(app).await,
        Commands::Admin(command) => commands::admin::run(app, command).await,
        Commands::Config { .. } | Commands::Completion { .. } => Ok(()),
    }
}
