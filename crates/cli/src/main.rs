//! SwiftBite CLI - database and operations tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! sb-cli migrate
//!
//! # Load the demo catalog
//! sb-cli seed
//!
//! # Register a driver
//! sb-cli driver create -n "Omar Adel" -p "+201001234567" --password "s3cret-pass"
//!
//! # Poll the API like the apps do
//! sb-cli watch driver-queue --driver-id 3
//! sb-cli watch admin-board
//! sb-cli watch track --order-id 42
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Insert demo categories, restaurants, menus and offers
//! - `driver create` - Create a driver account
//! - `watch` - Poll an API view on its refresh interval

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sb-cli")]
#[command(author, version, about = "SwiftBite CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database with a demo catalog
    Seed {
        /// Seed even if restaurants already exist
        #[arg(long)]
        force: bool,
    },
    /// Manage drivers
    Driver {
        #[command(subcommand)]
        action: DriverAction,
    },
    /// Poll an API view and log each refresh
    Watch {
        /// API base URL
        #[arg(long, env = "SWIFTBITE_API_URL", default_value = commands::watch::DEFAULT_API_URL)]
        api_url: String,

        #[command(subcommand)]
        view: WatchView,
    },
}

#[derive(Subcommand)]
enum DriverAction {
    /// Create a new driver account
    Create {
        /// Driver display name
        #[arg(short, long)]
        name: String,

        /// Phone number used to log in
        #[arg(short, long)]
        phone: String,

        /// Login password (at least 8 characters)
        #[arg(long)]
        password: String,

        /// Contact email
        #[arg(short, long)]
        email: Option<String>,

        /// Vehicle type
        #[arg(short, long)]
        vehicle: Option<String>,
    },
}

#[derive(Subcommand)]
enum WatchView {
    /// Orders a driver can claim (3s)
    DriverQueue {
        #[arg(long)]
        driver_id: i32,
    },
    /// Admin dashboard counters (5s)
    AdminBoard,
    /// One order's tracking history (10s)
    Track {
        #[arg(long)]
        order_id: i32,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { force } => commands::seed::demo_catalog(force).await?,
        Commands::Driver { action } => match action {
            DriverAction::Create {
                name,
                phone,
                password,
                email,
                vehicle,
            } => {
                commands::driver::create(name, phone, password, email, vehicle).await?;
            }
        },
        Commands::Watch { api_url, view } => {
            let view = match view {
                WatchView::DriverQueue { driver_id } => {
                    commands::watch::View::DriverQueue { driver_id }
                }
                WatchView::AdminBoard => commands::watch::View::AdminBoard,
                WatchView::Track { order_id } => commands::watch::View::Track { order_id },
            };
            commands::watch::run(&api_url, view).await?;
        }
    }
    Ok(())
}
