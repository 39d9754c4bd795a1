//! Kedai CLI - browse the menu, manage the cart, and place orders.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! kedai categories
//! kedai products --category drinks --limit 10
//!
//! # Create and confirm an account
//! kedai signup -n Sari -e sari@example.com --phone 08123456789 -p secret
//! kedai verify -e sari@example.com 123456
//!
//! # Log in, fill the cart, check out
//! kedai login -e sari@example.com -p secret
//! kedai cart add 65f1c0ffee
//! kedai cart set 65f1c0ffee 3
//! kedai checkout --store "Kedai Pusat" --address "Jl. Merdeka 1"
//!
//! # Track orders
//! kedai orders
//! kedai order 65f1beef
//! ```
//!
//! # Environment Variables
//!
//! - `KEDAI_API_URL` - Backend base URL (required)
//! - `KEDAI_STORAGE_DIR` - Local session storage (default `.kedai`)
//! - `SENTRY_DSN` - Enables error reporting when set

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout)]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kedai_storefront::config::ClientConfig;
use kedai_storefront::state::Storefront;

mod commands;

#[derive(Parser)]
#[command(name = "kedai")]
#[command(author, version, about = "Kedai storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List menu categories
    Categories,
    /// List products
    Products {
        /// Filter by category slug
        #[arg(short, long)]
        category: Option<String>,

        /// Maximum number of products
        #[arg(short, long)]
        limit: Option<u32>,

        /// Only featured products
        #[arg(short, long, conflicts_with_all = ["category", "limit"])]
        featured: bool,
    },
    /// Create an account
    Signup {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Account email
        #[arg(short, long)]
        email: String,

        /// Phone number, digits only
        #[arg(long)]
        phone: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Confirm an account with the emailed code
    Verify {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Verification code
        code: String,
    },
    /// Log in and restore the saved cart
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Show the logged-in profile
    Profile,
    /// Forget the local session
    Logout,
    /// Inspect or change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order for everything in the cart
    Checkout {
        /// Store name
        #[arg(short, long)]
        store: String,

        /// Store address
        #[arg(short, long)]
        address: String,

        /// Payment method
        #[arg(short, long, default_value = "cash")]
        payment: String,
    },
    /// List your orders
    Orders,
    /// Show one order
    Order {
        /// Order id
        id: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents
    Show,
    /// Add one unit of a product
    Add {
        /// Product id
        product_id: String,
    },
    /// Set a line's quantity (0 removes it)
    Set {
        /// Product id
        product_id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Set or clear a line's notes
    Notes {
        /// Product id
        product_id: String,

        /// Notes for the kitchen; omit to clear
        notes: Option<String>,
    },
    /// Empty the cart
    Clear,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "kedai_storefront=info,kedai_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    let result = match Storefront::new(config) {
        Ok(storefront) => run(cli, &storefront).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, storefront: &Storefront) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Categories => commands::catalog::categories(storefront).await?,
        Commands::Products {
            category,
            limit,
            featured,
        } => {
            commands::catalog::products(storefront, category.as_deref(), limit, featured).await?;
        }
        Commands::Signup {
            name,
            email,
            phone,
            password,
        } => commands::session::signup(storefront, &name, &email, &phone, &password).await?,
        Commands::Verify { email, code } => commands::session::verify(storefront, &email, &code).await?,
        Commands::Login { email, password } => {
            commands::session::login(storefront, &email, &password).await?;
        }
        Commands::Profile => commands::session::profile(storefront).await?,
        Commands::Logout => commands::session::logout(storefront).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(storefront).await?,
            CartAction::Add { product_id } => commands::cart::add(storefront, &product_id).await?,
            CartAction::Set {
                product_id,
                quantity,
            } => commands::cart::set_quantity(storefront, &product_id, quantity).await?,
            CartAction::Notes { product_id, notes } => {
                commands::cart::set_notes(storefront, &product_id, notes).await?;
            }
            CartAction::Clear => commands::cart::clear(storefront).await?,
        },
        Commands::Checkout {
            store,
            address,
            payment,
        } => commands::orders::checkout(storefront, &store, &address, &payment).await?,
        Commands::Orders => commands::orders::list(storefront).await?,
        Commands::Order { id } => commands::orders::show(storefront, &id).await?,
    }
    Ok(())
}
