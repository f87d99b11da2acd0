//! ArtisanBazaar CLI - drive the marketplace client core from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Who is signed in (uses BAZAAR_EMAIL / BAZAAR_PASSWORD when set)
//! bazaar whoami
//!
//! # Browse
//! bazaar products --featured
//! bazaar products --category ceramics --search mug
//!
//! # Cart and checkout
//! bazaar cart add 12 --quantity 2
//! bazaar cart checkout
//!
//! # Orders filtered by status
//! bazaar orders --status shipped
//!
//! # Modification requests
//! bazaar requests submit 12 --seller 3 "Please engrave initials on the lid"
//! bazaar requests review 5 approve --response "Happy to"
//!
//! # Route decisions for the signed-in user
//! bazaar route /dashboard/seller/products
//! ```
//!
//! # Environment Variables
//!
//! - `BAZAAR_API_URL` - Backend base URL (required)
//! - `BAZAAR_EMAIL`, `BAZAAR_PASSWORD` - Credentials for commands that need a session
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT` - Error tracking (optional)
//! - `RUST_LOG` - Log filter (default `artisan_bazaar_client=info,artisan_bazaar_cli=info`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use artisan_bazaar_client::{AppState, ClientConfig};
use artisan_bazaar_core::{CartItemId, ModificationRequestId, NotificationId, ProductId, Role, UserId};
use clap::{Parser, Subcommand, ValueEnum};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "bazaar")]
#[command(author, version, about = "ArtisanBazaar marketplace client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the signed-in user
    Whoami,
    /// End the backend session
    Logout,
    /// Browse products
    Products {
        /// Show featured products only
        #[arg(long)]
        featured: bool,
        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,
        /// Free-text search
        #[arg(short, long)]
        search: Option<String>,
        /// Show one product
        #[arg(long, conflicts_with_all = ["featured", "category", "search"])]
        id: Option<ProductId>,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// List orders
    Orders {
        /// Only orders with this status (`all` for every order)
        #[arg(short, long, default_value = "all")]
        status: String,
    },
    /// Product modification requests
    Requests {
        #[command(subcommand)]
        action: RequestAction,
    },
    /// Notifications
    Notifications {
        #[command(subcommand)]
        action: NotificationAction,
    },
    /// Moderation (admins only)
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Show how the route guard treats a path for the signed-in user
    Route {
        /// Path to check, e.g. `/dashboard/buyer/orders`
        path: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart and its totals
    Show,
    /// Add a product
    Add {
        product: ProductId,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Change a line's quantity (0 removes it)
    Update { item: CartItemId, quantity: u32 },
    /// Remove a line
    Remove { item: CartItemId },
    /// Place an order for the cart
    Checkout,
}

#[derive(Subcommand)]
enum RequestAction {
    /// Requests you submitted
    Buyer,
    /// Requests addressed to you
    Seller,
    /// Ask a seller to modify a product
    Submit {
        product: ProductId,
        #[arg(long)]
        seller: UserId,
        description: String,
    },
    /// Approve or reject a request addressed to you
    Review {
        request: ModificationRequestId,
        decision: Decision,
        #[arg(short, long, default_value = "")]
        response: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Decision {
    Approve,
    Reject,
}

#[derive(Subcommand)]
enum NotificationAction {
    /// List notifications
    List,
    /// Mark one read
    Read { id: NotificationId },
}

#[derive(Subcommand)]
enum AdminAction {
    /// List users
    Users {
        #[arg(short, long)]
        role: Option<Role>,
    },
    /// Take a product listing down
    RemoveListing { product: ProductId },
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

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "artisan_bazaar_client=info,artisan_bazaar_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: ClientConfig) -> Result<(), CommandError> {
    let state = AppState::new(config)?;

    match cli.command {
        Commands::Whoami => commands::session::whoami(&state).await?,
        Commands::Logout => commands::session::logout(&state).await?,
        Commands::Products {
            featured,
            category,
            search,
            id,
        } => match id {
            Some(id) => commands::shop::product(&state, id).await?,
            None if featured => commands::shop::featured(&state).await,
            None => commands::shop::catalog(&state, category, search).await,
        },
        Commands::Cart { action } => {
            commands::session::ensure_signed_in(&state).await?;
            match action {
                CartAction::Show => commands::shop::show_cart(&state).await,
                CartAction::Add { product, quantity } => {
                    commands::shop::add_to_cart(&state, product, quantity).await?;
                }
                CartAction::Update { item, quantity } => {
                    commands::shop::update_cart(&state, item, quantity).await?;
                }
                CartAction::Remove { item } => commands::shop::update_cart(&state, item, 0).await?,
                CartAction::Checkout => commands::shop::checkout(&state).await?,
            }
        }
        Commands::Orders { status } => {
            commands::session::ensure_signed_in(&state).await?;
            commands::shop::orders(&state, &status).await;
        }
        Commands::Requests { action } => {
            commands::session::ensure_signed_in(&state).await?;
            match action {
                RequestAction::Buyer => commands::requests::list_buyer(&state).await,
                RequestAction::Seller => commands::requests::list_seller(&state).await,
                RequestAction::Submit {
                    product,
                    seller,
                    description,
                } => commands::requests::submit(&state, product, seller, description).await?,
                RequestAction::Review {
                    request,
                    decision,
                    response,
                } => {
                    let approve = matches!(decision, Decision::Approve);
                    commands::requests::review(&state, request, approve, response).await?;
                }
            }
        }
        Commands::Notifications { action } => {
            commands::session::ensure_signed_in(&state).await?;
            match action {
                NotificationAction::List => commands::notifications::list(&state).await,
                NotificationAction::Read { id } => {
                    commands::notifications::mark_read(&state, id).await?;
                }
            }
        }
        Commands::Admin { action } => {
            commands::session::ensure_signed_in(&state).await?;
            match action {
                AdminAction::Users { role } => commands::admin::users(&state, role).await,
                AdminAction::RemoveListing { product } => {
                    commands::admin::remove_listing(&state, product).await?;
                }
            }
        }
        Commands::Route { path } => commands::session::route(&state, &path).await,
    }
    Ok(())
}
