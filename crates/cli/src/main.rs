//! Kirana CLI - terminal client for the Kirana store.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! kirana products
//! kirana products --search sneaker
//!
//! # Account
//! kirana register -u crio-user -p password1
//! kirana login -u crio-user -p password1
//! kirana balance
//! kirana logout
//!
//! # Cart
//! kirana cart show
//! kirana cart add <PRODUCT_ID>
//! kirana cart set-qty <PRODUCT_ID> 3
//!
//! # Addresses and checkout
//! kirana address list
//! kirana address add "221B Baker Street, London"
//! kirana address remove <ADDRESS_ID>
//! kirana checkout --address <ADDRESS_ID>
//! ```
//!
//! # Commands
//!
//! - `register` / `login` / `logout` / `balance` - Account and session
//! - `products` - Catalog listing and search
//! - `cart` - Inspect and mutate the cart
//! - `address` - Shipping address book
//! - `checkout` - Place the order for the current cart

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "kirana")]
#[command(author, version, about = "Kirana store terminal client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        /// Username (at least 6 characters)
        #[arg(short, long)]
        username: String,

        /// Password (at least 6 characters)
        #[arg(short, long)]
        password: String,

        /// Password confirmation; defaults to the password when omitted
        #[arg(long)]
        confirm: Option<String>,
    },
    /// Sign in and persist the session
    Login {
        /// Username
        #[arg(short, long)]
        username: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Drop the persisted session
    Logout,
    /// Show who is signed in and the wallet balance
    Balance,
    /// List the catalog, optionally filtered by a search term
    Products {
        /// Search by product name or category
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Inspect or change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage shipping addresses
    Address {
        #[command(subcommand)]
        action: AddressAction,
    },
    /// Place the order for the current cart
    Checkout {
        /// Id of the shipping address to deliver to
        #[arg(short, long)]
        address: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart lines and the order total
    Show,
    /// Add one unit of a product (refused when it is already in the cart)
    Add {
        /// Product id from `kirana products`
        product_id: String,
    },
    /// Set the quantity of a product (0 removes it)
    SetQty {
        /// Product id from `kirana products`
        product_id: String,

        /// New quantity
        qty: i64,
    },
}

#[derive(Subcommand)]
enum AddressAction {
    /// List addresses on file
    List,
    /// Add a new address
    Add {
        /// Full address text
        text: String,
    },
    /// Delete an address
    Remove {
        /// Address id from `kirana address list`
        address_id: String,
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
        Commands::Register {
            username,
            password,
            confirm,
        } => {
            commands::auth::register(&username, &password, confirm.as_deref()).await?;
        }
        Commands::Login { username, password } => {
            commands::auth::login(&username, &password).await?;
        }
        Commands::Logout => commands::auth::logout()?,
        Commands::Balance => commands::auth::balance()?,
        Commands::Products { search } => commands::catalog::products(search.as_deref()).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show().await?,
            CartAction::Add { product_id } => commands::cart::add(&product_id).await?,
            CartAction::SetQty { product_id, qty } => {
                commands::cart::set_qty(&product_id, qty).await?;
            }
        },
        Commands::Address { action } => match action {
            AddressAction::List => commands::address::list().await?,
            AddressAction::Add { text } => commands::address::add(&text).await?,
            AddressAction::Remove { address_id } => commands::address::remove(&address_id).await?,
        },
        Commands::Checkout { address } => commands::checkout::place_order(&address).await?,
    }
    Ok(())
}
