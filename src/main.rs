use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use clap::{Args, Parser, Subcommand};
use pharmacy::config::ClientConfig;
use pharmacy::net::api::ApiClient;
use pharmacy::net::interceptor::AuthInterceptor;
use pharmacy::net::transport::HttpTransport;
use pharmacy::net::types::ProfileUpdate;
use pharmacy::router::{GuardDecision, History, Router};
use pharmacy::state::auth::AuthService;
use pharmacy::state::cart::{CartItem, CartService};
use pharmacy::state::catalog::{self, CatalogService};
use pharmacy::state::checkout::{self, CheckoutSummary, ShippingDetails};
use pharmacy::state::password_reset::{PasswordResetWizard, ResetStep};
use pharmacy::state::session::Session;
use pharmacy::storage::{FileStore, KeyValueStore, StorageError};
use pharmacy::{ClientError, validation};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("unknown product `{0}`")]
    UnknownProduct(String),
    #[error("terminal io failed: {0}")]
    Io(#[from] io::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "pharmacy-cli", about = "Pharmacy marketplace client")]
struct Cli {
    #[arg(long, env = "PHARMACY_API_URL")]
    api_url: Option<String>,

    #[arg(long, env = "PHARMACY_STORAGE_PATH")]
    storage_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "PHARMACY_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "PHARMACY_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        confirm: String,
    },
    /// Show the cached user; `--refresh` re-fetches it first.
    Whoami {
        #[arg(long, default_value_t = false)]
        refresh: bool,
    },
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    ChangePassword {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
    /// Interactive forgot-password flow.
    ResetPassword,
    Products(ListArgs),
    Medicines(ListArgs),
    Categories,
    Cart(CartCommand),
    Checkout(CheckoutArgs),
    /// Run the route guard for a path and report where navigation lands.
    Route { path: String },
}

#[derive(Args, Debug)]
struct ListArgs {
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    search: Option<String>,
}

#[derive(Args, Debug)]
struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Subcommand, Debug)]
enum CartSubcommand {
    Show,
    Add { product_id: String },
    Remove { product_id: String },
    Set { product_id: String, quantity: u32 },
    Clear,
}

#[derive(Args, Debug)]
struct CheckoutArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    address: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    phone: String,
}

struct App {
    config: ClientConfig,
    store: Rc<dyn KeyValueStore>,
    session: Session,
    history: Rc<History>,
    api: ApiClient,
    auth: AuthService,
}

impl App {
    fn build(config: ClientConfig) -> Result<Self, CliError> {
        let store: Rc<dyn KeyValueStore> = Rc::new(FileStore::open(&config.storage_path)?);
        let session = Session::restore(Rc::clone(&store));
        let history = Rc::new(History::new());
        let transport = AuthInterceptor::new(HttpTransport::new(&config)?, session.clone(), history.clone());
        let api = ApiClient::new(Rc::new(transport));
        let auth = AuthService::new(api.clone(), session.clone(), history.clone());
        Ok(Self { config, store, session, history, api, auth })
    }

    fn cart(&self) -> CartService {
        CartService::load(Rc::clone(&self.store))
    }

    fn report_navigation(&self) {
        if let Some(path) = self.history.current() {
            println!("-> {path}");
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.api_url {
        config.api_base_url = pharmacy::config::normalize_base_url(&url)?;
    }
    if let Some(path) = cli.storage_path {
        config.storage_path = path;
    }
    let app = App::build(config)?;

    match cli.command {
        Command::Login { email, password } => {
            validation::validate_login(&email, &password).map_err(ClientError::Validation)?;
            let user = app.auth.login(&email, &password).await?;
            println!("signed in as {} ({})", user.email, user.role);
        }
        Command::Logout => app.auth.logout()?,
        Command::Register { name, email, password, confirm } => {
            validation::validate_registration(&name, &email, &password, &confirm).map_err(ClientError::Validation)?;
            app.auth.register(&name, &email, &password).await?;
            println!("account created; sign in to continue");
        }
        Command::Whoami { refresh } => {
            let user = if refresh { Some(app.auth.refresh_user_data().await?) } else { app.auth.current_user() };
            match user {
                Some(user) => print_json(&user)?,
                None => println!("not signed in"),
            }
        }
        Command::Profile { name, email } => {
            let user = app.auth.update_profile(&ProfileUpdate { name, email }).await?;
            print_json(&user)?;
        }
        Command::ChangePassword { current, new, confirm } => {
            validation::validate_password_change(&current, &new, &confirm).map_err(ClientError::Validation)?;
            app.auth.change_password(&current, &new).await?;
            println!("password changed");
        }
        Command::ResetPassword => run_reset_password(&app).await?,
        Command::Products(args) => {
            let items = CatalogService::new(app.api.clone()).products().await?;
            print_listing(&items, &args)?;
        }
        Command::Medicines(args) => {
            let items = CatalogService::new(app.api.clone()).medicines().await?;
            print_listing(&items, &args)?;
        }
        Command::Categories => {
            let catalog = CatalogService::new(app.api.clone());
            let mut items = catalog.products().await?;
            items.extend(catalog.medicines().await?);
            for name in catalog::categories(&items) {
                println!("{name}");
            }
        }
        Command::Cart(cart) => run_cart(&app, cart.command).await?,
        Command::Checkout(args) => {
            let details = ShippingDetails {
                full_name: args.name,
                address: args.address,
                city: args.city,
                phone: args.phone,
            };
            let mut cart = app.cart();
            let receipt = checkout::checkout(&mut cart, details, app.config.shipping)?;
            print_summary(&receipt.summary);
            println!("order placed for {}", receipt.ship_to.full_name);
        }
        Command::Route { path } => {
            let router = Router::new(app.session.clone(), app.history.clone());
            match router.check(&path) {
                GuardDecision::Allow => println!("allowed"),
                GuardDecision::Redirect(to) => println!("denied; redirecting to {to}"),
            }
            router.navigate(&path);
        }
    }

    app.report_navigation();
    Ok(())
}

async fn run_cart(app: &App, command: CartSubcommand) -> Result<(), CliError> {
    let mut cart = app.cart();
    match command {
        CartSubcommand::Show => {}
        CartSubcommand::Add { product_id } => {
            let product = CatalogService::new(app.api.clone())
                .find(&product_id)
                .await?
                .ok_or(CliError::UnknownProduct(product_id))?;
            cart.add_to_cart(CartItem::from(&product))?;
        }
        CartSubcommand::Remove { product_id } => cart.remove_from_cart(&product_id)?,
        CartSubcommand::Set { product_id, quantity } => cart.update_quantity(&product_id, quantity)?,
        CartSubcommand::Clear => cart.clear_cart()?,
    }
    print_summary(&CheckoutSummary::from_cart(&cart, app.config.shipping));
    Ok(())
}

async fn run_reset_password(app: &App) -> Result<(), CliError> {
    let mut wizard = PasswordResetWizard::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while wizard.step() != ResetStep::Done {
        let result = match wizard.step() {
            ResetStep::EnterEmail => {
                let email = prompt(&mut lines, "email: ")?;
                wizard.submit_email(&app.auth, &email).await
            }
            ResetStep::EnterCode => {
                let code = prompt(&mut lines, "code from email (blank to go back): ")?;
                if code.trim().is_empty() {
                    wizard.back();
                    continue;
                }
                wizard.submit_code(&app.auth, &code).await
            }
            ResetStep::NewPassword => {
                let password = prompt(&mut lines, "new password: ")?;
                let confirm = prompt(&mut lines, "confirm password: ")?;
                wizard.submit_password(&app.auth, &password, &confirm).await
            }
            ResetStep::Done => Ok(()),
        };
        if let Err(e) = result {
            eprintln!("{e}");
        }
    }
    println!("password reset; sign in with the new password");
    Ok(())
}

fn prompt(lines: &mut impl Iterator<Item = io::Result<String>>, label: &str) -> Result<String, CliError> {
    print!("{label}");
    io::stdout().flush()?;
    match lines.next() {
        Some(line) => Ok(line?),
        None => Err(CliError::Io(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"))),
    }
}

fn print_listing(items: &[pharmacy::net::types::Product], args: &ListArgs) -> Result<(), CliError> {
    let mut selected: Vec<_> = match &args.category {
        Some(category) => catalog::by_category(items, category),
        None => items.iter().collect(),
    };
    if let Some(query) = &args.search {
        let ids: Vec<String> = catalog::search(items, query).into_iter().map(|p| p.id.clone()).collect();
        selected.retain(|p| ids.contains(&p.id));
    }
    print_json(&selected)
}

fn print_summary(summary: &CheckoutSummary) {
    if summary.lines.is_empty() {
        println!("cart is empty");
        return;
    }
    for line in &summary.lines {
        println!("{:>3} x {:<32} {:>9.2}  [{}]", line.quantity, line.name, line.line_total(), line.product_id);
    }
    println!("items: {}", summary.item_count);
    println!("subtotal: {:.2}", summary.subtotal);
    println!("shipping: {:.2}", summary.shipping);
    println!("total: {:.2}", summary.total);
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
