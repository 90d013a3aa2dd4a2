//! Command line interface for the pharmacy client

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use pharmacy_client::{
    CartEligibility, ClientConfig, ClientError, GuardDecision, PharmacyClient, PrimaryRolePolicy,
    QuantityUpdate, RegisterRequest, Registration, RouteRequest, TokenClaims,
};
use rust_decimal::Decimal;
use shared::{
    Cart, ChangePasswordRequest, MedicineRequest, Order, OrderStatus, Role, UpdateProfileRequest,
};

/// HealthHub pharmacy client
#[derive(Parser, Debug)]
#[command(name = "pharmacy", version, about = "HealthHub pharmacy client")]
pub struct Cli {
    /// API base URL
    #[arg(long, env = "PHARMACY_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Directory holding the saved session
    #[arg(long, env = "PHARMACY_STORAGE_DIR", global = true)]
    pub storage_dir: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, env = "PHARMACY_TIMEOUT_SECS", global = true)]
    pub timeout: Option<u64>,

    /// How the primary role is chosen
    #[arg(long, value_enum, global = true)]
    pub primary_role: Option<PolicyArg>,

    /// Log level (RUST_LOG takes precedence)
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Also write security events to daily files in this directory
    #[arg(long, env = "PHARMACY_LOG_DIR", global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and save the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "PHARMACY_PASSWORD")]
        password: String,
    },
    /// Create an account
    Register(RegisterArgs),
    /// Forget the saved session
    Logout,
    /// Show the signed-in identity
    Whoami {
        /// Re-fetch the profile from the server first
        #[arg(long)]
        refresh: bool,
    },
    /// Check where a navigation would end up
    Guard {
        path: String,
        /// Roles that grant access (any of them)
        #[arg(long = "role")]
        roles: Vec<String>,
    },
    /// Browse or manage the medicine catalog
    #[command(subcommand)]
    Medicines(MedicineCommand),
    /// Manage your cart
    #[command(subcommand)]
    Cart(CartCommand),
    /// Place an order for everything in the cart
    Checkout {
        #[arg(long)]
        address: String,
        #[arg(long)]
        phone: String,
    },
    /// View and manage orders
    #[command(subcommand)]
    Orders(OrderCommand),
    /// View and edit your profile
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Administer user accounts
    #[command(subcommand)]
    Users(UserCommand),
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub address: String,
    #[arg(long)]
    pub age: u32,
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "PHARMACY_PASSWORD")]
    pub password: String,
    #[arg(long)]
    pub phone: String,
    #[arg(long = "role", value_enum, default_value = "user")]
    pub roles: Vec<RoleArg>,
}

#[derive(Subcommand, Debug)]
pub enum MedicineCommand {
    /// List medicines, optionally filtered by name
    List {
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one medicine
    Show { id: i64 },
    /// Add a medicine to the catalog (staff)
    Create(MedicineArgs),
    /// Replace a medicine's details (staff)
    Update {
        id: i64,
        #[command(flatten)]
        details: MedicineArgs,
    },
    /// Remove a medicine (staff)
    Delete { id: i64 },
}

#[derive(Args, Debug)]
pub struct MedicineArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long)]
    pub price: Decimal,
    #[arg(long)]
    pub stock: u32,
    /// Expiration date (YYYY-MM-DD)
    #[arg(long)]
    pub expires: String,
    #[arg(long, default_value = "")]
    pub image: String,
}

impl From<MedicineArgs> for MedicineRequest {
    fn from(args: MedicineArgs) -> Self {
        Self {
            name: args.name,
            description: args.description,
            price: args.price,
            stock_quantity: args.stock,
            expiration_date: args.expires,
            image: args.image,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum CartCommand {
    /// Show the cart
    Show,
    /// Add a medicine
    Add {
        medicine_id: i64,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set an item's quantity
    Update { item_id: i64, quantity: u32 },
    /// Remove an item
    Remove { item_id: i64 },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum OrderCommand {
    /// Your orders
    Mine,
    /// Show one order
    Show { id: i64 },
    /// Cancel a pending order
    Cancel { id: i64 },
    /// Every order (staff)
    All,
    /// Change an order's status (staff)
    Status {
        id: i64,
        #[arg(value_enum)]
        status: StatusArg,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    /// Show the profile stored on the server
    Show,
    /// Change profile fields; omitted fields keep their value
    Update {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        age: Option<u32>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Change the password
    Password {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// List all accounts
    List,
    /// Re-enable an account
    Activate { id: i64 },
    /// Disable an account
    Deactivate { id: i64 },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum PolicyArg {
    First,
    Highest,
}

impl From<PolicyArg> for PrimaryRolePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::First => PrimaryRolePolicy::FirstListed,
            PolicyArg::Highest => PrimaryRolePolicy::HighestPrivilege,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum RoleArg {
    User,
    Pharmacist,
    Admin,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::User => Role::User,
            RoleArg::Pharmacist => Role::Pharmacist,
            RoleArg::Admin => Role::Admin,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum StatusArg {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl From<StatusArg> for OrderStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Pending => OrderStatus::Pending,
            StatusArg::Confirmed => OrderStatus::Confirmed,
            StatusArg::Shipped => OrderStatus::Shipped,
            StatusArg::Delivered => OrderStatus::Delivered,
            StatusArg::Cancelled => OrderStatus::Cancelled,
        }
    }
}

impl Cli {
    /// Environment configuration with command line overrides applied
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::from_env();
        if let Some(url) = &self.api_url {
            config.base_url = url.clone();
        }
        if let Some(dir) = &self.storage_dir {
            config = config.with_storage_dir(dir);
        }
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }
        if let Some(policy) = self.primary_role {
            config = config.with_primary_role_policy(policy.into());
        }
        config
    }
}

/// Surface the message meant for people, keep the full error in the logs
fn friendly(e: ClientError) -> anyhow::Error {
    tracing::debug!(error = ?e, "Command failed");
    anyhow::anyhow!(e.user_message())
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.client_config();
    tracing::debug!(base_url = %config.base_url, storage = %config.storage_dir.display(), "Client configured");
    let mut client = PharmacyClient::new(config).map_err(friendly)?;

    match cli.command {
        Command::Login { email, password } => {
            let user = client.login(&email, &password).await.map_err(friendly)?;
            println!("Welcome, {}!", display_name(&user.full_name(), &user.email));
            println!("Continue at {}", client.landing_path());
        }
        Command::Register(args) => {
            let request = RegisterRequest {
                first_name: args.first_name,
                last_name: args.last_name,
                address: args.address,
                age: args.age,
                email: args.email,
                password: args.password,
                phone_number: args.phone,
                roles: args.roles.into_iter().map(Role::from).collect(),
                active: true,
            };
            match client.register(&request).await.map_err(friendly)? {
                Registration::SignedIn(session) => {
                    println!("Account created for {}.", session.user.email);
                    println!("Continue at {}", client.landing_path());
                }
                Registration::LoginRequired => {
                    println!("Registration successful! Please login with your new account.");
                }
            }
        }
        Command::Logout => {
            client.logout().map_err(friendly)?;
            println!("Logged out.");
        }
        Command::Whoami { refresh } => whoami(&mut client, refresh).await?,
        Command::Guard { path, roles } => {
            let request = RouteRequest::new(path).requiring(roles);
            match client.guard(&request) {
                GuardDecision::Render => println!("authorized: render {}", request.path),
                GuardDecision::RedirectToLogin { login_path, return_to } => {
                    println!("unauthenticated: redirect to {login_path} (return to {return_to})")
                }
                GuardDecision::RedirectToLanding { role, path } => {
                    let role = role.map(|r| r.to_string()).unwrap_or_else(|| "none".into());
                    println!("unauthorized ({role}): redirect to {path}")
                }
            }
        }
        Command::Medicines(command) => medicines(&client, command).await?,
        Command::Cart(command) => cart(&client, command).await?,
        Command::Checkout { address, phone } => {
            let cart = client.cart().get_or_create().await.map_err(friendly)?;
            let order = client
                .orders()
                .checkout(&cart, &address, &phone)
                .await
                .map_err(friendly)?;
            println!("Order placed successfully! You can view your orders in the Orders section.");
            print_order(&order);
        }
        Command::Orders(command) => orders(&client, command).await?,
        Command::Profile(command) => profile(&mut client, command).await?,
        Command::Users(command) => users(&client, command).await?,
    }
    Ok(())
}

async fn whoami(client: &mut PharmacyClient, refresh: bool) -> anyhow::Result<()> {
    if refresh {
        client.refresh_profile().await.map_err(friendly)?;
    }
    let Some(session) = client.session() else {
        println!("Not logged in.");
        return Ok(());
    };
    let user = &session.user;
    println!("{} <{}>", display_name(&user.full_name(), &user.email), user.email);
    println!("id:       {}", user.id);
    let roles: Vec<&str> = user.roles.iter().map(Role::as_str).collect();
    println!("roles:    {}", roles.join(", "));
    if let Some(role) = client.primary_role() {
        println!("primary:  {}", role.label());
    }
    println!("landing:  {}", client.landing_path());
    let cart = match client.cart_eligibility() {
        CartEligibility::Eligible => "yes".to_string(),
        other => format!("no ({other:?})"),
    };
    println!("cart:     {cart}");
    if TokenClaims::decode(&session.token).is_ok_and(|claims| claims.is_expired()) {
        println!("warning:  the saved token has expired; log in again");
    }
    Ok(())
}

async fn medicines(client: &PharmacyClient, command: MedicineCommand) -> anyhow::Result<()> {
    let service = client.medicines();
    match command {
        MedicineCommand::List { search } => {
            let medicines = match search {
                Some(query) => service.search(&query).await,
                None => service.list().await,
            }
            .map_err(friendly)?;
            for m in medicines {
                println!(
                    "{:>5}  {:<32} {:>9}  {:>4} units  {:?}",
                    m.id,
                    m.name,
                    m.price,
                    m.stock_quantity,
                    m.stock_status()
                );
            }
        }
        MedicineCommand::Show { id } => {
            let m = service.get(id).await.map_err(friendly)?;
            println!("{} (#{})", m.name, m.id);
            println!("{}", m.description);
            println!("price:    {}", m.price);
            println!("stock:    {} units ({:?})", m.stock_quantity, m.stock_status());
            println!("expires:  {}", m.expiration_date);
        }
        MedicineCommand::Create(args) => {
            let m = service.create(&args.into()).await.map_err(friendly)?;
            println!("Medicine {} created (#{}).", m.name, m.id);
        }
        MedicineCommand::Update { id, details } => {
            let m = service.update(id, &details.into()).await.map_err(friendly)?;
            println!("Medicine {} updated.", m.name);
        }
        MedicineCommand::Delete { id } => {
            service.delete(id).await.map_err(friendly)?;
            println!("Medicine {id} deleted.");
        }
    }
    Ok(())
}

async fn cart(client: &PharmacyClient, command: CartCommand) -> anyhow::Result<()> {
    let service = client.cart();
    match command {
        CartCommand::Show => {
            let current = service.get_or_create().await.map_err(friendly)?;
            print_cart(&current);
        }
        CartCommand::Add {
            medicine_id,
            quantity,
        } => {
            let current = service.get_or_create().await.map_err(friendly)?;
            let medicine = client
                .medicines()
                .get(medicine_id)
                .await
                .map_err(friendly)?;
            let addition = service
                .add_medicine(&current, &medicine, quantity)
                .await
                .map_err(friendly)?;
            if addition.clamped {
                println!(
                    "Only {} more unit(s) of {} available; added {}.",
                    addition.added, medicine.name, addition.added
                );
            }
            print_cart(&addition.cart);
        }
        CartCommand::Update { item_id, quantity } => {
            let current = service.get_or_create().await.map_err(friendly)?;
            match service
                .update_quantity(&current, item_id, quantity)
                .await
                .map_err(friendly)?
            {
                QuantityUpdate::Applied(cart) => print_cart(&cart),
                QuantityUpdate::Superseded => println!("A newer update for this item is pending."),
            }
        }
        // removal addresses the item directly; no cart lookup
        CartCommand::Remove { item_id } => {
            let cart = service.remove_item(item_id).await.map_err(friendly)?;
            print_cart(&cart);
        }
        CartCommand::Clear => {
            let current = service.get_or_create().await.map_err(friendly)?;
            service.clear(current.id).await.map_err(friendly)?;
            println!("Cart cleared.");
        }
    }
    Ok(())
}

async fn orders(client: &PharmacyClient, command: OrderCommand) -> anyhow::Result<()> {
    let service = client.orders();
    match command {
        OrderCommand::Mine => service.mine().await.map_err(friendly)?.iter().for_each(print_order),
        OrderCommand::All => service.all().await.map_err(friendly)?.iter().for_each(print_order),
        OrderCommand::Show { id } => print_order(&service.get(id).await.map_err(friendly)?),
        OrderCommand::Cancel { id } => {
            let order = service.cancel(id).await.map_err(friendly)?;
            println!("Order {} is now {}.", order.id, order.status);
        }
        OrderCommand::Status { id, status } => {
            let order = service
                .update_status(id, status.into())
                .await
                .map_err(friendly)?;
            println!("Order {} is now {}.", order.id, order.status);
        }
    }
    Ok(())
}

async fn profile(client: &mut PharmacyClient, command: ProfileCommand) -> anyhow::Result<()> {
    match command {
        ProfileCommand::Show => {
            let user = client.users().profile().await.map_err(friendly)?;
            println!("{} <{}>", display_name(&user.full_name(), &user.email), user.email);
            println!("address:  {}", user.address);
            println!("phone:    {}", user.phone_number);
            println!("age:      {}", user.age);
        }
        ProfileCommand::Update {
            first_name,
            last_name,
            address,
            age,
            email,
            phone,
        } => {
            let current = client
                .user()
                .context("Please log in to continue.")?;
            let mut request = UpdateProfileRequest::from(&current);
            if let Some(v) = first_name {
                request.first_name = v;
            }
            if let Some(v) = last_name {
                request.last_name = v;
            }
            if let Some(v) = address {
                request.address = v;
            }
            if let Some(v) = age {
                request.age = v;
            }
            if let Some(v) = email {
                request.email = v;
            }
            if let Some(v) = phone {
                request.phone_number = v;
            }
            let user = client.update_profile(&request).await.map_err(friendly)?;
            println!("Profile updated for {}.", user.email);
        }
        ProfileCommand::Password {
            current,
            new,
            confirm,
        } => {
            let request = ChangePasswordRequest {
                current_password: current,
                new_password: new,
                confirm_password: confirm,
            };
            let message = client
                .users()
                .change_password(&request)
                .await
                .map_err(friendly)?;
            println!("{message}");
        }
    }
    Ok(())
}

async fn users(client: &PharmacyClient, command: UserCommand) -> anyhow::Result<()> {
    let service = client.users();
    match command {
        UserCommand::List => {
            for user in service.all().await.map_err(friendly)? {
                let roles: Vec<&str> = user.roles.iter().map(Role::as_str).collect();
                let state = if user.active { "active" } else { "inactive" };
                println!("{:>5}  {:<32} {:<24} {state}", user.id, user.email, roles.join(","));
            }
        }
        UserCommand::Activate { id } => {
            let user = service.set_active(id, true).await.map_err(friendly)?;
            println!("{} activated.", user.email);
        }
        UserCommand::Deactivate { id } => {
            let user = service.set_active(id, false).await.map_err(friendly)?;
            println!("{} deactivated.", user.email);
        }
    }
    Ok(())
}

fn display_name<'a>(full_name: &'a str, email: &'a str) -> &'a str {
    if full_name.is_empty() { email } else { full_name }
}

fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }
    for item in &cart.item_list {
        println!(
            "{:>5}  {:<32} x{:<3} {:>9}",
            item.id,
            item.medicine.name,
            item.quantity,
            item.line_total()
        );
    }
    println!("{} item(s), total {}", cart.total_items(), cart.total_price());
}

fn print_order(order: &Order) {
    println!(
        "#{:<5} {:<10} {:>9}  {}",
        order.id, order.status, order.total_amount, order.order_date
    );
    for item in &order.order_items {
        println!("        {} x{} @ {}", item.medicine.name, item.quantity, item.price);
    }
}
