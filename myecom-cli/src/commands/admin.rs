use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use client::{Capability, guard};
use rust_decimal::Decimal;
use shared::models::{
    ApprovalAction, OrderStatus, Product, ProductForm, ProductId, User, UserId,
    WorkerRegistrationRequest,
};
use std::path::PathBuf;

use super::{app::App, display, prompt};

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    /// List products you can manage (suppliers see only their own)
    Products,
    /// Add a product
    CreateProduct(CreateProductArgs),
    /// Edit a product; omitted fields keep their current value
    UpdateProduct(UpdateProductArgs),
    /// Delete a product
    DeleteProduct { id: ProductId },
    /// List orders
    Orders {
        /// Only show orders not yet marked as seen.
        #[arg(long)]
        unseen: bool,
    },
    /// Change an order's status (pending, shipped, delivered, cancelled)
    OrderStatus { id: u64, status: OrderStatus },
    /// Mark an order as seen
    MarkSeen { id: u64 },
    /// List user accounts
    Users,
    /// Create a supplier account awaiting approval
    RegisterSupplier(RegisterSupplierArgs),
    /// Approve a supplier
    Approve { id: UserId },
    /// Reject a supplier
    Reject { id: UserId },
    /// Delete a user account
    DeleteUser { id: UserId },
}

#[derive(Args, Debug)]
pub struct CreateProductArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long)]
    pub price: Decimal,
    #[arg(long)]
    pub stock: u32,
    /// Category id (see `myecom catalog categories`).
    #[arg(long)]
    pub category: u64,
    /// Image file to upload.
    #[arg(long)]
    pub image: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct UpdateProductArgs {
    pub id: ProductId,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub price: Option<Decimal>,
    #[arg(long)]
    pub stock: Option<u32>,
    #[arg(long)]
    pub category: Option<u64>,
    #[arg(long)]
    pub image: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RegisterSupplierArgs {
    #[arg(long, short)]
    pub username: String,
    #[arg(long, short)]
    pub email: String,
    #[arg(long, default_value = "")]
    pub first_name: String,
    #[arg(long, default_value = "")]
    pub last_name: String,
    /// Read the initial password from stdin instead of prompting.
    #[arg(long)]
    pub password_stdin: bool,
}

pub async fn run(app: &App, command: AdminCommand) -> Result<()> {
    match command {
        AdminCommand::Products => products(app).await,
        AdminCommand::CreateProduct(args) => create_product(app, args).await,
        AdminCommand::UpdateProduct(args) => update_product(app, args).await,
        AdminCommand::DeleteProduct { id } => delete_product(app, id).await,
        AdminCommand::Orders { unseen } => orders(app, unseen).await,
        AdminCommand::OrderStatus { id, status } => order_status(app, id, status).await,
        AdminCommand::MarkSeen { id } => {
            app.require(Capability::ManageCatalog)?;
            app.api
                .mark_order_seen(id)
                .await
                .with_context(|| format!("failed to mark order #{id} as seen"))?;
            println!("Order #{id} marked as seen");
            Ok(())
        }
        AdminCommand::Users => users(app).await,
        AdminCommand::RegisterSupplier(args) => register_supplier(app, args).await,
        AdminCommand::Approve { id } => approval(app, id, ApprovalAction::Approve).await,
        AdminCommand::Reject { id } => approval(app, id, ApprovalAction::Reject).await,
        AdminCommand::DeleteUser { id } => delete_user(app, id).await,
    }
}

fn is_admin(user: &User) -> bool {
    guard::has_capability(user, Capability::ManageUsers)
}

/// Products `user` may manage: everything for admins, their own listings for suppliers.
fn managed_products(user: &User, products: Vec<Product>) -> Vec<Product> {
    if is_admin(user) {
        return products;
    }
    products
        .into_iter()
        .filter(|product| product.is_supplied_by(user.id))
        .collect()
}

async fn load_managed_product(app: &App, user: &User, id: ProductId) -> Result<Product> {
    let product = app
        .api
        .get_product(id)
        .await
        .with_context(|| format!("failed to load product #{id}"))?;
    if !is_admin(user) && !product.is_supplied_by(user.id) {
        bail!("product #{id} is listed by another supplier");
    }
    Ok(product)
}

async fn products(app: &App) -> Result<()> {
    let user = app.require(Capability::ManageCatalog)?;
    let products = app
        .api
        .list_products()
        .await
        .context("failed to load products")?;
    let products = managed_products(&user, products);
    if products.is_empty() {
        println!("No products yet; add one with `myecom admin create-product`");
    }
    display::print_products(&products);
    Ok(())
}

async fn create_product(app: &App, args: CreateProductArgs) -> Result<()> {
    app.require(Capability::ManageCatalog)?;
    let form = ProductForm {
        name: args.name,
        description: args.description,
        price: args.price,
        stock: args.stock,
        category_id: args.category,
        image: args.image,
    };
    let product = app
        .api
        .create_product(&form)
        .await
        .context("failed to create product")?;
    println!("Created product #{}", product.id);
    display::print_product(&product);
    Ok(())
}

async fn update_product(app: &App, args: UpdateProductArgs) -> Result<()> {
    let user = app.require(Capability::ManageCatalog)?;
    let current = load_managed_product(app, &user, args.id).await?;
    let Some(category_id) = args
        .category
        .or_else(|| current.category.as_ref().map(|category| category.id))
    else {
        bail!("product #{} has no category; pass --category", args.id);
    };

    let form = ProductForm {
        name: args.name.unwrap_or(current.name),
        description: args.description.unwrap_or(current.description),
        price: args.price.unwrap_or(current.price),
        stock: args.stock.unwrap_or(current.stock),
        category_id,
        image: args.image,
    };
    let product = app
        .api
        .update_product(args.id, &form)
        .await
        .with_context(|| format!("failed to update product #{}", args.id))?;
    display::print_product(&product);
    Ok(())
}

async fn delete_product(app: &App, id: ProductId) -> Result<()> {
    let user = app.require(Capability::ManageCatalog)?;
    let product = load_managed_product(app, &user, id).await?;
    app.api
        .delete_product(id)
        .await
        .with_context(|| format!("failed to delete product #{id}"))?;
    println!("Deleted {} (#{id})", product.name);
    Ok(())
}

async fn orders(app: &App, unseen: bool) -> Result<()> {
    app.require(Capability::ManageCatalog)?;
    let orders = app
        .api
        .list_orders()
        .await
        .context("failed to load orders")?;
    let mut shown = 0_usize;
    for order in orders.iter().filter(|order| !unseen || !order.is_seen) {
        display::print_order(order);
        shown += 1;
    }
    if shown == 0 {
        println!("No orders");
    }
    Ok(())
}

async fn order_status(app: &App, id: u64, status: OrderStatus) -> Result<()> {
    app.require(Capability::ManageCatalog)?;
    let order = app
        .api
        .update_order_status(id, status)
        .await
        .with_context(|| format!("failed to update order #{id}"))?;
    println!("Order #{} is now {}", order.id, order.status);
    Ok(())
}

async fn users(app: &App) -> Result<()> {
    app.require(Capability::ManageUsers)?;
    let users = app
        .api
        .list_users()
        .await
        .context("failed to load users")?;
    for user in &users {
        println!("{}", display::user_row(user));
    }
    let pending = users.iter().filter(|user| user.is_pending_supplier()).count();
    if pending > 0 {
        println!("{pending} supplier(s) awaiting approval");
    }
    Ok(())
}

async fn register_supplier(app: &App, args: RegisterSupplierArgs) -> Result<()> {
    app.require(Capability::ManageUsers)?;
    let password = prompt::password("Initial password: ", args.password_stdin)?;
    let user = app
        .api
        .register_worker(&WorkerRegistrationRequest {
            username: args.username,
            email: args.email,
            password,
            first_name: args.first_name,
            last_name: args.last_name,
        })
        .await
        .context("failed to register supplier")?;
    println!(
        "Registered supplier {} (#{}); approve with `myecom admin approve {}`",
        user.username, user.id, user.id
    );
    Ok(())
}

async fn approval(app: &App, id: UserId, action: ApprovalAction) -> Result<()> {
    app.require(Capability::ManageUsers)?;
    let response = app
        .api
        .set_worker_approval(id, action)
        .await
        .with_context(|| format!("failed to update supplier #{id}"))?;
    println!("{}", response.detail);
    Ok(())
}

async fn delete_user(app: &App, id: UserId) -> Result<()> {
    let admin = app.require(Capability::ManageUsers)?;
    if admin.id == id {
        bail!("refusing to delete your own account");
    }
    app.api
        .delete_user(id)
        .await
        .with_context(|| format!("failed to delete user #{id}"))?;
    println!("Deleted user #{id}");
    Ok(())
}
