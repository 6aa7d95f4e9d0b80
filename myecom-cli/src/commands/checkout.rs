use anyhow::{Context, Result, bail};
use clap::Args;
use client::{Capability, Cart, clamp_quantity};
use shared::models::{CreateOrderRequest, PaymentMethod, ProductId};
use std::str::FromStr;
use tracing::info;

use super::{app::App, display};

/// One `--item` argument: a product id with an optional quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemSpec {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl FromStr for ItemSpec {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (id, quantity) = value.split_once(':').unwrap_or((value, "1"));
        let product_id = id
            .trim()
            .parse()
            .map_err(|_| format!("invalid product id `{id}`"))?;
        let quantity: u32 = quantity
            .trim()
            .parse()
            .map_err(|_| format!("invalid quantity `{quantity}`"))?;
        if quantity == 0 {
            return Err("quantity must be at least 1".to_string());
        }
        Ok(Self {
            product_id,
            quantity,
        })
    }
}

#[derive(Args, Debug)]
pub struct CheckoutArgs {
    /// Product to buy as `<id>` or `<id>:<quantity>`; repeat for several products.
    #[arg(long = "item", short, required = true, value_name = "ID[:QTY]")]
    pub items: Vec<ItemSpec>,

    /// Shipping address.
    #[arg(long, short)]
    pub address: String,

    /// Print the cart without placing the order.
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn run(app: &App, args: CheckoutArgs) -> Result<()> {
    app.require(Capability::Shop)?;
    let address = args.address.trim();
    if address.is_empty() {
        bail!("a shipping address is required");
    }

    let mut cart = Cart::new();
    for item in &args.items {
        let product = app
            .api
            .get_product(item.product_id)
            .await
            .with_context(|| format!("failed to load product #{}", item.product_id))?;
        if !product.is_in_stock() {
            eprintln!("warning: {} is out of stock; skipped", product.name);
            continue;
        }
        let quantity = clamp_quantity(item.quantity, product.stock);
        if quantity < item.quantity {
            eprintln!(
                "warning: only {} of {} in stock; quantity reduced",
                product.stock, product.name
            );
        }
        cart.add(product, quantity);
    }

    let items = cart.order_items();
    if items.is_empty() {
        bail!("nothing to order; every requested product is out of stock");
    }
    display::print_cart(&cart);
    if args.dry_run {
        return Ok(());
    }

    let order = app
        .api
        .create_order(&CreateOrderRequest {
            items,
            address: address.to_string(),
            payment_method: PaymentMethod::Cod,
        })
        .await
        .context("failed to place order")?;
    info!(order = order.id, "order placed");
    cart.clear();
    println!("Order #{} placed ({}); pay {} on delivery", order.id, order.status, order.total);
    Ok(())
}
