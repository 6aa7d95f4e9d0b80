use anyhow::{Context, Result};
use client::Capability;

use super::{app::App, display};

/// Print the signed-in user's order history.
pub async fn run(app: &App) -> Result<()> {
    app.require(Capability::Shop)?;
    let orders = app
        .api
        .my_orders()
        .await
        .context("failed to load your orders")?;
    if orders.is_empty() {
        println!("You have not placed any orders yet");
    }
    for order in &orders {
        display::print_order(order);
    }
    Ok(())
}
