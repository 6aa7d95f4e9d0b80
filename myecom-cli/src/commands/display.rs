//! Plain-text rendering of API records.

use client::{Cart, guard};
use shared::models::{Order, Product, User};

pub fn product_row(product: &Product) -> String {
    let stock = if product.is_in_stock() {
        format!("{} in stock", product.stock)
    } else {
        "out of stock".to_string()
    };
    let category = product
        .category
        .as_ref()
        .map_or("-", |category| category.name.as_str());
    format!(
        "#{:<5} {:<32} {:>10} {:<14} {}",
        product.id, product.name, product.price, stock, category
    )
}

pub fn print_products(products: &[Product]) {
    for product in products {
        println!("{}", product_row(product));
    }
}

pub fn print_product(product: &Product) {
    println!("{} (#{})", product.name, product.id);
    println!("price: {}", product.price);
    if product.is_in_stock() {
        println!("stock: {}", product.stock);
    } else {
        println!("stock: out of stock");
    }
    if let Some(category) = &product.category {
        println!("category: {}", category.name);
    }
    if let Some(supplier) = &product.supplier {
        println!("supplier: {}", supplier.username);
    }
    if let Some(image) = &product.image {
        println!("image: {image}");
    }
    if !product.description.is_empty() {
        println!();
        println!("{}", product.description);
    }
}

pub fn print_user(user: &User) {
    println!("{} (#{}) <{}>", user.username, user.id, user.email);
    let name = format!("{} {}", user.first_name, user.last_name);
    if !name.trim().is_empty() {
        println!("name: {}", name.trim());
    }
    match &user.profile {
        Some(profile) => {
            let approval = if profile.is_approved {
                "approved"
            } else {
                "awaiting approval"
            };
            println!("role: {} ({approval})", profile.role);
        }
        None => println!("role: none"),
    }
    let capabilities = guard::capabilities(user)
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    if !capabilities.is_empty() {
        println!("capabilities: {}", capabilities.join(", "));
    }
}

pub fn user_row(user: &User) -> String {
    let (role, approved) = user.profile.as_ref().map_or(("-".to_string(), "-"), |profile| {
        (
            profile.role.to_string(),
            if profile.is_approved { "yes" } else { "no" },
        )
    });
    format!(
        "#{:<5} {:<20} {:<28} {:<9} approved: {}",
        user.id, user.username, user.email, role, approved
    )
}

pub fn print_order(order: &Order) {
    let seen = if order.is_seen { "" } else { " [new]" };
    let customer = order
        .user
        .as_ref()
        .map(|user| format!(" by {}", user.username))
        .unwrap_or_default();
    println!(
        "order #{} {}{customer} {} total {}{seen}",
        order.id,
        order.created_at.format("%Y-%m-%d %H:%M"),
        order.status,
        order.total
    );
    for item in &order.items {
        let name = item
            .product
            .as_ref()
            .map_or("(deleted product)", |product| product.name.as_str());
        println!(
            "    {} x {} @ {} = {}",
            item.quantity,
            name,
            item.price,
            item.line_total()
        );
    }
}

pub fn print_cart(cart: &Cart) {
    for line in cart.lines() {
        println!(
            "{:>3} x {:<32} {:>10}",
            line.quantity,
            line.product.name,
            line.subtotal()
        );
    }
    println!("{} item(s), total {}", cart.item_count(), cart.total());
}
