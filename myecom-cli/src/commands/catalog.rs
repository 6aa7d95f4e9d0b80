use anyhow::{Context, Result};
use clap::Subcommand;
use client::SuggestionDebouncer;
use shared::models::ProductId;
use std::{sync::Arc, time::Duration};

use super::{app::App, display};

#[derive(Subcommand, Debug)]
pub enum CatalogCommand {
    /// List all products
    List,
    /// Search products by name, description or category
    Search {
        /// Words to search for.
        query: String,
    },
    /// Show one product
    Show {
        id: ProductId,
    },
    /// List product categories
    Categories,
    /// Suggest search words for a partial query
    Suggest {
        query: String,
    },
}

pub async fn run(app: &App, command: CatalogCommand) -> Result<()> {
    match command {
        CatalogCommand::List => {
            let products = app
                .api
                .list_products()
                .await
                .context("failed to load products")?;
            if products.is_empty() {
                println!("The catalog is empty");
            }
            display::print_products(&products);
        }
        CatalogCommand::Search { query } => {
            let products = app
                .api
                .search_products(&query)
                .await
                .context("search failed")?;
            if products.is_empty() {
                println!("No products match \"{}\"", query.trim());
            }
            display::print_products(&products);
        }
        CatalogCommand::Show { id } => {
            let product = app
                .api
                .get_product(id)
                .await
                .with_context(|| format!("failed to load product #{id}"))?;
            display::print_product(&product);
        }
        CatalogCommand::Categories => {
            let categories = app
                .api
                .list_categories()
                .await
                .context("failed to load categories")?;
            for category in categories {
                println!("#{:<5} {}", category.id, category.name);
            }
        }
        CatalogCommand::Suggest { query } => {
            let debouncer = SuggestionDebouncer::with_quiet_period(
                Arc::new(app.api.clone()),
                Duration::from_millis(app.config.suggestion_debounce_ms),
            );
            let words = debouncer.schedule(&query).await.unwrap_or_default();
            for word in words {
                println!("{word}");
            }
        }
    }
    Ok(())
}
