//! Search-box suggestions.

use async_trait::async_trait;
use shared::models::Product;
use std::{
    collections::HashSet,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use tracing::{debug, warn};

use crate::{api::ApiClient, error::ClientResult};

/// Quiet period before a suggestion request goes out.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Queries shorter than this resolve to no suggestions without a request.
const MIN_QUERY_CHARS: usize = 2;

/// Lowercased words of the product names, stripped to ASCII letters and
/// digits, de-duplicated in first-seen order.
#[must_use]
pub fn suggestion_words(products: &[Product]) -> Vec<String> {
    let mut seen = HashSet::new();
    products
        .iter()
        .flat_map(|product| {
            product
                .name
                .to_lowercase()
                .split_whitespace()
                .map(|word| {
                    word.chars()
                        .filter(char::is_ascii_alphanumeric)
                        .collect::<String>()
                })
                .collect::<Vec<_>>()
        })
        .filter(|word| !word.is_empty() && seen.insert(word.clone()))
        .collect()
}

/// Anything that can answer a product search.
#[async_trait]
pub trait ProductSearch: Send + Sync {
    async fn search(&self, query: &str) -> ClientResult<Vec<Product>>;
}

#[async_trait]
impl ProductSearch for ApiClient {
    async fn search(&self, query: &str) -> ClientResult<Vec<Product>> {
        self.search_products(query).await
    }
}

/// Debounced suggestion fetcher: only the latest scheduled query issues a request.
pub struct SuggestionDebouncer {
    source: Arc<dyn ProductSearch>,
    quiet: Duration,
    latest: AtomicU64,
}

impl std::fmt::Debug for SuggestionDebouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionDebouncer")
            .field("quiet", &self.quiet)
            .field("latest", &self.latest.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl SuggestionDebouncer {
    #[must_use]
    pub fn new(source: Arc<dyn ProductSearch>) -> Self {
        Self::with_quiet_period(source, DEFAULT_DEBOUNCE)
    }

    #[must_use]
    pub fn with_quiet_period(source: Arc<dyn ProductSearch>, quiet: Duration) -> Self {
        Self {
            source,
            quiet,
            latest: AtomicU64::new(0),
        }
    }

    fn is_latest(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket
    }

    /// Schedule `query`, superseding any query still waiting.
    ///
    /// Resolves to `None` when a later call superseded this one, otherwise
    /// to the suggestion words. Fetch failures resolve to an empty list.
    pub async fn schedule(&self, query: &str) -> Option<Vec<String>> {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.quiet).await;
        if !self.is_latest(ticket) {
            debug!(ticket, "suggestion query superseded");
            return None;
        }

        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Some(Vec::new());
        }

        let words = match self.source.search(query).await {
            Ok(products) => suggestion_words(&products),
            Err(err) => {
                warn!(error = %err, "suggestion fetch failed");
                Vec::new()
            }
        };
        self.is_latest(ticket).then_some(words)
    }
}
