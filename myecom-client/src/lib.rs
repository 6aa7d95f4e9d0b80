//! Client-side core for the MyEcom storefront.
//!
//! [`ApiClient`] wraps the REST API, [`SessionStore`] owns the token
//! lifecycle and the signed-in user, [`Cart`] holds the basket and the
//! [`guard`] module decides who may enter which pages.

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::multiple_crate_versions, clippy::module_name_repetitions)]

pub mod api;
pub mod cart;
pub mod error;
pub mod guard;
pub mod http;
pub mod search;
pub mod session;
pub mod storage;

pub use api::ApiClient;
pub use cart::{Cart, CartLine, clamp_quantity};
pub use error::{ClientError, ClientResult};
pub use guard::{Capability, GuardDecision, Route};
pub use http::HttpAdapter;
pub use search::{ProductSearch, SuggestionDebouncer, suggestion_words};
pub use session::{SessionSnapshot, SessionStore};
pub use storage::{FileTokenStore, MemoryTokenStore, StoredTokens, TokenStore};
