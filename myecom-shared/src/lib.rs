//! Shared models and configuration for the MyEcom storefront client.
//!
//! Every type here mirrors a payload of the storefront REST API; the client
//! and CLI crates build on them without re-declaring wire formats.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![warn(clippy::pedantic)]
#![allow(clippy::multiple_crate_versions, clippy::module_name_repetitions)]

pub mod config;
pub mod models;
