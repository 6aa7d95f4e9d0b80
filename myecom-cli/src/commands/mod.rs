//! Subcommand implementations.

pub mod account;
pub mod admin;
pub mod app;
pub mod catalog;
pub mod checkout;
pub mod completion;
pub mod config;
pub mod display;
pub mod orders;
pub mod prompt;
pub mod session;
