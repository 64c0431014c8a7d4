//! genesis-client - state synchronization for the Genesis snippet catalog
//!
//! The crate keeps a local, typed mirror of a remote snippet catalog:
//! - [`client`] talks to the API and decodes its replies
//! - [`store`] holds the mirrored state, the actions that refresh it, the
//!   mutations that write it and the getters that read it
//! - [`search`] filters the loaded catalog locally
//!
//! The `genesis` binary drives the same store through [`cli`].

pub mod cli;
pub mod client;
pub mod config;
pub mod logging;
pub mod models;
pub mod search;
pub mod store;

pub use client::{ApiError, HttpClient, Transport};
pub use config::Config;
pub use store::{Action, AppState, Mutation, Store};
