//! # ticketstore
//!
//! A typed CRUD data-access client for an event-ticketing schema. Each
//! entity gets a repository with find/create/update/upsert/delete/count
//! operations; the [`Client`] facade owns the connection pool and hands out
//! repositories, transactions, and a raw query escape hatch.

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod repositories;
pub use migration;

pub use client::{Client, TransactionOptions};
pub use config::{ConfigLoader, StoreConfig};
pub use error::StoreError;
