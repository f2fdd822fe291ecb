//! Batch loader for a music-streaming star schema.
//!
//! `create-tables` rebuilds the target database and its five tables;
//! `etl` loads song metadata and activity logs into them.

pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

pub use error::EtlError;
