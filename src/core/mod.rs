//! Core translation engine module

pub mod client;
pub mod config;
pub mod errors;
pub mod key_cache;
pub mod languages;
pub mod models;
pub mod result_cache;
pub mod signer;
pub mod transport;
