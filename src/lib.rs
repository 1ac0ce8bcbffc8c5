//! `spotlight` library crate.
//!
//! Fetches organization contributors and explorer orchestrators and writes
//! them to JSON files. The binary entrypoint lives in `main.rs`.

pub mod aggregate;
pub mod cli;
pub mod collect;
pub mod config;
pub mod error;
pub mod explorer;
pub mod filter;
pub mod github;
pub mod models;
pub mod run;
pub mod sink;
pub mod source;
pub mod window;
