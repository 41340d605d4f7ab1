//! geoimpact CLI library.
//!
//! Types, command handlers and output formatting behind the `geoimpact`
//! binary. Commands run against a JSON fixture workspace loaded into the
//! in-memory stores.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod fixture;
pub mod output;
