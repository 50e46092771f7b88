//! services/api/src/lib.rs
//!
//! The library crate for the `api` service. The binaries in `bin/` pull the
//! adapters, configuration, and web layer from here.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
