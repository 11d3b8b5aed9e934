//! Icecube Core - Shared types library.
//!
//! Types shared by the storefront service and its integration tests.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. Anything that
//! talks to Shopify lives in the storefront crate.
//!
//! # Modules
//!
//! - [`types`] - Email addresses, marketing consent, and newsletter
//!   subscription requests/results

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
