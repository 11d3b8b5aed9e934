//! Icecube storefront library.
//!
//! Newsletter signup for the storefront: validates an address and records
//! it as a subscribed customer in the Shopify Admin API. Exposed as a
//! library so the router can be driven end-to-end from the integration
//! tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod shopify;
pub mod state;
