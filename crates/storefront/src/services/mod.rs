//! Business logic services for storefront.
//!
//! # Services
//!
//! - `newsletter` - Newsletter signup against the Shopify customer registry

pub mod newsletter;
