//! Resource-specific facades over the client core
//!
//! Each module provides a typed interface for one CMS collection. The
//! facades build query maps, delegate to the client's verb helpers and add
//! resource-level preconditions; they never classify failures themselves
//! beyond their own validation.

pub mod products;

pub use products::{ProductQuery, ProductsApi};
