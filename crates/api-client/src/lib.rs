//! HTTP/GraphQL client for the Shopfront CMS
//!
//! This crate wraps the CMS REST and GraphQL endpoints behind a uniform
//! result envelope: every fallible operation returns `Result<Envelope<T>,
//! ApiError>` and no expected failure ever surfaces as a panic.
//!
//! # Features
//!
//! - **Injectable transport**: the network seam is a trait, so tests run
//!   against a deterministic stub with zero real I/O
//! - **Closed error taxonomy**: every failure mode (transport, decode,
//!   CMS-level, configuration, validation) maps to one [`ErrorKind`]
//! - **Token as value or resolver**: static bearer tokens and per-request
//!   async resolvers share one code path
//! - **Bracket-notation queries**: nested filter objects serialize to the
//!   CMS `filter[field][_op]` grammar at any depth
//!
//! # Example
//!
//! ```rust,no_run
//! use shopfront_api_client::{ClientConfig, ProductQuery, ShopfrontClient};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::from_env();
//!     let client = ShopfrontClient::new(config)?;
//!
//!     let query = ProductQuery::new()
//!         .with_filter(json!({"status": {"_eq": "published"}}))
//!         .with_limit(10);
//!
//!     let page = client.products().list(&query).await?;
//!     println!("got {} products", page.data.len());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod query;
pub mod transport;

pub use client::{GraphqlRequest, RequestBody, RequestOptions, ShopfrontClient};
pub use config::{ClientConfig, TokenSource};
pub use endpoints::{ProductQuery, ProductsApi};
pub use error::{ApiError, ApiResult, Envelope, ErrorKind};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::client::{GraphqlRequest, RequestBody, RequestOptions, ShopfrontClient};
    pub use crate::config::{ClientConfig, TokenSource};
    pub use crate::endpoints::{ProductQuery, ProductsApi};
    pub use crate::error::{ApiError, ApiResult, Envelope, ErrorKind};
    pub use crate::transport::{StubTransport, Transport};
}
