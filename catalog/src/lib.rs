pub mod client;
pub mod fetch;

pub use client::{CatalogClient, CatalogError};
pub use fetch::fetch_all;
