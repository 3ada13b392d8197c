//! REST API access

pub mod client;
pub mod envelope;
pub mod resource;

pub use client::{ApiClient, ApiRequest};
pub use envelope::{Page, Pagination};
pub use resource::{Resource, ResourceKind, RestResource};
