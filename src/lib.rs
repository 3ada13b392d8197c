//! Marine-Axis - admin client for the Marine-Axis marketplace API
//!
//! This is the library interface, giving programmatic access to the session
//! manager, the REST client and the generic list controller used by the CLI.

pub mod api;
pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod crud;
pub mod error;
pub mod events;

pub use app::App;
pub use config::Config;
pub use crud::{CrudController, FilterSet};
pub use error::{ApiError, Error, ErrorKind};
