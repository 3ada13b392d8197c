//! Generic CRUD synchronization for list views

mod controller;
pub mod filters;

pub use controller::{CrudController, CrudState, FetchError, DEFAULT_DEBOUNCE};
pub use filters::FilterSet;
