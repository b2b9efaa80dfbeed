//! Resource data model: attribute values, stored resources and list paging.
//!
//! # Key Types
//!
//! - [`Value`] - Closed sum type for attribute values
//! - [`Attributes`] - Insertion-ordered attribute mapping
//! - [`Resource`] - A stored resource with its [`Meta`]
//! - [`ListRequestParams`] / [`Page`] - Pagination and filtering for listings

pub mod context;
pub mod resource;
pub mod value;
pub mod version;

pub use context::{ListRequestParams, Page};
pub use resource::{Meta, Resource};
pub use value::{Attributes, Value};
pub use version::Version;
