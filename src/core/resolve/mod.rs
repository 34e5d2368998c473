//! Field resolution
//!
//! Materializes the references of a page before it is rendered. See
//! [`FieldResolver`].

pub mod resolver;

pub use resolver::{FieldResolver, RequestedFields, CONTAINER_FIELD, NOTES_FIELD, USER_FIELDS};
