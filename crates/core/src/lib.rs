//! Herald notice dispatch core.
//!
//! Pure building blocks shared by the notifier, storage and HTTP crates:
//!
//! - [`options`]: option layering, validation and recipient resolution.
//! - [`normalize`]: message flattening and markup escaping.
//! - [`translate`]: failures and validation errors to notice content.
//! - [`gateway`]: the collaborator traits a dispatch calls into.

pub mod error;
pub mod gateway;
pub mod level;
pub mod normalize;
pub mod options;
pub mod translate;
pub mod types;
