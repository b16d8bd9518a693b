//! Row structs for the notice tables.
//!
//! Inserts go through [`herald_core::gateway::NewNotice`], so there are no
//! separate create DTOs here.

pub mod notice;
