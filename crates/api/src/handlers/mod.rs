//! Request handlers.
//!
//! Each submodule provides async handler functions for a single resource.
//! Handlers delegate to the corresponding repository in `domari_db`, run
//! domain logic from `domari_core`, and map errors via [`crate::error::AppError`].

pub mod auth;
pub mod budget;
pub mod category;
pub mod document;
pub mod group;
pub mod project;
pub mod recurring;
pub mod report;
pub mod supplier;
pub mod transaction;
