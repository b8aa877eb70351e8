//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod budget;
pub mod category;
pub mod contract_period;
pub mod document;
pub mod fund;
pub mod project;
pub mod recurring;
pub mod session;
pub mod supplier;
pub mod transaction;
pub mod user;
