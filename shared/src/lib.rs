//! Shared types and domain logic for the Post-Harvest Risk Platform
//!
//! This crate contains the pure parts of the system shared between the
//! backend, the browser (via WASM) and other components: the data model,
//! the crop profile table, the risk engine and the advisory decision table.

pub mod advisory;
pub mod models;
pub mod risk;
pub mod types;
pub mod validation;

pub use advisory::*;
pub use models::*;
pub use risk::*;
pub use types::*;
pub use validation::*;
