//! Domain models for the Post-Harvest Risk Platform

mod batch;
mod crop;
mod risk;
mod weather;

pub use batch::*;
pub use crop::*;
pub use risk::*;
pub use weather::*;
