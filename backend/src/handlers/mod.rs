//! HTTP request handlers

pub mod batches;
pub mod forecast;
pub mod health;
pub mod risk;
pub mod sync;

pub use batches::*;
pub use forecast::*;
pub use health::*;
pub use risk::*;
pub use sync::*;
