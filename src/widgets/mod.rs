//! Adapters for the third-party widgets some pages drive.
//!
//! Controllers only see the traits; the concrete widget can be swapped without
//! touching page logic.

mod calendar;
mod markdown;

pub use calendar::*;
pub use markdown::*;
