//! Data models for the Buddy System frontend.
//!
//! These mirror the backend's JSON records field for field. The backend owns
//! every record; the frontend only holds transient copies.

mod announcement;
mod faq;
mod form;
mod knowledge;
mod mission;
mod report;
mod schedule;
mod station;
mod timesheet;
mod user;

pub use announcement::*;
pub use faq::*;
pub use form::*;
pub use knowledge::*;
pub use mission::*;
pub use report::*;
pub use schedule::*;
pub use station::*;
pub use timesheet::*;
pub use user::*;
