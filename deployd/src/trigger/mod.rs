//! Remote deployment trigger client

pub mod client;
pub mod report;

pub use client::{Options, TriggerClient, TriggerError, TriggerOutcome};
pub use report::report;
