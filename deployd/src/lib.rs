//! deployd library
//!
//! Single-flight deployment service, its shell pipeline executor and the
//! client that triggers it remotely.

pub mod app;
pub mod deploy;
pub mod errors;
pub mod logs;
pub mod models;
pub mod server;
pub mod storage;
pub mod trigger;
pub mod utils;
