//! Roster server host: configuration, logging, readiness and the HTTP stack
//! around the student records module.

pub mod config;
pub mod cors;
pub mod logging;
pub mod readiness;
pub mod server;
pub mod signals;

pub use config::{AppConfig, CliArgs};
pub use readiness::Readiness;
pub use server::{App, build_router, json_error_body, run, serve};
