//! estimate-service: cost estimate pricing engine and the HTTP service that
//! serves its figures to document preview and PDF export.

pub mod config;
pub mod handlers;
pub mod models;
pub mod pricing;
pub mod services;
pub mod startup;

pub use startup::{AppState, Application};
