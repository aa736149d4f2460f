//! Library exports for panelauth, shared between the binary and tests.

pub mod client;
pub mod config;
pub mod guard;
pub mod metrics;
pub mod models;
pub mod refresh;
pub mod routes;
pub mod startup;
pub mod state;
pub mod store;
pub mod utils;
