pub mod actors;
pub mod alerts;
#[cfg(feature = "api")]
pub mod api;
pub mod classify;
pub mod config;
pub mod discord;
pub mod monitor;
pub mod probe;
pub mod query;
pub mod registry;
pub mod streak;
pub mod util;
