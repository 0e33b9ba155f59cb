//! CLI command handlers.

pub mod admin;
pub mod auth;
pub mod certificate;
pub mod config;
pub mod journey;
pub mod prefs;
pub mod status;
