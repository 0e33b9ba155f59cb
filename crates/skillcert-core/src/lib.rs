//! Core library for the skillcert terminal client.
//!
//! Everything the CLI needs that is not terminal I/O lives here: config,
//! the typed portal API client, the persisted session, routing guards and
//! the attempt/payment/test progression.

pub mod admin;
pub mod api;
pub mod certificate;
pub mod config;
pub mod dates;
pub mod flow;
pub mod session;
pub mod theme;
