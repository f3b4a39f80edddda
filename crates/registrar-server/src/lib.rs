//! # Registrar Server
//!
//! HTTP front end for the course catalog: route handlers, server-rendered
//! views, and the server lifecycle.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod routes;
pub mod server;
pub mod views;

pub use server::{AppState, Server, ServerConfig};
