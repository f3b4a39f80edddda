//! # Registrar Core
//!
//! Core types for the registrar course catalog service.
//!
//! This crate provides the foundational pieces used by the server and CLI:
//! - Common error types
//! - The [`Course`] record
//! - The file-backed [`Catalog`] store

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod course;
pub mod error;

pub use catalog::Catalog;
pub use course::Course;
pub use error::{Error, Result};
