//! Core types and trait definitions for the Opisto school-administration
//! store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod catalog;
pub mod credential;
pub mod error;
pub mod message;
pub mod schedule;
pub mod store;
pub mod user;

pub use error::{Error, Result};
