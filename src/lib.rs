//! repoblog - Library Root
//!
//! A blog whose posts and media live in a GitHub repository. Re-exports
//! all modules for the binary, integration tests and benchmarks.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod usecases;

pub use error::BlogError;
pub use usecases::BlogClient;
