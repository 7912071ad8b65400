//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (HTTP clients, file I/O). Each sub-module
//! groups adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `github`: GitHub REST API client and contents store
//! - `memory`: In-process stand-ins for both ports
//! - `persistence`: Token file on local disk

pub mod github;
pub mod memory;
pub mod persistence;
