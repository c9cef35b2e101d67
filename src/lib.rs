//! Library crate for user-admin.
//!
//! This crate exposes the building blocks of the tool:
//! - Record model, in-memory repository, search and statistics (`model`, `repo`, `search`, `stats`)
//! - CSV/PDF report generation (`report`)
//! - Local and HTTP backends plus the session gate (`backend`, `api`, `auth`, `storage`)
//! - Configuration files and logging setup (`config`, `logging`)
//! - Application state, update loop and rendering (`app`, `ui`)
//!
//! It is used by the `user-admin` binary and by tests.
#![doc = include_str!("../README.md")]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod api;
pub mod app;
pub mod auth;
pub mod backend;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod report;
pub mod repo;
pub mod search;
pub mod stats;
pub mod storage;
pub mod ui;

// Re-export commonly used items at the crate root for convenience
/// Convenient error and result types shared across the crate.
pub use error::{AdminError, AdminResult, DynError, Result};
