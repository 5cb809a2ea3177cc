//! # truckmate-core
//!
//! Core library for TruckMate - a terminal client for a truck repair shop's
//! damage assessment service.
//!
//! This library provides:
//! - Wire types for the shop backend's REST API
//! - An HTTP client and a blocking [`api::Backend`] seam over it
//! - The session context (durable token + derived identity)
//! - The admin dashboard filter/sort/bucket pipeline
//! - Password and form validation
//! - Screen routing with role gates
//! - Configuration management and logging infrastructure
//!
//! ## Example
//!
//! ```rust,no_run
//! use truckmate_core::api::HttpBackend;
//! use truckmate_core::session::{SessionContext, TokenStore};
//! use truckmate_core::Config;
//!
//! let config = Config::load().expect("failed to load config");
//! let backend = HttpBackend::new(&config.api).expect("failed to create client");
//!
//! let mut session = SessionContext::new(TokenStore::new(config.token_path()));
//! let state = session.restore(&backend).expect("failed to read token");
//! println!("{:?}", state);
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use error::{Error, Result};
pub use types::*;

// Public modules
pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod format;
pub mod logging;
pub mod router;
pub mod session;
pub mod types;
pub mod validation;
