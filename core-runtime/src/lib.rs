//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the admin console core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus system
//!
//! ## Overview
//!
//! Every other core crate depends on this one. It owns the validated
//! `CoreConfig` (settings plus injected bridges), the `tracing` bootstrap,
//! and the broadcast channel that session changes are published on.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{ApiSettings, CoreConfig, CoreConfigBuilder, FeatureFlags, GoogleOAuthSettings};
pub use error::{Error, Result};
