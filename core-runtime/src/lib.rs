//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the audio alert core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Session lifecycle event bus
//!
//! ## Overview
//!
//! This crate contains the ambient utilities that the playback session and
//! the service façade depend on. It establishes the logging conventions, the
//! validated configuration shared by every layer, and the broadcast channel
//! used to observe session state changes.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
