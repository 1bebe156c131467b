//! Engine configuration
//!
//! This module provides the `EngineConfig` struct and its type-safe builder.
//! It carries the facts the engine learns from its host application: the
//! canonical site URL, whether the installation runs in network mode, and the
//! paths that must never be rewritten.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod methods;
pub mod types;

// Re-exports for public API
pub use builder::{EngineConfigBuilder, WithSiteUrl};
pub use types::EngineConfig;
