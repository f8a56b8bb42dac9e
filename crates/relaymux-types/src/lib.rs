//! # relaymux Types
//!
//! Core types, configuration models, and error definitions for relaymux.
//!
//! This crate provides the foundational type system for the bridge control core:
//!
//! - **`error`** - Typed error hierarchy for providers, failover, balancing and configuration
//! - **`models`** - Domain models (connection state, health snapshots, audit events, config)
//!
//! ## Architecture Role
//!
//! `relaymux-types` sits at the bottom of the dependency graph:
//!
//! ```text
//!        relaymux-types (this crate)
//!                │
//!                ▼
//!          relaymux-core
//!                │
//!                ▼
//!     bridge orchestrator (consumer)
//! ```
//!
//! All types are designed to be:
//! - **Serializable** via serde for health endpoints and config files
//! - **Clone** for cheap snapshotting across async boundaries
//! - **PartialEq** for testing and comparison

pub mod error;
pub mod models;

// Re-export error types for convenience
pub use error::{
    BalancerError, ConfigError, FailoverError, ProviderError, ProviderOperation, Result,
    TypedError,
};

// Re-export core model types
pub use models::{
    BalancerConfig, BalancerStrategy, BridgeConfig, ConnectionState, FailoverConfig,
    FailoverEvent, InboundEvent, OutboundMedia, ProviderConfig, ProviderEntry,
    ProviderStateSnapshot, SendReceipt, SlotStats, SwitchKind, SwitchNotice,
};
