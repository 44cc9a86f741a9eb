//! # vmengine Common
//!
//! Shared utilities for the vmengine crates.
//!
//! ## Logging
//!
//! ```rust
//! use vmengine_common::init_logging;
//!
//! // Initialize with level (RUST_LOG overrides it)
//! init_logging("info").unwrap();
//! tracing::info!(vm_id = "vm-123", "VM created");
//! ```

pub mod logging;

// Re-export logging functions
pub use logging::{
    init_logging,
    init_logging_json,
    init_test_logging,
};
