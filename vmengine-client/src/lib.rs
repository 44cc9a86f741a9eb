//! # vmengine Client
//!
//! Client core for the virtualization management engine.
//!
//! This crate provides:
//! - **Error taxonomy** ([`ErrorKind`], [`EngineError`]) - causally chained
//!   errors with a retry predicate that a retry executor can trust
//! - **Error classifier** ([`classify`]) - best-effort mapping of opaque
//!   transport errors onto the taxonomy
//! - **Client surface** ([`EngineClient`]) - typed operations over clusters,
//!   hosts, templates, storage domains, datacenters, networks, VMs, NICs and disks
//! - **Mock backend** ([`MockClient`]) - an in-memory resource graph enforcing
//!   the engine's existence, uniqueness and referential checks
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           EngineClient Trait            │
//! │  (create_vm, create_nic, list_*, ...)   │
//! └─────────────────────┬───────────────────┘
//!                       │
//!         ┌─────────────┴─────────────┐
//!         ▼                           ▼
//! ┌───────────────────┐     ┌───────────────────┐
//! │    MockClient     │     │  HTTP transport   │
//! │   (in-memory)     │     │    (external)     │
//! └───────────────────┘     └───────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use vmengine_client::{EngineClient, ErrorKind, MockClient, VmParams, BLANK_TEMPLATE_ID};
//!
//! let client = MockClient::new().unwrap();
//! let cluster_id = client.fixture().cluster_id.clone();
//! let profile_id = client.fixture().vnic_profile_id.clone();
//!
//! let vm = client
//!     .create_vm(&cluster_id, "my-vm", BLANK_TEMPLATE_ID, VmParams::new())
//!     .unwrap();
//! vm.create_nic("eth0", &profile_id).unwrap();
//!
//! let err = vm.create_nic("eth0", &profile_id).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::BadArgument);
//! ```

pub mod classify;
pub mod config;
pub mod error;
pub mod mock;
pub mod traits;
pub mod transport;
pub mod types;

pub use classify::classify;
pub use config::{MockConfig, NicNameScope};
pub use error::{BoxError, EngineError, ErrorKind, Result};
pub use mock::{generate_random_id, Fixture, MockClient};
pub use traits::{ClientRef, EngineClient};
pub use transport::TransportError;
pub use types::*;
