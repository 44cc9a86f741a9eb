//! Structured errors surfaced by the engine transport layer.
//!
//! The SDK only guarantees typed errors for a few conditions. Everything else
//! reaches the client as free text, which is why the classifier falls back to
//! message matching.

use thiserror::Error;

/// Typed failures the transport can report.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Authentication against the SSO endpoint failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The engine answered with 404 for the requested resource.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// Any other HTTP level failure, carried as text.
    #[error("HTTP {status}: {body}")]
    Http {
        status: u16,
        body: String,
    },
}
