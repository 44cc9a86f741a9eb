//! Best-effort classification of foreign errors.
//!
//! The transport layer does not guarantee typed errors, so classification is an
//! ordered table of structural checks and message markers. Rules are evaluated
//! top to bottom and the first match wins.

use std::error::Error as StdError;

use crate::error::{BoxError, EngineError, ErrorKind};
use crate::transport::TransportError;

/// What a rule looks for in an error chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    /// A [`TransportError::Auth`] anywhere in the chain.
    AuthFailure,
    /// A [`TransportError::NotFound`] anywhere in the chain.
    NotFoundResponse,
    /// The message of the error or one of its sources contains the marker.
    Contains(&'static str),
}

/// One classification rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub matcher: Matcher,
    pub kind: ErrorKind,
    pub message: &'static str,
}

const ACCESS_DENIED: &str = "access denied, check your credentials";
const TLS_FAILED: &str = "TLS error, check your CA certificate settings";

/// Classification rules, in evaluation order.
pub const RULES: &[Rule] = &[
    Rule {
        matcher: Matcher::AuthFailure,
        kind: ErrorKind::AccessDenied,
        message: ACCESS_DENIED,
    },
    Rule {
        matcher: Matcher::Contains("access_denied"),
        kind: ErrorKind::AccessDenied,
        message: ACCESS_DENIED,
    },
    Rule {
        matcher: Matcher::Contains("parse non-array sso with response"),
        kind: ErrorKind::NotAnEngine,
        message: "invalid credentials, or the URL does not point to an engine, check your settings",
    },
    Rule {
        matcher: Matcher::Contains("server gave HTTP response to HTTPS client"),
        kind: ErrorKind::NotAnEngine,
        message: "the server gave a HTTP response to a HTTPS client, check if your URL is correct",
    },
    Rule {
        matcher: Matcher::Contains("tls"),
        kind: ErrorKind::Tls,
        message: TLS_FAILED,
    },
    Rule {
        matcher: Matcher::Contains("x509"),
        kind: ErrorKind::Tls,
        message: TLS_FAILED,
    },
    Rule {
        matcher: Matcher::NotFoundResponse,
        kind: ErrorKind::NotFound,
        message: "the requested resource was not found",
    },
];

impl Matcher {
    /// Check the matcher against `err` and its sources.
    pub fn matches(&self, err: &(dyn StdError + 'static)) -> bool {
        match self {
            Matcher::AuthFailure => chain(err).any(|e| {
                matches!(e.downcast_ref::<TransportError>(), Some(TransportError::Auth(_)))
            }),
            Matcher::NotFoundResponse => chain(err).any(|e| {
                matches!(e.downcast_ref::<TransportError>(), Some(TransportError::NotFound(_)))
            }),
            Matcher::Contains(marker) => chain(err).any(|e| e.to_string().contains(marker)),
        }
    }
}

fn chain<'a>(
    err: &'a (dyn StdError + 'static),
) -> impl Iterator<Item = &'a (dyn StdError + 'static)> + 'a {
    std::iter::successors(Some(err), |&e| e.source())
}

/// Find the first rule matching `err`, without taking ownership.
pub fn identify(err: &(dyn StdError + 'static)) -> Option<&'static Rule> {
    RULES.iter().find(|rule| rule.matcher.matches(err))
}

/// Classify `err` into an [`EngineError`] wrapping it.
///
/// Returns the original error untouched when no rule matches, so the caller
/// keeps it uncategorized.
pub fn classify(err: BoxError) -> Result<EngineError, BoxError> {
    match identify(&*err) {
        Some(rule) => Ok(EngineError::wrap(err, rule.kind, rule.message)),
        None => Err(err),
    }
}
