//! Client identification utilities
//!
//! Derives the source address and user agent of a request. Login attempts
//! are keyed on these, and sessions are bound to the user agent hash.

use axum::http::{HeaderMap, header};
use std::net::IpAddr;

use crate::crypto::sha256;

/// Stored user agents are cut to this many characters
pub const MAX_USER_AGENT_LENGTH: usize = 512;

/// Request origin as seen by the auth layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientContext {
    /// Client IP address (from X-Forwarded-For or direct connection)
    pub ip: Option<IpAddr>,
    /// User-Agent header, truncated; empty when absent
    pub user_agent: String,
    /// SHA-256 hash of the full User-Agent header
    pub fingerprint: [u8; 32],
}

impl ClientContext {
    pub fn new(ip: Option<IpAddr>, user_agent: impl Into<String>) -> Self {
        let raw = user_agent.into();
        let fingerprint = sha256(raw.as_bytes());
        let user_agent = raw.chars().take(MAX_USER_AGENT_LENGTH).collect();
        Self {
            ip,
            user_agent,
            fingerprint,
        }
    }

    /// Build from request headers
    ///
    /// ## Arguments
    /// * `headers` - HTTP request headers
    /// * `direct_ip` - Peer address of the connection
    /// * `trust_forwarded_for` - Honor `X-Forwarded-For` (behind a reverse proxy)
    pub fn from_headers(
        headers: &HeaderMap,
        direct_ip: Option<IpAddr>,
        trust_forwarded_for: bool,
    ) -> Self {
        let ip = if trust_forwarded_for {
            extract_client_ip(headers, direct_ip)
        } else {
            direct_ip
        };
        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        Self::new(ip, user_agent)
    }

    /// Get IP as string (for database storage)
    ///
    /// Unknown sources are stored as the empty string so they still group.
    pub fn ip_string(&self) -> String {
        self.ip.map(|ip| ip.to_string()).unwrap_or_default()
    }

    /// Get fingerprint as Vec<u8> (for database storage)
    pub fn fingerprint_vec(&self) -> Vec<u8> {
        self.fingerprint.to_vec()
    }
}

/// Extract client IP address from headers
///
/// Checks X-Forwarded-For header first (for reverse proxy setups),
/// then falls back to direct connection IP.
///
/// ## Returns
/// The client IP address, or None if not determinable
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Option<IpAddr> {
    // First IP in the list is the original client
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|xff| xff.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok())
        .or(direct_ip)
}
