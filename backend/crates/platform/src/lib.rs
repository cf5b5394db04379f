//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (SHA-256, secure tokens, Base64)
//! - Password hashing (Argon2id with optional pepper)
//! - Cookie management
//! - Client identification (IP, User-Agent fingerprint)
//! - Sliding-window rate limiting primitives

pub mod client;
pub mod cookie;
pub mod crypto;
pub mod password;
pub mod rate_limit;
