//! Domain Services

pub mod lockout_policy;
