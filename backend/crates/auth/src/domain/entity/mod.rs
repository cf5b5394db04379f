//! Entity Module

pub mod account;
pub mod attempt_record;
pub mod auth_session;
pub mod auth_token;
pub mod credential;
pub mod principal;
