//! Value Object Module

pub mod account_id;
pub mod account_status;
pub mod attempt_outcome;
pub mod email;
pub mod login_identity;
pub mod public_id;
pub mod token_purpose;
pub mod user_name;
pub mod user_password;
pub mod user_role;
