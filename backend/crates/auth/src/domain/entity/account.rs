//! Account Entity
//!
//! Forum account profile. The password hash lives in [`Credential`].
//!
//! [`Credential`]: super::credential::Credential

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    account_id::AccountId, account_status::AccountStatus, email::Email, public_id::PublicId,
    user_name::UserName, user_role::UserRole,
};

/// Account entity
#[derive(Debug, Clone)]
pub struct Account {
    /// Internal UUID identifier
    pub account_id: AccountId,
    /// Public-facing nanoid identifier (URL-safe)
    pub public_id: PublicId,
    /// User name (unique by canonical form)
    pub user_name: UserName,
    /// Email (unique, lowercased)
    pub email: Email,
    pub role: UserRole,
    pub status: AccountStatus,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Last successful login
    pub last_seen_at: Option<DateTime<Utc>>,
}

impl Account {
    /// Create a new active account
    pub fn new(user_name: UserName, email: Email, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            account_id: AccountId::new(),
            public_id: PublicId::new(),
            user_name,
            email,
            role,
            status: AccountStatus::Active,
            email_verified: false,
            created_at: now,
            updated_at: now,
            last_seen_at: None,
        }
    }

    #[inline]
    pub fn can_login(&self) -> bool {
        self.status.can_login()
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Administrator rights only count on an active account
    #[inline]
    pub fn is_active_admin(&self) -> bool {
        self.is_admin() && self.can_login()
    }

    pub fn record_login(&mut self, at: DateTime<Utc>) {
        self.last_seen_at = Some(at);
    }

    pub fn toggle_status(&mut self) {
        self.status = self.status.toggled();
        self.updated_at = Utc::now();
    }

    pub fn toggle_role(&mut self) {
        self.role = self.role.toggled();
        self.updated_at = Utc::now();
    }

    pub fn mark_email_verified(&mut self) {
        self.email_verified = true;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account::new(
            UserName::new("alice").unwrap(),
            Email::new("alice@example.com").unwrap(),
            UserRole::Member,
        )
    }

    #[test]
    fn test_new_account_defaults() {
        let account = account();
        assert!(account.can_login());
        assert!(!account.is_admin());
        assert!(!account.email_verified);
        assert!(account.last_seen_at.is_none());
    }

    #[test]
    fn test_inactive_admin_is_not_active_admin() {
        let mut account = account();
        account.toggle_role();
        assert!(account.is_active_admin());
        account.toggle_status();
        assert!(account.is_admin());
        assert!(!account.is_active_admin());
    }
}
