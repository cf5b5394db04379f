use serde::{Deserialize, Serialize};
use std::fmt;

/// Forum role. `Admin` is the administrator flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum UserRole {
    #[default]
    Member = 0,
    Admin = 1,
}

impl UserRole {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            UserRole::Member => "member",
            UserRole::Admin => "admin",
        }
    }

    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    #[inline]
    pub const fn from_admin_flag(is_admin: bool) -> Self {
        if is_admin { UserRole::Admin } else { UserRole::Member }
    }

    #[inline]
    pub const fn toggled(&self) -> Self {
        match self {
            UserRole::Member => UserRole::Admin,
            UserRole::Admin => UserRole::Member,
        }
    }

    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(UserRole::Member),
            1 => Some(UserRole::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_from_id() {
        assert_eq!(UserRole::from_id(0), Some(UserRole::Member));
        assert_eq!(UserRole::from_id(1), Some(UserRole::Admin));
        assert_eq!(UserRole::from_id(2), None);
    }

    #[test]
    fn test_user_role_display() {
        assert_eq!(UserRole::Member.to_string(), "member");
        assert_eq!(UserRole::Admin.to_string(), "admin");
    }

    #[test]
    fn test_admin_flag() {
        assert!(UserRole::from_admin_flag(true).is_admin());
        assert!(!UserRole::from_admin_flag(false).is_admin());
        assert_eq!(UserRole::Member.toggled(), UserRole::Admin);
    }
}
