//! User roles and authorization helpers

use serde::{Deserialize, Serialize};

/// Primary role assigned to a user account.
///
/// Every user has exactly one role; route-level authorization checks the
/// role's capability methods rather than matching variants directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full system access, including user management
    Superadmin,
    /// Administrative access to sessions, admissions, and fees
    Admin,
    /// Teaching staff
    Teacher,
    /// Fee collection desk
    Accountant,
    /// Student self-service account
    Student,
}

impl Role {
    /// Get the role as a string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Superadmin => "superadmin",
            Self::Admin => "admin",
            Self::Teacher => "teacher",
            Self::Accountant => "accountant",
            Self::Student => "student",
        }
    }

    /// Whether this role may manage users, sessions, and fee structure
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Superadmin | Self::Admin)
    }

    /// Whether this role may record fee payments
    pub const fn can_collect_fees(&self) -> bool {
        matches!(self, Self::Superadmin | Self::Admin | Self::Accountant)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "superadmin" => Ok(Self::Superadmin),
            "admin" => Ok(Self::Admin),
            "teacher" => Ok(Self::Teacher),
            "accountant" => Ok(Self::Accountant),
            "student" => Ok(Self::Student),
            _ => Err(RoleParseError(s.to_string())),
        }
    }
}

/// Error parsing a role from a string
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct RoleParseError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_roles() {
        for role in [
            Role::Superadmin,
            Role::Admin,
            Role::Teacher,
            Role::Accountant,
            Role::Student,
        ] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn rejects_unknown_role() {
        assert!("principal".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
        assert!("Admin".parse::<Role>().is_err());
    }

    #[test]
    fn admin_capabilities() {
        assert!(Role::Superadmin.is_admin());
        assert!(Role::Admin.is_admin());
        assert!(!Role::Teacher.is_admin());
        assert!(!Role::Accountant.is_admin());
        assert!(!Role::Student.is_admin());
    }

    #[test]
    fn accountant_collects_but_does_not_administer() {
        assert!(Role::Accountant.can_collect_fees());
        assert!(!Role::Accountant.is_admin());
        assert!(!Role::Student.can_collect_fees());
    }

    #[test]
    fn serde_uses_lowercase() {
        let json = serde_json::to_string(&Role::Superadmin).unwrap();
        assert_eq!(json, "\"superadmin\"");
        let role: Role = serde_json::from_str("\"accountant\"").unwrap();
        assert_eq!(role, Role::Accountant);
    }
}
