//! Club member model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Club role carried in the session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Role {
    Member,
    Exec,
    Admin,
}

impl Role {
    /// Execs and admins may edit any workout and record attendance.
    pub fn is_privileged(self) -> bool {
        matches!(self, Role::Exec | Role::Admin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Exec => "exec",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(Role::Member),
            "exec" => Ok(Role::Exec),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// User row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    /// Stored as text; see [`User::role`]
    pub role: String,
    /// Late cancellations counted against the member
    pub absences: i32,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Parsed role; unknown values fall back to member.
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or(Role::Member)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_and_privilege() {
        for role in [Role::Member, Role::Exec, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!(!Role::Member.is_privileged());
        assert!(Role::Exec.is_privileged());
        assert!(Role::Admin.is_privileged());
        assert!("coach".parse::<Role>().is_err());
    }
}
