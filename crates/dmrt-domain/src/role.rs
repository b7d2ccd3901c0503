//! Workflow roles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role a magic link or session is issued for.
///
/// Wire format: snake_case string (`team_member`, `pro`, `leader`).
/// Ordering follows [`Role::rank`], so `Role::Leader > Role::Pro > Role::TeamMember`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    TeamMember,
    Pro,
    Leader,
}

/// Returned by [`Role::from_str`] for unknown role names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 3] = [Role::TeamMember, Role::Pro, Role::Leader];

    /// Privilege rank: team_member = 1, pro = 2, leader = 3.
    pub fn rank(self) -> u8 {
        match self {
            Self::TeamMember => 1,
            Self::Pro => 2,
            Self::Leader => 3,
        }
    }

    /// `true` if this role meets a minimum-role requirement.
    pub fn satisfies(self, min: Role) -> bool {
        self.rank() >= min.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TeamMember => "team_member",
            Self::Pro => "pro",
            Self::Leader => "leader",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "team_member" => Ok(Self::TeamMember),
            "pro" => Ok(Self::Pro),
            "leader" => Ok(Self::Leader),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

impl PartialOrd for Role {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Role {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}
