use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Raised when a stored or submitted string is not one of an enum's values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

/// Generates `as_str`, `Display` and `FromStr` for a fieldless enum whose
/// wire form is the snake_case string given per variant.
macro_rules! string_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(UnknownVariant { kind: $kind, value: other.to_string() }),
                }
            }
        }
    };
}

/// Staff roles. Reporters are anonymous and never hold a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
}

string_enum!(Role, "role", {
    Admin => "admin",
    Manager => "manager",
});

/// Triage status of a report. Admins may move between any two of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    New,
    InReview,
    AwaitingInfo,
    Resolved,
    Closed,
}

string_enum!(ReportStatus, "status", {
    New => "new",
    InReview => "in_review",
    AwaitingInfo => "awaiting_info",
    Resolved => "resolved",
    Closed => "closed",
});

/// The two independent message threads attached to every report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// reporter <-> admin
    Reporter,
    /// manager <-> admin
    Manager,
}

string_enum!(Channel, "channel", {
    Reporter => "reporter",
    Manager => "manager",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    Reporter,
    Manager,
    Admin,
    /// Messages written by the service itself, e.g. the submission receipt.
    System,
}

string_enum!(Sender, "sender", {
    Reporter => "reporter",
    Manager => "manager",
    Admin => "admin",
    System => "system",
});
