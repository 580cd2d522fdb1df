/// Shared enumerations used across the codebase.
///
/// Every enumeration is a closed set: parsing an unknown value fails instead
/// of falling back to a default, and the wire spelling is the `as_str` value.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declares a closed string enumeration with its wire spellings.
macro_rules! closed_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(UnknownVariant(other.to_string())),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Returned when a string is not part of a closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value: {0}")]
pub struct UnknownVariant(pub String);

closed_enum! {
    /// Global role governing coarse-grained authorization.
    Role {
        Admin => "admin",
        Manager => "manager",
        Developer => "developer",
        Viewer => "viewer",
    }
}

closed_enum! {
    ProjectStatus {
        Planning => "Planning",
        Active => "Active",
        OnHold => "On Hold",
        Completed => "Completed",
        Cancelled => "Cancelled",
        Delayed => "Delayed",
    }
}

closed_enum! {
    RiskLevel {
        Low => "Low",
        Medium => "Medium",
        High => "High",
        Critical => "Critical",
    }
}

closed_enum! {
    /// Role of a team member inside one project, distinct from [`Role`].
    TeamRole {
        Developer => "Developer",
        Designer => "Designer",
        Qa => "QA",
        Analyst => "Analyst",
        Architect => "Architect",
        Other => "Other",
    }
}

closed_enum! {
    BudgetType {
        Compute => "Compute",
        Storage => "Storage",
        Database => "Database",
        Network => "Network",
        Software => "Software",
        Support => "Support",
    }
}

closed_enum! {
    UsageUnit {
        Gb => "GB",
        Tb => "TB",
        Hours => "Hours",
        Users => "Users",
        Licenses => "Licenses",
    }
}

closed_enum! {
    BudgetStatus {
        Active => "Active",
        Archived => "Archived",
        Pending => "Pending",
    }
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::Planning
    }
}

impl Default for RiskLevel {
    fn default() -> Self {
        RiskLevel::Low
    }
}

impl Default for BudgetStatus {
    fn default() -> Self {
        BudgetStatus::Active
    }
}
