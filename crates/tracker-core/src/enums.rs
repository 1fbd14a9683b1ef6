//! Enum types for the tracker.
//!
//! Each enum has:
//! - Custom Serialize (as SCREAMING_SNAKE_CASE string, the storage spelling)
//! - Custom Deserialize (known variants only, unknown strings are rejected)
//! - `as_str()`, `label()`, `is_default()`, `Display`, `FromStr`

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Error returned when a string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseEnumError {
    /// The enum being parsed (e.g. "status").
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

// ---------------------------------------------------------------------------
// Macro: defines a closed enum with string and label representations.
// ---------------------------------------------------------------------------
macro_rules! define_enum {
    (
        $(#[$meta:meta])*
        $name:ident, kind = $kind:expr, default = $default:ident,
        variants: [
            $( ($variant:ident, $str:expr, $label:expr) ),+ $(,)?
        ]
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "graphql", derive(async_graphql::Enum))]
        pub enum $name {
            $( $variant, )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[ $( Self::$variant, )+ ];

            /// Returns the string representation.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $str, )+
                }
            }

            /// Returns the human-readable label.
            pub fn label(&self) -> &'static str {
                match self {
                    $( Self::$variant => $label, )+
                }
            }

            /// Returns `true` if this is the default variant.
            pub fn is_default(&self) -> bool {
                *self == Self::$default
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $str => Ok(Self::$variant), )+
                    other => Err(ParseEnumError {
                        kind: $kind,
                        value: other.to_owned(),
                    }),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

// ===========================================================================
// Status
// ===========================================================================

define_enum! {
    /// Current state of an issue.
    Status, kind = "status", default = Open,
    variants: [
        (Open, "OPEN", "Open"),
        (InProgress, "IN_PROGRESS", "In Progress"),
        (Closed, "CLOSED", "Closed"),
    ]
}

// ===========================================================================
// IssueType
// ===========================================================================

define_enum! {
    /// Categorises the kind of work.
    IssueType, kind = "issue type", default = General,
    variants: [
        (General, "GENERAL", "General"),
        (Bug, "BUG", "Bug"),
        (Spike, "SPIKE", "Spike"),
        (Task, "TASK", "Task"),
        (Subtask, "SUBTASK", "Subtask"),
    ]
}
