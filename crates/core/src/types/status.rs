//! Roles and status enums for marketplace entities.
//!
//! Statuses arrive from the backend as free-form strings. Known values map to
//! a variant; anything else is preserved in `Unknown` so that a new server
//! status renders with the neutral treatment instead of failing to parse.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Marketplace role of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Browses and purchases products.
    Buyer,
    /// Lists and manages inventory.
    Seller,
    /// Moderates users and listings.
    Admin,
}

impl Role {
    /// All roles, in display order.
    pub const ALL: [Self; 3] = [Self::Buyer, Self::Seller, Self::Admin];

    /// Path of this role's dashboard home.
    #[must_use]
    pub const fn dashboard_path(self) -> &'static str {
        match self {
            Self::Buyer => "/dashboard/buyer",
            Self::Seller => "/dashboard/seller",
            Self::Admin => "/dashboard/admin",
        }
    }

    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buyer => "buyer",
            Self::Seller => "seller",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buyer" => Ok(Self::Buyer),
            "seller" => Ok(Self::Seller),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// Visual treatment for a status badge.
///
/// The UI maps each treatment to a color; the core only decides which one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatusTreatment {
    /// Awaiting action.
    Warning,
    /// In progress.
    Info,
    /// On its way.
    Progress,
    /// Completed successfully.
    Success,
    /// Cancelled, rejected, or failed.
    Danger,
    /// Fallback for anything unrecognized.
    #[default]
    Neutral,
}

/// Implements the string mapping shared by the status enums.
macro_rules! string_status {
    ($name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        impl $name {
            /// Parse a server status string; unrecognized values are kept verbatim.
            #[must_use]
            pub fn parse(s: &str) -> Self {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($wire => Self::$variant,)+
                    _ => Self::Unknown(s.to_owned()),
                }
            }

            /// Wire representation of the status.
            #[must_use]
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $wire,)+
                    Self::Unknown(raw) => raw,
                }
            }

            /// Whether the backend sent a status this client does not know.
            #[must_use]
            pub const fn is_unknown(&self) -> bool {
                matches!(self, Self::Unknown(_))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::parse(&s)
            }
        }

        impl From<$name> for String {
            fn from(status: $name) -> Self {
                status.as_str().to_owned()
            }
        }
    };
}

/// Order lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    /// A status string this client does not recognize.
    Unknown(String),
}

string_status!(OrderStatus {
    Pending => "pending",
    Processing => "processing",
    Shipped => "shipped",
    Delivered => "delivered",
    Cancelled => "cancelled",
});

impl OrderStatus {
    /// Known statuses, in lifecycle order. Used to build filter menus.
    #[must_use]
    pub fn known() -> [Self; 5] {
        [
            Self::Pending,
            Self::Processing,
            Self::Shipped,
            Self::Delivered,
            Self::Cancelled,
        ]
    }

    /// Badge treatment for this status.
    #[must_use]
    pub const fn treatment(&self) -> StatusTreatment {
        match self {
            Self::Pending => StatusTreatment::Warning,
            Self::Processing => StatusTreatment::Info,
            Self::Shipped => StatusTreatment::Progress,
            Self::Delivered => StatusTreatment::Success,
            Self::Cancelled => StatusTreatment::Danger,
            Self::Unknown(_) => StatusTreatment::Neutral,
        }
    }
}

/// Status of a buyer's modification request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    /// A status string this client does not recognize.
    Unknown(String),
}

string_status!(RequestStatus {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
});

impl RequestStatus {
    /// Badge treatment for this status.
    #[must_use]
    pub const fn treatment(&self) -> StatusTreatment {
        match self {
            Self::Pending => StatusTreatment::Warning,
            Self::Approved => StatusTreatment::Success,
            Self::Rejected => StatusTreatment::Danger,
            Self::Unknown(_) => StatusTreatment::Neutral,
        }
    }

    /// Whether a seller may still respond to the request.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip_strings() {
        for role in Role::ALL {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
        assert!("moderator".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde() {
        let role: Role = serde_json::from_str("\"seller\"").unwrap();
        assert_eq!(role, Role::Seller);
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }

    #[test]
    fn test_order_status_parse_is_case_insensitive() {
        assert_eq!(OrderStatus::parse("Shipped"), OrderStatus::Shipped);
        assert_eq!(OrderStatus::parse(" DELIVERED "), OrderStatus::Delivered);
    }

    #[test]
    fn test_unknown_status_falls_back_to_neutral() {
        let status: OrderStatus = serde_json::from_str("\"on_hold\"").unwrap();
        assert_eq!(status, OrderStatus::Unknown("on_hold".to_string()));
        assert!(status.is_unknown());
        assert_eq!(status.treatment(), StatusTreatment::Neutral);
        assert_eq!(status.to_string(), "on_hold");

        let request = RequestStatus::parse("escalated");
        assert_eq!(request.treatment(), StatusTreatment::Neutral);
    }

    #[test]
    fn test_known_treatments() {
        assert_eq!(OrderStatus::Pending.treatment(), StatusTreatment::Warning);
        assert_eq!(OrderStatus::Delivered.treatment(), StatusTreatment::Success);
        assert_eq!(OrderStatus::Cancelled.treatment(), StatusTreatment::Danger);
        assert_eq!(RequestStatus::Approved.treatment(), StatusTreatment::Success);
        assert_eq!(RequestStatus::Rejected.treatment(), StatusTreatment::Danger);
    }

    #[test]
    fn test_status_serializes_wire_value() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Processing).unwrap(),
            "\"processing\""
        );
        assert_eq!(
            serde_json::to_string(&RequestStatus::Unknown("custom".into())).unwrap(),
            "\"custom\""
        );
    }
}
