#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of an asset request.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
pub enum RequestStatus {
    /// Submitted, nobody is working on it yet.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Pending"))]
    Pending,
    /// An administrator picked it up.
    #[serde(rename = "In Progress")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "In Progress"))]
    InProgress,
    /// A model was published for it.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Completed"))]
    Completed,
    /// Declined by an administrator.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Rejected"))]
    Rejected,
}

impl RequestStatus {
    /// All possible status values.
    pub const ALL: &'static [RequestStatus] = &[
        Self::Pending,
        Self::InProgress,
        Self::Completed,
        Self::Rejected,
    ];

    /// Returns the wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for RequestStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Error when parsing an invalid status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError {
    invalid: String,
}

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid status '{}'. Valid values: {}",
            self.invalid,
            RequestStatus::ALL
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseStatusError {}

impl FromStr for RequestStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "In Progress" | "InProgress" => Ok(Self::InProgress),
            "Completed" => Ok(Self::Completed),
            "Rejected" => Ok(Self::Rejected),
            _ => Err(ParseStatusError {
                invalid: s.to_string(),
            }),
        }
    }
}
