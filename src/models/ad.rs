// src/models/ad.rs

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdType {
    Sale,
    Purchase,
    Service,
}

impl AdType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdType::Sale => "sale",
            AdType::Purchase => "purchase",
            AdType::Service => "service",
        }
    }
}

impl fmt::Display for AdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sale" => Ok(AdType::Sale),
            "purchase" => Ok(AdType::Purchase),
            "service" => Ok(AdType::Service),
            other => Err(format!("unknown ad type '{}'", other)),
        }
    }
}

/// Represents the 'ads' table in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ad {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub ad_type: AdType,
    pub owner_id: i64,

    /// Optional ad-group the listing belongs to.
    pub group_id: Option<i64>,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAd {
    pub title: String,
    pub description: String,
    pub ad_type: AdType,
    pub owner_id: i64,
    pub group_id: Option<i64>,
}

/// DTO for creating a new ad.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAdRequest {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title length must be between 1 and 200 chars"
    ))]
    pub title: String,

    #[validate(length(max = 5000, message = "Description must be at most 5000 chars"))]
    pub description: String,

    pub ad_type: AdType,

    pub group_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_ad_type_is_rejected_by_serde() {
        let parsed = serde_json::from_value::<CreateAdRequest>(serde_json::json!({
            "title": "Bike",
            "description": "Red",
            "ad_type": "auction"
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn ad_type_string_forms_agree() {
        for ty in [AdType::Sale, AdType::Purchase, AdType::Service] {
            assert_eq!(ty.as_str().parse::<AdType>(), Ok(ty));
            assert_eq!(serde_json::to_value(ty).unwrap(), ty.as_str());
            assert_eq!(ty.to_string(), ty.as_str());
        }
    }
}
