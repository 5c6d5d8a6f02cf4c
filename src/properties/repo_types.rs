use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

pub const DEFAULT_STATUS: &str = "active";
pub const MAX_RISK_SCORE: i32 = 100;

/// Named sub-scores, e.g. `flood`, `fire`, `crime`.
pub type RiskFactors = BTreeMap<String, f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Residential,
    Commercial,
    Industrial,
}

impl PropertyType {
    pub fn as_str(self) -> &'static str {
        match self {
            PropertyType::Residential => "residential",
            PropertyType::Commercial => "commercial",
            PropertyType::Industrial => "industrial",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "residential" => Ok(PropertyType::Residential),
            "commercial" => Ok(PropertyType::Commercial),
            "industrial" => Ok(PropertyType::Industrial),
            other => anyhow::bail!("unknown property type {other:?}"),
        }
    }
}

/// Validated create input. The owner comes from the session, never the body.
#[derive(Debug, Clone)]
pub struct NewProperty {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub property_type: PropertyType,
    pub estimated_value: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Property {
    pub id: Uuid,
    pub user_id: Uuid,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub property_type: PropertyType,
    pub status: String,
    pub estimated_value: Option<f64>,
    pub risk_score: i32,
    pub risk_factors: RiskFactors,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Write-back from the external risk assessment service.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskAssessment {
    pub risk_score: i32,
    pub risk_factors: RiskFactors,
}

impl RiskAssessment {
    pub fn is_in_range(&self) -> bool {
        (0..=MAX_RISK_SCORE).contains(&self.risk_score)
    }
}

#[derive(Debug, FromRow)]
pub struct PropertyRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub property_type: String,
    pub status: String,
    pub estimated_value: Option<f64>,
    pub risk_score: i32,
    pub risk_factors: Json<RiskFactors>,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
}

impl TryFrom<PropertyRow> for Property {
    type Error = anyhow::Error;

    fn try_from(r: PropertyRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            address: r.address,
            latitude: r.latitude,
            longitude: r.longitude,
            property_type: r.property_type.parse()?,
            status: r.status,
            estimated_value: r.estimated_value,
            risk_score: r.risk_score,
            risk_factors: r.risk_factors.0,
            notes: r.notes,
            created_at: r.created_at,
        })
    }
}
