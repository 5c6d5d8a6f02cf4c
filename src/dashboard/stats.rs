use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::properties::repo_types::Property;

pub const LOW_RISK_MAX: i32 = 40;
pub const MEDIUM_RISK_MAX: i32 = 70;
pub const RECENT_ACTIVITY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskBucket {
    Low,
    Medium,
    High,
}

impl RiskBucket {
    /// Low is 0-40, medium 41-70, high 71 and up.
    pub fn of(score: i32) -> Self {
        if score <= LOW_RISK_MAX {
            RiskBucket::Low
        } else if score <= MEDIUM_RISK_MAX {
            RiskBucket::Medium
        } else {
            RiskBucket::High
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct PortfolioStats {
    pub total_properties: usize,
    pub low_risk_count: usize,
    pub medium_risk_count: usize,
    pub high_risk_count: usize,
    pub average_risk_score: f64,
    pub total_estimated_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentActivity {
    pub id: Uuid,
    pub address: String,
    pub risk_score: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub stats: PortfolioStats,
    pub recent_activity: Vec<RecentActivity>,
}

impl DashboardStats {
    /// Aggregates one snapshot of a caller's properties, given newest first.
    /// Every property lands in exactly one bucket.
    pub fn from_properties(properties: &[Property]) -> Self {
        let mut stats = PortfolioStats {
            total_properties: properties.len(),
            ..Default::default()
        };
        let mut score_sum: i64 = 0;
        for p in properties {
            match RiskBucket::of(p.risk_score) {
                RiskBucket::Low => stats.low_risk_count += 1,
                RiskBucket::Medium => stats.medium_risk_count += 1,
                RiskBucket::High => stats.high_risk_count += 1,
            }
            score_sum += i64::from(p.risk_score);
            stats.total_estimated_value += p.estimated_value.unwrap_or(0.0);
        }
        if !properties.is_empty() {
            stats.average_risk_score = score_sum as f64 / properties.len() as f64;
        }

        let recent_activity = properties
            .iter()
            .take(RECENT_ACTIVITY_LIMIT)
            .map(|p| RecentActivity {
                id: p.id,
                address: p.address.clone(),
                risk_score: p.risk_score,
                created_at: p.created_at,
            })
            .collect();

        Self {
            stats,
            recent_activity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::repo_types::{PropertyType, RiskFactors, DEFAULT_STATUS};

    fn property(score: i32, value: Option<f64>) -> Property {
        Property {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            address: format!("plot {score}"),
            latitude: 0.0,
            longitude: 0.0,
            property_type: PropertyType::Residential,
            status: DEFAULT_STATUS.into(),
            estimated_value: value,
            risk_score: score,
            risk_factors: RiskFactors::new(),
            notes: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn bucket_boundaries() {
        assert_eq!(RiskBucket::of(0), RiskBucket::Low);
        assert_eq!(RiskBucket::of(40), RiskBucket::Low);
        assert_eq!(RiskBucket::of(41), RiskBucket::Medium);
        assert_eq!(RiskBucket::of(70), RiskBucket::Medium);
        assert_eq!(RiskBucket::of(71), RiskBucket::High);
        assert_eq!(RiskBucket::of(100), RiskBucket::High);
    }

    #[test]
    fn empty_portfolio() {
        let s = DashboardStats::from_properties(&[]);
        assert_eq!(s.stats, PortfolioStats::default());
        assert!(s.recent_activity.is_empty());
    }

    #[test]
    fn buckets_always_partition_total() {
        let props: Vec<_> = (0..=100).map(|score| property(score, None)).collect();
        let s = DashboardStats::from_properties(&props).stats;
        assert_eq!(s.total_properties, 101);
        assert_eq!(
            s.low_risk_count + s.medium_risk_count + s.high_risk_count,
            s.total_properties
        );
        assert_eq!(s.low_risk_count, 41);
        assert_eq!(s.medium_risk_count, 30);
        assert_eq!(s.high_risk_count, 30);
        assert_eq!(s.average_risk_score, 50.0);
    }

    #[test]
    fn totals_and_recent_activity() {
        let props: Vec<_> = (0..12)
            .map(|i| property(i * 5, if i % 2 == 0 { Some(1000.0) } else { None }))
            .collect();
        let s = DashboardStats::from_properties(&props);
        assert_eq!(s.stats.total_estimated_value, 6000.0);
        assert_eq!(s.recent_activity.len(), RECENT_ACTIVITY_LIMIT);
        assert_eq!(s.recent_activity[0].id, props[0].id);
    }
}
