//! Hand-off to the external risk assessment service.
//!
//! The service consumes newly created properties and writes a score and a
//! risk-factor breakdown back through [`PropertyStore::record_assessment`].
//! No scoring happens in this process.
//!
//! [`PropertyStore::record_assessment`]: crate::store::PropertyStore::record_assessment

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::repo_types::{Property, PropertyType};

/// What the assessment service needs to score a property.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentRequest {
    pub property_id: Uuid,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub property_type: PropertyType,
}

impl From<&Property> for AssessmentRequest {
    fn from(p: &Property) -> Self {
        Self {
            property_id: p.id,
            address: p.address.clone(),
            latitude: p.latitude,
            longitude: p.longitude,
            property_type: p.property_type,
        }
    }
}

#[async_trait]
pub trait RiskAssessor: Send + Sync {
    /// Queues an assessment. Must not block the request on the scoring itself.
    async fn request_assessment(&self, req: AssessmentRequest) -> anyhow::Result<()>;
}

/// Records that an assessment is owed; the score stays at 0 until an
/// external service writes one back.
#[derive(Debug, Default, Clone)]
pub struct PendingAssessor;

#[async_trait]
impl RiskAssessor for PendingAssessor {
    async fn request_assessment(&self, req: AssessmentRequest) -> anyhow::Result<()> {
        info!(
            property_id = %req.property_id,
            property_type = %req.property_type,
            "risk assessment pending"
        );
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use parking_lot::Mutex;

    use super::*;

    /// Captures requests for assertions.
    #[derive(Default)]
    pub struct RecordingAssessor {
        pub requests: Mutex<Vec<AssessmentRequest>>,
    }

    #[async_trait]
    impl RiskAssessor for RecordingAssessor {
        async fn request_assessment(&self, req: AssessmentRequest) -> anyhow::Result<()> {
            self.requests.lock().push(req);
            Ok(())
        }
    }
}
