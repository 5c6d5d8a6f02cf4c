use async_trait::async_trait;
use parking_lot::Mutex;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{PropertyStore, StoreError, StoreResult, UserStore};
use crate::{
    auth::repo_types::{NewUser, User},
    properties::repo_types::{NewProperty, Property, RiskAssessment, RiskFactors, DEFAULT_STATUS},
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    // insertion order; listing reverses it
    properties: Vec<Property>,
}

/// Process-local store. Uniqueness checks and inserts happen under one lock,
/// so concurrent signups with the same email cannot both succeed.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let mut t = self.tables.lock();
        if t.users.iter().any(|u| u.email == new.email) {
            return Err(StoreError::DuplicateEmail);
        }
        if t.users.iter().any(|u| u.username == new.username) {
            return Err(StoreError::DuplicateUsername);
        }
        let user = User {
            id: Uuid::new_v4(),
            role: new.profile.role(),
            attributes: new.profile.attributes(),
            email: new.email,
            username: new.username,
            full_name: new.full_name,
            password_hash: new.password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let t = self.tables.lock();
        Ok(t.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let t = self.tables.lock();
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl PropertyStore for MemoryStore {
    async fn create_property(&self, owner: Uuid, p: NewProperty) -> StoreResult<Property> {
        let property = Property {
            id: Uuid::new_v4(),
            user_id: owner,
            address: p.address,
            latitude: p.latitude,
            longitude: p.longitude,
            property_type: p.property_type,
            status: DEFAULT_STATUS.to_string(),
            estimated_value: p.estimated_value,
            risk_score: 0,
            risk_factors: RiskFactors::new(),
            notes: p.notes,
            created_at: OffsetDateTime::now_utc(),
        };
        let mut t = self.tables.lock();
        if !t.users.iter().any(|u| u.id == owner) {
            return Err(StoreError::UnknownOwner);
        }
        t.properties.push(property.clone());
        Ok(property)
    }

    async fn list_properties(&self, owner: Uuid) -> StoreResult<Vec<Property>> {
        let t = self.tables.lock();
        let mut out: Vec<Property> = t
            .properties
            .iter()
            .rev()
            .filter(|p| p.user_id == owner)
            .cloned()
            .collect();
        // stable: equal timestamps keep newest-inserted first
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn get_property(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Property>> {
        let t = self.tables.lock();
        Ok(t
            .properties
            .iter()
            .find(|p| p.id == id && p.user_id == owner)
            .cloned())
    }

    async fn delete_property(&self, owner: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut t = self.tables.lock();
        let before = t.properties.len();
        t.properties.retain(|p| !(p.id == id && p.user_id == owner));
        Ok(t.properties.len() < before)
    }

    async fn record_assessment(&self, id: Uuid, assessment: RiskAssessment) -> StoreResult<Property> {
        if !assessment.is_in_range() {
            return Err(StoreError::InvalidRiskScore(assessment.risk_score));
        }
        let mut t = self.tables.lock();
        let property = t
            .properties
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound)?;
        property.risk_score = assessment.risk_score;
        property.risk_factors = assessment.risk_factors;
        Ok(property.clone())
    }
}
