use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};
use tracing::debug;
use uuid::Uuid;

use super::{PropertyStore, StoreError, StoreResult, UserStore};
use crate::{
    auth::repo_types::{NewUser, User, UserRow},
    properties::repo_types::{
        NewProperty, Property, PropertyRow, RiskAssessment, DEFAULT_STATUS,
    },
};

const USERS_EMAIL_KEY: &str = "users_email_key";
const USERS_USERNAME_KEY: &str = "users_username_key";

const USER_COLUMNS: &str = "id, email, username, full_name, password_hash, role, \
     specialty_line, years_exp, organization, industry, avg_claims_per_month, reinsurer_type, \
     created_at";

const PROPERTY_COLUMNS: &str = "id, user_id, address, latitude, longitude, property_type, \
     status, estimated_value, risk_score, risk_factors, notes, created_at";

#[derive(Clone)]
pub struct PgStore {
    pub db: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { db })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .context("run migrations")
    }
}

/// Translates unique-constraint violations on `users` into typed errors.
fn map_user_insert_error(err: sqlx::Error) -> StoreError {
    let duplicate = match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => match db.constraint() {
            Some(USERS_EMAIL_KEY) => Some(StoreError::DuplicateEmail),
            Some(USERS_USERNAME_KEY) => Some(StoreError::DuplicateUsername),
            _ => None,
        },
        _ => None,
    };
    duplicate.unwrap_or(StoreError::Database(err))
}

/// A property insert whose `user_id` no longer exists.
fn map_property_insert_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => StoreError::UnknownOwner,
        _ => StoreError::Database(err),
    }
}

fn to_user(row: UserRow) -> StoreResult<User> {
    User::try_from(row).map_err(StoreError::Corrupt)
}

fn to_property(row: PropertyRow) -> StoreResult<Property> {
    Property::try_from(row).map_err(StoreError::Corrupt)
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let attrs = user.profile.attributes();
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, email, username, full_name, password_hash, role,
                               specialty_line, years_exp, organization, industry,
                               avg_claims_per_month, reinsurer_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.full_name)
        .bind(&user.password_hash)
        .bind(user.profile.role().as_str())
        .bind(attrs.specialty_line)
        .bind(attrs.years_exp)
        .bind(attrs.organization)
        .bind(attrs.industry)
        .bind(attrs.avg_claims_per_month)
        .bind(attrs.reinsurer_type)
        .fetch_one(&self.db)
        .await
        .map_err(map_user_insert_error)?;
        debug!(user_id = %row.id, "user row inserted");
        to_user(row)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        row.map(to_user).transpose()
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        row.map(to_user).transpose()
    }
}

#[async_trait]
impl PropertyStore for PgStore {
    async fn create_property(&self, owner: Uuid, p: NewProperty) -> StoreResult<Property> {
        let row = sqlx::query_as::<_, PropertyRow>(&format!(
            r#"
            INSERT INTO properties (id, user_id, address, latitude, longitude, property_type,
                                    status, estimated_value, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {PROPERTY_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(owner)
        .bind(&p.address)
        .bind(p.latitude)
        .bind(p.longitude)
        .bind(p.property_type.as_str())
        .bind(DEFAULT_STATUS)
        .bind(p.estimated_value)
        .bind(&p.notes)
        .fetch_one(&self.db)
        .await
        .map_err(map_property_insert_error)?;
        to_property(row)
    }

    async fn list_properties(&self, owner: Uuid) -> StoreResult<Vec<Property>> {
        let rows = sqlx::query_as::<_, PropertyRow>(&format!(
            r#"
            SELECT {PROPERTY_COLUMNS}
            FROM properties
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(owner)
        .fetch_all(&self.db)
        .await?;
        rows.into_iter().map(to_property).collect()
    }

    async fn get_property(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Property>> {
        let row = sqlx::query_as::<_, PropertyRow>(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.db)
        .await?;
        row.map(to_property).transpose()
    }

    async fn delete_property(&self, owner: Uuid, id: Uuid) -> StoreResult<bool> {
        let res = sqlx::query("DELETE FROM properties WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn record_assessment(&self, id: Uuid, assessment: RiskAssessment) -> StoreResult<Property> {
        if !assessment.is_in_range() {
            return Err(StoreError::InvalidRiskScore(assessment.risk_score));
        }
        let row = sqlx::query_as::<_, PropertyRow>(&format!(
            r#"
            UPDATE properties
               SET risk_score = $2, risk_factors = $3
             WHERE id = $1
            RETURNING {PROPERTY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(assessment.risk_score)
        .bind(Json(&assessment.risk_factors))
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)?;
        to_property(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

    #[test]
    fn unique_constraint_names_match_schema() {
        assert!(SCHEMA.contains(&format!("CONSTRAINT {USERS_EMAIL_KEY} UNIQUE (email)")));
        assert!(SCHEMA.contains(&format!("CONSTRAINT {USERS_USERNAME_KEY} UNIQUE (username)")));
    }

    #[test]
    fn properties_reference_users() {
        assert!(SCHEMA.contains("REFERENCES users (id) ON DELETE CASCADE"));
    }

    #[test]
    fn non_database_errors_pass_through() {
        assert!(matches!(
            map_user_insert_error(sqlx::Error::RowNotFound),
            StoreError::Database(sqlx::Error::RowNotFound)
        ));
        assert!(matches!(
            map_property_insert_error(sqlx::Error::PoolTimedOut),
            StoreError::Database(sqlx::Error::PoolTimedOut)
        ));
    }
}
