use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Account role. Picks the signup ruleset and travels in the session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Underwriter,
    Broker,
    Insurer,
    #[serde(rename = "CLAIMS", alias = "CLAIMS_HANDLER")]
    ClaimsHandler,
    Reinsurer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Underwriter => "UNDERWRITER",
            Role::Broker => "BROKER",
            Role::Insurer => "INSURER",
            Role::ClaimsHandler => "CLAIMS",
            Role::Reinsurer => "REINSURER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "UNDERWRITER" => Ok(Role::Underwriter),
            "BROKER" => Ok(Role::Broker),
            "INSURER" => Ok(Role::Insurer),
            "CLAIMS" | "CLAIMS_HANDLER" => Ok(Role::ClaimsHandler),
            "REINSURER" => Ok(Role::Reinsurer),
            other => anyhow::bail!("unknown role {other:?}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReinsurerType {
    Treaty,
    Facultative,
}

impl ReinsurerType {
    pub fn as_str(self) -> &'static str {
        match self {
            ReinsurerType::Treaty => "treaty",
            ReinsurerType::Facultative => "facultative",
        }
    }
}

impl FromStr for ReinsurerType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "treaty" => Ok(ReinsurerType::Treaty),
            "facultative" => Ok(ReinsurerType::Facultative),
            other => anyhow::bail!("unknown reinsurer type {other:?}"),
        }
    }
}

/// Role-specific signup attributes. Each variant carries exactly the fields
/// its role declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleProfile {
    Underwriter {
        specialty_line: String,
        years_exp: i32,
    },
    Broker {
        organization: String,
    },
    Insurer {
        organization: String,
        industry: Option<String>,
    },
    ClaimsHandler {
        organization: String,
        avg_claims_per_month: i32,
    },
    Reinsurer {
        organization: String,
        reinsurer_type: ReinsurerType,
    },
}

impl RoleProfile {
    pub fn role(&self) -> Role {
        match self {
            RoleProfile::Underwriter { .. } => Role::Underwriter,
            RoleProfile::Broker { .. } => Role::Broker,
            RoleProfile::Insurer { .. } => Role::Insurer,
            RoleProfile::ClaimsHandler { .. } => Role::ClaimsHandler,
            RoleProfile::Reinsurer { .. } => Role::Reinsurer,
        }
    }

    /// Flattens the profile into the nullable per-role columns.
    pub fn attributes(&self) -> RoleAttributes {
        let mut attrs = RoleAttributes::default();
        match self {
            RoleProfile::Underwriter {
                specialty_line,
                years_exp,
            } => {
                attrs.specialty_line = Some(specialty_line.clone());
                attrs.years_exp = Some(*years_exp);
            }
            RoleProfile::Broker { organization } => {
                attrs.organization = Some(organization.clone());
            }
            RoleProfile::Insurer {
                organization,
                industry,
            } => {
                attrs.organization = Some(organization.clone());
                attrs.industry = industry.clone();
            }
            RoleProfile::ClaimsHandler {
                organization,
                avg_claims_per_month,
            } => {
                attrs.organization = Some(organization.clone());
                attrs.avg_claims_per_month = Some(*avg_claims_per_month);
            }
            RoleProfile::Reinsurer {
                organization,
                reinsurer_type,
            } => {
                attrs.organization = Some(organization.clone());
                attrs.reinsurer_type = Some(reinsurer_type.as_str().to_string());
            }
        }
        attrs
    }
}

/// Nullable role-dependent columns of the `users` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RoleAttributes {
    pub specialty_line: Option<String>,
    pub years_exp: Option<i32>,
    pub organization: Option<String>,
    pub industry: Option<String>,
    pub avg_claims_per_month: Option<i32>,
    pub reinsurer_type: Option<String>,
}

/// Validated signup input with the password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub password_hash: String,
    pub profile: RoleProfile,
}

/// User record in the database.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub full_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string, never exposed
    pub role: Role,
    #[serde(flatten)]
    pub attributes: RoleAttributes,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub password_hash: String,
    pub role: String,
    #[sqlx(flatten)]
    pub attributes: RoleAttributes,
    pub created_at: OffsetDateTime,
}

impl TryFrom<UserRow> for User {
    type Error = anyhow::Error;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            email: r.email,
            username: r.username,
            full_name: r.full_name,
            password_hash: r.password_hash,
            role: r.role.parse()?,
            attributes: r.attributes,
            created_at: r.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_wire_names_and_aliases() {
        assert_eq!("broker".parse::<Role>().unwrap(), Role::Broker);
        assert_eq!("CLAIMS".parse::<Role>().unwrap(), Role::ClaimsHandler);
        assert_eq!("claims-handler".parse::<Role>().unwrap(), Role::ClaimsHandler);
        assert!("ADMIN".parse::<Role>().is_err());
    }

    #[test]
    fn role_serializes_as_wire_name() {
        assert_eq!(serde_json::to_string(&Role::ClaimsHandler).unwrap(), "\"CLAIMS\"");
        assert_eq!(serde_json::to_string(&Role::Broker).unwrap(), "\"BROKER\"");
        for role in [
            Role::Underwriter,
            Role::Broker,
            Role::Insurer,
            Role::ClaimsHandler,
            Role::Reinsurer,
        ] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn attributes_null_out_fields_of_other_roles() {
        let attrs = RoleProfile::Broker {
            organization: "Acme Insurance".into(),
        }
        .attributes();
        assert_eq!(attrs.organization.as_deref(), Some("Acme Insurance"));
        assert_eq!(attrs.specialty_line, None);
        assert_eq!(attrs.years_exp, None);
        assert_eq!(attrs.reinsurer_type, None);

        let attrs = RoleProfile::Reinsurer {
            organization: "Re Co".into(),
            reinsurer_type: ReinsurerType::Facultative,
        }
        .attributes();
        assert_eq!(attrs.reinsurer_type.as_deref(), Some("facultative"));
    }
}
