use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::{Role, User};

/// JSON number or numeric string, for form fields posted either way.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Int(i64),
    Float(f64),
    Text(String),
}

impl NumberOrText {
    /// Integral value, if this is one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            NumberOrText::Int(i) => Some(*i),
            NumberOrText::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
            NumberOrText::Float(_) => None,
            NumberOrText::Text(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite() && f.fract() == 0.0)
                        .map(|f| f as i64)
                })
            }
        }
    }
}

/// Request body for signup. Everything is optional at the wire level; the
/// validator decides what the declared role requires.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub role: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub specialty_line: Option<String>,
    pub years_exp: Option<NumberOrText>,
    pub organization: Option<String>,
    pub industry: Option<String>,
    pub avg_claims_per_month: Option<NumberOrText>,
    pub reinsurer_type: Option<String>,
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Response returned after signup, login or `/auth/me`.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: PublicUser,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub role: Role,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            username: u.username,
            full_name: u.full_name,
            role: u.role,
        }
    }
}
