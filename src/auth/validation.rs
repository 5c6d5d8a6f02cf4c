//! Role-conditional signup validation.
//!
//! Checks run in a fixed order and the first failure is returned as a
//! client-facing message: role presence, the base fields every role shares,
//! the role value itself, then the role's own fields.

use lazy_static::lazy_static;
use regex::Regex;

use super::{
    dto::{LoginRequest, NumberOrText, SignupRequest},
    repo_types::{ReinsurerType, Role, RoleProfile},
};
use crate::error::AppError;

type Check<T> = Result<T, AppError>;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref USERNAME_RE: Regex = Regex::new(r"^[a-zA-Z0-9._-]+$").unwrap();
}

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 32;
const PASSWORD_MIN: usize = 8;

/// Signup input that passed validation. The password is still plaintext.
#[derive(Debug, Clone)]
pub struct ValidSignup {
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub profile: RoleProfile,
}

#[derive(Debug, Clone)]
pub struct ValidLogin {
    pub email: String,
    pub password: String,
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn check_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < PASSWORD_MIN {
        return Err("Password must be at least 8 characters");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Must include an uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err("Must include a lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Must include a number");
    }
    Ok(())
}

fn check_username(username: &str) -> Result<(), &'static str> {
    let len = username.chars().count();
    if len < USERNAME_MIN {
        return Err("Username must be at least 3 characters");
    }
    if len > USERNAME_MAX {
        return Err("Username must be at most 32 characters");
    }
    if !USERNAME_RE.is_match(username) {
        return Err("Only letters, numbers, dot, underscore, hyphen");
    }
    Ok(())
}

fn required_text(value: &Option<String>, msg: &str) -> Check<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::validation(msg))
}

fn optional_text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn non_negative_int(value: &Option<NumberOrText>, msg: &str) -> Check<i32> {
    value
        .as_ref()
        .and_then(NumberOrText::as_integer)
        .filter(|v| *v >= 0)
        .and_then(|v| i32::try_from(v).ok())
        .ok_or_else(|| AppError::validation(msg))
}

pub fn validate_signup(req: &SignupRequest) -> Check<ValidSignup> {
    let raw_role = required_text(&req.role, "Role required")?;

    let full_name = req.full_name.as_deref().map(str::trim).unwrap_or_default();
    if full_name.chars().count() < 2 {
        return Err(AppError::validation("Enter your full name"));
    }

    let email = normalize_email(req.email.as_deref().unwrap_or_default());
    if !is_valid_email(&email) {
        return Err(AppError::validation("Invalid email"));
    }

    let username = req.username.as_deref().map(str::trim).unwrap_or_default();
    check_username(username).map_err(AppError::validation)?;

    let password = req.password.as_deref().unwrap_or_default();
    check_password(password).map_err(AppError::validation)?;

    let role: Role = raw_role
        .parse()
        .map_err(|_| AppError::validation("Invalid role"))?;

    Ok(ValidSignup {
        full_name: full_name.to_string(),
        email,
        username: username.to_string(),
        password: password.to_string(),
        profile: role_profile(role, req)?,
    })
}

fn role_profile(role: Role, req: &SignupRequest) -> Check<RoleProfile> {
    let profile = match role {
        Role::Underwriter => RoleProfile::Underwriter {
            specialty_line: required_text(&req.specialty_line, "Select your specialty")?,
            years_exp: non_negative_int(
                &req.years_exp,
                "Years of experience must be a whole number of 0 or more",
            )?,
        },
        Role::Broker => RoleProfile::Broker {
            organization: required_text(&req.organization, "Enter organization")?,
        },
        Role::Insurer => RoleProfile::Insurer {
            organization: required_text(&req.organization, "Enter company name")?,
            industry: optional_text(&req.industry),
        },
        Role::ClaimsHandler => RoleProfile::ClaimsHandler {
            organization: required_text(&req.organization, "Enter organization")?,
            avg_claims_per_month: non_negative_int(
                &req.avg_claims_per_month,
                "Average claims per month must be a whole number of 0 or more",
            )?,
        },
        Role::Reinsurer => RoleProfile::Reinsurer {
            organization: required_text(&req.organization, "Enter reinsurer")?,
            reinsurer_type: req
                .reinsurer_type
                .as_deref()
                .unwrap_or_default()
                .parse::<ReinsurerType>()
                .map_err(|_| AppError::validation("Invalid reinsurer type"))?,
        },
    };
    Ok(profile)
}

pub fn validate_login(req: &LoginRequest) -> Check<ValidLogin> {
    let email = normalize_email(req.email.as_deref().unwrap_or_default());
    if !is_valid_email(&email) {
        return Err(AppError::validation("Invalid email"));
    }
    let password = req.password.as_deref().unwrap_or_default();
    if password.is_empty() {
        return Err(AppError::validation("Password is required"));
    }
    Ok(ValidLogin {
        email,
        password: password.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(role: &str) -> SignupRequest {
        SignupRequest {
            role: Some(role.into()),
            full_name: Some("Jane Doe".into()),
            email: Some("  Jane@Acme.IO ".into()),
            username: Some("jane_doe".into()),
            password: Some("Passw0rdX".into()),
            ..Default::default()
        }
    }

    fn message(err: AppError) -> String {
        match err {
            AppError::Validation(msg) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn broker_with_organization_passes_and_normalizes_email() {
        let mut req = base("BROKER");
        req.organization = Some(" Acme Insurance ".into());
        let ok = validate_signup(&req).unwrap();
        assert_eq!(ok.email, "jane@acme.io");
        assert_eq!(
            ok.profile,
            RoleProfile::Broker {
                organization: "Acme Insurance".into()
            }
        );
    }

    #[test]
    fn missing_role_is_reported_first() {
        let mut req = base("BROKER");
        req.role = None;
        req.email = Some("bad".into());
        assert_eq!(message(validate_signup(&req).unwrap_err()), "Role required");
    }

    #[test]
    fn unknown_role_gets_base_checks_then_fails() {
        let mut req = base("ADMIN");
        req.password = Some("short".into());
        assert_eq!(
            message(validate_signup(&req).unwrap_err()),
            "Password must be at least 8 characters"
        );

        let req = base("ADMIN");
        assert_eq!(message(validate_signup(&req).unwrap_err()), "Invalid role");
    }

    #[test]
    fn base_fields_short_circuit_in_order() {
        let mut req = base("BROKER");
        req.full_name = Some("J".into());
        req.email = Some("nope".into());
        assert_eq!(message(validate_signup(&req).unwrap_err()), "Enter your full name");

        let mut req = base("BROKER");
        req.email = Some("nope".into());
        req.username = Some("x".into());
        assert_eq!(message(validate_signup(&req).unwrap_err()), "Invalid email");

        let mut req = base("BROKER");
        req.username = Some("has space".into());
        assert_eq!(
            message(validate_signup(&req).unwrap_err()),
            "Only letters, numbers, dot, underscore, hyphen"
        );

        let mut req = base("BROKER");
        req.username = Some("a".repeat(33));
        assert_eq!(
            message(validate_signup(&req).unwrap_err()),
            "Username must be at most 32 characters"
        );
    }

    #[test]
    fn password_policy() {
        assert_eq!(check_password("Ab1"), Err("Password must be at least 8 characters"));
        assert_eq!(check_password("abcdefg1"), Err("Must include an uppercase letter"));
        assert_eq!(check_password("ABCDEFG1"), Err("Must include a lowercase letter"));
        assert_eq!(check_password("Abcdefgh"), Err("Must include a number"));
        assert_eq!(check_password("Abcdefg1"), Ok(()));
    }

    #[test]
    fn each_role_requires_its_own_fields() {
        // (role, field that is missing, expected message)
        let cases = [
            ("UNDERWRITER", "Select your specialty"),
            ("BROKER", "Enter organization"),
            ("INSURER", "Enter company name"),
            ("CLAIMS", "Enter organization"),
            ("REINSURER", "Enter reinsurer"),
        ];
        for (role, expected) in cases {
            let err = validate_signup(&base(role)).unwrap_err();
            assert_eq!(message(err), expected, "role {role}");
        }
    }

    #[test]
    fn underwriter_needs_non_negative_years() {
        let mut req = base("UNDERWRITER");
        req.specialty_line = Some("Marine".into());
        assert!(message(validate_signup(&req).unwrap_err()).starts_with("Years of experience"));

        req.years_exp = Some(NumberOrText::Int(-1));
        assert!(validate_signup(&req).is_err());

        req.years_exp = Some(NumberOrText::Text("12".into()));
        let ok = validate_signup(&req).unwrap();
        assert_eq!(
            ok.profile,
            RoleProfile::Underwriter {
                specialty_line: "Marine".into(),
                years_exp: 12
            }
        );
    }

    #[test]
    fn insurer_industry_is_optional() {
        let mut req = base("insurer");
        req.organization = Some("Umbrella".into());
        let ok = validate_signup(&req).unwrap();
        assert_eq!(
            ok.profile,
            RoleProfile::Insurer {
                organization: "Umbrella".into(),
                industry: None
            }
        );
    }

    #[test]
    fn claims_handler_needs_claim_volume() {
        let mut req = base("CLAIMS");
        req.organization = Some("Acme".into());
        assert!(message(validate_signup(&req).unwrap_err()).starts_with("Average claims"));
        req.avg_claims_per_month = Some(NumberOrText::Int(0));
        assert_eq!(validate_signup(&req).unwrap().profile.role(), Role::ClaimsHandler);
    }

    #[test]
    fn reinsurer_type_is_normalized() {
        let mut req = base("REINSURER");
        req.organization = Some("Re Co".into());
        req.reinsurer_type = Some("proportional".into());
        assert_eq!(message(validate_signup(&req).unwrap_err()), "Invalid reinsurer type");

        req.reinsurer_type = Some("Treaty".into());
        let ok = validate_signup(&req).unwrap();
        assert_eq!(
            ok.profile,
            RoleProfile::Reinsurer {
                organization: "Re Co".into(),
                reinsurer_type: ReinsurerType::Treaty
            }
        );
    }

    #[test]
    fn login_validation() {
        let req = LoginRequest {
            email: Some("nope".into()),
            password: Some("x".into()),
        };
        assert_eq!(message(validate_login(&req).unwrap_err()), "Invalid email");

        let req = LoginRequest {
            email: Some("a@b.io".into()),
            password: None,
        };
        assert_eq!(message(validate_login(&req).unwrap_err()), "Password is required");

        let req = LoginRequest {
            email: Some(" A@B.io".into()),
            password: Some("pw".into()),
        };
        assert_eq!(validate_login(&req).unwrap().email, "a@b.io");
    }
}
