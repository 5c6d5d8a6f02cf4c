use serde::Deserialize;

use super::repo_types::{NewProperty, PropertyType};
use crate::error::AppError;

/// Body of `POST /properties`. Any `user_id` the client sends is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct CreatePropertyRequest {
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub property_type: Option<String>,
    pub estimated_value: Option<f64>,
    pub notes: Option<String>,
}

impl CreatePropertyRequest {
    pub fn validate(self) -> Result<NewProperty, AppError> {
        let address = self
            .address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .ok_or_else(|| AppError::validation("Address is required"))?
            .to_string();

        let latitude = self
            .latitude
            .filter(|v| v.is_finite() && (-90.0..=90.0).contains(v))
            .ok_or_else(|| AppError::validation("Latitude must be between -90 and 90"))?;
        let longitude = self
            .longitude
            .filter(|v| v.is_finite() && (-180.0..=180.0).contains(v))
            .ok_or_else(|| AppError::validation("Longitude must be between -180 and 180"))?;

        let property_type: PropertyType = self
            .property_type
            .as_deref()
            .unwrap_or_default()
            .parse()
            .map_err(|_| {
                AppError::validation("Property type must be residential, commercial or industrial")
            })?;

        if let Some(v) = self.estimated_value {
            if !v.is_finite() || v < 0.0 {
                return Err(AppError::validation("Estimated value must be 0 or more"));
            }
        }

        let notes = self
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        Ok(NewProperty {
            address,
            latitude,
            longitude,
            property_type,
            estimated_value: self.estimated_value,
            notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn westlands() -> CreatePropertyRequest {
        CreatePropertyRequest {
            address: Some("Westlands, Nairobi".into()),
            latitude: Some(-1.2676),
            longitude: Some(36.8095),
            property_type: Some("Commercial".into()),
            estimated_value: Some(50_000_000.0),
            notes: Some("  ".into()),
        }
    }

    #[test]
    fn valid_request_is_normalized() {
        let p = westlands().validate().unwrap();
        assert_eq!(p.property_type, PropertyType::Commercial);
        assert_eq!(p.notes, None);
        assert_eq!(p.estimated_value, Some(50_000_000.0));
    }

    #[test]
    fn rejects_bad_fields() {
        let mut r = westlands();
        r.address = Some(" ".into());
        assert!(matches!(r.validate(), Err(AppError::Validation(m)) if m == "Address is required"));

        let mut r = westlands();
        r.latitude = Some(91.0);
        assert!(r.validate().is_err());

        let mut r = westlands();
        r.longitude = None;
        assert!(r.validate().is_err());

        let mut r = westlands();
        r.property_type = Some("castle".into());
        assert!(r.validate().is_err());

        let mut r = westlands();
        r.estimated_value = Some(-5.0);
        assert!(r.validate().is_err());
    }

    #[test]
    fn ignores_client_supplied_owner() {
        let r: CreatePropertyRequest = serde_json::from_str(
            r#"{"address":"Karen, Nairobi","latitude":-1.3192,"longitude":36.6851,
                "property_type":"residential","user_id":"00000000-0000-0000-0000-000000000000"}"#,
        )
        .unwrap();
        assert!(r.validate().is_ok());
    }
}
