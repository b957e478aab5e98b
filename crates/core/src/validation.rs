//! Validation engine.
//!
//! Pure checks over [`FormFields`]: required-field presence and
//! coordinate bounds. The form re-runs [`is_submittable`] on every edit
//! and the submission pipeline re-runs [`validate`] before sending.

use std::ops::RangeInclusive;

use crate::fields::{Field, FormFields};

/// Valid latitude range in decimal degrees.
pub const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;

/// Valid longitude range in decimal degrees.
pub const LONGITUDE_RANGE: RangeInclusive<f64> = -180.0..=180.0;

/// Message shown when a submit is attempted with invalid input.
pub const INVALID_FORM_MESSAGE: &str =
    "Por favor, preencha todos os campos obrigatórios corretamente.";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Campo obrigatório não preenchido: {}", .0.label())]
    MissingField(Field),

    #[error("Latitude inválida: {0}")]
    InvalidLatitude(String),

    #[error("Longitude inválida: {0}")]
    InvalidLongitude(String),
}

/// Result of checking a coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateCheck {
    pub is_valid: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Parse coordinate text as a finite decimal number.
///
/// Surrounding whitespace is ignored. `NaN` and infinities are rejected.
pub fn parse_coordinate(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
}

pub fn is_valid_latitude(value: &str) -> bool {
    parse_coordinate(value).is_some_and(|lat| LATITUDE_RANGE.contains(&lat))
}

pub fn is_valid_longitude(value: &str) -> bool {
    parse_coordinate(value).is_some_and(|lng| LONGITUDE_RANGE.contains(&lng))
}

/// Check a latitude/longitude pair together, keeping the parsed values.
pub fn validate_coordinates(latitude: &str, longitude: &str) -> CoordinateCheck {
    CoordinateCheck {
        is_valid: is_valid_latitude(latitude) && is_valid_longitude(longitude),
        latitude: parse_coordinate(latitude),
        longitude: parse_coordinate(longitude),
    }
}

/// Validate the whole form.
///
/// Reports the first problem found, checking required fields in form
/// order before coordinate ranges.
pub fn validate(fields: &FormFields) -> Result<(), ValidationError> {
    if let Some(&missing) = Field::REQUIRED
        .iter()
        .find(|&&field| fields.get(field).trim().is_empty())
    {
        return Err(ValidationError::MissingField(missing));
    }

    if !is_valid_latitude(&fields.latitude) {
        return Err(ValidationError::InvalidLatitude(fields.latitude.clone()));
    }

    if !is_valid_longitude(&fields.longitude) {
        return Err(ValidationError::InvalidLongitude(fields.longitude.clone()));
    }

    Ok(())
}

/// Whether the form may be submitted in its current state.
pub fn is_submittable(fields: &FormFields) -> bool {
    validate(fields).is_ok()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn complete() -> FormFields {
        FormFields {
            rank: "CAP".into(),
            name: "João".into(),
            battalion: "1BPM".into(),
            address: "Rua X".into(),
            latitude: "-23.5".into(),
            longitude: "-46.6".into(),
        }
    }

    #[test]
    fn complete_form_is_submittable() {
        assert!(is_submittable(&complete()));
    }

    #[test]
    fn every_required_field_is_checked() {
        for field in Field::REQUIRED {
            let mut fields = complete();
            fields.get_mut(field).clear();
            assert!(!is_submittable(&fields), "{field} should be required");
            assert_matches!(validate(&fields), Err(ValidationError::MissingField(f)) if f == field);
        }
    }

    #[test]
    fn whitespace_only_counts_as_empty() {
        let mut fields = complete();
        fields.address = " \t\n".into();
        assert_matches!(
            validate(&fields),
            Err(ValidationError::MissingField(Field::Address))
        );
    }

    #[test]
    fn latitude_boundaries_are_inclusive() {
        assert!(is_valid_latitude("90"));
        assert!(is_valid_latitude("-90"));
        assert!(is_valid_latitude("0"));
        assert!(!is_valid_latitude("90.0000001"));
        assert!(!is_valid_latitude("-90.0000001"));
    }

    #[test]
    fn longitude_boundaries_are_inclusive() {
        assert!(is_valid_longitude("180"));
        assert!(is_valid_longitude("-180"));
        assert!(!is_valid_longitude("180.0000001"));
        assert!(!is_valid_longitude("-180.0000001"));
    }

    #[test]
    fn non_numeric_coordinates_are_invalid() {
        assert!(!is_valid_latitude("abc"));
        assert!(!is_valid_latitude("12abc"));
        assert!(!is_valid_latitude("NaN"));
        assert!(!is_valid_longitude("inf"));
        assert!(!is_valid_longitude(""));
    }

    #[test]
    fn coordinates_tolerate_surrounding_whitespace() {
        assert!(is_valid_latitude("  -23.55052000 "));
        assert_eq!(parse_coordinate(" 1.5 "), Some(1.5));
    }

    #[test]
    fn out_of_range_coordinates_block_submission() {
        let mut fields = complete();
        fields.latitude = "91".into();
        assert_matches!(validate(&fields), Err(ValidationError::InvalidLatitude(v)) if v == "91");

        let mut fields = complete();
        fields.longitude = "-181".into();
        assert_matches!(validate(&fields), Err(ValidationError::InvalidLongitude(_)));
    }

    #[test]
    fn validate_coordinates_keeps_parsed_values() {
        let check = validate_coordinates("-23.5", "200");
        assert!(!check.is_valid);
        assert_eq!(check.latitude, Some(-23.5));
        assert_eq!(check.longitude, Some(200.0));

        let check = validate_coordinates("x", "1");
        assert!(!check.is_valid);
        assert_eq!(check.latitude, None);
    }
}
