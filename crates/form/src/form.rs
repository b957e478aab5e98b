//! Form field state with continuous validation.
//!
//! Every mutation (input, blur, coordinate fill, reset) re-runs the
//! validation engine so [`FormState::is_submittable`] always reflects the
//! current values.

use muster_core::config::ValidationSettings;
use muster_core::fields::{Field, FormFields};
use muster_core::format::format_coordinate;
use muster_core::rank::is_known_rank;
use muster_core::validation;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormInputError {
    #[error("Posto/graduação desconhecido: {0}")]
    UnknownRank(String),
}

#[derive(Debug, Clone)]
pub struct FormState {
    fields: FormFields,
    limits: ValidationSettings,
    submittable: bool,
}

impl FormState {
    /// Empty form. Validation runs once here.
    pub fn new(limits: ValidationSettings) -> Self {
        let mut form = Self {
            fields: FormFields::default(),
            limits,
            submittable: false,
        };
        form.revalidate();
        form
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub fn is_submittable(&self) -> bool {
        self.submittable
    }

    /// Whether the submit control is enabled.
    pub fn submit_enabled(&self, in_flight: bool) -> bool {
        self.submittable && !in_flight
    }

    /// Maximum characters accepted by `field`, if bounded.
    pub fn max_length(&self, field: Field) -> Option<usize> {
        match field {
            Field::Name => Some(self.limits.name_max_length),
            Field::Battalion => Some(self.limits.battalion_max_length),
            Field::Address => Some(self.limits.address_max_length),
            Field::Rank | Field::Latitude | Field::Longitude => None,
        }
    }

    /// Change event for `field`.
    ///
    /// Rank only accepts catalog codes or the empty placeholder. Free-text
    /// input longer than the field limit is cut at the limit.
    pub fn input(&mut self, field: Field, value: &str) -> Result<(), FormInputError> {
        if field == Field::Rank && !value.is_empty() && !is_known_rank(value) {
            return Err(FormInputError::UnknownRank(value.to_string()));
        }

        let value = match self.max_length(field) {
            Some(max) => truncate_chars(value, max),
            None => value,
        };

        *self.fields.get_mut(field) = value.to_string();
        self.revalidate();
        Ok(())
    }

    /// Blur event for `field`.
    pub fn blur(&mut self, _field: Field) {
        self.revalidate();
    }

    /// Write a located position into the coordinate fields.
    pub fn set_coordinates(&mut self, latitude: f64, longitude: f64) {
        let places = self.limits.coordinate_decimal_places;
        self.fields.latitude = format_coordinate(latitude, places);
        self.fields.longitude = format_coordinate(longitude, places);
        self.revalidate();
    }

    /// Clear every field.
    pub fn reset(&mut self) {
        self.fields.clear();
        self.revalidate();
    }

    fn revalidate(&mut self) {
        self.submittable = validation::is_submittable(&self.fields);
    }
}

fn truncate_chars(value: &str, max: usize) -> &str {
    match value.char_indices().nth(max) {
        Some((byte_idx, _)) => &value[..byte_idx],
        None => value,
    }
}
