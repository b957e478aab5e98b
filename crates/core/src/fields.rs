//! Raw form field values, exactly as the user typed them.

use std::fmt;

/// One input of the registration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Rank,
    Name,
    Battalion,
    Address,
    Latitude,
    Longitude,
}

impl Field {
    /// Every field the form requires, in display order.
    pub const REQUIRED: [Field; 6] = [
        Field::Rank,
        Field::Name,
        Field::Battalion,
        Field::Address,
        Field::Latitude,
        Field::Longitude,
    ];

    /// Form field name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Rank => "rank",
            Self::Name => "name",
            Self::Battalion => "battalion",
            Self::Address => "address",
            Self::Latitude => "latitude",
            Self::Longitude => "longitude",
        }
    }

    /// Label shown next to the input.
    pub fn label(self) -> &'static str {
        match self {
            Self::Rank => "Posto/Graduação",
            Self::Name => "Nome Completo",
            Self::Battalion => "Batalhão",
            Self::Address => "Endereço",
            Self::Latitude => "Latitude",
            Self::Longitude => "Longitude",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Current text of every form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub rank: String,
    pub name: String,
    pub battalion: String,
    pub address: String,
    pub latitude: String,
    pub longitude: String,
}

impl FormFields {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Rank => &self.rank,
            Field::Name => &self.name,
            Field::Battalion => &self.battalion,
            Field::Address => &self.address,
            Field::Latitude => &self.latitude,
            Field::Longitude => &self.longitude,
        }
    }

    pub fn get_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Rank => &mut self.rank,
            Field::Name => &mut self.name,
            Field::Battalion => &mut self.battalion,
            Field::Address => &mut self.address,
            Field::Latitude => &mut self.latitude,
            Field::Longitude => &mut self.longitude,
        }
    }

    /// Empty every input.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_blank(&self) -> bool {
        Field::REQUIRED
            .iter()
            .all(|&field| self.get(field).trim().is_empty())
    }
}
