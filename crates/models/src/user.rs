use std::{fmt, str::FromStr};

use chrono::{Local, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive: `male`, `Male` and `MALE` all parse.
impl FromStr for Gender {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gender::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ModelError::UnknownGender(s.to_string()))
    }
}

/// A stored user record.
///
/// `id` is `None` until the service assigns one on insert; it is never
/// regenerated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Assigned by the server; ignored on create, required on update.
    #[serde(default)]
    pub id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub age: u32,
    pub email: String,
}

impl User {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        gender: Gender,
        age: u32,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            gender,
            age,
            email: email.into(),
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    /// Approximate date of birth: today's local date minus `age` years.
    pub fn date_of_birth(&self) -> Option<NaiveDate> {
        self.date_of_birth_from(Local::now().date_naive())
    }

    /// Same as [`User::date_of_birth`] relative to a fixed `today`.
    /// `None` if the age reaches past the calendar range.
    pub fn date_of_birth_from(&self, today: NaiveDate) -> Option<NaiveDate> {
        let months = self.age.checked_mul(12)?;
        today.checked_sub_months(Months::new(months))
    }
}
