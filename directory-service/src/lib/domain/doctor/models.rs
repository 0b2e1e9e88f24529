use chrono::DateTime;
use chrono::NaiveTime;
use chrono::Utc;
use chrono::Weekday;

use crate::account::models::AccountId;
use crate::doctor::errors::AvailabilityError;
use crate::doctor::errors::FilterError;
use crate::doctor::errors::ProfileFieldError;

/// Doctor profile aggregate.
///
/// Keyed by the owning account; one profile per account at most.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doctor {
    pub id: AccountId,
    pub profile: DoctorProfile,
    pub availability: Vec<AvailabilityWindow>,
    pub created_at: DateTime<Utc>,
}

impl Doctor {
    /// A freshly registered doctor has no availability yet.
    pub fn new(id: AccountId, profile: DoctorProfile, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            profile,
            availability: Vec::new(),
            created_at,
        }
    }

    /// Whether any window covers `day`, and `at` when given.
    pub fn is_available(&self, day: Weekday, at: Option<NaiveTime>) -> bool {
        self.availability.iter().any(|window| match at {
            Some(at) => window.contains(day, at),
            None => window.day == day,
        })
    }
}

/// Role-specific attributes of a doctor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorProfile {
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub gender: String,
    pub marital_status: String,
    pub designation: String,
    pub qualification: String,
    pub blood_group: String,
    pub address: String,
    pub country: String,
    pub state: String,
    pub city: String,
    pub postal_code: String,
    pub specialization: String,
    pub license_number: String,
}

impl DoctorProfile {
    const MAX_FIELD_LENGTH: usize = 100;
    const MAX_ADDRESS_LENGTH: usize = 255;
    const MIN_AGE: i32 = 18;
    const MAX_AGE: i32 = 120;

    /// Trim every attribute and check it against the profile rules.
    ///
    /// # Errors
    /// * `Missing` - A required attribute is blank
    /// * `TooLong` - An attribute exceeds its column width
    /// * `AgeOutOfRange` - Age outside 18..=120
    pub fn validated(self) -> Result<Self, ProfileFieldError> {
        let limit = Self::MAX_FIELD_LENGTH;
        let profile = Self {
            first_name: required("first_name", self.first_name, limit)?,
            last_name: required("last_name", self.last_name, limit)?,
            age: self.age,
            gender: required("gender", self.gender, limit)?,
            marital_status: required("marital_status", self.marital_status, limit)?,
            designation: required("designation", self.designation, limit)?,
            qualification: required("qualification", self.qualification, limit)?,
            blood_group: required("blood_group", self.blood_group, limit)?,
            address: required("address", self.address, Self::MAX_ADDRESS_LENGTH)?,
            country: required("country", self.country, limit)?,
            state: required("state", self.state, limit)?,
            city: required("city", self.city, limit)?,
            postal_code: required("postal_code", self.postal_code, limit)?,
            specialization: required("specialization", self.specialization, limit)?,
            license_number: required("license_number", self.license_number, limit)?,
        };

        if !(Self::MIN_AGE..=Self::MAX_AGE).contains(&profile.age) {
            return Err(ProfileFieldError::AgeOutOfRange {
                min: Self::MIN_AGE,
                max: Self::MAX_AGE,
                actual: profile.age,
            });
        }

        Ok(profile)
    }
}

fn required(field: &'static str, value: String, max: usize) -> Result<String, ProfileFieldError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ProfileFieldError::Missing { field })
    } else if value.chars().count() > max {
        Err(ProfileFieldError::TooLong { field, max })
    } else {
        Ok(value.to_string())
    }
}

/// Weekly slot during which a doctor can be booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityWindow {
    pub day: Weekday,
    pub starts_at: NaiveTime,
    pub ends_at: NaiveTime,
}

impl AvailabilityWindow {
    /// # Errors
    /// * `EmptyWindow` - `starts_at` is not strictly before `ends_at`
    pub fn new(
        day: Weekday,
        starts_at: NaiveTime,
        ends_at: NaiveTime,
    ) -> Result<Self, AvailabilityError> {
        if starts_at >= ends_at {
            return Err(AvailabilityError::EmptyWindow {
                starts_at: starts_at.to_string(),
                ends_at: ends_at.to_string(),
            });
        }
        Ok(Self {
            day,
            starts_at,
            ends_at,
        })
    }

    /// Containment is inclusive at both ends.
    pub fn contains(&self, day: Weekday, at: NaiveTime) -> bool {
        self.day == day && self.starts_at <= at && at <= self.ends_at
    }
}

/// Parse a day label such as `Mon` or `monday`.
pub fn parse_day(label: &str) -> Result<Weekday, AvailabilityError> {
    label
        .trim()
        .parse::<Weekday>()
        .map_err(|_| AvailabilityError::InvalidDay(label.to_string()))
}

/// Parse a time of day given as `HH:MM` or `HH:MM:SS`.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, AvailabilityError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| AvailabilityError::InvalidTime(value.to_string()))
}

/// Profile attributes that can be filtered by equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoctorAttribute {
    Specialization,
    Designation,
    Qualification,
    Country,
    State,
    City,
}

impl DoctorAttribute {
    /// Column holding the attribute in the `doctors` table.
    pub fn column(self) -> &'static str {
        match self {
            DoctorAttribute::Specialization => "specialization",
            DoctorAttribute::Designation => "designation",
            DoctorAttribute::Qualification => "qualification",
            DoctorAttribute::Country => "country",
            DoctorAttribute::State => "state",
            DoctorAttribute::City => "city",
        }
    }

    pub fn value_of(self, profile: &DoctorProfile) -> &str {
        match self {
            DoctorAttribute::Specialization => &profile.specialization,
            DoctorAttribute::Designation => &profile.designation,
            DoctorAttribute::Qualification => &profile.qualification,
            DoctorAttribute::Country => &profile.country,
            DoctorAttribute::State => &profile.state,
            DoctorAttribute::City => &profile.city,
        }
    }
}

/// Availability part of a directory search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityQuery {
    pub day: Weekday,
    pub at: Option<NaiveTime>,
}

/// Sparse conjunctive search criteria for the directory.
///
/// Absent criteria impose no constraint; an empty filter matches every doctor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoctorFilter {
    attributes: Vec<(DoctorAttribute, String)>,
    availability: Option<AvailabilityQuery>,
}

impl DoctorFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Constrain `attribute` to equal `value`. Blank or absent values are ignored.
    pub fn with_attribute(mut self, attribute: DoctorAttribute, value: Option<&str>) -> Self {
        let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return self;
        };
        self.attributes.retain(|(existing, _)| *existing != attribute);
        self.attributes.push((attribute, value.to_string()));
        self
    }

    /// Constrain availability from raw `day` and `time` parameters.
    ///
    /// # Errors
    /// * `TimeWithoutDay` - A time was given without a day
    /// * `Availability` - Day or time could not be parsed
    pub fn with_availability(
        mut self,
        day: Option<&str>,
        time: Option<&str>,
    ) -> Result<Self, FilterError> {
        let day = day.map(str::trim).filter(|v| !v.is_empty());
        let time = time.map(str::trim).filter(|v| !v.is_empty());

        self.availability = match (day, time) {
            (None, None) => None,
            (None, Some(_)) => return Err(FilterError::TimeWithoutDay),
            (Some(day), time) => Some(AvailabilityQuery {
                day: parse_day(day)?,
                at: time.map(parse_time_of_day).transpose()?,
            }),
        };
        Ok(self)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (DoctorAttribute, &str)> {
        self.attributes
            .iter()
            .map(|(attribute, value)| (*attribute, value.as_str()))
    }

    pub fn availability(&self) -> Option<AvailabilityQuery> {
        self.availability
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.availability.is_none()
    }

    /// Evaluate the filter against an in-memory doctor.
    pub fn matches(&self, doctor: &Doctor) -> bool {
        let attributes_match = self
            .attributes()
            .all(|(attribute, value)| attribute.value_of(&doctor.profile) == value);

        let availability_match = match self.availability {
            Some(query) => doctor.is_available(query.day, query.at),
            None => true,
        };

        attributes_match && availability_match
    }
}
