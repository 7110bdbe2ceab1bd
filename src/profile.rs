//! User profile: the structured record that personalises answers
//!
//! Form input arrives as loose strings and is decoded by
//! [`ProfileForm::validate`]. Every path into a stored [`Profile`] (the form,
//! deserialisation, [`crate::ContextEngine::submit_profile`]) runs
//! [`Profile::validate`], so stored profiles have passed range and enum
//! checks.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Stored value when the user leaves restrictions blank
pub const NO_RESTRICTIONS: &str = "None";

const AGE_RANGE: std::ops::RangeInclusive<u32> = 1..=120;
const HEIGHT_RANGE_CM: std::ops::RangeInclusive<f64> = 50.0..=272.0;
const WEIGHT_RANGE_KG: std::ops::RangeInclusive<f64> = 20.0..=500.0;

/// Gender, either a known option or free text
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum Gender {
    Male,
    Female,
    Other(String),
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Male => f.write_str("Male"),
            Self::Female => f.write_str("Female"),
            Self::Other(text) => f.write_str(text),
        }
    }
}

impl FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "" => Err(Error::Profile("gender is required".to_string())),
            "male" | "m" => Ok(Self::Male),
            "female" | "f" => Ok(Self::Female),
            _ => Ok(Self::Other(trimmed.to_string())),
        }
    }
}

impl TryFrom<String> for Gender {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Gender> for String {
    fn from(value: Gender) -> Self {
        value.to_string()
    }
}

/// Typical weekly activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    /// All levels, in ascending order
    pub const ALL: [Self; 5] = [
        Self::Sedentary,
        Self::Light,
        Self::Moderate,
        Self::Active,
        Self::VeryActive,
    ];
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sedentary => "Sedentary",
            Self::Light => "Lightly Active",
            Self::Moderate => "Moderately Active",
            Self::Active => "Active",
            Self::VeryActive => "Very Active",
        })
    }
}

impl FromStr for ActivityLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "sedentary" => Ok(Self::Sedentary),
            "light" | "lightly active" => Ok(Self::Light),
            "moderate" | "moderately active" => Ok(Self::Moderate),
            "active" => Ok(Self::Active),
            "very active" | "veryactive" => Ok(Self::VeryActive),
            _ => Err(Error::Profile(format!("unknown activity level: {}", s.trim()))),
        }
    }
}

/// Primary nutrition goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    LoseWeight,
    Maintain,
    GainMuscle,
}

impl Goal {
    pub const ALL: [Self; 3] = [Self::LoseWeight, Self::Maintain, Self::GainMuscle];
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LoseWeight => "Lose Weight",
            Self::Maintain => "Maintain Weight",
            Self::GainMuscle => "Gain Muscle",
        })
    }
}

impl FromStr for Goal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "lose weight" | "lose" | "fat loss" => Ok(Self::LoseWeight),
            "maintain" | "maintain weight" | "maintenance" => Ok(Self::Maintain),
            "gain muscle" | "gain" | "muscle gain" => Ok(Self::GainMuscle),
            _ => Err(Error::Profile(format!("unknown goal: {}", s.trim()))),
        }
    }
}

/// A validated profile record
///
/// Serialises with the field names the backend expects. Deserialising runs
/// the same checks as [`ProfileForm::validate`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", try_from = "ProfileRecord")]
pub struct Profile {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    #[serde(rename = "height")]
    pub height_cm: f64,
    #[serde(rename = "weight")]
    pub weight_kg: f64,
    pub activity_level: ActivityLevel,
    pub goal: Goal,
    pub restrictions: String,
}

impl Profile {
    /// One-line summary of the fields that steer advice
    #[must_use]
    pub fn summary(&self) -> String {
        format!("Goal: {}. Restrictions: {}.", self.goal, self.restrictions)
    }

    /// Check every field against the profile rules
    ///
    /// # Errors
    ///
    /// Returns [`Error::Profile`] naming the first field that is blank or out
    /// of range. Blank restrictions are rejected here; use
    /// [`Self::normalized`] to default them to [`NO_RESTRICTIONS`] first.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Profile("name is required".to_string()));
        }
        if !AGE_RANGE.contains(&self.age) {
            return Err(Error::Profile(format!(
                "age must be between {} and {}",
                AGE_RANGE.start(),
                AGE_RANGE.end()
            )));
        }
        check_measure("height", self.height_cm, &HEIGHT_RANGE_CM)?;
        check_measure("weight", self.weight_kg, &WEIGHT_RANGE_KG)?;
        if self.restrictions.trim().is_empty() {
            return Err(Error::Profile("restrictions must not be blank".to_string()));
        }
        Ok(())
    }

    /// Trim text fields, default blank restrictions, then validate
    ///
    /// # Errors
    ///
    /// Returns [`Error::Profile`] if the record breaks a profile rule
    pub fn normalized(mut self) -> Result<Self> {
        self.name = self.name.trim().to_string();
        let restrictions = self.restrictions.trim();
        self.restrictions = if restrictions.is_empty() {
            NO_RESTRICTIONS.to_string()
        } else {
            restrictions.to_string()
        };
        self.validate()?;
        Ok(self)
    }
}

/// Wire shape of a profile before validation
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileRecord {
    name: String,
    age: u32,
    gender: Gender,
    #[serde(rename = "height")]
    height_cm: f64,
    #[serde(rename = "weight")]
    weight_kg: f64,
    activity_level: ActivityLevel,
    goal: Goal,
    #[serde(default)]
    restrictions: Option<String>,
}

impl TryFrom<ProfileRecord> for Profile {
    type Error = Error;

    fn try_from(record: ProfileRecord) -> Result<Self> {
        Self {
            name: record.name,
            age: record.age,
            gender: record.gender,
            height_cm: record.height_cm,
            weight_kg: record.weight_kg,
            activity_level: record.activity_level,
            goal: record.goal,
            restrictions: record.restrictions.unwrap_or_default(),
        }
        .normalized()
    }
}

/// Raw profile form input, one string per field
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileForm {
    pub name: String,
    pub age: String,
    pub gender: String,
    pub height_cm: String,
    pub weight_kg: String,
    pub activity_level: String,
    pub goal: String,
    #[serde(default)]
    pub restrictions: Option<String>,
}

impl ProfileForm {
    /// Decode and validate the form into a [`Profile`]
    ///
    /// # Errors
    ///
    /// Returns [`Error::Profile`] naming the first field that is missing,
    /// malformed or out of range.
    pub fn validate(&self) -> Result<Profile> {
        let age: u32 = self
            .age
            .trim()
            .parse()
            .map_err(|_| Error::Profile(format!("age is not a whole number: {}", self.age.trim())))?;

        Profile {
            name: self.name.clone(),
            age,
            gender: self.gender.parse()?,
            height_cm: parse_measure("height", &self.height_cm)?,
            weight_kg: parse_measure("weight", &self.weight_kg)?,
            activity_level: self.activity_level.parse()?,
            goal: self.goal.parse()?,
            restrictions: self.restrictions.clone().unwrap_or_default(),
        }
        .normalized()
    }
}

fn parse_measure(field: &str, raw: &str) -> Result<f64> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Profile(format!("{field} is not a number: {}", raw.trim())))
}

fn check_measure(field: &str, value: f64, range: &std::ops::RangeInclusive<f64>) -> Result<()> {
    if !value.is_finite() || !range.contains(&value) {
        return Err(Error::Profile(format!(
            "{field} must be between {} and {}",
            range.start(),
            range.end()
        )));
    }
    Ok(())
}

/// Whether a submit created the profile or replaced an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileChange {
    Created,
    Replaced,
}

/// Holds at most one profile
#[derive(Debug, Clone, Default)]
pub struct ProfileStore {
    profile: Option<Profile>,
}

impl ProfileStore {
    #[must_use]
    pub const fn new() -> Self {
        Self { profile: None }
    }

    /// Store `profile`, replacing any previous record wholesale
    pub fn submit(&mut self, profile: Profile) -> ProfileChange {
        match self.profile.replace(profile) {
            Some(_) => ProfileChange::Replaced,
            None => ProfileChange::Created,
        }
    }

    #[must_use]
    pub const fn current(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    #[must_use]
    pub const fn is_set(&self) -> bool {
        self.profile.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ProfileForm {
        ProfileForm {
            name: "Ana".to_string(),
            age: "31".to_string(),
            gender: "female".to_string(),
            height_cm: "165".to_string(),
            weight_kg: "62.5".to_string(),
            activity_level: "moderately active".to_string(),
            goal: "lose weight".to_string(),
            restrictions: None,
        }
    }

    #[test]
    fn missing_restrictions_become_none() {
        let profile = form().validate().unwrap();
        assert_eq!(profile.restrictions, "None");

        let mut blank = form();
        blank.restrictions = Some("   ".to_string());
        assert_eq!(blank.validate().unwrap().restrictions, "None");
    }

    #[test]
    fn valid_form_decodes_every_field() {
        let mut f = form();
        f.restrictions = Some(" beef, peanuts ".to_string());
        let p = f.validate().unwrap();

        assert_eq!(p.name, "Ana");
        assert_eq!(p.age, 31);
        assert_eq!(p.gender, Gender::Female);
        assert!((p.weight_kg - 62.5).abs() < f64::EPSILON);
        assert_eq!(p.activity_level, ActivityLevel::Moderate);
        assert_eq!(p.goal, Goal::LoseWeight);
        assert_eq!(p.restrictions, "beef, peanuts");
    }

    #[test]
    fn rejects_out_of_range_and_malformed_values() {
        let mut f = form();
        f.age = "0".to_string();
        assert!(matches!(f.validate(), Err(Error::Profile(_))));

        let mut f = form();
        f.age = "thirty".to_string();
        assert!(f.validate().is_err());

        let mut f = form();
        f.height_cm = "-170".to_string();
        assert!(f.validate().is_err());

        let mut f = form();
        f.weight_kg = "NaN".to_string();
        assert!(f.validate().is_err());

        let mut f = form();
        f.goal = "get swole".to_string();
        assert!(f.validate().is_err());

        let mut f = form();
        f.name = "  ".to_string();
        assert!(f.validate().is_err());
    }

    #[test]
    fn free_text_gender_is_kept() {
        let mut f = form();
        f.gender = "Non-binary".to_string();
        assert_eq!(f.validate().unwrap().gender, Gender::Other("Non-binary".to_string()));
    }

    #[test]
    fn wire_shape_matches_backend() {
        let p = form().validate().unwrap();
        let json = serde_json::to_value(&p).unwrap();

        assert_eq!(json["name"], "Ana");
        assert_eq!(json["gender"], "Female");
        assert_eq!(json["height"], 165.0);
        assert_eq!(json["weight"], 62.5);
        assert_eq!(json["activityLevel"], "moderate");
        assert_eq!(json["goal"], "lose_weight");
        assert_eq!(json["restrictions"], "None");
    }

    #[test]
    fn hand_built_profile_is_checked() {
        let good = form().validate().unwrap();
        assert!(good.validate().is_ok());

        let zero_age = Profile { age: 0, ..good.clone() };
        assert!(matches!(zero_age.validate(), Err(Error::Profile(_))));

        let negative = Profile { height_cm: -5.0, ..good.clone() };
        assert!(negative.validate().is_err());

        let nan = Profile { weight_kg: f64::NAN, ..good.clone() };
        assert!(nan.validate().is_err());

        let blank = Profile { restrictions: "  ".to_string(), ..good };
        assert!(blank.validate().is_err());
        assert_eq!(blank.normalized().unwrap().restrictions, "None");
    }

    #[test]
    fn deserializing_runs_validation() {
        let ok: Profile = serde_json::from_value(serde_json::json!({
            "name": "Ana", "age": 31, "gender": "Female", "height": 165.0,
            "weight": 60.0, "activityLevel": "light", "goal": "maintain"
        }))
        .unwrap();
        assert_eq!(ok.restrictions, "None");

        let bad = serde_json::from_value::<Profile>(serde_json::json!({
            "name": "Ana", "age": 0, "gender": "Female", "height": 165.0,
            "weight": 60.0, "activityLevel": "light", "goal": "maintain",
            "restrictions": ""
        }));
        assert!(bad.is_err());
    }

    #[test]
    fn store_holds_a_single_profile() {
        let mut store = ProfileStore::new();
        assert!(!store.is_set());

        let p = form().validate().unwrap();
        assert_eq!(store.submit(p.clone()), ProfileChange::Created);

        let mut f = form();
        f.name = "Bea".to_string();
        assert_eq!(store.submit(f.validate().unwrap()), ProfileChange::Replaced);
        assert_eq!(store.current().unwrap().name, "Bea");
    }
}
