use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use lexicon::{
    Derivation, LetterAnalysis, Metadata, Numerology, Popularity, Profile, derive,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Boy,
    Girl,
    Unisex,
}

impl Gender {
    pub const ALL: [Self; 3] = [Self::Boy, Self::Girl, Self::Unisex];

    /// A unisex name suits every requested gender.
    pub fn suits(self, requested: Self) -> bool {
        self == requested || self == Self::Unisex
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Boy => "boy",
            Self::Girl => "girl",
            Self::Unisex => "unisex",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|gender| gender.as_str() == s)
            .ok_or_else(|| AppError::Validation("Invalid gender specified".into()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl FromStr for ZodiacSign {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let sign = match s.to_lowercase().as_str() {
            "aries" => Self::Aries,
            "taurus" => Self::Taurus,
            "gemini" => Self::Gemini,
            "cancer" => Self::Cancer,
            "leo" => Self::Leo,
            "virgo" => Self::Virgo,
            "libra" => Self::Libra,
            "scorpio" => Self::Scorpio,
            "sagittarius" => Self::Sagittarius,
            "capricorn" => Self::Capricorn,
            "aquarius" => Self::Aquarius,
            "pisces" => Self::Pisces,
            _ => return Err(AppError::Validation("Valid zodiac sign is required".into())),
        };

        Ok(sign)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZodiacElement {
    Fire,
    Earth,
    Air,
    Water,
}

impl FromStr for ZodiacElement {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fire" => Ok(Self::Fire),
            "earth" => Ok(Self::Earth),
            "air" => Ok(Self::Air),
            "water" => Ok(Self::Water),
            _ => Err(AppError::Validation(
                "Valid element (fire/earth/air/water) is required".into(),
            )),
        }
    }
}

/// Admin-supplied astrology, not derived from the name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Zodiac {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign: Option<ZodiacSign>,
    #[serde(default)]
    pub qualities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<ZodiacElement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameRecord {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub meaning: String,
    pub gender: Gender,
    pub origin: String,
    #[serde(default)]
    pub religion: Vec<String>,
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default)]
    pub characteristics: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zodiac: Option<Zodiac>,
    pub metadata: Metadata,
    pub letter_analysis: LetterAnalysis,
    pub numerology: Numerology,
    #[serde(default)]
    pub popularity: Popularity,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NameRecord {
    pub fn profile(&self) -> Profile<'_> {
        Profile {
            origin: &self.origin,
            length: self.metadata.length,
            numerology: self.numerology.number,
        }
    }

    fn set_derivation(&mut self, derivation: Derivation) {
        self.name = derivation.name;
        self.slug = derivation.slug;
        self.metadata = derivation.metadata;
        self.letter_analysis = derivation.letter_analysis;
        self.numerology = derivation.numerology;
    }

    /// Applies a partial update. Derived fields are recomputed whenever the patch carries a name.
    /// On error the record is left untouched.
    pub fn apply(&mut self, patch: NamePatch, now: DateTime<Utc>) -> Result<(), AppError> {
        let derivation = patch.name.as_deref().map(derive).transpose()?;
        let meaning = patch
            .meaning
            .map(|meaning| required(meaning, "Meaning is required"))
            .transpose()?;
        let origin = patch
            .origin
            .map(|origin| required(origin, "Origin is required"))
            .transpose()?;

        if let Some(derivation) = derivation {
            self.set_derivation(derivation);
        }
        if let Some(meaning) = meaning {
            self.meaning = meaning;
        }
        if let Some(origin) = origin {
            self.origin = origin;
        }
        if let Some(gender) = patch.gender {
            self.gender = gender;
        }
        if let Some(religion) = patch.religion {
            self.religion = religion;
        }
        if let Some(regions) = patch.regions {
            self.regions = regions;
        }
        if let Some(characteristics) = patch.characteristics {
            self.characteristics = characteristics;
        }
        if let Some(zodiac) = patch.zodiac {
            self.zodiac = Some(zodiac);
        }

        self.updated_at = now;
        Ok(())
    }
}

/// Trends are non-negative and finite.
pub fn checked_trend(trend: f64) -> Result<f64, AppError> {
    if !trend.is_finite() || trend < 0.0 {
        return Err(AppError::Validation("Trend must be a non-negative number".into()));
    }

    Ok(trend)
}

fn required(value: String, message: &str) -> Result<String, AppError> {
    let value = value.trim().to_string();

    if value.is_empty() {
        return Err(AppError::Validation(message.into()));
    }

    Ok(value)
}

/// Create and import payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NameDraft {
    pub name: String,
    pub meaning: String,
    pub gender: Option<Gender>,
    pub origin: String,
    pub religion: Vec<String>,
    pub regions: Vec<String>,
    pub characteristics: Vec<String>,
    pub zodiac: Option<Zodiac>,
    pub trend: Option<f64>,
}

impl NameDraft {
    pub fn into_record(self, now: DateTime<Utc>) -> Result<NameRecord, AppError> {
        let missing = || AppError::Validation("Please provide required fields".into());

        if self.name.trim().is_empty() || self.meaning.trim().is_empty() || self.origin.trim().is_empty() {
            return Err(missing());
        }
        let gender = self.gender.ok_or_else(missing)?;
        let trend = self.trend.map(checked_trend).transpose()?.unwrap_or_default();
        let derivation = derive(&self.name)?;

        Ok(NameRecord {
            id: Uuid::new_v4(),
            name: derivation.name,
            slug: derivation.slug,
            meaning: self.meaning.trim().to_string(),
            gender,
            origin: self.origin.trim().to_string(),
            religion: self.religion,
            regions: self.regions,
            characteristics: self.characteristics,
            zodiac: self.zodiac,
            metadata: derivation.metadata,
            letter_analysis: derivation.letter_analysis,
            numerology: derivation.numerology,
            popularity: Popularity::default().with_trend(trend),
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial update. Derived and popularity fields are not accepted here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NamePatch {
    pub name: Option<String>,
    pub meaning: Option<String>,
    pub gender: Option<Gender>,
    pub origin: Option<String>,
    pub religion: Option<Vec<String>>,
    pub regions: Option<Vec<String>>,
    pub characteristics: Option<Vec<String>>,
    pub zodiac: Option<Zodiac>,
}
