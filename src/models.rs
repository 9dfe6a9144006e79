//! Data models for the course catalog.
//!
//! This module contains the external catalog payload shapes consumed by the
//! sync engine and the stored record types (courses, tees, holes, hole-tee
//! pairings, plays and hole scores) shared by the store and the report layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Treat an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept either a JSON string or number and keep it as text.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) => Some(s),
        Some(Raw::Int(n)) => Some(n.to_string()),
        Some(Raw::Float(n)) => Some(n.to_string()),
        None => None,
    })
}

/// One course as delivered by the external catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalCourseItem {
    /// External unique key; the upsert key for [`Course`].
    pub id: String,
    #[serde(default)]
    pub db_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
    pub display_name: String,
    #[serde(default)]
    pub numbers_of_holes: Option<i64>,
    #[serde(default)]
    pub course_location: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub difficulty: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image: Option<MediaRef>,
    #[serde(default)]
    pub video: Option<MediaRef>,
    #[serde(default)]
    pub world_location: Option<WorldLocation>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tees: Vec<ExternalTee>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub holes: Vec<ExternalHole>,
}

impl ExternalCourseItem {
    pub fn image_url(&self) -> Option<&str> {
        self.image.as_ref().and_then(|m| m.url.as_deref())
    }

    pub fn video_url(&self) -> Option<&str> {
        self.video.as_ref().and_then(|m| m.url.as_deref())
    }

    pub fn latitude(&self) -> Option<f64> {
        self.world_location.as_ref().and_then(|l| l.latitude)
    }

    pub fn longitude(&self) -> Option<f64> {
        self.world_location.as_ref().and_then(|l| l.longitude)
    }

    pub fn google_map_url(&self) -> Option<&str> {
        self.world_location
            .as_ref()
            .and_then(|l| l.google_map_url.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRef {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldLocation {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub google_map_url: Option<String>,
}

/// A tee set of an external course.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalTee {
    /// Optional external key, used by tagged hole-tee linkage.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub par: Option<i64>,
    #[serde(default)]
    pub course_distance: Option<f64>,
    #[serde(default)]
    pub course_rating: Option<f64>,
    #[serde(default)]
    pub slope: Option<f64>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A hole of an external course. Its position in the course's hole list is
/// its hole index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalHole {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tees: Vec<ExternalHoleTee>,
}

/// Per-tee data for one hole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalHoleTee {
    /// Optional reference to [`ExternalTee::id`].
    #[serde(default)]
    pub tee_id: Option<String>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub stroke_index: Option<i64>,
    #[serde(default)]
    pub par: Option<i64>,
}

/// A stored course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub external_id: String,
    pub db_id: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub display_name: String,
    pub numbers_of_holes: Option<i64>,
    pub course_location: Option<String>,
    pub difficulty: Option<String>,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub google_map_url: Option<String>,
    pub synced_at: DateTime<Utc>,
}

/// A stored tee set. `ordinal` is the tee's position in the payload of the
/// sync that created it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tee {
    pub id: String,
    pub course_id: String,
    pub ordinal: i64,
    pub external_key: Option<String>,
    pub par: Option<i64>,
    pub course_distance: Option<f64>,
    pub course_rating: Option<f64>,
    pub slope: Option<f64>,
    pub gender: Option<String>,
    pub kind: Option<String>,
    pub name: Option<String>,
}

impl Tee {
    /// Label shown for a tee: its name, else its gender, else "Tee".
    pub fn label(&self) -> &str {
        tee_label(self.name.as_deref(), self.gender.as_deref())
    }
}

/// Resolve the display label for a tee from its optional name and gender.
pub fn tee_label<'a>(name: Option<&'a str>, gender: Option<&'a str>) -> &'a str {
    name.filter(|s| !s.is_empty())
        .or_else(|| gender.filter(|s| !s.is_empty()))
        .unwrap_or("Tee")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hole {
    pub id: String,
    pub course_id: String,
    pub hole_index: i64,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoleTee {
    pub id: String,
    pub hole_id: String,
    pub tee_id: String,
    pub distance: Option<f64>,
    pub stroke_index: Option<i64>,
    pub par: Option<i64>,
}

/// Extent of a recorded round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HolesPlayed {
    Front,
    Back,
    Full,
}

impl HolesPlayed {
    pub fn as_str(&self) -> &'static str {
        match self {
            HolesPlayed::Front => "front",
            HolesPlayed::Back => "back",
            HolesPlayed::Full => "full",
        }
    }
}

impl fmt::Display for HolesPlayed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HolesPlayed::Front => write!(f, "Front 9"),
            HolesPlayed::Back => write!(f, "Back 9"),
            HolesPlayed::Full => write!(f, "Full 18"),
        }
    }
}

impl FromStr for HolesPlayed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "front" => Ok(HolesPlayed::Front),
            "back" => Ok(HolesPlayed::Back),
            "full" => Ok(HolesPlayed::Full),
            other => Err(format!("unknown holes played value: {}", other)),
        }
    }
}

/// A recorded round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Play {
    pub id: String,
    pub course_id: String,
    /// Cleared when the referenced tee is replaced by a resync.
    pub tee_id: Option<String>,
    pub tee_ordinal: i64,
    pub holes_played: HolesPlayed,
    pub overall_score: Option<i64>,
    pub note: Option<String>,
    pub played_at: DateTime<Utc>,
}

/// Input for recording a new round. Hole scores are addressed by hole index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlay {
    pub course_id: String,
    pub tee_id: String,
    pub holes_played: HolesPlayed,
    #[serde(default)]
    pub overall_score: Option<i64>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub played_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scores: Vec<NewHoleScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHoleScore {
    pub hole_index: i64,
    pub score: i64,
}

/// One line of a course's play history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaySummary {
    pub play_id: String,
    pub played_at: DateTime<Utc>,
    pub tee_label: String,
    pub holes_played: HolesPlayed,
    pub overall_score: Option<i64>,
    pub note: Option<String>,
    /// Number of hole scores recorded; a scorecard is available when > 0.
    pub hole_score_count: usize,
}

impl PlaySummary {
    pub fn has_scorecard(&self) -> bool {
        self.hole_score_count > 0
    }
}

/// Row counts owned by one course.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildCounts {
    pub tees: usize,
    pub holes: usize,
    pub hole_tees: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_external_item() {
        let json = r#"{
            "id": "ext-1",
            "dbId": 42,
            "createdAt": "2024-03-01T10:00:00Z",
            "displayName": "Pebble Beach",
            "numbersOfHoles": 18,
            "difficulty": 3,
            "tags": null,
            "image": {"url": "https://img/1.png"},
            "worldLocation": {"latitude": 36.5, "longitude": -121.9, "googleMapUrl": "https://maps/1"},
            "tees": [{"par": 72, "courseRating": 74.9, "slope": 144, "gender": "male", "name": "Blue"}],
            "holes": [{"name": "One", "tees": [{"distance": 380, "strokeIndex": 5, "par": 4}]}]
        }"#;

        let item: ExternalCourseItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, "ext-1");
        assert_eq!(item.db_id, Some(42));
        assert_eq!(item.difficulty.as_deref(), Some("3"));
        assert!(item.tags.is_empty());
        assert_eq!(item.image_url(), Some("https://img/1.png"));
        assert_eq!(item.video_url(), None);
        assert_eq!(item.latitude(), Some(36.5));
        assert_eq!(item.google_map_url(), Some("https://maps/1"));
        assert_eq!(item.tees.len(), 1);
        assert_eq!(item.holes[0].tees[0].stroke_index, Some(5));
    }

    #[test]
    fn test_parse_minimal_item() {
        let item: ExternalCourseItem =
            serde_json::from_str(r#"{"id": "x", "displayName": "X", "holes": null}"#).unwrap();
        assert!(item.tees.is_empty());
        assert!(item.holes.is_empty());
        assert!(item.created_at.is_none());
    }

    #[test]
    fn test_holes_played_labels() {
        assert_eq!(HolesPlayed::Front.to_string(), "Front 9");
        assert_eq!(HolesPlayed::Back.to_string(), "Back 9");
        assert_eq!(HolesPlayed::Full.to_string(), "Full 18");
        assert_eq!("BACK".parse::<HolesPlayed>(), Ok(HolesPlayed::Back));
        assert!("middle".parse::<HolesPlayed>().is_err());
    }

    #[test]
    fn test_tee_label_fallbacks() {
        assert_eq!(tee_label(Some("Blue"), Some("male")), "Blue");
        assert_eq!(tee_label(Some(""), Some("female")), "female");
        assert_eq!(tee_label(None, None), "Tee");
    }
}
