use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::ValidationError;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum TransportMode {
    Car,
    Bus,
    Ev,
    Bike,
    Walk,
}

impl TransportMode {
    pub const ALL: [TransportMode; 5] = [
        TransportMode::Car,
        TransportMode::Bus,
        TransportMode::Ev,
        TransportMode::Bike,
        TransportMode::Walk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Car => "car",
            TransportMode::Bus => "bus",
            TransportMode::Ev => "ev",
            TransportMode::Bike => "bike",
            TransportMode::Walk => "walk",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransportMode {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == wanted)
            .ok_or_else(|| ValidationError::UnknownTransportMode(raw.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum TripStatus {
    #[default]
    Pending,
    Completed,
}

impl TripStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Pending => "pending",
            TripStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TripStatus {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(TripStatus::Pending),
            "completed" => Ok(TripStatus::Completed),
            _ => Err(ValidationError::UnknownStatus(raw.to_string())),
        }
    }
}

/// Creation payload as it arrives over the wire. Mode and status stay raw
/// strings until [`crate::services::trips::TripService::create_trip`]
/// validates them. `origin_*` is where the traveller set off from; with the
/// trip's own coordinates it stands in for a missing `distance`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrip {
    pub category: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(alias = "visitdate")]
    pub visit_date: NaiveDate,
    pub transport_mode: String,
    pub status: Option<String>,
    pub distance: Option<f64>,
    pub origin_latitude: Option<f64>,
    pub origin_longitude: Option<f64>,
}

/// A validated trip with its derived figures, ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct TripRecord {
    pub category: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub visit_date: NaiveDate,
    pub transport_mode: TransportMode,
    pub status: TripStatus,
    pub distance: f64,
    pub actual_emissions: f64,
    pub saved_emissions: f64,
    pub eco_score: f64,
}

/// A stored trip. Mode and status columns hold the lowercase names.
#[derive(Debug, Clone, Serialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: i64,
    pub category: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub visit_date: NaiveDate,
    pub transport_mode: TransportMode,
    pub status: TripStatus,
    pub distance: f64,
    pub actual_emissions: f64,
    pub saved_emissions: f64,
    pub eco_score: f64,
    pub created_at: DateTime<Utc>,
}
