use chrono::NaiveDate;
use serde::Serialize;

use super::trip::TransportMode;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModeEmissions {
    pub transport_mode: TransportMode,
    pub actual_emissions: f64,
    pub saved_emissions: f64,
}

/// One point of the eco-score trend line.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EcoScorePoint {
    pub visit_date: NaiveDate,
    #[serde(rename = "ecoscore")]
    pub eco_score: f64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub struct StatusCounts {
    pub pending: i64,
    pub completed: i64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct EmissionsSummary {
    pub saved: f64,
    pub net: f64,
}

/// How often a place was visited; `location` is the most recent spelling.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LocationVisits {
    pub location: String,
    pub visits: i64,
}
