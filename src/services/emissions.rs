//! Per-trip emission figures.
//!
//! Factors are grams of CO2 per kilometer. The eco-score normalizes against
//! [`REFERENCE_MODE`] over the same distance, while saved emissions are
//! measured against the flat [`SAVINGS_THRESHOLD_PER_KM`]. The two baselines
//! do not agree: a car trip scores ~56 but records no savings.

use crate::{error::ValidationError, models::trip::TransportMode};

pub const CAR_FACTOR: f64 = 223.6;
pub const BUS_FACTOR: f64 = 515.2;
pub const EV_FACTOR: f64 = 0.0;
pub const BIKE_FACTOR: f64 = 26.6;
pub const WALK_FACTOR: f64 = 0.0;

/// Worst-case mode; an eco-score of 0 means "as bad as the bus".
pub const REFERENCE_MODE: TransportMode = TransportMode::Bus;

/// Emission rate per km below which a trip counts as saving emissions.
pub const SAVINGS_THRESHOLD_PER_KM: f64 = 113.0;

pub const MAX_ECO_SCORE: f64 = 100.0;

/// Applied by trip creation when the caller sends no distance.
pub const DEFAULT_DISTANCE_KM: f64 = 10.0;

pub fn emission_factor(mode: TransportMode) -> f64 {
    match mode {
        TransportMode::Car => CAR_FACTOR,
        TransportMode::Bus => BUS_FACTOR,
        TransportMode::Ev => EV_FACTOR,
        TransportMode::Bike => BIKE_FACTOR,
        TransportMode::Walk => WALK_FACTOR,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Emissions {
    pub actual: f64,
    pub saved: f64,
    pub eco_score: f64,
}

pub fn compute(distance: f64, mode: TransportMode) -> Result<Emissions, ValidationError> {
    if !distance.is_finite() || distance <= 0.0 {
        return Err(ValidationError::InvalidDistance(distance));
    }

    let factor = emission_factor(mode);
    let actual = factor * distance;
    let saved = ((SAVINGS_THRESHOLD_PER_KM - factor) * distance).max(0.0);
    if !actual.is_finite() || !saved.is_finite() {
        return Err(ValidationError::InvalidDistance(distance));
    }

    // actual / (reference factor * distance), with the distance cancelled out.
    let ratio = factor / emission_factor(REFERENCE_MODE);
    let eco_score = (MAX_ECO_SCORE - ratio * MAX_ECO_SCORE).clamp(0.0, MAX_ECO_SCORE);

    Ok(Emissions {
        actual,
        saved,
        eco_score,
    })
}
