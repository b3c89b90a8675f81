use std::collections::HashMap;

use chrono::{Local, NaiveDate};
use tracing::{debug, info, warn};

use crate::{
    error::{AppError, ValidationError},
    models::{
        report::{EcoScorePoint, EmissionsSummary, LocationVisits, ModeEmissions, StatusCounts},
        trip::{NewTrip, TransportMode, Trip, TripRecord, TripStatus},
    },
    services::{
        emissions::{self, DEFAULT_DISTANCE_KM},
        geo::haversine_km,
        store::TripStore,
    },
};

/// Trip creation, the status rule, and the reporting reductions.
#[derive(Clone)]
pub struct TripService {
    store: TripStore,
}

impl TripService {
    pub fn new(store: TripStore) -> Self {
        Self { store }
    }

    /// Validates the payload and fills in the derived emission figures.
    pub fn prepare(input: NewTrip) -> Result<TripRecord, ValidationError> {
        let transport_mode: TransportMode = input.transport_mode.parse()?;
        let status = match input.status.as_deref() {
            Some(raw) => raw.parse()?,
            None => TripStatus::default(),
        };
        let distance = resolve_distance(&input);
        let figures = emissions::compute(distance, transport_mode)?;

        Ok(TripRecord {
            category: input.category,
            location: input.location,
            latitude: input.latitude,
            longitude: input.longitude,
            visit_date: input.visit_date,
            transport_mode,
            status,
            distance,
            actual_emissions: figures.actual,
            saved_emissions: figures.saved,
            eco_score: figures.eco_score,
        })
    }

    pub async fn create_trip(&self, input: NewTrip) -> Result<Trip, AppError> {
        let record = Self::prepare(input).map_err(|err| {
            warn!("rejected trip: {err}");
            err
        })?;
        let trip = self.store.insert(&record).await?;
        info!(
            id = trip.id,
            mode = %trip.transport_mode,
            distance = trip.distance,
            eco_score = trip.eco_score,
            "trip created"
        );
        Ok(trip)
    }

    pub async fn list_trips(&self, status: Option<TripStatus>) -> Result<Vec<Trip>, AppError> {
        self.store.select_all(status).await
    }

    pub async fn delete_all_trips(&self) -> Result<u64, AppError> {
        let removed = self.store.delete_all().await?;
        info!(removed, "all trips deleted");
        Ok(removed)
    }

    /// Runs the status rule against the local calendar date.
    pub async fn refresh_statuses(&self) -> Result<u64, AppError> {
        self.refresh_statuses_as_of(Local::now().date_naive()).await
    }

    pub async fn refresh_statuses_as_of(&self, today: NaiveDate) -> Result<u64, AppError> {
        let updated = self.store.complete_pending_before(today).await?;
        if updated > 0 {
            info!(updated, %today, "pending trips completed");
        } else {
            debug!(%today, "no pending trips to complete");
        }
        Ok(updated)
    }

    pub async fn total_saved(&self) -> Result<f64, AppError> {
        self.store.total_saved().await
    }

    pub async fn net_impact(&self) -> Result<f64, AppError> {
        self.store.net_impact().await
    }

    pub async fn emissions_summary(&self) -> Result<EmissionsSummary, AppError> {
        Ok(EmissionsSummary {
            saved: self.total_saved().await?,
            net: self.net_impact().await?,
        })
    }

    pub async fn total_distance(&self) -> Result<f64, AppError> {
        self.store.total_distance().await
    }

    pub async fn average_eco_score(&self) -> Result<f64, AppError> {
        self.store.average_eco_score().await
    }

    pub async fn emissions_by_mode(&self) -> Result<Vec<ModeEmissions>, AppError> {
        self.store.emissions_by_mode().await
    }

    pub async fn eco_score_series(&self) -> Result<Vec<EcoScorePoint>, AppError> {
        self.store.eco_score_series().await
    }

    pub async fn status_counts(&self) -> Result<StatusCounts, AppError> {
        let rows = self.store.count_by_status().await?;
        Ok(tally_statuses(rows))
    }

    /// Most visited places first. Spellings that differ only in case or
    /// spacing count as the same place.
    pub async fn location_visit_counts(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<LocationVisits>, AppError> {
        let rows = self.store.count_by_location().await?;
        let mut ranked = merge_locations(rows);
        if let Some(limit) = limit {
            ranked.truncate(limit);
        }
        Ok(ranked)
    }
}

/// Explicit distance first, then origin-to-destination great-circle
/// distance, then the flat default.
fn resolve_distance(input: &NewTrip) -> f64 {
    if let Some(distance) = input.distance {
        return distance;
    }
    match (
        input.origin_latitude,
        input.origin_longitude,
        input.latitude,
        input.longitude,
    ) {
        (Some(from_lat), Some(from_lon), Some(to_lat), Some(to_lon)) => {
            haversine_km((from_lat, from_lon), (to_lat, to_lon))
        }
        _ => DEFAULT_DISTANCE_KM,
    }
}

pub fn normalize_location(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Folds `(location, visits, newest id)` rows into one entry per normalized
/// name, sorted by visits descending then name.
fn merge_locations(rows: impl IntoIterator<Item = (String, i64, i64)>) -> Vec<LocationVisits> {
    let mut merged: HashMap<String, (String, i64, i64)> = HashMap::new();
    for (location, visits, newest_id) in rows {
        let key = normalize_location(&location);
        if key.is_empty() {
            continue;
        }
        let entry = merged
            .entry(key)
            .or_insert_with(|| (location.clone(), 0, newest_id));
        entry.1 += visits;
        if newest_id > entry.2 {
            entry.0 = location;
            entry.2 = newest_id;
        }
    }

    let mut ranked: Vec<LocationVisits> = merged
        .into_values()
        .map(|(location, visits, _)| LocationVisits { location, visits })
        .collect();
    ranked.sort_by(|a, b| {
        b.visits
            .cmp(&a.visits)
            .then_with(|| a.location.cmp(&b.location))
    });
    ranked
}

fn tally_statuses(rows: impl IntoIterator<Item = (String, i64)>) -> StatusCounts {
    rows.into_iter()
        .fold(StatusCounts::default(), |mut counts, (status, n)| {
            match status.parse::<TripStatus>() {
                Ok(TripStatus::Pending) => counts.pending += n,
                Ok(TripStatus::Completed) => counts.completed += n,
                Err(_) => {}
            }
            counts
        })
}
