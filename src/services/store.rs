use chrono::{NaiveDate, SecondsFormat, SubsecRound, Utc};

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        report::{EcoScorePoint, ModeEmissions},
        trip::{TransportMode, Trip, TripRecord, TripStatus},
    },
};

/// SQL access to the `trips` table. Every write is a single statement, so a
/// failed call leaves the table as it was.
#[derive(Clone)]
pub struct TripStore {
    pool: DbPool,
}

impl TripStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub async fn insert(&self, record: &TripRecord) -> Result<Trip, AppError> {
        // Fixed precision keeps the text column sortable.
        let created_at = Utc::now()
            .trunc_subsecs(6)
            .to_rfc3339_opts(SecondsFormat::Micros, true);
        let trip = sqlx::query_as::<_, Trip>(
            r#"INSERT INTO trips (
                category, location, latitude, longitude, visit_date, transport_mode,
                status, distance, actual_emissions, saved_emissions, eco_score, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *"#,
        )
        .bind(&record.category)
        .bind(&record.location)
        .bind(record.latitude)
        .bind(record.longitude)
        .bind(record.visit_date)
        .bind(record.transport_mode)
        .bind(record.status)
        .bind(record.distance)
        .bind(record.actual_emissions)
        .bind(record.saved_emissions)
        .bind(record.eco_score)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(trip)
    }

    pub async fn select_all(&self, status: Option<TripStatus>) -> Result<Vec<Trip>, AppError> {
        let trips = match status {
            Some(status) => {
                sqlx::query_as::<_, Trip>(
                    "SELECT * FROM trips WHERE status = ? ORDER BY created_at DESC, id DESC",
                )
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Trip>(
                    "SELECT * FROM trips ORDER BY created_at DESC, id DESC",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(trips)
    }

    /// Marks every pending trip dated before `today` as completed.
    pub async fn complete_pending_before(&self, today: NaiveDate) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE trips SET status = ? WHERE status = ? AND visit_date < ?")
            .bind(TripStatus::Completed)
            .bind(TripStatus::Pending)
            .bind(today)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_all(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM trips")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn total_saved(&self) -> Result<f64, AppError> {
        self.scalar("SELECT COALESCE(SUM(saved_emissions), 0.0) FROM trips")
            .await
    }

    pub async fn net_impact(&self) -> Result<f64, AppError> {
        self.scalar(
            "SELECT COALESCE(SUM(saved_emissions), 0.0) - COALESCE(SUM(actual_emissions), 0.0) FROM trips",
        )
        .await
    }

    pub async fn total_distance(&self) -> Result<f64, AppError> {
        self.scalar("SELECT COALESCE(SUM(distance), 0.0) FROM trips")
            .await
    }

    pub async fn average_eco_score(&self) -> Result<f64, AppError> {
        self.scalar("SELECT COALESCE(AVG(eco_score), 0.0) FROM trips")
            .await
    }

    pub async fn emissions_by_mode(&self) -> Result<Vec<ModeEmissions>, AppError> {
        let rows: Vec<(TransportMode, f64, f64)> = sqlx::query_as(
            r#"SELECT transport_mode,
                      COALESCE(SUM(actual_emissions), 0.0),
                      COALESCE(SUM(saved_emissions), 0.0)
               FROM trips
               GROUP BY transport_mode
               ORDER BY transport_mode"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(transport_mode, actual_emissions, saved_emissions)| ModeEmissions {
                    transport_mode,
                    actual_emissions,
                    saved_emissions,
                },
            )
            .collect())
    }

    pub async fn eco_score_series(&self) -> Result<Vec<EcoScorePoint>, AppError> {
        let rows: Vec<(NaiveDate, f64)> = sqlx::query_as(
            r#"SELECT visit_date, AVG(eco_score)
               FROM trips
               GROUP BY visit_date
               ORDER BY visit_date"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(visit_date, eco_score)| EcoScorePoint {
                visit_date,
                eco_score,
            })
            .collect())
    }

    /// Trip counts keyed by the raw status column.
    pub async fn count_by_status(&self) -> Result<Vec<(String, i64)>, AppError> {
        let rows = sqlx::query_as("SELECT status, COUNT(*) FROM trips GROUP BY status")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Visit counts per stored location spelling, with the id of the newest
    /// trip using that spelling.
    pub async fn count_by_location(&self) -> Result<Vec<(String, i64, i64)>, AppError> {
        let rows = sqlx::query_as(
            "SELECT TRIM(location), COUNT(*), MAX(id) FROM trips GROUP BY TRIM(location)",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn scalar(&self, sql: &'static str) -> Result<f64, AppError> {
        let value: f64 = sqlx::query_scalar(sql).fetch_one(&self.pool).await?;
        Ok(value)
    }
}
