use std::{fmt, fs::File, net::SocketAddr};

use anyhow::Context;
use chrono::{Days, Local, NaiveDate};
use cucumber::{given, then, when, World as _};
use ecotrack::{
    config::AppConfig,
    db::{init_pool, run_migrations},
    error::AppError,
    models::trip::{NewTrip, Trip},
    services::trips::TripService,
    state::AppState,
};
use tempfile::TempDir;

#[derive(Debug, cucumber::World, Default)]
struct TripWorld {
    state: Option<TestState>,
    last_trip: Option<Trip>,
    last_error: Option<String>,
    refreshed: Option<u64>,
}

impl TripWorld {
    fn trips(&self) -> &TripService {
        &self
            .state
            .as_ref()
            .expect("state must be initialised first")
            .app
            .trips
    }
}

struct TestState {
    app: AppState,
    _root: TempDir,
}

impl fmt::Debug for TestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestState").finish()
    }
}

impl TestState {
    async fn new() -> anyhow::Result<Self> {
        let root = TempDir::new().context("create temp dir for bdd world")?;
        let db_path = root.path().join("bdd.sqlite");
        File::create(&db_path)?;
        let database_url = format!("sqlite://{}", db_path.to_string_lossy());

        let config = AppConfig {
            database_url: database_url.clone(),
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            max_connections: 4,
            allowed_origins: vec!["http://localhost:3000".into()],
        };

        let db = init_pool(&config.database_url, config.max_connections).await?;
        run_migrations(&db).await?;

        let app = AppState::new(config, db);
        Ok(Self { app, _root: root })
    }
}

fn visit_date(days: u64, direction: &str) -> NaiveDate {
    let today = Local::now().date_naive();
    match direction {
        "ago" => today - Days::new(days),
        _ => today + Days::new(days),
    }
}

fn trip_input(mode: String, distance: f64, date: NaiveDate, status: Option<&str>) -> NewTrip {
    NewTrip {
        category: "sightseeing".into(),
        location: "Ghent".into(),
        latitude: Some(51.05),
        longitude: Some(3.72),
        visit_date: date,
        transport_mode: mode,
        status: status.map(str::to_string),
        distance: Some(distance),
        origin_latitude: None,
        origin_longitude: None,
    }
}

async fn record(world: &mut TripWorld, input: NewTrip) {
    match world.trips().create_trip(input).await {
        Ok(trip) => {
            world.last_trip = Some(trip);
            world.last_error = None;
        }
        Err(err @ AppError::Validation(_)) => world.last_error = Some(err.to_string()),
        Err(err) => panic!("unexpected failure: {err:?}"),
    }
}

fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} (±{tolerance}), got {actual}"
    );
}

#[given("a fresh trip database")]
async fn given_fresh_database(world: &mut TripWorld) {
    world.state = Some(TestState::new().await.expect("state"));
    world.last_trip = None;
    world.last_error = None;
    world.refreshed = None;
}

#[given(regex = r#"^a trip by "([^"]+)" over ([\d.]+) km visited (\d+) days? (ago|from now)$"#)]
#[when(regex = r#"^I record a trip by "([^"]+)" over ([\d.]+) km visited (\d+) days? (ago|from now)$"#)]
async fn record_pending_trip(
    world: &mut TripWorld,
    mode: String,
    distance: f64,
    days: u64,
    direction: String,
) {
    let input = trip_input(mode, distance, visit_date(days, &direction), None);
    record(world, input).await;
}

#[given(
    regex = r#"^a completed trip by "([^"]+)" over ([\d.]+) km visited (\d+) days? (ago|from now)$"#
)]
async fn record_completed_trip(
    world: &mut TripWorld,
    mode: String,
    distance: f64,
    days: u64,
    direction: String,
) {
    let input = trip_input(
        mode,
        distance,
        visit_date(days, &direction),
        Some("completed"),
    );
    record(world, input).await;
}

#[given(regex = r#"^a trip to "([^"]+)" by "([^"]+)" over ([\d.]+) km$"#)]
async fn record_trip_to(world: &mut TripWorld, location: String, mode: String, distance: f64) {
    let mut input = trip_input(mode, distance, Local::now().date_naive(), None);
    input.location = location;
    record(world, input).await;
}

#[when(regex = r#"^I try to record a trip by "([^"]+)" over (-?[\d.]+) km$"#)]
async fn try_record_trip(world: &mut TripWorld, mode: String, distance: f64) {
    let input = trip_input(mode, distance, Local::now().date_naive(), None);
    world.last_trip = None;
    record(world, input).await;
}

#[when("I refresh trip statuses")]
async fn when_refresh(world: &mut TripWorld) {
    let updated = world.trips().refresh_statuses().await.expect("refresh");
    world.refreshed = Some(updated);
}

#[when("I delete all trips")]
async fn when_delete_all(world: &mut TripWorld) {
    world.trips().delete_all_trips().await.expect("delete all");
}

#[then(regex = r#"^the trip is rejected with a message mentioning "([^"]+)"$"#)]
async fn then_rejected(world: &mut TripWorld, needle: String) {
    let message = world.last_error.as_ref().expect("trip should be rejected");
    assert!(message.contains(&needle), "{message:?} lacks {needle:?}");
    assert!(world.last_trip.is_none());
}

#[then(regex = r"^the recorded trip has an eco-score of about ([\d.]+)$")]
async fn then_eco_score(world: &mut TripWorld, expected: f64) {
    let trip = world.last_trip.as_ref().expect("a trip was recorded");
    assert_close(trip.eco_score, expected, 0.05);
}

#[then(regex = r"^the recorded trip emitted ([\d.]+) and saved ([\d.]+)$")]
async fn then_emitted_and_saved(world: &mut TripWorld, actual: f64, saved: f64) {
    let trip = world.last_trip.as_ref().expect("a trip was recorded");
    assert_close(trip.actual_emissions, actual, 1e-6);
    assert_close(trip.saved_emissions, saved, 1e-6);
}

#[then(regex = r"^(\d+) trips? (?:is|are) stored$")]
async fn then_stored_count(world: &mut TripWorld, expected: usize) {
    let trips = world.trips().list_trips(None).await.expect("list trips");
    assert_eq!(trips.len(), expected);
}

#[then(regex = r"^the total distance is ([\d.]+)$")]
async fn then_total_distance(world: &mut TripWorld, expected: f64) {
    let total = world.trips().total_distance().await.expect("total distance");
    assert_close(total, expected, 1e-9);
}

#[then(regex = r"^the total saved emissions are ([\d.]+)$")]
async fn then_total_saved(world: &mut TripWorld, expected: f64) {
    let total = world.trips().total_saved().await.expect("total saved");
    assert_close(total, expected, 1e-6);
}

#[then(regex = r"^the net impact is (-?[\d.]+)$")]
async fn then_net_impact(world: &mut TripWorld, expected: f64) {
    let net = world.trips().net_impact().await.expect("net impact");
    assert_close(net, expected, 1e-6);
}

#[then(regex = r"^the average eco-score is about ([\d.]+)$")]
async fn then_average_eco_score(world: &mut TripWorld, expected: f64) {
    let avg = world.trips().average_eco_score().await.expect("average");
    assert_close(avg, expected, 0.05);
}

#[then(regex = r"^there are (\d+) pending and (\d+) completed trips$")]
async fn then_status_counts(world: &mut TripWorld, pending: i64, completed: i64) {
    let counts = world.trips().status_counts().await.expect("counts");
    assert_eq!((counts.pending, counts.completed), (pending, completed));
}

#[then(regex = r"^the refresh completed (\d+) trips?$")]
async fn then_refreshed(world: &mut TripWorld, expected: u64) {
    assert_eq!(world.refreshed, Some(expected));
}

#[then(regex = r"^emissions by mode lists (\d+) modes?$")]
async fn then_modes(world: &mut TripWorld, expected: usize) {
    let modes = world.trips().emissions_by_mode().await.expect("by mode");
    assert_eq!(modes.len(), expected);
}

#[then(regex = r"^the eco-score series has (\d+) points? in date order$")]
async fn then_series(world: &mut TripWorld, expected: usize) {
    let series = world.trips().eco_score_series().await.expect("series");
    assert_eq!(series.len(), expected);
    assert!(series
        .windows(2)
        .all(|pair| pair[0].visit_date < pair[1].visit_date));
}

#[then("no locations have been visited")]
async fn then_no_locations(world: &mut TripWorld) {
    let ranked = world
        .trips()
        .location_visit_counts(None)
        .await
        .expect("locations");
    assert!(ranked.is_empty());
}

#[then(regex = r#"^the most visited location is "([^"]+)" with (\d+) visits?$"#)]
async fn then_top_location(world: &mut TripWorld, location: String, visits: i64) {
    let ranked = world
        .trips()
        .location_visit_counts(Some(1))
        .await
        .expect("locations");
    let top = ranked.first().expect("at least one location");
    assert_eq!((top.location.as_str(), top.visits), (location.as_str(), visits));
}

#[tokio::main]
async fn main() {
    TripWorld::cucumber()
        .fail_on_skipped()
        .with_default_cli()
        .run("tests/features")
        .await;
}
