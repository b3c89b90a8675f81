use crate::{
    config::AppConfig,
    db::DbPool,
    services::{store::TripStore, trips::TripService},
};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub trips: TripService,
}

impl AppState {
    pub fn new(config: AppConfig, db: DbPool) -> Self {
        let trips = TripService::new(TripStore::new(db));
        Self { config, trips }
    }
}
