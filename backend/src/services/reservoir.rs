//! Reservoir registry service
//!
//! In-memory store of monitored reservoirs, seeded with the Kenyan pilot sites.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::{
    validate_new_reservoir, validate_reservoir_update, Coordinates, CreateReservoirInput,
    Reservoir, ReservoirFilter, ReservoirStatus, UpdateReservoirInput,
};
use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};

/// Read access to reservoirs for the prediction pipeline
#[async_trait]
pub trait ReservoirRepository: Send + Sync {
    async fn get(&self, id: u64) -> Option<Reservoir>;
}

/// Reservoir registry service
#[derive(Clone, Default)]
pub struct ReservoirService {
    store: Arc<RwLock<BTreeMap<u64, Reservoir>>>,
}

impl ReservoirService {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the given reservoirs
    pub fn with_reservoirs(reservoirs: impl IntoIterator<Item = Reservoir>) -> Self {
        let store = reservoirs.into_iter().map(|r| (r.id, r)).collect();
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }

    /// Create a registry seeded with the pilot sites
    pub fn seeded() -> Self {
        Self::with_reservoirs(seed_reservoirs())
    }

    /// List reservoirs matching the filter, ordered by id
    pub async fn list(&self, filter: &ReservoirFilter) -> Vec<Reservoir> {
        self.store
            .read()
            .await
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect()
    }

    pub async fn count(&self) -> usize {
        self.store.read().await.len()
    }

    /// Get a reservoir by ID
    pub async fn get_by_id(&self, id: u64) -> AppResult<Reservoir> {
        self.store
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(AppError::NotFound("Reservoir"))
    }

    /// Register a new reservoir under the next free ID
    pub async fn create(&self, input: CreateReservoirInput) -> AppResult<Reservoir> {
        let new_reservoir = validate_new_reservoir(input)?;

        let mut store = self.store.write().await;
        let id = store.keys().next_back().map_or(1, |max| max + 1);
        let reservoir = new_reservoir.into_reservoir(id, today());
        store.insert(id, reservoir.clone());

        tracing::info!(
            reservoir_id = id,
            status = %reservoir.status,
            "Reservoir registered"
        );

        Ok(reservoir)
    }

    /// Apply a partial update
    pub async fn update(&self, id: u64, input: UpdateReservoirInput) -> AppResult<Reservoir> {
        validate_reservoir_update(&input)?;

        let mut store = self.store.write().await;
        let reservoir = store.get_mut(&id).ok_or(AppError::NotFound("Reservoir"))?;
        input.apply(reservoir, today());

        tracing::info!(
            reservoir_id = id,
            current_level = reservoir.current_level,
            status = %reservoir.status,
            "Reservoir updated"
        );

        Ok(reservoir.clone())
    }

    /// Remove a reservoir, returning the removed record
    pub async fn delete(&self, id: u64) -> AppResult<Reservoir> {
        let removed = self
            .store
            .write()
            .await
            .remove(&id)
            .ok_or(AppError::NotFound("Reservoir"))?;

        tracing::info!(reservoir_id = id, "Reservoir deleted");
        Ok(removed)
    }
}

#[async_trait]
impl ReservoirRepository for ReservoirService {
    async fn get(&self, id: u64) -> Option<Reservoir> {
        self.store.read().await.get(&id).cloned()
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// (id, name, location, capacity, level, lat, lng, runout)
type SeedRow = (u64, &'static str, &'static str, f64, f64, i64, i64, (i32, u32, u32));

const SEED: [SeedRow; 8] = [
    (1, "Nairobi Central Water Reserve", "Nairobi, Kenya", 85.0, 72.0, -12921, 368219, (2024, 12, 15)),
    (2, "Mombasa Coastal Reservoir", "Mombasa, Kenya", 100.0, 45.0, -40435, 396682, (2024, 10, 20)),
    (3, "Kisumu Lake Victoria Reserve", "Kisumu, Kenya", 95.0, 88.0, -917, 347680, (2025, 2, 10)),
    (4, "Nakuru Rift Valley Reservoir", "Nakuru, Kenya", 90.0, 32.0, -3031, 360800, (2024, 9, 15)),
    (5, "Eldoret Highland Water Point", "Eldoret, Kenya", 80.0, 67.0, 5143, 352698, (2024, 11, 25)),
    (6, "Malindi Coastal Reserve", "Malindi, Kenya", 75.0, 91.0, -32194, 401169, (2025, 3, 20)),
    (7, "Machakos Eastern Reserve", "Machakos, Kenya", 70.0, 55.0, -15177, 372634, (2024, 11, 10)),
    (8, "Kitale Trans-Nzoia Water Point", "Kitale, Kenya", 85.0, 78.0, 10157, 350062, (2025, 1, 15)),
];

/// Pilot reservoirs as last surveyed
pub fn seed_reservoirs() -> Vec<Reservoir> {
    let surveyed = NaiveDate::from_ymd_opt(2024, 8, 30).unwrap_or(NaiveDate::MIN);

    SEED.iter()
        .map(|&(id, name, location, capacity, level, lat, lng, (y, m, d))| Reservoir {
            id,
            name: name.to_string(),
            location: location.to_string(),
            capacity,
            current_level: level,
            last_updated: surveyed,
            coordinates: Coordinates::new(Decimal::new(lat, 4), Decimal::new(lng, 4)),
            estimated_runout: NaiveDate::from_ymd_opt(y, m, d).unwrap_or(surveyed),
            status: ReservoirStatus::from_level(level),
        })
        .collect()
}
