#![forbid(unsafe_code)]
//! Flotte — moteur de réservation pour une flotte de chauffeurs et de véhicules.
//!
//! - Détection de chevauchements à bornes incluses (scheduled/active uniquement).
//! - Disponibilités par différence d'ensembles (toutes les ressources − occupées).
//! - Réservation atomique sous emprunt exclusif du stockage.
//! - Tout en UTC ; stockage fichiers (JSON/CSV).

pub mod dispatch;
pub mod io;
pub mod model;
pub mod stats;
pub mod storage;
pub mod store;

pub use dispatch::{
    available_resources, detect_conflicts, has_conflict, overlaps, reserve, Conflict, Dispatcher,
    FleetError, NewTrip, TripUpdate,
};
pub use model::{
    Company, CompanyId, Driver, Fleet, ResourceId, ResourceKind, Trip, TripId, TripStatus,
    Vehicle, VehicleType, Window,
};
pub use stats::{
    availability_stats, kpi_overview, percentage, AvailabilityStats, KpiCache, KpiOverview,
    StatsOptions,
};
pub use storage::{JsonStorage, Storage};
pub use store::{CommitmentStore, StoreError, TripQuery, TripWriter};
