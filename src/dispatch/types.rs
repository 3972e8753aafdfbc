use crate::model::{CompanyId, ResourceId, ResourceKind, TripId, TripStatus, Window};
use crate::store::StoreError;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Double réservation constatée entre deux trajets bloquants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub kind: ResourceKind,
    pub resource: ResourceId,
    pub trip_a: TripId,
    pub trip_b: TripId,
}

/// Demande de création de trajet.
#[derive(Debug, Clone)]
pub struct NewTrip {
    pub company: CompanyId,
    pub driver: ResourceId,
    pub vehicle: ResourceId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: TripStatus,
}

impl NewTrip {
    pub fn new(
        company: CompanyId,
        driver: ResourceId,
        vehicle: ResourceId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            company,
            driver,
            vehicle,
            start,
            end,
            status: TripStatus::Scheduled,
        }
    }

    pub fn with_status(mut self, status: TripStatus) -> Self {
        self.status = status;
        self
    }
}

/// Modification partielle d'un trajet existant ; `None` conserve la valeur.
#[derive(Debug, Clone, Default)]
pub struct TripUpdate {
    pub driver: Option<ResourceId>,
    pub vehicle: Option<ResourceId>,
    pub window: Option<Window>,
}

#[derive(Error, Debug)]
pub enum FleetError {
    #[error("invalid window: {0}")]
    InvalidWindow(&'static str),
    #[error("unknown {kind}: {id}")]
    UnknownResource { kind: ResourceKind, id: ResourceId },
    #[error("unknown company: {0}")]
    UnknownCompany(CompanyId),
    #[error("unknown trip: {0}")]
    UnknownTrip(TripId),
    #[error("{kind} {resource} is already booked by trip {trip}")]
    Conflict {
        kind: ResourceKind,
        resource: ResourceId,
        trip: TripId,
    },
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition { from: TripStatus, to: TripStatus },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl FleetError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, FleetError::Conflict { .. })
    }
}
