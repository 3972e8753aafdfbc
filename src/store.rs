//! Accès aux trajets et ressources pour le moteur de conflits.
//!
//! Le moteur ne connaît le stockage qu'au travers de [`CommitmentStore`] ;
//! [`Fleet`] en fournit l'implémentation en mémoire.

use crate::model::{CompanyId, Fleet, ResourceId, ResourceKind, Trip, TripId, TripStatus, Window};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("duplicate trip id: {0}")]
    DuplicateTrip(TripId),
    #[error("no such trip in store: {0}")]
    MissingTrip(TripId),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Critères de recherche de trajets.
///
/// Un trajet correspond si son statut est dans `statuses`, si sa fenêtre
/// chevauche `window` (bornes incluses), et si les filtres optionnels de
/// ressource et de société sont respectés.
#[derive(Debug, Clone)]
pub struct TripQuery<'a> {
    pub window: Window,
    pub statuses: &'a [TripStatus],
    pub resource: Option<(ResourceKind, &'a ResourceId)>,
    pub company: Option<&'a CompanyId>,
}

impl<'a> TripQuery<'a> {
    /// Trajets bloquants (scheduled/active) chevauchant `window`.
    pub fn blocking(window: Window) -> Self {
        Self {
            window,
            statuses: &TripStatus::BLOCKING,
            resource: None,
            company: None,
        }
    }

    pub fn for_resource(mut self, kind: ResourceKind, id: &'a ResourceId) -> Self {
        self.resource = Some((kind, id));
        self
    }

    pub fn for_company(mut self, company: &'a CompanyId) -> Self {
        self.company = Some(company);
        self
    }

    pub fn matches(&self, trip: &Trip) -> bool {
        if !self.statuses.contains(&trip.status) {
            return false;
        }
        if let Some((kind, id)) = self.resource {
            if trip.resource(kind) != id {
                return false;
            }
        }
        if let Some(company) = self.company {
            if &trip.company != company {
                return false;
            }
        }
        trip.window.overlaps(&self.window)
    }
}

/// Capacité de lecture minimale attendue du stockage des trajets.
pub trait CommitmentStore {
    /// Liste les trajets correspondant à `query`.
    fn find_trips(&self, query: &TripQuery<'_>) -> Result<Vec<Trip>, StoreError>;

    /// Liste les ressources d'un type, éventuellement limitées à une société.
    fn list_resources(
        &self,
        kind: ResourceKind,
        company: Option<&CompanyId>,
    ) -> Result<Vec<ResourceId>, StoreError>;

    fn get_trip(&self, id: &TripId) -> Result<Option<Trip>, StoreError>;

    /// Trajets ayant l'un des statuts donnés, sans filtre de fenêtre.
    fn list_trips(&self, statuses: &[TripStatus]) -> Result<Vec<Trip>, StoreError>;

    fn contains_resource(&self, kind: ResourceKind, id: &ResourceId) -> Result<bool, StoreError> {
        Ok(self.list_resources(kind, None)?.iter().any(|r| r == id))
    }

    fn contains_company(&self, id: &CompanyId) -> Result<bool, StoreError>;
}

/// Écriture des trajets. Prise par `&mut`, elle sérialise vérification et
/// écriture dans le même emprunt exclusif.
pub trait TripWriter: CommitmentStore {
    fn insert_trip(&mut self, trip: Trip) -> Result<(), StoreError>;
    fn replace_trip(&mut self, trip: Trip) -> Result<(), StoreError>;
    fn delete_trip(&mut self, id: &TripId) -> Result<Trip, StoreError>;
}

impl CommitmentStore for Fleet {
    fn find_trips(&self, query: &TripQuery<'_>) -> Result<Vec<Trip>, StoreError> {
        Ok(self
            .trips
            .iter()
            .filter(|t| query.matches(t))
            .cloned()
            .collect())
    }

    fn list_resources(
        &self,
        kind: ResourceKind,
        company: Option<&CompanyId>,
    ) -> Result<Vec<ResourceId>, StoreError> {
        let in_scope = |owner: &CompanyId| company.map_or(true, |c| c == owner);
        let ids: Vec<ResourceId> = match kind {
            ResourceKind::Driver => self
                .drivers
                .iter()
                .filter(|d| in_scope(&d.company))
                .map(|d| d.id.clone())
                .collect(),
            ResourceKind::Vehicle => self
                .vehicles
                .iter()
                .filter(|v| in_scope(&v.company))
                .map(|v| v.id.clone())
                .collect(),
        };
        Ok(ids)
    }

    fn get_trip(&self, id: &TripId) -> Result<Option<Trip>, StoreError> {
        Ok(self.find_trip(id).cloned())
    }

    fn list_trips(&self, statuses: &[TripStatus]) -> Result<Vec<Trip>, StoreError> {
        Ok(self
            .trips
            .iter()
            .filter(|t| statuses.contains(&t.status))
            .cloned()
            .collect())
    }

    fn contains_resource(&self, kind: ResourceKind, id: &ResourceId) -> Result<bool, StoreError> {
        Ok(self.resource_company(kind, id).is_some())
    }

    fn contains_company(&self, id: &CompanyId) -> Result<bool, StoreError> {
        Ok(self.find_company(id).is_some())
    }
}

impl TripWriter for Fleet {
    fn insert_trip(&mut self, trip: Trip) -> Result<(), StoreError> {
        if self.find_trip(&trip.id).is_some() {
            return Err(StoreError::DuplicateTrip(trip.id));
        }
        self.trips.push(trip);
        Ok(())
    }

    fn replace_trip(&mut self, trip: Trip) -> Result<(), StoreError> {
        let slot = self
            .find_trip_mut(&trip.id)
            .ok_or_else(|| StoreError::MissingTrip(trip.id.clone()))?;
        *slot = trip;
        Ok(())
    }

    fn delete_trip(&mut self, id: &TripId) -> Result<Trip, StoreError> {
        let pos = self
            .trips
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(|| StoreError::MissingTrip(id.clone()))?;
        Ok(self.trips.remove(pos))
    }
}
