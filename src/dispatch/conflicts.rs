use super::{util, Conflict, FleetError};
use crate::model::{Fleet, ResourceId, ResourceKind, Trip, TripId, Window};
use crate::store::{CommitmentStore, TripQuery};
use std::collections::HashMap;

/// Trajets bloquants de `resource` chevauchant `window`, hors `exclude`.
pub fn conflicting_trips<S: CommitmentStore + ?Sized>(
    store: &S,
    kind: ResourceKind,
    resource: &ResourceId,
    window: &Window,
    exclude: Option<&TripId>,
) -> Result<Vec<Trip>, FleetError> {
    util::ensure_window(window)?;
    let query = TripQuery::blocking(*window).for_resource(kind, resource);
    let mut trips = store.find_trips(&query)?;
    trips.retain(|t| {
        exclude.map_or(true, |x| &t.id != x)
            && t.is_blocking()
            && t.resource(kind) == resource
            && util::overlaps(&t.window, window)
    });
    trips.sort_by_key(|t| t.window.start);
    Ok(trips)
}

/// Vrai si `resource` a au moins un trajet scheduled/active chevauchant `window`.
pub fn has_conflict<S: CommitmentStore + ?Sized>(
    store: &S,
    kind: ResourceKind,
    resource: &ResourceId,
    window: &Window,
    exclude: Option<&TripId>,
) -> Result<bool, FleetError> {
    let found = conflicting_trips(store, kind, resource, window, exclude)?;
    tracing::debug!(%kind, %resource, %window, conflicts = found.len(), "conflict check");
    Ok(!found.is_empty())
}

/// Audit : toutes les paires de trajets bloquants qui occupent la même ressource
/// sur des fenêtres qui se chevauchent.
pub fn detect_conflicts(fleet: &Fleet) -> Vec<Conflict> {
    let mut out = Vec::new();

    for kind in ResourceKind::ALL {
        let mut by_resource: HashMap<&ResourceId, Vec<&Trip>> = HashMap::new();
        for trip in fleet.trips.iter().filter(|t| t.is_blocking()) {
            by_resource.entry(trip.resource(kind)).or_default().push(trip);
        }

        let mut resources: Vec<_> = by_resource.into_iter().collect();
        resources.sort_by(|a, b| a.0.cmp(b.0));

        for (resource, mut trips) in resources {
            trips.sort_by_key(|t| t.window.start);
            for (idx, a) in trips.iter().enumerate() {
                // triés par début : dès qu'un b commence après la fin de a, les suivants aussi
                for b in trips.iter().skip(idx + 1) {
                    if b.window.start > a.window.end {
                        break;
                    }
                    out.push(Conflict {
                        kind,
                        resource: resource.clone(),
                        trip_a: a.id.clone(),
                        trip_b: b.id.clone(),
                    });
                }
            }
        }
    }

    out
}
