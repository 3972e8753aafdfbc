use super::{conflicts, util, FleetError, NewTrip, TripUpdate};
use crate::model::{CompanyId, ResourceId, ResourceKind, Trip, TripId, TripStatus, Window};
use crate::store::{CommitmentStore, TripWriter};

/// Réserve un trajet si chauffeur et véhicule sont libres.
///
/// Vérification et insertion se font sous le même emprunt `&mut` du stockage :
/// aucun autre appelant ne peut écrire entre les deux.
pub fn reserve<S: TripWriter + ?Sized>(
    store: &mut S,
    request: NewTrip,
) -> Result<Trip, FleetError> {
    let window = Window {
        start: request.start,
        end: request.end,
    };
    util::ensure_trip_window(&window)?;
    ensure_company(&*store, &request.company)?;
    ensure_resource(&*store, ResourceKind::Driver, &request.driver)?;
    ensure_resource(&*store, ResourceKind::Vehicle, &request.vehicle)?;

    let mut trip = Trip::new(request.company, request.driver, request.vehicle, window)
        .map_err(|_| FleetError::InvalidWindow("trip end must be strictly after start"))?;
    trip.status = request.status;

    if trip.is_blocking() {
        ensure_free(&*store, &trip, None)?;
    }

    store.insert_trip(trip.clone())?;
    tracing::info!(
        trip = %trip.id,
        driver = %trip.driver,
        vehicle = %trip.vehicle,
        window = %trip.window,
        "trip booked"
    );
    Ok(trip)
}

/// Modifie chauffeur, véhicule et/ou fenêtre d'un trajet en revérifiant les
/// conflits, le trajet lui-même exclu.
pub fn update<S: TripWriter + ?Sized>(
    store: &mut S,
    id: &TripId,
    changes: TripUpdate,
) -> Result<Trip, FleetError> {
    let mut trip = store
        .get_trip(id)?
        .ok_or_else(|| FleetError::UnknownTrip(id.clone()))?;

    if let Some(window) = changes.window {
        util::ensure_trip_window(&window)?;
        trip.window = window;
    }
    if let Some(driver) = changes.driver {
        ensure_resource(&*store, ResourceKind::Driver, &driver)?;
        trip.driver = driver;
    }
    if let Some(vehicle) = changes.vehicle {
        ensure_resource(&*store, ResourceKind::Vehicle, &vehicle)?;
        trip.vehicle = vehicle;
    }

    if trip.is_blocking() {
        ensure_free(&*store, &trip, Some(id))?;
    }

    store.replace_trip(trip.clone())?;
    tracing::info!(trip = %trip.id, window = %trip.window, "trip updated");
    Ok(trip)
}

/// Applique une transition de cycle de vie.
pub fn transition<S: TripWriter + ?Sized>(
    store: &mut S,
    id: &TripId,
    next: TripStatus,
) -> Result<Trip, FleetError> {
    let mut trip = store
        .get_trip(id)?
        .ok_or_else(|| FleetError::UnknownTrip(id.clone()))?;

    if !trip.status.can_transition_to(next) {
        return Err(FleetError::InvalidTransition {
            from: trip.status,
            to: next,
        });
    }

    let previous = trip.status;
    trip.status = next;
    store.replace_trip(trip.clone())?;
    tracing::info!(trip = %trip.id, from = %previous, to = %next, "trip status changed");
    Ok(trip)
}

pub fn remove<S: TripWriter + ?Sized>(store: &mut S, id: &TripId) -> Result<Trip, FleetError> {
    if store.get_trip(id)?.is_none() {
        return Err(FleetError::UnknownTrip(id.clone()));
    }
    let trip = store.delete_trip(id)?;
    tracing::info!(trip = %trip.id, "trip removed");
    Ok(trip)
}

fn ensure_free<S: CommitmentStore + ?Sized>(
    store: &S,
    trip: &Trip,
    exclude: Option<&TripId>,
) -> Result<(), FleetError> {
    for kind in ResourceKind::ALL {
        let resource = trip.resource(kind);
        let found = conflicts::conflicting_trips(store, kind, resource, &trip.window, exclude)?;
        if let Some(existing) = found.into_iter().next() {
            tracing::warn!(
                %kind,
                %resource,
                existing = %existing.id,
                window = %trip.window,
                "booking rejected"
            );
            return Err(FleetError::Conflict {
                kind,
                resource: resource.clone(),
                trip: existing.id,
            });
        }
    }
    Ok(())
}

fn ensure_resource<S: CommitmentStore + ?Sized>(
    store: &S,
    kind: ResourceKind,
    id: &ResourceId,
) -> Result<(), FleetError> {
    if !store.contains_resource(kind, id)? {
        return Err(FleetError::UnknownResource {
            kind,
            id: id.clone(),
        });
    }
    Ok(())
}

fn ensure_company<S: CommitmentStore + ?Sized>(
    store: &S,
    id: &CompanyId,
) -> Result<(), FleetError> {
    if !store.contains_company(id)? {
        return Err(FleetError::UnknownCompany(id.clone()));
    }
    Ok(())
}
