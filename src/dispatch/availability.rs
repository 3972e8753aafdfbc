use super::{util, FleetError};
use crate::model::{CompanyId, ResourceId, ResourceKind, Window};
use crate::store::{CommitmentStore, TripQuery};
use std::collections::HashSet;

/// Ressources occupées par au moins un trajet bloquant chevauchant `window`.
///
/// Calculé sur toute la flotte : le filtre société ne s'applique pas ici.
pub fn busy_resources<S: CommitmentStore + ?Sized>(
    store: &S,
    kind: ResourceKind,
    window: &Window,
) -> Result<HashSet<ResourceId>, FleetError> {
    util::ensure_window(window)?;
    let trips = store.find_trips(&TripQuery::blocking(*window))?;
    Ok(trips
        .into_iter()
        .filter(|t| t.is_blocking() && util::overlaps(&t.window, window))
        .map(|t| match kind {
            ResourceKind::Driver => t.driver,
            ResourceKind::Vehicle => t.vehicle,
        })
        .collect())
}

/// Ressources libres sur `window` : toutes les ressources (éventuellement
/// limitées à `company`) moins l'ensemble occupé. L'ordre du stockage est conservé.
pub fn available_resources<S: CommitmentStore + ?Sized>(
    store: &S,
    kind: ResourceKind,
    window: &Window,
    company: Option<&CompanyId>,
) -> Result<Vec<ResourceId>, FleetError> {
    let busy = busy_resources(store, kind, window)?;
    let all = store.list_resources(kind, company)?;
    let total = all.len();
    let available: Vec<ResourceId> = all.into_iter().filter(|id| !busy.contains(id)).collect();
    tracing::debug!(
        %kind,
        %window,
        busy = busy.len(),
        total,
        available = available.len(),
        "availability resolved"
    );
    Ok(available)
}
