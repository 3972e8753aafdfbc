mod availability;
mod conflicts;
mod mutate;
mod types;
mod util;

pub use availability::{available_resources, busy_resources};
pub use conflicts::{conflicting_trips, detect_conflicts, has_conflict};
pub use mutate::{remove, reserve, transition, update};
pub use types::{Conflict, FleetError, NewTrip, TripUpdate};
pub use util::overlaps;

use crate::model::{
    Company, CompanyId, Driver, Fleet, ResourceId, ResourceKind, Trip, TripId, TripStatus, Vehicle,
    VehicleType, Window,
};

/// Dispatcher : encapsule une Fleet et applique les règles de réservation
#[derive(Debug, Default)]
pub struct Dispatcher {
    fleet: Fleet,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            fleet: Fleet::default(),
        }
    }

    pub fn with_fleet(fleet: Fleet) -> Self {
        Self { fleet }
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub fn add_company(&mut self, name: &str) -> CompanyId {
        let company = Company::new(name);
        let id = company.id.clone();
        self.fleet.companies.push(company);
        id
    }

    pub fn add_driver(
        &mut self,
        company: &CompanyId,
        name: &str,
        phone: &str,
    ) -> Result<ResourceId, FleetError> {
        self.ensure_company(company)?;
        let driver = Driver::new(company.clone(), name, phone);
        let id = driver.id.clone();
        self.fleet.drivers.push(driver);
        Ok(id)
    }

    pub fn add_vehicle(
        &mut self,
        company: &CompanyId,
        plate_number: &str,
        vehicle_type: VehicleType,
    ) -> Result<ResourceId, FleetError> {
        self.ensure_company(company)?;
        let vehicle = Vehicle::new(company.clone(), plate_number, vehicle_type);
        let id = vehicle.id.clone();
        self.fleet.vehicles.push(vehicle);
        Ok(id)
    }

    fn ensure_company(&self, company: &CompanyId) -> Result<(), FleetError> {
        if self.fleet.find_company(company).is_none() {
            return Err(FleetError::UnknownCompany(company.clone()));
        }
        Ok(())
    }

    /// Réserve un trajet (vérification + écriture atomiques)
    pub fn book(&mut self, request: NewTrip) -> Result<TripId, FleetError> {
        reserve(&mut self.fleet, request).map(|t| t.id)
    }

    pub fn update(&mut self, id: &TripId, changes: TripUpdate) -> Result<&Trip, FleetError> {
        update(&mut self.fleet, id, changes)?;
        self.fleet
            .find_trip(id)
            .ok_or_else(|| FleetError::UnknownTrip(id.clone()))
    }

    pub fn transition(&mut self, id: &TripId, next: TripStatus) -> Result<(), FleetError> {
        transition(&mut self.fleet, id, next).map(|_| ())
    }

    pub fn remove_trip(&mut self, id: &TripId) -> Result<Trip, FleetError> {
        remove(&mut self.fleet, id)
    }

    pub fn has_conflict(
        &self,
        kind: ResourceKind,
        resource: &ResourceId,
        window: &Window,
        exclude: Option<&TripId>,
    ) -> Result<bool, FleetError> {
        has_conflict(&self.fleet, kind, resource, window, exclude)
    }

    pub fn available(
        &self,
        kind: ResourceKind,
        window: &Window,
        company: Option<&CompanyId>,
    ) -> Result<Vec<ResourceId>, FleetError> {
        available_resources(&self.fleet, kind, window, company)
    }

    pub fn detect_conflicts(&self) -> Vec<Conflict> {
        detect_conflicts(&self.fleet)
    }
}
