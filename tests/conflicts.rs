#![forbid(unsafe_code)]
use chrono::{DateTime, TimeZone, Utc};
use flotte::model::{Company, Driver, Vehicle, VehicleType};
use flotte::store::{CommitmentStore, StoreError, TripQuery};
use flotte::{
    detect_conflicts, has_conflict, kpi_overview, CompanyId, Fleet, FleetError, ResourceId,
    ResourceKind, Trip, TripId, TripStatus, Window,
};

fn at(h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 1, h, 0, 0).unwrap()
}

fn w(start: u32, end: u32) -> Window {
    Window::new(at(start), at(end)).unwrap()
}

struct Setup {
    fleet: Fleet,
    company: CompanyId,
    drivers: Vec<ResourceId>,
    vehicles: Vec<ResourceId>,
}

fn setup() -> Setup {
    let mut fleet = Fleet::default();
    let company = Company::new("Delta Transport");
    let cid = company.id.clone();
    fleet.companies.push(company);
    for name in ["Ali", "Omar"] {
        fleet.drivers.push(Driver::new(cid.clone(), name, "01000000000"));
    }
    for plate in ["ABC-1234", "XYZ-9876"] {
        fleet.vehicles.push(Vehicle::new(cid.clone(), plate, VehicleType::Van));
    }
    let drivers = fleet.drivers.iter().map(|d| d.id.clone()).collect();
    let vehicles = fleet.vehicles.iter().map(|v| v.id.clone()).collect();
    Setup {
        fleet,
        company: cid,
        drivers,
        vehicles,
    }
}

fn push_trip(
    s: &mut Setup,
    driver: usize,
    vehicle: usize,
    window: Window,
    status: TripStatus,
) -> TripId {
    let mut trip = Trip::new(
        s.company.clone(),
        s.drivers[driver].clone(),
        s.vehicles[vehicle].clone(),
        window,
    )
    .unwrap();
    trip.status = status;
    let id = trip.id.clone();
    s.fleet.trips.push(trip);
    id
}

#[test]
fn driver_scenario_through_lifecycle() {
    let mut s = setup();
    let trip = push_trip(&mut s, 0, 0, w(10, 12), TripStatus::Scheduled);
    let d = s.drivers[0].clone();

    assert!(has_conflict(&s.fleet, ResourceKind::Driver, &d, &w(11, 13), None).unwrap());
    assert!(!has_conflict(&s.fleet, ResourceKind::Driver, &d, &w(13, 15), None).unwrap());

    s.fleet.find_trip_mut(&trip).unwrap().status = TripStatus::Completed;
    assert!(!has_conflict(&s.fleet, ResourceKind::Driver, &d, &w(11, 13), None).unwrap());
}

#[test]
fn vehicle_overlap_is_detected() {
    let mut s = setup();
    push_trip(&mut s, 0, 1, w(14, 16), TripStatus::Active);
    let v = s.vehicles[1].clone();
    assert!(has_conflict(&s.fleet, ResourceKind::Vehicle, &v, &w(15, 17), None).unwrap());
    // l'autre véhicule reste libre
    let other = s.vehicles[0].clone();
    assert!(!has_conflict(&s.fleet, ResourceKind::Vehicle, &other, &w(15, 17), None).unwrap());
}

#[test]
fn back_to_back_trips_conflict() {
    let mut s = setup();
    push_trip(&mut s, 0, 0, w(10, 12), TripStatus::Scheduled);
    let d = s.drivers[0].clone();
    assert!(has_conflict(&s.fleet, ResourceKind::Driver, &d, &w(12, 13), None).unwrap());
}

#[test]
fn completed_and_cancelled_trips_do_not_block() {
    let mut s = setup();
    push_trip(&mut s, 0, 0, w(10, 12), TripStatus::Completed);
    push_trip(&mut s, 0, 0, w(10, 12), TripStatus::Cancelled);
    let d = s.drivers[0].clone();
    let v = s.vehicles[0].clone();
    assert!(!has_conflict(&s.fleet, ResourceKind::Driver, &d, &w(11, 13), None).unwrap());
    assert!(!has_conflict(&s.fleet, ResourceKind::Vehicle, &v, &w(11, 13), None).unwrap());
}

#[test]
fn excluded_trip_is_ignored() {
    let mut s = setup();
    let trip = push_trip(&mut s, 0, 0, w(10, 12), TripStatus::Scheduled);
    let d = s.drivers[0].clone();
    assert!(!has_conflict(&s.fleet, ResourceKind::Driver, &d, &w(11, 13), Some(&trip)).unwrap());

    let other = push_trip(&mut s, 0, 1, w(12, 14), TripStatus::Scheduled);
    assert!(has_conflict(&s.fleet, ResourceKind::Driver, &d, &w(11, 13), Some(&trip)).unwrap());
    assert!(has_conflict(&s.fleet, ResourceKind::Driver, &d, &w(11, 13), Some(&other)).unwrap());
}

#[test]
fn inverted_window_is_an_error() {
    let s = setup();
    let inverted = Window {
        start: at(12),
        end: at(10),
    };
    let err = has_conflict(&s.fleet, ResourceKind::Driver, &s.drivers[0], &inverted, None)
        .unwrap_err();
    assert!(matches!(err, FleetError::InvalidWindow(_)));
}

struct DownStore;

impl CommitmentStore for DownStore {
    fn find_trips(&self, _query: &TripQuery<'_>) -> Result<Vec<Trip>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
    fn list_resources(
        &self,
        _kind: ResourceKind,
        _company: Option<&CompanyId>,
    ) -> Result<Vec<ResourceId>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
    fn get_trip(&self, _id: &TripId) -> Result<Option<Trip>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
    fn list_trips(&self, _statuses: &[TripStatus]) -> Result<Vec<Trip>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
    fn contains_company(&self, _id: &CompanyId) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

#[test]
fn store_failures_propagate() {
    let err = has_conflict(
        &DownStore,
        ResourceKind::Driver,
        &ResourceId::new("d-1"),
        &w(10, 12),
        None,
    )
    .unwrap_err();
    assert!(matches!(err, FleetError::Store(StoreError::Unavailable(_))));
}

#[test]
fn dashboard_reads_through_the_store() {
    let err = kpi_overview(&DownStore, at(10)).unwrap_err();
    assert!(matches!(err, FleetError::Store(StoreError::Unavailable(_))));
}

#[test]
fn audit_reports_double_bookings() {
    let mut s = setup();
    let a = push_trip(&mut s, 0, 0, w(8, 10), TripStatus::Scheduled);
    let b = push_trip(&mut s, 0, 1, w(10, 11), TripStatus::Active);
    push_trip(&mut s, 0, 1, w(9, 12), TripStatus::Completed);
    push_trip(&mut s, 1, 0, w(14, 15), TripStatus::Scheduled);

    let conflicts = detect_conflicts(&s.fleet);
    assert_eq!(conflicts.len(), 1);
    let c = &conflicts[0];
    assert_eq!(c.kind, ResourceKind::Driver);
    assert_eq!(c.resource, s.drivers[0]);
    assert_eq!((&c.trip_a, &c.trip_b), (&a, &b));
}

#[test]
fn audit_is_clean_for_disjoint_trips() {
    let mut s = setup();
    push_trip(&mut s, 0, 0, w(8, 10), TripStatus::Scheduled);
    push_trip(&mut s, 0, 0, w(11, 12), TripStatus::Scheduled);
    push_trip(&mut s, 1, 1, w(8, 12), TripStatus::Active);
    assert!(detect_conflicts(&s.fleet).is_empty());
}

#[test]
fn store_query_filters_by_company_and_status() {
    let mut s = setup();
    push_trip(&mut s, 0, 0, w(10, 12), TripStatus::Scheduled);
    push_trip(&mut s, 1, 1, w(10, 12), TripStatus::Completed);
    let elsewhere = CompanyId::new("other");

    let query = TripQuery::blocking(w(11, 11));
    assert_eq!(s.fleet.find_trips(&query).unwrap().len(), 1);
    let scoped = TripQuery::blocking(w(11, 11)).for_company(&s.company);
    assert_eq!(s.fleet.find_trips(&scoped).unwrap().len(), 1);
    let foreign = TripQuery::blocking(w(11, 11)).for_company(&elsewhere);
    assert!(s.fleet.find_trips(&foreign).unwrap().is_empty());
}
