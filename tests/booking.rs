#![forbid(unsafe_code)]
use chrono::{DateTime, TimeZone, Utc};
use flotte::{
    CompanyId, Dispatcher, FleetError, JsonStorage, NewTrip, ResourceId, ResourceKind, Storage,
    Trip, TripId, TripStatus, TripUpdate, VehicleType, Window,
};
use tempfile::tempdir;

fn at(h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 1, h, 0, 0).unwrap()
}

fn w(start: u32, end: u32) -> Window {
    Window::new(at(start), at(end)).unwrap()
}

struct Setup {
    d: Dispatcher,
    company: CompanyId,
    drivers: [ResourceId; 2],
    vehicles: [ResourceId; 2],
}

fn setup() -> Setup {
    let mut d = Dispatcher::new();
    let company = d.add_company("City Express");
    let drivers = [
        d.add_driver(&company, "Ali", "01012345678").unwrap(),
        d.add_driver(&company, "Omar", "01112345678").unwrap(),
    ];
    let vehicles = [
        d.add_vehicle(&company, "ABC-1234", VehicleType::Bus).unwrap(),
        d.add_vehicle(&company, "XYZ-9876", VehicleType::Van).unwrap(),
    ];
    Setup {
        d,
        company,
        drivers,
        vehicles,
    }
}

impl Setup {
    fn request(&self, driver: usize, vehicle: usize, start: u32, end: u32) -> NewTrip {
        NewTrip::new(
            self.company.clone(),
            self.drivers[driver].clone(),
            self.vehicles[vehicle].clone(),
            at(start),
            at(end),
        )
    }
}

#[test]
fn book_creates_a_scheduled_trip() {
    let mut s = setup();
    let id = s.d.book(s.request(0, 0, 10, 12)).unwrap();
    let trip = s.d.fleet().find_trip(&id).unwrap();
    assert_eq!(trip.status, TripStatus::Scheduled);
    assert_eq!(trip.window, w(10, 12));
    assert_eq!(trip.driver, s.drivers[0]);
}

#[test]
fn booking_a_busy_driver_is_rejected() {
    let mut s = setup();
    let first = s.d.book(s.request(0, 0, 10, 12)).unwrap();
    let err = s.d.book(s.request(0, 1, 11, 13)).unwrap_err();
    match err {
        FleetError::Conflict {
            kind,
            resource,
            trip,
        } => {
            assert_eq!(kind, ResourceKind::Driver);
            assert_eq!(resource, s.drivers[0]);
            assert_eq!(trip, first);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(s.d.fleet().trips.len(), 1);
}

#[test]
fn booking_a_busy_vehicle_is_rejected() {
    let mut s = setup();
    s.d.book(s.request(0, 0, 10, 12)).unwrap();
    let err = s.d.book(s.request(1, 0, 12, 14)).unwrap_err();
    assert!(matches!(
        err,
        FleetError::Conflict {
            kind: ResourceKind::Vehicle,
            ..
        }
    ));
}

#[test]
fn disjoint_bookings_are_accepted() {
    let mut s = setup();
    s.d.book(s.request(0, 0, 10, 12)).unwrap();
    s.d.book(s.request(0, 0, 13, 15)).unwrap();
    s.d.book(s.request(1, 1, 10, 12)).unwrap();
    assert_eq!(s.d.fleet().trips.len(), 3);
    assert!(s.d.detect_conflicts().is_empty());
}

#[test]
fn invalid_requests_are_rejected() {
    let mut s = setup();
    let empty = s.d.book(s.request(0, 0, 10, 10)).unwrap_err();
    assert!(matches!(empty, FleetError::InvalidWindow(_)));
    let inverted = s.d.book(s.request(0, 0, 12, 10)).unwrap_err();
    assert!(matches!(inverted, FleetError::InvalidWindow(_)));

    let mut unknown_driver = s.request(0, 0, 10, 12);
    unknown_driver.driver = ResourceId::new("ghost");
    assert!(matches!(
        s.d.book(unknown_driver).unwrap_err(),
        FleetError::UnknownResource {
            kind: ResourceKind::Driver,
            ..
        }
    ));

    // un id de chauffeur n'est pas un id de véhicule
    let mut swapped = s.request(0, 0, 10, 12);
    swapped.vehicle = s.drivers[1].clone();
    assert!(matches!(
        s.d.book(swapped).unwrap_err(),
        FleetError::UnknownResource {
            kind: ResourceKind::Vehicle,
            ..
        }
    ));

    let mut unknown_company = s.request(0, 0, 10, 12);
    unknown_company.company = CompanyId::new("nope");
    assert!(matches!(
        s.d.book(unknown_company).unwrap_err(),
        FleetError::UnknownCompany(_)
    ));

    assert!(matches!(
        s.d.add_driver(&CompanyId::new("nope"), "X", "").unwrap_err(),
        FleetError::UnknownCompany(_)
    ));
    assert!(s.d.fleet().trips.is_empty());
}

#[test]
fn reschedule_excludes_the_trip_itself() {
    let mut s = setup();
    let id = s.d.book(s.request(0, 0, 10, 12)).unwrap();
    let moved = s
        .d
        .update(
            &id,
            TripUpdate {
                window: Some(w(11, 13)),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(moved.window, w(11, 13));

    s.d.book(s.request(0, 1, 15, 16)).unwrap();
    let err = s
        .d
        .update(
            &id,
            TripUpdate {
                window: Some(w(14, 15)),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(s.d.fleet().find_trip(&id).unwrap().window, w(11, 13));
}

#[test]
fn reassigning_a_driver_checks_the_new_driver() {
    let mut s = setup();
    let id = s.d.book(s.request(0, 0, 10, 12)).unwrap();
    s.d.book(s.request(1, 1, 11, 12)).unwrap();

    let err = s
        .d
        .update(
            &id,
            TripUpdate {
                driver: Some(s.drivers[1].clone()),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        FleetError::Conflict {
            kind: ResourceKind::Driver,
            ..
        }
    ));
    assert!(s.d.update(&TripId::new("missing"), TripUpdate::default()).is_err());
}

#[test]
fn lifecycle_transitions_are_enforced() {
    let mut s = setup();
    let id = s.d.book(s.request(0, 0, 10, 12)).unwrap();

    s.d.transition(&id, TripStatus::Active).unwrap();
    let back = s.d.transition(&id, TripStatus::Scheduled).unwrap_err();
    assert!(matches!(
        back,
        FleetError::InvalidTransition {
            from: TripStatus::Active,
            to: TripStatus::Scheduled
        }
    ));
    s.d.transition(&id, TripStatus::Completed).unwrap();
    assert!(s.d.transition(&id, TripStatus::Cancelled).is_err());

    // terminé : le créneau est de nouveau réservable
    s.d.book(s.request(0, 0, 11, 13)).unwrap();
}

#[test]
fn cancelled_or_removed_trips_free_their_resources() {
    let mut s = setup();
    let a = s.d.book(s.request(0, 0, 10, 12)).unwrap();
    s.d.transition(&a, TripStatus::Cancelled).unwrap();
    let b = s.d.book(s.request(0, 0, 10, 12)).unwrap();

    let removed = s.d.remove_trip(&b).unwrap();
    assert_eq!(removed.id, b);
    assert!(!s
        .d
        .has_conflict(ResourceKind::Driver, &s.drivers[0], &w(10, 12), None)
        .unwrap());
    assert!(matches!(
        s.d.remove_trip(&b).unwrap_err(),
        FleetError::UnknownTrip(_)
    ));
}

#[test]
fn json_storage_roundtrip() {
    let dir = tempdir().unwrap();
    let storage = JsonStorage::open(dir.path().join("fleet.json")).unwrap();
    assert!(storage.load_or_default().unwrap().trips.is_empty());

    let mut s = setup();
    let id = s.d.book(s.request(0, 0, 10, 12)).unwrap();
    storage.save(s.d.fleet()).unwrap();

    let loaded = Dispatcher::with_fleet(storage.load().unwrap());
    let trip = loaded.fleet().find_trip(&id).unwrap();
    assert_eq!(trip.window, w(10, 12));
    assert_eq!(loaded.fleet().drivers.len(), 2);
    assert!(loaded
        .has_conflict(ResourceKind::Vehicle, &s.vehicles[0], &w(12, 13), None)
        .unwrap());
}

#[test]
fn trip_requires_end_after_start() {
    let s = setup();
    let make = |window: Window| {
        Trip::new(
            s.company.clone(),
            s.drivers[0].clone(),
            s.vehicles[0].clone(),
            window,
        )
    };
    let inverted = Window {
        start: at(12),
        end: at(10),
    };
    assert!(make(inverted).is_err());
    assert!(make(Window::instant(at(10))).is_err());
    assert!(make(w(10, 12)).is_ok());
}

#[test]
fn json_storage_rejects_inverted_trips() {
    let dir = tempdir().unwrap();
    let storage = JsonStorage::open(dir.path().join("fleet.json")).unwrap();

    let s = setup();
    let mut fleet = s.d.fleet().clone();
    fleet.trips.push(Trip {
        id: TripId::new("t-inverted"),
        company: s.company.clone(),
        driver: s.drivers[0].clone(),
        vehicle: s.vehicles[0].clone(),
        window: Window {
            start: at(12),
            end: at(10),
        },
        status: TripStatus::Active,
    });
    storage.save(&fleet).unwrap();

    let err = storage.load().unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("t-inverted"), "{msg}");
    assert!(msg.contains("inverted"), "{msg}");
    assert!(storage.load_or_default().is_err());
}
