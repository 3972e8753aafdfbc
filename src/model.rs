use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

macro_rules! strong_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new<S: AsRef<str>>(s: S) -> Self {
                Self(s.as_ref().to_owned())
            }
            pub fn random() -> Self {
                Self(Uuid::new_v4().to_string())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

strong_id!(
    /// Identifiant fort pour Company
    CompanyId
);
strong_id!(
    /// Identifiant d'une ressource réservable (chauffeur ou véhicule).
    /// Unique sur toute la flotte, toutes sociétés confondues.
    ResourceId
);
strong_id!(
    /// Identifiant fort pour Trip
    TripId
);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown {what}: {value}")]
pub struct ParseEnumError {
    what: &'static str,
    value: String,
}

/// Les deux types de ressources réservables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Driver,
    Vehicle,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Driver, ResourceKind::Vehicle];

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Driver => "driver",
            ResourceKind::Vehicle => "vehicle",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "driver" | "drivers" => Ok(ResourceKind::Driver),
            "vehicle" | "vehicles" => Ok(ResourceKind::Vehicle),
            _ => Err(ParseEnumError {
                what: "resource kind",
                value: s.to_string(),
            }),
        }
    }
}

/// Statut d'un trajet. Seuls `Scheduled` et `Active` occupent leurs ressources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    #[default]
    Scheduled,
    Active,
    Completed,
    Cancelled,
}

impl TripStatus {
    /// Statuts pris en compte par la détection de conflits.
    pub const BLOCKING: [TripStatus; 2] = [TripStatus::Scheduled, TripStatus::Active];
    pub const ALL: [TripStatus; 4] = [
        TripStatus::Scheduled,
        TripStatus::Active,
        TripStatus::Completed,
        TripStatus::Cancelled,
    ];

    pub fn is_blocking(self) -> bool {
        match self {
            TripStatus::Scheduled | TripStatus::Active => true,
            TripStatus::Completed | TripStatus::Cancelled => false,
        }
    }

    /// Scheduled → Active → Completed ; Scheduled | Active → Cancelled.
    pub fn can_transition_to(self, next: TripStatus) -> bool {
        matches!(
            (self, next),
            (TripStatus::Scheduled, TripStatus::Active)
                | (TripStatus::Active, TripStatus::Completed)
                | (TripStatus::Scheduled, TripStatus::Cancelled)
                | (TripStatus::Active, TripStatus::Cancelled)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TripStatus::Scheduled => "scheduled",
            TripStatus::Active => "active",
            TripStatus::Completed => "completed",
            TripStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TripStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Ok(TripStatus::Scheduled),
            "active" => Ok(TripStatus::Active),
            "completed" => Ok(TripStatus::Completed),
            "cancelled" | "canceled" => Ok(TripStatus::Cancelled),
            _ => Err(ParseEnumError {
                what: "trip status",
                value: s.to_string(),
            }),
        }
    }
}

/// Fenêtre temporelle fermée `[start, end]` (UTC).
///
/// `start == end` est accepté (instant), `end < start` ne l'est pas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    /// Retourne `None` si la fenêtre est inversée.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn instant(at: DateTime<Utc>) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_instant(&self) -> bool {
        self.start == self.end
    }

    /// Chevauchement à bornes incluses : deux fenêtres qui se touchent
    /// (fin de l'une == début de l'autre) se chevauchent.
    pub fn overlaps(&self, other: &Window) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Durée en minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

/// Société propriétaire de chauffeurs et de véhicules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
}

impl Company {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            id: CompanyId::random(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    pub id: ResourceId,
    pub company: CompanyId,
    pub name: String,
    #[serde(default)]
    pub phone: String,
}

impl Driver {
    pub fn new<N: Into<String>, P: Into<String>>(company: CompanyId, name: N, phone: P) -> Self {
        Self {
            id: ResourceId::random(),
            company,
            name: name.into(),
            phone: phone.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    #[default]
    Car,
    Truck,
    Van,
    Bus,
}

impl VehicleType {
    pub fn as_str(self) -> &'static str {
        match self {
            VehicleType::Car => "car",
            VehicleType::Truck => "truck",
            VehicleType::Van => "van",
            VehicleType::Bus => "bus",
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "car" => Ok(VehicleType::Car),
            "truck" => Ok(VehicleType::Truck),
            "van" => Ok(VehicleType::Van),
            "bus" => Ok(VehicleType::Bus),
            _ => Err(ParseEnumError {
                what: "vehicle type",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: ResourceId,
    pub company: CompanyId,
    pub plate_number: String,
    #[serde(default, rename = "type")]
    pub vehicle_type: VehicleType,
}

impl Vehicle {
    pub fn new<P: Into<String>>(
        company: CompanyId,
        plate_number: P,
        vehicle_type: VehicleType,
    ) -> Self {
        Self {
            id: ResourceId::random(),
            company,
            plate_number: plate_number.into(),
            vehicle_type,
        }
    }
}

/// Trajet : un chauffeur et un véhicule occupés ensemble sur une fenêtre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    pub id: TripId,
    pub company: CompanyId,
    pub driver: ResourceId,
    pub vehicle: ResourceId,
    #[serde(flatten)]
    pub window: Window,
    #[serde(default)]
    pub status: TripStatus,
}

impl Trip {
    /// Crée un trajet `Scheduled` en validant que `end > start`.
    pub fn new(
        company: CompanyId,
        driver: ResourceId,
        vehicle: ResourceId,
        window: Window,
    ) -> Result<Self, String> {
        if window.end <= window.start {
            return Err("trip end must be strictly after start".to_string());
        }
        Ok(Self {
            id: TripId::random(),
            company,
            driver,
            vehicle,
            window,
            status: TripStatus::Scheduled,
        })
    }

    /// Ressource occupée par ce trajet pour le type donné.
    pub fn resource(&self, kind: ResourceKind) -> &ResourceId {
        match kind {
            ResourceKind::Driver => &self.driver,
            ResourceKind::Vehicle => &self.vehicle,
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.status.is_blocking()
    }
}

/// Flotte complète (données de toutes les sociétés)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Fleet {
    #[serde(default)]
    pub companies: Vec<Company>,
    #[serde(default)]
    pub drivers: Vec<Driver>,
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
    #[serde(default)]
    pub trips: Vec<Trip>,
}

impl Fleet {
    pub fn find_company(&self, id: &CompanyId) -> Option<&Company> {
        self.companies.iter().find(|c| &c.id == id)
    }
    pub fn find_driver(&self, id: &ResourceId) -> Option<&Driver> {
        self.drivers.iter().find(|d| &d.id == id)
    }
    pub fn find_vehicle(&self, id: &ResourceId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| &v.id == id)
    }
    pub fn find_trip(&self, id: &TripId) -> Option<&Trip> {
        self.trips.iter().find(|t| &t.id == id)
    }
    pub fn find_trip_mut(&mut self, id: &TripId) -> Option<&mut Trip> {
        self.trips.iter_mut().find(|t| &t.id == id)
    }

    /// Société propriétaire d'une ressource, si elle existe.
    pub fn resource_company(&self, kind: ResourceKind, id: &ResourceId) -> Option<&CompanyId> {
        match kind {
            ResourceKind::Driver => self.find_driver(id).map(|d| &d.company),
            ResourceKind::Vehicle => self.find_vehicle(id).map(|v| &v.company),
        }
    }

    /// Libellé lisible : nom du chauffeur ou plaque du véhicule.
    pub fn resource_label(&self, kind: ResourceKind, id: &ResourceId) -> Option<&str> {
        match kind {
            ResourceKind::Driver => self.find_driver(id).map(|d| d.name.as_str()),
            ResourceKind::Vehicle => self.find_vehicle(id).map(|v| v.plate_number.as_str()),
        }
    }
}
