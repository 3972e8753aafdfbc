//! Indicateurs de disponibilité et tableau de bord (KPI).

use crate::dispatch::{available_resources, FleetError};
use crate::model::{CompanyId, ResourceKind, Trip, TripStatus, Window};
use crate::store::CommitmentStore;
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};
use std::fmt;

/// Pourcentage arrondi à l'entier le plus proche ; 0 si `total == 0`.
pub fn percentage(available: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (available as f64 / total as f64 * 100.0).round() as u32
}

/// Disponibilité des chauffeurs et véhicules sur une fenêtre.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityStats {
    pub window: Window,
    pub available_drivers: usize,
    pub total_drivers: usize,
    pub available_vehicles: usize,
    pub total_vehicles: usize,
    pub drivers_percentage: u32,
    pub vehicles_percentage: u32,
}

pub fn availability_stats<S: CommitmentStore + ?Sized>(
    store: &S,
    window: &Window,
    company: Option<&CompanyId>,
) -> Result<AvailabilityStats, FleetError> {
    let available_drivers =
        available_resources(store, ResourceKind::Driver, window, company)?.len();
    let available_vehicles =
        available_resources(store, ResourceKind::Vehicle, window, company)?.len();
    let total_drivers = store.list_resources(ResourceKind::Driver, company)?.len();
    let total_vehicles = store.list_resources(ResourceKind::Vehicle, company)?.len();

    Ok(AvailabilityStats {
        window: *window,
        available_drivers,
        total_drivers,
        available_vehicles,
        total_vehicles,
        drivers_percentage: percentage(available_drivers, total_drivers),
        vehicles_percentage: percentage(available_vehicles, total_vehicles),
    })
}

impl fmt::Display for AvailabilityStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "window: {}", self.window)?;
        writeln!(
            f,
            "drivers: {}/{} ({}%)",
            self.available_drivers, self.total_drivers, self.drivers_percentage
        )?;
        write!(
            f,
            "vehicles: {}/{} ({}%)",
            self.available_vehicles, self.total_vehicles, self.vehicles_percentage
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Increase,
    Decrease,
    Same,
}

impl Trend {
    fn from_difference(diff: i64) -> Self {
        match diff {
            d if d > 0 => Trend::Increase,
            d if d < 0 => Trend::Decrease,
            _ => Trend::Same,
        }
    }
}

/// Niveau global de disponibilité : ≥ 70 % bon, ≥ 40 % à surveiller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityLevel {
    Good,
    Warning,
    Critical,
}

impl AvailabilityLevel {
    pub fn from_percentage(pct: u32) -> Self {
        if pct >= 70 {
            AvailabilityLevel::Good
        } else if pct >= 40 {
            AvailabilityLevel::Warning
        } else {
            AvailabilityLevel::Critical
        }
    }
}

/// Tableau de bord calculé à un instant donné.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KpiOverview {
    pub computed_at: DateTime<Utc>,
    pub active_trips: usize,
    pub active_yesterday: usize,
    pub active_trend: Trend,
    pub available_drivers: usize,
    pub available_vehicles: usize,
    pub drivers_percentage: u32,
    pub vehicles_percentage: u32,
    pub average_availability: u32,
    pub availability_level: AvailabilityLevel,
    pub completed_this_month: usize,
    pub completed_last_month: usize,
    /// Croissance mensuelle en %, 0 si aucun trajet terminé le mois précédent.
    pub monthly_growth: i64,
    pub total_drivers: usize,
    pub total_vehicles: usize,
    pub total_trips: usize,
    /// Trajets actifs par jour de départ, 7 derniers jours (le plus ancien d'abord).
    pub active_chart: [usize; 7],
    /// Trajets terminés par mois de fin, 7 derniers mois (le plus ancien d'abord).
    pub completed_chart: [usize; 7],
}

pub fn kpi_overview<S: CommitmentStore + ?Sized>(
    store: &S,
    now: DateTime<Utc>,
) -> Result<KpiOverview, FleetError> {
    let instant = Window::instant(now);
    let available_drivers =
        available_resources(store, ResourceKind::Driver, &instant, None)?.len();
    let available_vehicles =
        available_resources(store, ResourceKind::Vehicle, &instant, None)?.len();
    let total_drivers = store.list_resources(ResourceKind::Driver, None)?.len();
    let total_vehicles = store.list_resources(ResourceKind::Vehicle, None)?.len();

    let drivers_percentage = percentage(available_drivers, total_drivers);
    let vehicles_percentage = percentage(available_vehicles, total_vehicles);
    let average_availability =
        (f64::from(drivers_percentage + vehicles_percentage) / 2.0).round() as u32;

    let active = store.list_trips(&[TripStatus::Active])?;
    let completed = store.list_trips(&[TripStatus::Completed])?;
    let total_trips = store.list_trips(&TripStatus::ALL)?.len();

    let today = now.date_naive();
    let active_trips = active.len();
    let active_on = |day: NaiveDate| count(&active, |t| t.window.start.date_naive() == day);
    let active_yesterday = active_on(today - Duration::days(1));

    let completed_in =
        |month: (i32, u32)| count(&completed, |t| month_of(t.window.end.date_naive()) == month);
    let completed_this_month = completed_in(month_of(today));
    let completed_last_month = completed_in(months_back(today, 1));
    let monthly_growth = if completed_last_month > 0 {
        let diff = completed_this_month as f64 - completed_last_month as f64;
        (diff / completed_last_month as f64 * 100.0).round() as i64
    } else {
        0
    };

    let mut active_chart = [0usize; 7];
    let mut completed_chart = [0usize; 7];
    for (slot, back) in (0..7u32).rev().enumerate() {
        active_chart[slot] = active_on(today - Duration::days(i64::from(back)));
        completed_chart[slot] = completed_in(months_back(today, back));
    }

    Ok(KpiOverview {
        computed_at: now,
        active_trips,
        active_yesterday,
        active_trend: Trend::from_difference(active_trips as i64 - active_yesterday as i64),
        available_drivers,
        available_vehicles,
        drivers_percentage,
        vehicles_percentage,
        average_availability,
        availability_level: AvailabilityLevel::from_percentage(average_availability),
        completed_this_month,
        completed_last_month,
        monthly_growth,
        total_drivers,
        total_vehicles,
        total_trips,
        active_chart,
        completed_chart,
    })
}

fn count(trips: &[Trip], pred: impl Fn(&Trip) -> bool) -> usize {
    trips.iter().filter(|&t| pred(t)).count()
}

fn month_of(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

fn months_back(date: NaiveDate, n: u32) -> (i32, u32) {
    let first = date.with_day(1).unwrap_or(date);
    let target = first.checked_sub_months(Months::new(n)).unwrap_or(first);
    month_of(target)
}

impl fmt::Display for KpiOverview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "active trips: {} ({:?} vs yesterday: {})",
            self.active_trips, self.active_trend, self.active_yesterday
        )?;
        writeln!(
            f,
            "available now: {} drivers / {} vehicles ({}% average, {:?})",
            self.available_drivers,
            self.available_vehicles,
            self.average_availability,
            self.availability_level
        )?;
        writeln!(
            f,
            "completed this month: {} ({:+}% vs last month: {})",
            self.completed_this_month, self.monthly_growth, self.completed_last_month
        )?;
        writeln!(
            f,
            "totals: {} drivers / {} vehicles / {} trips",
            self.total_drivers, self.total_vehicles, self.total_trips
        )?;
        writeln!(f, "active per day (7d): {:?}", self.active_chart)?;
        write!(f, "completed per month (7m): {:?}", self.completed_chart)
    }
}

/// Options des indicateurs.
#[derive(Debug, Clone, Copy)]
pub struct StatsOptions {
    pub cache_ttl_secs: u32,
}

impl Default for StatsOptions {
    fn default() -> Self {
        Self { cache_ttl_secs: 60 }
    }
}

/// Cache court du tableau de bord. Approximation périmée par nature : ne
/// remplace jamais la vérification de conflit au moment d'écrire.
#[derive(Debug, Clone)]
pub struct KpiCache {
    ttl: Duration,
    entry: Option<KpiOverview>,
}

impl KpiCache {
    pub fn new(opts: StatsOptions) -> Self {
        Self {
            ttl: Duration::seconds(i64::from(opts.cache_ttl_secs)),
            entry: None,
        }
    }

    /// Retourne l'entrée en cache si elle est fraîche, sinon recalcule.
    /// Un échec de calcul laisse l'entrée précédente en place.
    pub fn get_or_compute<F>(
        &mut self,
        now: DateTime<Utc>,
        compute: F,
    ) -> Result<&KpiOverview, FleetError>
    where
        F: FnOnce(DateTime<Utc>) -> Result<KpiOverview, FleetError>,
    {
        let ttl = self.ttl;
        let fresh = matches!(
            &self.entry,
            Some(kpi) if now >= kpi.computed_at && now - kpi.computed_at < ttl
        );
        if !fresh {
            tracing::debug!(at = %now, "recomputing kpi overview");
            let kpi = compute(now)?;
            self.entry = Some(kpi);
        }
        Ok(self.entry.as_ref().expect("entry is set above"))
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

impl Default for KpiCache {
    fn default() -> Self {
        Self::new(StatsOptions::default())
    }
}
