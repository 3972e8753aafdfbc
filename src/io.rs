use crate::dispatch::{Conflict, NewTrip};
use crate::model::{
    CompanyId, Driver, Fleet, ResourceId, ResourceKind, TripStatus, Vehicle, VehicleType,
};
use crate::stats::AvailabilityStats;
use anyhow::{bail, Context};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs;
use std::path::Path;

/// Import de chauffeurs: header `company_id,name,phone`
pub fn import_drivers_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Driver>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let company = rec.get(0).context("missing company_id")?.trim();
        let name = rec.get(1).context("missing name")?.trim();
        let phone = rec.get(2).unwrap_or("").trim();
        if company.is_empty() || name.is_empty() {
            bail!("invalid driver row (empty)");
        }
        out.push(Driver::new(CompanyId::new(company), name, phone));
    }
    Ok(out)
}

/// Import de véhicules: header `company_id,plate_number,type`
pub fn import_vehicles_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Vehicle>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let company = rec.get(0).context("missing company_id")?.trim();
        let plate = rec.get(1).context("missing plate_number")?.trim();
        if company.is_empty() || plate.is_empty() {
            bail!("invalid vehicle row (empty)");
        }
        let vehicle_type: VehicleType = match rec.get(2).map(str::trim) {
            Some(raw) if !raw.is_empty() => raw
                .parse()
                .with_context(|| format!("invalid type for plate {plate}"))?,
            _ => Default::default(),
        };
        out.push(Vehicle::new(CompanyId::new(company), plate, vehicle_type));
    }
    Ok(out)
}

/// Import de trajets: header `company_id,driver_id,vehicle_id,start,end[,status]`
///
/// Les lignes sont rendues sous forme de demandes : la réservation (et donc
/// le contrôle des conflits) reste à la charge de l'appelant.
pub fn import_trips_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<NewTrip>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let company = rec.get(0).context("missing company_id")?.trim();
        let driver = rec.get(1).context("missing driver_id")?.trim();
        let vehicle = rec.get(2).context("missing vehicle_id")?.trim();
        let start = parse_instant(rec.get(3).context("missing start")?.trim())?;
        let end = parse_instant(rec.get(4).context("missing end")?.trim())?;
        let status: TripStatus = match rec.get(5).map(str::trim) {
            Some(raw) if !raw.is_empty() => raw.parse()?,
            _ => TripStatus::Scheduled,
        };
        out.push(
            NewTrip::new(
                CompanyId::new(company),
                ResourceId::new(driver),
                ResourceId::new(vehicle),
                start,
                end,
            )
            .with_status(status),
        );
    }
    Ok(out)
}

/// Instant UTC : RFC3339, `YYYY-MM-DD HH:MM[:SS]` (lu en UTC) ou date seule (minuit).
pub fn parse_instant(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(dt) = raw.parse::<DateTime<Utc>>() {
        return Ok(dt);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("invalid date/datetime: {raw}"))?;
    let midnight = date.and_hms_opt(0, 0, 0).context("invalid midnight conversion")?;
    Ok(Utc.from_utc_datetime(&midnight))
}

/// Export JSON de la flotte (jolie mise en forme)
pub fn export_fleet_json<P: AsRef<Path>>(path: P, fleet: &Fleet) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(fleet)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV des trajets: header `id,company_id,driver,vehicle,start,end,status`
pub fn export_trips_csv<P: AsRef<Path>>(path: P, fleet: &Fleet) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["id", "company_id", "driver", "vehicle", "start", "end", "status"])?;
    for t in &fleet.trips {
        let driver = fleet
            .resource_label(ResourceKind::Driver, &t.driver)
            .unwrap_or(t.driver.as_str());
        let vehicle = fleet
            .resource_label(ResourceKind::Vehicle, &t.vehicle)
            .unwrap_or(t.vehicle.as_str());
        let start = t.window.start.to_rfc3339();
        let end = t.window.end.to_rfc3339();
        w.write_record([
            t.id.as_str(),
            t.company.as_str(),
            driver,
            vehicle,
            start.as_str(),
            end.as_str(),
            t.status.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Export CSV des ressources disponibles: header `id,company_id,label`
pub fn export_available_csv<P: AsRef<Path>>(
    path: P,
    fleet: &Fleet,
    kind: ResourceKind,
    ids: &[ResourceId],
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["id", "company_id", "label"])?;
    for id in ids {
        let company = fleet
            .resource_company(kind, id)
            .map(CompanyId::as_str)
            .unwrap_or("");
        let label = fleet.resource_label(kind, id).unwrap_or("");
        w.write_record([id.as_str(), company, label])?;
    }
    w.flush()?;
    Ok(())
}

/// Export CSV des statistiques: header `kind,available,total,percentage`
pub fn export_stats_csv<P: AsRef<Path>>(path: P, stats: &AvailabilityStats) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["kind", "available", "total", "percentage"])?;
    let rows = [
        (
            ResourceKind::Driver,
            stats.available_drivers,
            stats.total_drivers,
            stats.drivers_percentage,
        ),
        (
            ResourceKind::Vehicle,
            stats.available_vehicles,
            stats.total_vehicles,
            stats.vehicles_percentage,
        ),
    ];
    for (kind, available, total, pct) in rows {
        let mut a = itoa::Buffer::new();
        let mut t = itoa::Buffer::new();
        let mut p = itoa::Buffer::new();
        w.write_record([kind.as_str(), a.format(available), t.format(total), p.format(pct)])?;
    }
    w.flush()?;
    Ok(())
}

/// Export CSV d'un rapport de conflits: header `kind,resource,trip_a,trip_b`
pub fn export_conflicts_csv<P: AsRef<Path>>(path: P, conflicts: &[Conflict]) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["kind", "resource", "trip_a", "trip_b"])?;
    for c in conflicts {
        w.write_record([
            c.kind.as_str(),
            c.resource.as_str(),
            c.trip_a.as_str(),
            c.trip_b.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}
