#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use flotte::{
    io,
    model::{CompanyId, ResourceId, ResourceKind, TripId, TripStatus, VehicleType, Window},
    stats::{availability_stats, kpi_overview},
    storage::{JsonStorage, Storage},
    Dispatcher, FleetError, TripUpdate,
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de gestion de flotte (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON de la flotte
    #[arg(long, global = true, default_value = "fleet.json")]
    fleet: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Créer une société
    AddCompany {
        #[arg(long)]
        name: String,
    },

    /// Ajouter un chauffeur
    AddDriver {
        #[arg(long)]
        company: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        phone: String,
    },

    /// Ajouter un véhicule
    AddVehicle {
        #[arg(long)]
        company: String,
        #[arg(long)]
        plate: String,
        /// car | truck | van | bus
        #[arg(long = "type", default_value = "car")]
        vehicle_type: VehicleType,
    },

    /// Importer des chauffeurs depuis un CSV
    ImportDrivers {
        #[arg(long)]
        csv: String,
    },

    /// Importer des véhicules depuis un CSV
    ImportVehicles {
        #[arg(long)]
        csv: String,
    },

    /// Importer des trajets depuis un CSV (chaque ligne est réservée)
    ImportTrips {
        #[arg(long)]
        csv: String,
    },

    /// Réserver un trajet
    Book {
        #[arg(long)]
        company: String,
        #[arg(long)]
        driver: String,
        #[arg(long)]
        vehicle: String,
        /// RFC3339 UTC ou "YYYY-MM-DD HH:MM"
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },

    /// Déplacer ou réaffecter un trajet
    Reschedule {
        #[arg(long)]
        trip: String,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        driver: Option<String>,
        #[arg(long)]
        vehicle: Option<String>,
    },

    /// Changer le statut d'un trajet
    Status {
        #[arg(long)]
        trip: String,
        /// scheduled | active | completed | cancelled
        #[arg(long)]
        to: TripStatus,
    },

    /// Supprimer un trajet
    RemoveTrip {
        #[arg(long)]
        trip: String,
    },

    /// Tester si une ressource est déjà réservée sur une fenêtre
    Conflict {
        /// driver | vehicle
        #[arg(long)]
        kind: ResourceKind,
        #[arg(long)]
        id: String,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        /// Trajet à ignorer (modification de ce trajet)
        #[arg(long)]
        exclude: Option<String>,
    },

    /// Lister les ressources disponibles sur une fenêtre
    Available {
        #[arg(long)]
        kind: ResourceKind,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Statistiques de disponibilité sur une fenêtre
    Stats {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Tableau de bord à l'instant présent
    Kpi,

    /// Vérifier les doubles réservations
    Check {
        /// Export CSV des conflits (optionnel)
        #[arg(long)]
        report: Option<String>,
    },

    /// Lister et optionnellement exporter
    List {
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },
}

fn parse_window(start: &str, end: &str) -> Result<Window> {
    let start = io::parse_instant(start)?;
    let end = io::parse_instant(end)?;
    Window::new(start, end).context("end must not be before start")
}

/// Code 2 = conflit (WARNING), erreur sinon.
fn booking_outcome<T>(res: Result<T, FleetError>) -> Result<Option<T>> {
    match res {
        Ok(v) => Ok(Some(v)),
        Err(err) if err.is_conflict() => {
            eprintln!("CONFLICT: {err}");
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.fleet)?;
    let mut dispatcher = Dispatcher::with_fleet(storage.load_or_default()?);

    let code = match cli.cmd {
        Commands::AddCompany { name } => {
            let id = dispatcher.add_company(&name);
            storage.save(dispatcher.fleet())?;
            println!("{id}");
            0
        }
        Commands::AddDriver {
            company,
            name,
            phone,
        } => {
            let id = dispatcher.add_driver(&CompanyId::new(company), &name, &phone)?;
            storage.save(dispatcher.fleet())?;
            println!("{id}");
            0
        }
        Commands::AddVehicle {
            company,
            plate,
            vehicle_type,
        } => {
            let id = dispatcher.add_vehicle(&CompanyId::new(company), &plate, vehicle_type)?;
            storage.save(dispatcher.fleet())?;
            println!("{id}");
            0
        }
        Commands::ImportDrivers { csv } => {
            for d in io::import_drivers_csv(csv)? {
                dispatcher.add_driver(&d.company, &d.name, &d.phone)?;
            }
            storage.save(dispatcher.fleet())?;
            0
        }
        Commands::ImportVehicles { csv } => {
            for v in io::import_vehicles_csv(csv)? {
                dispatcher.add_vehicle(&v.company, &v.plate_number, v.vehicle_type)?;
            }
            storage.save(dispatcher.fleet())?;
            0
        }
        Commands::ImportTrips { csv } => {
            let mut rejected = 0usize;
            for request in io::import_trips_csv(csv)? {
                if booking_outcome(dispatcher.book(request))?.is_none() {
                    rejected += 1;
                }
            }
            storage.save(dispatcher.fleet())?;
            if rejected == 0 {
                0
            } else {
                eprintln!("{rejected} trip(s) rejected");
                2
            }
        }
        Commands::Book {
            company,
            driver,
            vehicle,
            start,
            end,
        } => {
            let request = flotte::NewTrip::new(
                CompanyId::new(company),
                ResourceId::new(driver),
                ResourceId::new(vehicle),
                io::parse_instant(&start)?,
                io::parse_instant(&end)?,
            );
            match booking_outcome(dispatcher.book(request))? {
                Some(id) => {
                    storage.save(dispatcher.fleet())?;
                    println!("{id}");
                    0
                }
                None => 2,
            }
        }
        Commands::Reschedule {
            trip,
            start,
            end,
            driver,
            vehicle,
        } => {
            let id = TripId::new(trip);
            let current = dispatcher
                .fleet()
                .find_trip(&id)
                .map(|t| t.window)
                .ok_or_else(|| anyhow::anyhow!("unknown trip: {}", id))?;
            let window = match (start, end) {
                (None, None) => None,
                (start, end) => {
                    let start = start.map_or(Ok(current.start), |s| io::parse_instant(&s))?;
                    let end = end.map_or(Ok(current.end), |s| io::parse_instant(&s))?;
                    Some(Window { start, end })
                }
            };
            let changes = TripUpdate {
                driver: driver.map(ResourceId::new),
                vehicle: vehicle.map(ResourceId::new),
                window,
            };
            match booking_outcome(dispatcher.update(&id, changes).map(|t| t.id.clone()))? {
                Some(_) => {
                    storage.save(dispatcher.fleet())?;
                    0
                }
                None => 2,
            }
        }
        Commands::Status { trip, to } => {
            dispatcher.transition(&TripId::new(trip), to)?;
            storage.save(dispatcher.fleet())?;
            0
        }
        Commands::RemoveTrip { trip } => {
            dispatcher.remove_trip(&TripId::new(trip))?;
            storage.save(dispatcher.fleet())?;
            0
        }
        Commands::Conflict {
            kind,
            id,
            start,
            end,
            exclude,
        } => {
            let window = parse_window(&start, &end)?;
            let exclude = exclude.map(TripId::new);
            let busy =
                dispatcher.has_conflict(kind, &ResourceId::new(id), &window, exclude.as_ref())?;
            if busy {
                println!("conflict");
                2
            } else {
                println!("free");
                0
            }
        }
        Commands::Available {
            kind,
            start,
            end,
            company,
            out_csv,
        } => {
            let window = parse_window(&start, &end)?;
            let company = company.map(CompanyId::new);
            let ids = dispatcher.available(kind, &window, company.as_ref())?;
            if let Some(path) = out_csv {
                io::export_available_csv(path, dispatcher.fleet(), kind, &ids)?;
            }
            for id in &ids {
                let label = dispatcher.fleet().resource_label(kind, id).unwrap_or("-");
                println!("{id} | {label}");
            }
            0
        }
        Commands::Stats {
            start,
            end,
            company,
            out_csv,
        } => {
            let window = parse_window(&start, &end)?;
            let company = company.map(CompanyId::new);
            let stats = availability_stats(dispatcher.fleet(), &window, company.as_ref())?;
            if let Some(path) = out_csv {
                io::export_stats_csv(path, &stats)?;
            }
            println!("{stats}");
            0
        }
        Commands::Kpi => {
            let kpi = kpi_overview(dispatcher.fleet(), Utc::now())?;
            println!("{kpi}");
            0
        }
        Commands::Check { report } => {
            let conflicts = dispatcher.detect_conflicts();
            if conflicts.is_empty() {
                println!("OK: no conflicts");
                0
            } else {
                eprintln!("Found {} conflict(s)", conflicts.len());
                if let Some(path) = report {
                    io::export_conflicts_csv(path, &conflicts)?;
                }
                2
            }
        }
        Commands::List { out_json, out_csv } => {
            if let Some(path) = out_json {
                io::export_fleet_json(path, dispatcher.fleet())?;
            }
            if let Some(path) = out_csv {
                io::export_trips_csv(path, dispatcher.fleet())?;
            }
            let fleet = dispatcher.fleet();
            for t in &fleet.trips {
                let driver = fleet
                    .resource_label(ResourceKind::Driver, &t.driver)
                    .unwrap_or("-");
                let vehicle = fleet
                    .resource_label(ResourceKind::Vehicle, &t.vehicle)
                    .unwrap_or("-");
                println!(
                    "{} | {} → {} | {} | {} | {}",
                    t.id,
                    t.window.start.to_rfc3339(),
                    t.window.end.to_rfc3339(),
                    driver,
                    vehicle,
                    t.status
                );
            }
            0
        }
    };

    std::process::exit(code);
}
