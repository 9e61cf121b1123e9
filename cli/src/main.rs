mod commands;
mod config;
mod photos;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process;

use crate::commands::{
    cmd_bodyfat_clear, cmd_bodyfat_mode, cmd_bodyfat_set, cmd_delete, cmd_export, cmd_history,
    cmd_log, cmd_measure_clear, cmd_measure_set, cmd_measure_show, cmd_photo_attach,
    cmd_photo_list, cmd_photo_remove, cmd_photo_show, cmd_sex, cmd_show, cmd_trend,
};
use crate::config::Config;
use crate::photos::LocalPhotoStore;
use caliper_core::service::CaliperService;

#[derive(Parser)]
#[command(
    name = "caliper",
    version,
    about = "A body-composition tracker CLI",
    long_about = "\n\n   ██████╗ █████╗ ██╗     ██╗██████╗ ███████╗██████╗
  ██╔════╝██╔══██╗██║     ██║██╔══██╗██╔════╝██╔══██╗
  ██║     ███████║██║     ██║██████╔╝█████╗  ██████╔╝
  ██║     ██╔══██║██║     ██║██╔═══╝ ██╔══╝  ██╔══██╗
  ╚██████╗██║  ██║███████╗██║██║     ███████╗██║  ██║
   ╚═════╝╚═╝  ╚═╝╚══════╝╚═╝╚═╝     ╚══════╝╚═╝  ╚═╝
          know what you're made of.
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log weight and/or notes for a date
    Log {
        /// Weight value (number)
        #[arg(short, long)]
        weight: Option<f64>,
        /// Unit: lb or kg (default: lb)
        #[arg(short, long, default_value = "lb")]
        unit: String,
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Optional notes
        #[arg(long)]
        notes: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the entry for a date (default: today)
    Show {
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show all logged entries
    History {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete the entry for a date
    Delete {
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record body measurements (inches)
    Measure {
        #[command(subcommand)]
        command: MeasureCommands,
    },
    /// Set biological sex for the body-fat formula
    Sex {
        /// male or female
        sex: String,
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage the body-fat value and its auto/manual mode
    Bodyfat {
        #[command(subcommand)]
        command: BodyfatCommands,
    },
    /// Manage progress photos
    Photo {
        #[command(subcommand)]
        command: PhotoCommands,
    },
    /// Show metric trends over a time range
    Trend {
        /// Metric: weight, bodyFat, waterPercent (default: all)
        metric: Option<String>,
        /// Range: thisWeek, thisMonth, thisYear, last7, last28, last365, all
        #[arg(short, long, default_value = "all")]
        range: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export history as CSV or JSON
    Export {
        /// Format: csv or json
        #[arg(short, long, default_value = "csv")]
        format: String,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },
}

#[derive(Subcommand)]
enum MeasureCommands {
    /// Set a measurement in inches
    Set {
        /// Field: neck, waist, hips, height, chest, shoulders, biceps,
        /// forearms, wrist, upper-thigh, lower-thigh, calves
        field: String,
        /// Value in inches
        inches: f64,
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Clear a measurement
    Clear {
        /// Field name
        field: String,
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show all measurements for a date
    Show {
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum BodyfatCommands {
    /// Set the body-fat percentage manually (takes manual ownership)
    Set {
        /// Body-fat percentage
        percent: f64,
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Clear the body-fat value (re-estimates if measurements allow)
    Clear {
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Switch between auto (estimated) and manual mode
    Mode {
        /// auto or manual
        mode: String,
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum PhotoCommands {
    /// Attach a photo to a slot (copies the file into the photo store)
    Attach {
        /// Slot: front, side, back
        slot: String,
        /// Path to the photo file
        file: std::path::PathBuf,
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a photo from a slot
    Remove {
        /// Slot: front, side, back
        slot: String,
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List photos for a date
    List {
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the URL for one photo slot
    Show {
        /// Slot: front, side, back
        slot: String,
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

#[allow(clippy::too_many_lines)]
fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let svc = CaliperService::new(&config.db_path)?;
    let store = LocalPhotoStore::new(config.photos_dir.clone());

    match cli.command {
        Commands::Log {
            weight,
            unit,
            date,
            notes,
            json,
        } => cmd_log(&svc, weight, &unit, date, notes, json),
        Commands::Show { date, json } => cmd_show(&svc, date, json),
        Commands::History { json } => cmd_history(&svc, json),
        Commands::Delete { date, json } => cmd_delete(&svc, date, json),
        Commands::Measure { command } => match command {
            MeasureCommands::Set {
                field,
                inches,
                date,
                json,
            } => cmd_measure_set(&svc, &field, inches, date, json),
            MeasureCommands::Clear { field, date, json } => {
                cmd_measure_clear(&svc, &field, date, json)
            }
            MeasureCommands::Show { date, json } => cmd_measure_show(&svc, date, json),
        },
        Commands::Sex { sex, date, json } => cmd_sex(&svc, &sex, date, json),
        Commands::Bodyfat { command } => match command {
            BodyfatCommands::Set {
                percent,
                date,
                json,
            } => cmd_bodyfat_set(&svc, percent, date, json),
            BodyfatCommands::Clear { date, json } => cmd_bodyfat_clear(&svc, date, json),
            BodyfatCommands::Mode { mode, date, json } => cmd_bodyfat_mode(&svc, &mode, date, json),
        },
        Commands::Photo { command } => match command {
            PhotoCommands::Attach {
                slot,
                file,
                date,
                json,
            } => cmd_photo_attach(&svc, &store, &slot, &file, date, json),
            PhotoCommands::Remove { slot, date, json } => cmd_photo_remove(&svc, &slot, date, json),
            PhotoCommands::List { date, json } => cmd_photo_list(&svc, &store, date, json),
            PhotoCommands::Show { slot, date, json } => {
                cmd_photo_show(&svc, &store, &slot, date, json)
            }
        },
        Commands::Trend {
            metric,
            range,
            json,
        } => cmd_trend(&svc, metric, &range, json),
        Commands::Export { format, output } => cmd_export(&svc, &format, output.as_deref()),
    }
}
