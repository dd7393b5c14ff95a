use clap::{Parser, Subcommand};
use minmin_core::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "minmin")]
#[command(about = "Sleep, condition and pre-sleep diary tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Record hours slept
    Sleep {
        /// Hours slept, in (0, 24]
        #[arg(allow_negative_numbers = true)]
        hours: f64,

        /// Day to record for (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<CalendarDay>,
    },

    /// Record how the day felt
    Condition {
        /// very-good, good, neutral, bad, very-bad
        #[arg(long)]
        feeling: Feeling,

        /// high, normal, low, very-low
        #[arg(long)]
        energy: EnergyLevel,

        #[arg(long)]
        date: Option<CalendarDay>,
    },

    /// Write the pre-sleep diary entry
    Diary {
        text: String,

        #[arg(long)]
        date: Option<CalendarDay>,
    },

    /// Show everything recorded for one day (default)
    Show {
        #[arg(long)]
        date: Option<CalendarDay>,
    },

    /// List records, newest first
    History {
        /// Only this kind (sleep, condition, diary)
        #[arg(long)]
        kind: Option<RecordKind>,
    },

    /// List records between two days, inclusive, oldest first
    Range {
        from: CalendarDay,
        to: CalendarDay,

        #[arg(long, default_value = "sleep")]
        kind: RecordKind,
    },

    /// Recommend tonight's sleep from the past week
    Suggest,

    /// Show the diary streak and the number of days with sleep logged
    Streak,

    /// Export one record kind to CSV
    Export {
        #[arg(long, default_value = "sleep")]
        kind: RecordKind,

        #[arg(long)]
        out: PathBuf,
    },

    /// Merge records from a JSON snapshot (including browser app exports)
    Import { file: PathBuf },

    /// Delete all records
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    minmin_core::logging::init_with_level(minmin_core::logging::level_for_verbosity(cli.verbose));

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let records_path = Config::records_path(&data_dir);
    tracing::debug!("Using records file {:?}", records_path);

    match cli.command {
        Some(Commands::Sleep { hours, date }) => {
            let (_lock, mut tracker) = open_for_write(&records_path, &config)?;
            let recorded = tracker.record_sleep(date.unwrap_or_else(CalendarDay::today), hours)?;
            println!("✓ {}", recorded.message());
        }
        Some(Commands::Condition {
            feeling,
            energy,
            date,
        }) => {
            let (_lock, mut tracker) = open_for_write(&records_path, &config)?;
            let recorded = tracker.record_condition(
                date.unwrap_or_else(CalendarDay::today),
                feeling,
                energy,
            )?;
            println!("✓ {}", recorded.message());
        }
        Some(Commands::Diary { text, date }) => {
            let (_lock, mut tracker) = open_for_write(&records_path, &config)?;
            let recorded = tracker.record_diary(date.unwrap_or_else(CalendarDay::today), &text)?;
            println!("✓ {}", recorded.message());
        }
        Some(Commands::Show { date }) => {
            let tracker = open_for_read(&records_path, &config)?;
            cmd_show(&tracker, date.unwrap_or_else(CalendarDay::today));
        }
        None => {
            let tracker = open_for_read(&records_path, &config)?;
            cmd_show(&tracker, CalendarDay::today());
        }
        Some(Commands::History { kind }) => {
            let tracker = open_for_read(&records_path, &config)?;
            cmd_history(&tracker, kind);
        }
        Some(Commands::Range { from, to, kind }) => {
            let tracker = open_for_read(&records_path, &config)?;
            let records = tracker.records_in_range(kind, from, to);
            if records.is_empty() {
                println!("No {} records between {} and {}.", kind, from, to);
            }
            for record in &records {
                println!("{}  {}", record.date(), describe(record));
            }
        }
        Some(Commands::Suggest) => {
            let tracker = open_for_read(&records_path, &config)?;
            let suggestion = tracker.suggest_optimal_sleep_time();
            println!("{}", suggestion.message);
        }
        Some(Commands::Streak) => {
            let tracker = open_for_read(&records_path, &config)?;
            println!("Diary streak: {} days", tracker.continuous_diary_days());
            println!(
                "Days with sleep logged: {}",
                tracker.unique_record_date_count(RecordKind::Sleep)
            );
        }
        Some(Commands::Export { kind, out }) => {
            let tracker = open_for_read(&records_path, &config)?;
            let count = export_csv(tracker.records(), kind, &out)?;
            println!("✓ Exported {} {} records to {}", count, kind, out.display());
        }
        Some(Commands::Import { file }) => {
            let snapshot = Snapshot::read_from(&file)?;
            let (_lock, mut tracker) = open_for_write(&records_path, &config)?;
            let summary = tracker.import_snapshot(snapshot)?;
            println!(
                "✓ Imported {} new and {} replaced records ({} skipped)",
                summary.inserted, summary.replaced, summary.skipped
            );
        }
        Some(Commands::Clear { yes }) => {
            if !yes {
                return Err(Error::Other(
                    "refusing to delete all records without --yes".into(),
                ));
            }
            let (_lock, mut tracker) = open_for_write(&records_path, &config)?;
            tracker.clear_all()?;
            println!("✓ All records deleted.");
        }
    }

    Ok(())
}

/// Open the tracker while holding the store lock, so the load and the
/// following save cannot interleave with another process
fn open_for_write(path: &Path, config: &Config) -> Result<(StoreLock, Tracker<JsonFileStore>)> {
    let sink = JsonFileStore::new(path);
    let lock = sink.lock()?;
    let tracker = Tracker::open(sink, config.recommendation.clone())?;
    Ok((lock, tracker))
}

fn open_for_read(path: &Path, config: &Config) -> Result<Tracker<JsonFileStore>> {
    Tracker::open(JsonFileStore::new(path), config.recommendation.clone())
}

fn cmd_show(tracker: &Tracker<JsonFileStore>, date: CalendarDay) {
    println!("{}", date);
    for kind in RecordKind::ALL {
        let value = tracker
            .get_by_date(kind, date)
            .map(|r| describe(&r))
            .unwrap_or_else(|| "not recorded".into());
        println!("  {:<10} {}", format!("{}:", kind), value);
    }
}

fn cmd_history(tracker: &Tracker<JsonFileStore>, kind: Option<RecordKind>) {
    let kinds = match kind {
        Some(kind) => vec![kind],
        None => RecordKind::ALL.to_vec(),
    };

    for kind in kinds {
        let records = tracker.records().history_newest_first(kind);
        println!("── {} ({}) ──", kind, records.len());
        if records.is_empty() {
            println!("  No {} records yet.", kind);
        }
        for record in &records {
            println!("  {}  {}", record.date(), describe(record));
        }
    }
}

fn describe(record: &Record) -> String {
    match record {
        Record::Sleep(r) => format!("{} hours", r.duration_hours),
        Record::Condition(r) => format!("feeling {}, energy {}", r.feeling, r.energy_level),
        Record::Diary(r) => truncate(&r.text, 80),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    }
}
