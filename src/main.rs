use clap::{Parser, Subcommand, ValueEnum};
use storecast::clip::{ClipDescriptor, FILLER_TYPE};
use storecast::clock;
use storecast::config::SchedulerConfig;
use storecast::scheduler::{Schedule, Scheduler};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "storecast", about = "Store broadcast playlist scheduler", version)]
struct Cli {
    /// Config file (default: <config dir>/storecast/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a day's timeline from a JSON clip catalog
    Schedule {
        /// Catalog file: JSON array of {name, type, frequency, time_slot, duration}
        catalog: PathBuf,
        /// Broadcast day length, HH:MM[:SS] or seconds (overrides config)
        #[arg(short, long)]
        total: Option<String>,
        /// Round-robin batch size for flexible clips (overrides config)
        #[arg(short, long)]
        batch_size: Option<usize>,
        /// Fail if a fixed-window clip lands outside its window
        #[arg(long)]
        strict: bool,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
        /// Write output to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Print catalog entries for audio files, reading title and duration from tags
    Probe {
        /// Audio file path(s)
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Clip type ("Music" marks filler)
        #[arg(short = 't', long = "type", default_value = FILLER_TYPE)]
        kind: String,
        /// Airings per day (normal clips)
        #[arg(short, long)]
        frequency: Option<u32>,
        /// Fixed broadcast window, HH:MM-HH:MM
        #[arg(short, long)]
        slot: Option<String>,
    },
    /// Scheduler configuration
    Config {
        #[command(subcommand)]
        action: ConfigCmd,
    },
    /// Convert between HH:MM:SS and seconds since midnight
    Clock { value: String },
}

#[derive(Subcommand)]
enum ConfigCmd {
    /// Show current configuration
    Show,
    /// Set the broadcast day length (HH:MM[:SS] or seconds)
    Total { value: String },
    /// Set the round-robin batch size
    Batch { size: usize },
    /// Enable or disable strict window checking
    Strict {
        #[arg(value_parser = ["on", "off"])]
        state: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", msg);
    std::process::exit(1);
}

/// Accept a plain number of seconds or a clock string.
fn parse_duration_arg(value: &str) -> Result<u32, String> {
    if value.chars().all(|c| c.is_ascii_digit()) && !value.is_empty() {
        return value
            .parse::<u32>()
            .map_err(|e| format!("Invalid seconds '{}': {}", value, e));
    }
    clock::to_seconds(value).map_err(|e| e.to_string())
}

fn render_text(schedule: &Schedule) -> String {
    let mut out = String::new();
    for row in schedule.rows() {
        out.push_str(&format!(
            "{}  {:<8} {:>5}s  {}\n",
            row.window, row.kind, row.duration, row.name
        ));
    }
    out.push_str(&format!(
        "\n{} entries, ends {} | committed {}s | filler rate {} | \
         fillers {} placed, {} dropped | silence {}s\n",
        schedule.len(),
        clock::to_clock_string(schedule.end_secs()),
        schedule.committed_secs,
        schedule.filler_rate,
        schedule.fillers_inserted,
        schedule.fillers_discarded,
        schedule.silence_secs()
    ));
    for s in schedule.summary() {
        out.push_str(&format!(
            "  {:<24} {:<6} x{:<4} {}\n",
            s.name,
            s.kind,
            s.occurrences,
            clock::to_clock_string(s.airtime_secs)
        ));
    }
    for miss in schedule.window_misses() {
        out.push_str(&format!(
            "  warning: '{}' at {} is outside {}\n",
            miss.clip,
            clock::to_clock_string(miss.start),
            miss.window
        ));
    }
    out
}

fn emit(text: &str, out: Option<&Path>) {
    match out {
        Some(path) => {
            if let Err(e) = fs::write(path, text) {
                fail(format!("could not write '{}': {}", path.display(), e));
            }
            println!("Wrote {}", path.display());
        }
        None => print!("{}", text),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .or_else(SchedulerConfig::default_path)
        .unwrap_or_else(|| PathBuf::from("storecast.json"));
    let mut config = SchedulerConfig::load(&config_path);

    match cli.command {
        Commands::Schedule {
            catalog,
            total,
            batch_size,
            strict,
            format,
            out,
        } => {
            if let Some(total) = total {
                config.total_duration_secs = parse_duration_arg(&total).unwrap_or_else(|e| fail(e));
            }
            if let Some(size) = batch_size {
                config.batch_size = size;
            }
            config.strict_windows |= strict;

            let data = fs::read_to_string(&catalog)
                .unwrap_or_else(|e| fail(format!("could not read '{}': {}", catalog.display(), e)));
            let clips = storecast::parse_catalog(&data).unwrap_or_else(|e| fail(e));
            let scheduler = Scheduler::new(config).unwrap_or_else(|e| fail(e));
            let schedule = scheduler.run(&clips).unwrap_or_else(|e| fail(e));

            let text = match format {
                Format::Text => render_text(&schedule),
                Format::Json => serde_json::to_string_pretty(&schedule.rows())
                    .map(|s| s + "\n")
                    .unwrap_or_else(|e| fail(e)),
            };
            emit(&text, out.as_deref());
        }
        Commands::Probe {
            files,
            kind,
            frequency,
            slot,
        } => {
            let mut descriptors = Vec::new();
            for file in &files {
                match ClipDescriptor::from_audio_file(file, &kind, frequency, slot.clone()) {
                    Ok(d) => descriptors.push(d),
                    Err(e) => eprintln!("Warning: {}", e),
                }
            }
            if descriptors.is_empty() {
                fail("no readable audio files");
            }
            // Validate what we produced the same way `schedule` will.
            for d in &descriptors {
                if let Err(e) = d.clone().into_spec() {
                    fail(e);
                }
            }
            match serde_json::to_string_pretty(&descriptors) {
                Ok(json) => println!("{}", json),
                Err(e) => fail(e),
            }
        }
        Commands::Config { action } => match action {
            ConfigCmd::Show => {
                println!("Config file: {}", config_path.display());
                println!(
                    "Total duration: {} ({}s)",
                    clock::to_clock_string(config.total_duration_secs),
                    config.total_duration_secs
                );
                println!("Batch size: {}", config.batch_size);
                println!(
                    "Strict windows: {}",
                    if config.strict_windows { "on" } else { "off" }
                );
            }
            ConfigCmd::Total { value } => {
                config.total_duration_secs = parse_duration_arg(&value).unwrap_or_else(|e| fail(e));
                if let Err(e) = config.validate() {
                    fail(e);
                }
                config.save(&config_path).unwrap_or_else(|e| fail(e));
                println!(
                    "Total duration set to {}",
                    clock::to_clock_string(config.total_duration_secs)
                );
            }
            ConfigCmd::Batch { size } => {
                config.batch_size = size;
                if let Err(e) = config.validate() {
                    fail(e);
                }
                config.save(&config_path).unwrap_or_else(|e| fail(e));
                println!("Batch size set to {}", size);
            }
            ConfigCmd::Strict { state } => {
                config.strict_windows = state == "on";
                config.save(&config_path).unwrap_or_else(|e| fail(e));
                println!("Strict windows {}", state);
            }
        },
        Commands::Clock { value } => {
            if value.chars().all(|c| c.is_ascii_digit()) && !value.is_empty() {
                match value.parse::<u32>() {
                    Ok(secs) => println!("{}", clock::to_clock_string(secs)),
                    Err(e) => fail(e),
                }
            } else {
                match clock::to_seconds(&value) {
                    Ok(secs) => println!("{}", secs),
                    Err(e) => fail(e),
                }
            }
        }
    }
}
