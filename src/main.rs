use chrono::Local;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use surveydeck::report::{self, Summary};
use surveydeck::slides::gaps::{self, format_gap, GapStyle};
use surveydeck::{DeckConfig, SurveyData};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "surveydeck")]
#[command(author, version, about = "Render pre-aggregated survey results as a slide deck")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only show warnings and the final result
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the deck to a file (.html or .json)
    Render {
        /// Survey data (JSON)
        data: PathBuf,

        /// Output file; format follows the extension
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Deck settings (TOML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory for auto-named decks
        #[arg(long, default_value = "surveydeck-reports")]
        report_dir: PathBuf,

        /// Don't prompt to open the deck
        #[arg(long)]
        no_open: bool,
    },

    /// Start a local server with the interactive gap view
    Serve {
        /// Survey data (JSON)
        data: PathBuf,

        /// Port to listen on
        #[arg(short, long, default_value = "3001")]
        port: u16,

        /// Deck settings (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check the data for broken relationships; exits 1 on warnings
    Check {
        /// Survey data (JSON)
        data: PathBuf,

        /// Deck settings (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the top gaps, or one dimension's drill-down
    Gaps {
        /// Survey data (JSON)
        data: PathBuf,

        /// Dimension id to drill into
        #[arg(short, long)]
        dimension: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Deck settings (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose {
        "debug"
    } else if args.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let code = match args.command {
        Command::Render { data, output, config, report_dir, no_open } => {
            run_render(&data, output, config.as_deref(), &report_dir, no_open, args.quiet)
        }
        Command::Serve { data, port, config } => run_serve(&data, port, config.as_deref()),
        Command::Check { data, config } => run_check(&data, config.as_deref(), args.quiet),
        Command::Gaps { data, dimension, json, config } => {
            run_gaps(&data, dimension.as_deref(), json, config.as_deref())
        }
    };
    std::process::exit(code);
}

fn load(data: &Path, config: Option<&Path>) -> Option<(SurveyData, DeckConfig)> {
    let config = match DeckConfig::load(config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("\x1b[31mBad config:\x1b[0m {}", e);
            return None;
        }
    };
    match SurveyData::load(data) {
        Ok(d) => Some((d, config)),
        Err(e) => {
            eprintln!("\x1b[31mCannot read {}:\x1b[0m {}", data.display(), e);
            None
        }
    }
}

fn run_render(
    data: &Path,
    output: Option<PathBuf>,
    config: Option<&Path>,
    report_dir: &Path,
    no_open: bool,
    quiet: bool,
) -> i32 {
    let Some((data, config)) = load(data, config) else {
        return 1;
    };

    let output_path = match output {
        Some(path) => path,
        None => {
            if let Err(e) = std::fs::create_dir_all(report_dir) {
                eprintln!("Cannot create {}: {}", report_dir.display(), e);
                return 1;
            }
            let timestamp = Local::now().format("%Y%m%d_%H%M%S");
            report_dir.join(format!("surveydeck_report_{}.html", timestamp))
        }
    };

    let summary = match report::generate(&output_path, &data, &config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to write deck: {}", e);
            return 1;
        }
    };

    if !quiet {
        print_summary(&summary);
        eprintln!("\n\x1b[32mDeck saved: {}\x1b[0m", output_path.display());
    }

    if !no_open && !quiet {
        eprint!("\nOpen deck in browser? [Y/n] ");
        io::stderr().flush().ok();

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_ok() {
            let input = input.trim().to_lowercase();
            if input.is_empty() || input == "y" || input == "yes" {
                if let Err(e) = open::that(&output_path) {
                    eprintln!("Failed to open deck: {}", e);
                }
            }
        }
    }

    0
}

fn print_summary(summary: &Summary) {
    eprintln!("\x1b[1msurveydeck\x1b[0m");
    eprintln!("{}", "─".repeat(50));
    for slide in &summary.slides {
        let color = if slide.skipped > 0 { "\x1b[33m" } else { "\x1b[32m" };
        eprintln!(
            "  {}{:<10}\x1b[0m {:>2} drawn  {:>2} skipped",
            color, slide.id, slide.rendered, slide.skipped
        );
    }
    eprintln!("{}", "─".repeat(50));
    eprintln!("  \x1b[32m✓ Charts:\x1b[0m   {}", summary.charts_rendered);
    if summary.charts_skipped > 0 {
        eprintln!("  \x1b[33m? Skipped:\x1b[0m  {}", summary.charts_skipped);
    }
    if summary.warnings > 0 {
        eprintln!("  \x1b[31m✗ Warnings:\x1b[0m {}", summary.warnings);
    }
}

fn run_serve(data: &Path, port: u16, config: Option<&Path>) -> i32 {
    let Some((data, config)) = load(data, config) else {
        return 1;
    };
    match surveydeck::serve::start(port, data, config) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Server error: {}", e);
            1
        }
    }
}

fn run_check(data: &Path, config: Option<&Path>, quiet: bool) -> i32 {
    let Some((data, config)) = load(data, config) else {
        return 1;
    };
    let warnings = data.validate(&config.validation);
    for w in &warnings {
        println!("\x1b[33mwarning\x1b[0m {}", w);
    }
    if !quiet {
        if warnings.is_empty() {
            eprintln!("\x1b[32m✓ Data looks consistent\x1b[0m");
        } else {
            eprintln!("\n{} warning(s)", warnings.len());
        }
    }
    i32::from(!warnings.is_empty())
}

fn run_gaps(data: &Path, dimension: Option<&str>, json: bool, config: Option<&Path>) -> i32 {
    let Some((data, config)) = load(data, config) else {
        return 1;
    };

    match dimension {
        None => {
            let Some(indicators) = data.all_indicators.as_deref() else {
                eprintln!("No gap data (allIndicators) in input");
                return 1;
            };
            let top = gaps::top_gaps(indicators, &config.gaps);
            if json {
                return print_json(&top);
            }
            println!(
                "\x1b[1m{:<16} {:<40} {:>9} {:>9} {:>7} {:>8}\x1b[0m",
                "DIMENSION", "OPPORTUNITY", "COMMUNITY", "OFFERINGS", "GAP", "% HIGH"
            );
            for item in &top {
                println!(
                    "{:<16} {:<40} {:>9.2} {:>9.2} {} {:>7.1}%",
                    truncate(&item.dimension, 16),
                    truncate(&item.indicator, 40),
                    item.community,
                    item.offerings,
                    colored_gap(item.gap),
                    item.pct_high
                );
            }
        }
        Some(id) => {
            let drill = data
                .dimension_data
                .as_ref()
                .and_then(|dims| gaps::dimension_drilldown(dims, id));
            let Some(drill) = drill else {
                eprintln!("Unknown dimension '{}'", id);
                return 1;
            };
            if json {
                return print_json(&drill);
            }
            println!("\x1b[1m{}\x1b[0m", drill.name);
            println!(
                "\x1b[1m{:<48} {:>9} {:>9} {:>7} {:>8}\x1b[0m",
                "OPPORTUNITY", "COMMUNITY", "OFFERINGS", "GAP", "% HIGH"
            );
            for item in &drill.indicators {
                println!(
                    "{:<48} {:>9.2} {:>9.2} {} {:>7.1}%",
                    truncate(&item.name, 48),
                    item.community,
                    item.offerings,
                    colored_gap(item.gap),
                    item.pct_high
                );
            }
        }
    }
    0
}

fn print_json<T: serde::Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            eprintln!("Error serializing: {}", e);
            1
        }
    }
}

fn colored_gap(gap: f64) -> String {
    let color = match GapStyle::of(gap) {
        GapStyle::Positive => "\x1b[32m",
        GapStyle::Negative => "\x1b[31m",
        GapStyle::Neutral => "\x1b[90m",
    };
    format!("{}{:>7}\x1b[0m", color, format_gap(gap))
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
