mod converters;
mod download;
mod error;
mod store;

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use converters::missile_launches::{self, ExtractConfig, HEADERS, Record};
use store::LaunchStore;

#[derive(Parser)]
#[command(version, about = "Load the NTI missile test database into SQLite", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the workbook, load it into a fresh database and print it
    Fetch {
        /// Workbook URL
        #[arg(long, default_value = download::WORKBOOK_URL)]
        url: String,

        /// Scratch directory, emptied at the start of every run
        #[arg(short, long, default_value = "temp")]
        work_dir: PathBuf,

        /// Download timeout in seconds
        #[arg(long, default_value_t = 60)]
        timeout_secs: u64,

        #[command(flatten)]
        extract: ExtractArgs,
    },
    /// Convert a local workbook to CSV
    Convert {
        /// Path to input XLSX file
        #[arg(short, long)]
        input: PathBuf,

        /// Path to output CSV file (defaults to input file with .csv extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        extract: ExtractArgs,
    },
    /// Print a previously loaded database, longest distance first
    Show {
        /// Path to the SQLite database
        #[arg(short, long)]
        db: PathBuf,
    },
}

#[derive(Args)]
struct ExtractArgs {
    /// 0-based index of the first data row (empty rows are not counted)
    #[arg(long, default_value_t = 148)]
    start_row: usize,

    /// 0-based index one past the last data row
    #[arg(long)]
    end_row: Option<usize>,

    /// Keep rows with unknown fields instead of dropping them
    #[arg(long)]
    lenient: bool,
}

impl From<ExtractArgs> for ExtractConfig {
    fn from(args: ExtractArgs) -> Self {
        ExtractConfig {
            start_row: args.start_row,
            end_row: args.end_row,
            strict: !args.lenient,
        }
    }
}

fn main() {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env).with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Fetch {
            url,
            work_dir,
            timeout_secs,
            extract,
        } => handle_fetch(&url, &work_dir, Duration::from_secs(timeout_secs), extract.into()),
        Commands::Convert {
            input,
            output,
            extract,
        } => handle_convert(input, output, extract.into()),
        Commands::Show { db } => handle_show(&db),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn handle_fetch(
    url: &str,
    work_dir: &Path,
    timeout: Duration,
    config: ExtractConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    download::reset_work_dir(work_dir)?;
    let workbook = download::fetch_workbook(url, work_dir, timeout)?;

    let rows = converters::parse_xlsx(&workbook)?;
    let records = missile_launches::extract(&rows, &config)?;
    info!(records = records.len(), "extracted launches");

    let mut store = LaunchStore::open(&work_dir.join(download::DATABASE_FILE))?;
    store.replace_all(&records)?;

    print_table(&store.sorted_by_distance()?);
    Ok(())
}

fn handle_convert(
    input: PathBuf,
    output: Option<PathBuf>,
    config: ExtractConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = output.unwrap_or_else(|| input.with_extension("csv"));

    let rows = converters::parse_xlsx(&input)?;
    let records = missile_launches::extract(&rows, &config)?;
    converters::write_csv(&output, &records)?;

    println!(
        "Successfully converted {} launches from {} to {}",
        records.len(),
        input.display(),
        output.display()
    );
    Ok(())
}

fn handle_show(db: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !db.is_file() {
        return Err(format!("database not found: {}", db.display()).into());
    }
    let store = LaunchStore::open(db)?;
    print_table(&store.sorted_by_distance()?);
    Ok(())
}

/// Relative column widths of the launch table.
const COLUMN_WIDTHS: [usize; 5] = [21, 40, 22, 22, 14];

fn print_table(records: &[Record]) {
    print_line(HEADERS);
    let total = COLUMN_WIDTHS.iter().sum::<usize>() + 2 * (COLUMN_WIDTHS.len() - 1);
    println!("{}", "-".repeat(total));
    for record in records {
        print_line(record.to_columns());
    }
}

fn print_line(cells: [&str; 5]) {
    let line = cells
        .iter()
        .zip(COLUMN_WIDTHS)
        .map(|(cell, width)| format!("{:^width$}", cell, width = width))
        .collect::<Vec<_>>()
        .join("  ");
    println!("{}", line.trim_end());
}
