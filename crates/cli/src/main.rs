// facetgrid CLI - faceted filtering and side-by-side comparison of CSV catalogues

mod exit_codes;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use facetgrid_config::{ConfigError, SchemaConfig};
use facetgrid_engine::{facet_options, Dataset, Explorer, FacetError, FieldKind, Intent, Record, RecordId};
use facetgrid_io::IngestError;

use exit_codes::{
    config_exit_code, facet_exit_code, ingest_exit_code, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "fgrid")]
#[command(about = "Faceted filtering and comparison for CSV catalogues")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// More log output on stderr (-v debug, -vv trace). RUST_LOG wins if set.
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only errors on stderr
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Records matching every selected facet, in file order
    #[command(after_help = "\
Examples:
  fgrid records -d modules.csv -s 'Chipset Vendor=Nordic' -s Certification=FCC
  fgrid records -d modules.csv --all -f json")]
    Records {
        #[command(flatten)]
        data: DataArgs,

        #[arg(long, short = 'f', default_value = "csv")]
        format: TableFormat,

        /// List every record when nothing is selected
        #[arg(long)]
        all: bool,
    },

    /// Values still selectable for one field, given the other selections
    #[command(after_help = "\
Examples:
  fgrid options GPIO -d modules.csv -s 'Chipset Vendor=Nordic'")]
    Options {
        /// Field to list options for
        field: String,

        #[command(flatten)]
        data: DataArgs,

        #[arg(long)]
        json: bool,
    },

    /// Every visible facet with its options and selection marks
    Facets {
        #[command(flatten)]
        data: DataArgs,

        #[arg(long)]
        json: bool,
    },

    /// Pinned records, largest group first
    #[command(after_help = "\
Examples:
  fgrid compare -d modules.csv -p NRF52832__nRF52832 -p CC2640R2F__CC2640")]
    Compare {
        #[command(flatten)]
        data: DataArgs,

        #[arg(long, short = 'f', default_value = "csv")]
        format: TableFormat,
    },

    /// Fields of the data file with their kinds
    Fields {
        #[command(flatten)]
        data: DataArgs,

        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct DataArgs {
    /// CSV/TSV catalogue (delimiter is sniffed unless --delimiter is given)
    #[arg(long, short = 'd', value_name = "FILE")]
    data: PathBuf,

    /// Schema TOML (default: <config dir>/facetgrid/schema.toml, else built-in)
    #[arg(long, value_name = "FILE", env = "FACETGRID_SCHEMA")]
    schema: Option<PathBuf>,

    /// Field delimiter of the data file
    #[arg(long, value_name = "CHAR")]
    delimiter: Option<char>,

    /// Select a facet value; repeat for OR within a field, AND across fields
    #[arg(long, short = 's', value_name = "FIELD=VALUE")]
    select: Vec<String>,

    /// Pin a record for comparison by its identity
    #[arg(long, short = 'p', value_name = "FIRST__SECOND")]
    pin: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum TableFormat {
    Csv,
    Tsv,
    Json,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  facetgrid-engine ", env!("CARGO_PKG_VERSION"),
    )
}

fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Records { data, format, all } => cmd_records(data, format, all),
        Commands::Options { field, data, json } => cmd_options(field, data, json),
        Commands::Facets { data, json } => cmd_facets(data, json),
        Commands::Compare { data, format } => cmd_compare(data, format),
        Commands::Fields { data, json } => cmd_fields(data, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn facet(err: FacetError) -> Self {
        let hint = match &err {
            FacetError::UnknownField(_) => {
                Some("run `fgrid fields --data FILE` to list the available fields".to_string())
            }
            _ => None,
        };
        Self { code: facet_exit_code(&err), message: err.to_string(), hint }
    }

    pub fn config(err: ConfigError) -> Self {
        Self { code: config_exit_code(&err), message: err.to_string(), hint: None }
    }

    pub fn ingest(err: IngestError) -> Self {
        Self { code: ingest_exit_code(&err), message: err.to_string(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// Session setup
// ============================================================================

/// Load schema and data, then replay --select and --pin as intents
fn open(args: &DataArgs) -> Result<Explorer, CliError> {
    let config = SchemaConfig::resolve(args.schema.as_deref()).map_err(CliError::config)?;

    let imported = match args.delimiter {
        Some(c) => {
            let delimiter = ascii_delimiter(c)?;
            facetgrid_io::csv::import_with_delimiter(&args.data, delimiter, &config)
        }
        None => facetgrid_io::csv::import(&args.data, &config),
    };
    let (dataset, _report) = imported.map_err(CliError::ingest)?;

    let mut explorer = Explorer::new(Arc::new(dataset));
    for raw in &args.select {
        let (field, value) = parse_selection(raw)?;
        explorer
            .apply(Intent::select(field, value))
            .map_err(CliError::facet)?;
    }
    for raw in &args.pin {
        let id = parse_identity(raw)?;
        if explorer.dataset().find(&id).is_none() {
            log::warn!("pin {id} matches no record");
        }
        explorer
            .apply(Intent::Pin { id })
            .map_err(CliError::facet)?;
    }
    Ok(explorer)
}

fn ascii_delimiter(c: char) -> Result<u8, CliError> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(CliError::usage(format!("delimiter must be an ASCII character, got '{c}'")))
    }
}

/// `FIELD=VALUE`, split at the first '='
fn parse_selection(raw: &str) -> Result<(&str, &str), CliError> {
    let Some((field, value)) = raw.split_once('=') else {
        return Err(CliError::usage(format!("invalid selection '{raw}'"))
            .with_hint("use FIELD=VALUE, e.g. --select 'Chipset Vendor=Nordic'"));
    };
    let (field, value) = (field.trim(), value.trim());
    if field.is_empty() || value.is_empty() {
        return Err(CliError::usage(format!(
            "invalid selection '{raw}': field and value must be non-empty"
        )));
    }
    Ok((field, value))
}

fn parse_identity(raw: &str) -> Result<RecordId, CliError> {
    RecordId::parse(raw).ok_or_else(|| {
        CliError::usage(format!("invalid identity '{raw}'"))
            .with_hint(format!("use FIRST{}SECOND", RecordId::SEPARATOR))
    })
}

// ============================================================================
// Output helpers
// ============================================================================

fn write_table(dataset: &Dataset, records: &[&Record], format: TableFormat) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let written = match format {
        TableFormat::Csv => facetgrid_io::csv::write_records(&mut handle, dataset, records, b','),
        TableFormat::Tsv => facetgrid_io::csv::write_records(&mut handle, dataset, records, b'\t'),
        TableFormat::Json => facetgrid_io::json::write_records(&mut handle, dataset, records)
            .and_then(|()| writeln!(handle).map_err(|e| IngestError::Io(e.to_string()))),
    };
    written.map_err(|e| CliError::io(e.to_string()))
}

fn write_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value).map_err(|e| CliError::io(e.to_string()))?;
    writeln!(handle).map_err(|e| CliError::io(e.to_string()))
}

// ============================================================================
// records
// ============================================================================

fn cmd_records(args: DataArgs, format: TableFormat, all: bool) -> Result<(), CliError> {
    let explorer = open(&args)?;

    if explorer.filters().is_unfiltered() && !all {
        eprintln!(
            "No filters selected ({} records). Narrow with --select FIELD=VALUE, or pass --all.",
            explorer.dataset().len()
        );
        return Ok(());
    }

    let records = explorer.records().map_err(CliError::facet)?;
    log::info!("{} of {} records match", records.len(), explorer.dataset().len());
    write_table(explorer.dataset(), &records, format)
}

// ============================================================================
// options
// ============================================================================

fn cmd_options(field: String, args: DataArgs, json: bool) -> Result<(), CliError> {
    let explorer = open(&args)?;
    let options = facet_options(explorer.dataset(), explorer.filters(), &field)
        .map_err(CliError::facet)?;

    if json {
        return write_json(&options);
    }
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    for option in &options {
        writeln!(handle, "{}", option.value).map_err(|e| CliError::io(e.to_string()))?;
    }
    Ok(())
}

// ============================================================================
// facets
// ============================================================================

fn cmd_facets(args: DataArgs, json: bool) -> Result<(), CliError> {
    let explorer = open(&args)?;
    let snapshot = explorer.snapshot().map_err(CliError::facet)?;

    if json {
        return write_json(&snapshot);
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let mut out = || -> io::Result<()> {
        if !snapshot.tags.is_empty() {
            let tags: Vec<String> = snapshot
                .tags
                .iter()
                .map(|t| format!("{}={}", t.field, t.value))
                .collect();
            writeln!(handle, "selected: {}", tags.join(", "))?;
        }
        for facet in &snapshot.facets {
            let marker = if facet.active { " *" } else { "" };
            writeln!(handle, "{} ({}){}", facet.field, facet.kind, marker)?;
            for entry in &facet.entries {
                let check = if entry.selected { "x" } else { " " };
                writeln!(handle, "  [{}] {}", check, entry.option.value)?;
            }
        }
        Ok(())
    };
    out().map_err(|e| CliError::io(e.to_string()))
}

// ============================================================================
// compare
// ============================================================================

fn cmd_compare(args: DataArgs, format: TableFormat) -> Result<(), CliError> {
    let explorer = open(&args)?;
    let pinned = explorer.pinned();

    if pinned.is_empty() {
        eprintln!("No records pinned. Pin with --pin FIRST{}SECOND.", RecordId::SEPARATOR);
        return Ok(());
    }
    write_table(explorer.dataset(), &pinned, format)
}

// ============================================================================
// fields
// ============================================================================

#[derive(Serialize)]
struct FieldInfo<'a> {
    name: &'a str,
    kind: FieldKind,
    hidden: bool,
    identity: bool,
    group: bool,
}

fn cmd_fields(args: DataArgs, json: bool) -> Result<(), CliError> {
    let explorer = open(&args)?;
    let dataset = explorer.dataset();
    let schema = dataset.schema();
    let (first, second) = schema.identity();

    let infos: Vec<FieldInfo> = dataset
        .fields()
        .iter()
        .map(|field| FieldInfo {
            name: &field.name,
            kind: field.kind,
            hidden: schema.is_hidden(&field.name),
            identity: field.name == first || field.name == second,
            group: schema.group() == Some(field.name.as_str()),
        })
        .collect();

    if json {
        return write_json(&infos);
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    for info in &infos {
        let mut flags = Vec::new();
        if info.identity {
            flags.push("identity");
        }
        if info.group {
            flags.push("group");
        }
        if info.hidden {
            flags.push("hidden");
        }
        let line = if flags.is_empty() {
            format!("{}\t{}", info.name, info.kind)
        } else {
            format!("{}\t{}\t{}", info.name, info.kind, flags.join(","))
        };
        writeln!(handle, "{}", line).map_err(|e| CliError::io(e.to_string()))?;
    }
    Ok(())
}
