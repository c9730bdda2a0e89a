//! tabmask CLI - column redaction for delimited text, JSON records and
//! columnar containers
//!
//! - redact: mask named columns, keeping the input's format
//! - convert: re-encode a payload in the format its output suffix names
//! - inspect: list columns, types and container layout

mod config;

use clap::{Parser, Subcommand, ValueEnum};
use config::{delimiter_byte, Config};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::error::Error;
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tabmask_codec::{
    CellType, CodecSet, ColumnarCodec, ColumnarOptions, Decoded, Layout, OriginHint, TabularModel,
};
use tabmask_io::{
    extract, FieldMask, Locator, MissingFieldPolicy, ObjectStore, OutputSink, Payload,
    PayloadKind, RedactionRequest, RedactionResult, Redactor,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tabmask")]
#[command(about = "Redact PII columns from CSV, JSON and columnar files")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./tabmask.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace every value of the named columns with ***
    ///
    /// Examples:
    ///   tabmask redact students.csv --field name --field email_address
    ///   tabmask redact s3://bucket/new_data/file1.json -f name -o out.json
    ///   tabmask redact --request '{"file_to_obfuscate": "a.csv", "pii_fields": ["name"]}'
    Redact {
        /// Path, file:// or s3://bucket/key locator
        #[arg(required_unless_present = "request")]
        locator: Option<String>,
        /// Column to redact (repeatable)
        #[arg(long = "field", short = 'f')]
        fields: Vec<String>,
        /// JSON request document naming the file and fields
        #[arg(long, conflicts_with_all = ["locator", "fields"])]
        request: Option<String>,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Delimiter for text input
        #[arg(long)]
        delimiter: Option<char>,
        /// Override the kind implied by the locator suffix
        #[arg(long)]
        kind: Option<String>,
        /// Fail when a requested field is missing
        #[arg(long)]
        reject_missing: bool,
        /// Show a progress spinner
        #[arg(long)]
        progress: bool,
    },
    /// Re-encode a payload; each side's format comes from its suffix
    Convert {
        /// Input locator
        input: String,
        /// Output file
        #[arg(short, long)]
        output: PathBuf,
        /// Delimiter for text input and output
        #[arg(long)]
        delimiter: Option<char>,
        /// Zstd level for columnar output (0 disables compression)
        #[arg(long)]
        zstd_level: Option<u8>,
        /// Show a progress spinner
        #[arg(long)]
        progress: bool,
    },
    /// Show columns, types and row counts
    Inspect {
        /// Input locator
        locator: String,
        /// Output format (table, json)
        #[arg(long, value_enum, default_value_t = InspectFormat::Table)]
        format: InspectFormat,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum InspectFormat {
    Table,
    Json,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    init_logging(&config.log.level);
    tracing::debug!(path = ?cli.config, "configuration loaded");

    match cli.command {
        Commands::Redact {
            locator,
            fields,
            request,
            output,
            delimiter,
            kind,
            reject_missing,
            progress,
        } => {
            let (locator, mask) = match request {
                Some(doc) => {
                    let request = RedactionRequest::from_json(&doc)?;
                    (request.locator()?.to_string(), request.mask())
                }
                None => (
                    locator.unwrap_or_default(),
                    fields.into_iter().collect::<FieldMask>(),
                ),
            };
            handle_redact(
                &config,
                &locator,
                &mask,
                output,
                delimiter,
                kind,
                reject_missing,
                progress,
            )?;
        }
        Commands::Convert {
            input,
            output,
            delimiter,
            zstd_level,
            progress,
        } => {
            handle_convert(&config, &input, output, delimiter, zstd_level, progress)?;
        }
        Commands::Inspect { locator, format } => {
            handle_inspect(&config, &locator, format)?;
        }
    }

    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}

/// Fetch `locator`; an explicit kind skips suffix detection
fn load_payload(
    config: &Config,
    locator: &str,
    kind: Option<&str>,
    delimiter: Option<char>,
) -> Result<Payload, Box<dyn Error>> {
    let store = config.store();
    let (kind, data) = match kind {
        Some(tag) => {
            let kind = tag.parse::<PayloadKind>()?;
            (kind, store.fetch(&locator.parse::<Locator>()?)?)
        }
        None => {
            let payload = extract(locator, &store)?;
            (payload.kind(), payload.data().clone())
        }
    };
    let delimiter = match delimiter {
        Some(c) => delimiter_byte(c)?,
        None => config.delimiter()?,
    };
    Ok(Payload::from_kind(kind, data, delimiter))
}

#[allow(clippy::too_many_arguments)]
fn handle_redact(
    config: &Config,
    locator: &str,
    mask: &FieldMask,
    output: Option<PathBuf>,
    delimiter: Option<char>,
    kind: Option<String>,
    reject_missing: bool,
    show_progress: bool,
) -> Result<(), Box<dyn Error>> {
    let start = Instant::now();
    let payload = load_payload(config, locator, kind.as_deref(), delimiter)?;

    let mut options = config.redact_options();
    if reject_missing {
        options.missing_fields = MissingFieldPolicy::Reject;
    }
    let redactor = Redactor::new(options);

    let mut progress_bar = show_progress.then(|| create_spinner("Redacting"));
    let result = redactor.redact(&payload, mask);
    let elapsed = start.elapsed();
    if let Some(pb) = progress_bar.take() {
        match &result {
            Ok(result) => pb.finish_with_message(format!(
                "Redacted {} rows in {:.2?}",
                result.summary.rows, elapsed
            )),
            Err(_) => pb.abandon_with_message("Redaction failed"),
        }
    }
    let result = result?;

    let mut sink = match &output {
        Some(path) => OutputSink::Path(path.clone()),
        None => OutputSink::Stdout,
    };
    sink.write(&result.payload)?;

    report_redact_summary(&result, output.as_ref(), elapsed)?;
    Ok(())
}

fn report_redact_summary(
    result: &RedactionResult,
    output: Option<&PathBuf>,
    elapsed: Duration,
) -> Result<(), Box<dyn Error>> {
    let mut stderr = std::io::stderr().lock();
    for finding in &result.findings {
        let level = if finding.is_error() { "warning" } else { "note" };
        writeln!(&mut stderr, "{}: {}", level, finding)?;
    }
    let masked = if result.summary.masked_columns.is_empty() {
        "none".to_string()
    } else {
        result.summary.masked_columns.join(", ")
    };
    writeln!(
        &mut stderr,
        "Redacted {} {} (rows: {}, columns: {}, masked: {}, bytes: {}, elapsed: {:.2?})",
        result.kind(),
        output
            .map(|path| format!("to {}", path.display()))
            .unwrap_or_else(|| "to stdout".to_string()),
        result.summary.rows,
        result.summary.columns,
        masked,
        result.data().len(),
        elapsed
    )?;
    Ok(())
}

fn handle_convert(
    config: &Config,
    input: &str,
    output: PathBuf,
    delimiter: Option<char>,
    zstd_level: Option<u8>,
    show_progress: bool,
) -> Result<(), Box<dyn Error>> {
    let start = Instant::now();
    let payload = load_payload(config, input, None, delimiter)?;
    let target = output
        .to_str()
        .ok_or("output path is not valid UTF-8")?
        .parse::<Locator>()?
        .kind()?;

    let compression = match zstd_level {
        Some(0) => tabmask_codec::Compression::None,
        Some(level) => tabmask_codec::Compression::Zstd(level),
        None => config.compression(),
    };
    let codecs = CodecSet::standard(ColumnarOptions {
        compression,
        ..ColumnarOptions::default()
    });

    let mut progress_bar = show_progress.then(|| create_spinner("Converting"));
    let Decoded { model, layout } = codecs.read(&payload)?;
    let layout = target_layout(&layout, target, config, delimiter, compression)?;
    let converted = codecs.write(&model, &layout)?;
    OutputSink::Path(output.clone()).write(&converted)?;

    let elapsed = start.elapsed();
    if let Some(pb) = progress_bar.take() {
        pb.finish_with_message(format!(
            "Converted {} rows in {:.2?}",
            model.row_count(),
            elapsed
        ));
    }
    writeln!(
        std::io::stderr().lock(),
        "Converted {} to {} {} (rows: {}, columns: {}, bytes: {} -> {}, elapsed: {:.2?})",
        payload.kind(),
        target,
        output.display(),
        model.row_count(),
        model.column_count(),
        payload.len(),
        converted.len(),
        elapsed
    )?;
    Ok(())
}

/// Keep the source layout when the kind is unchanged, otherwise start fresh
fn target_layout(
    source: &Layout,
    target: PayloadKind,
    config: &Config,
    delimiter: Option<char>,
    compression: tabmask_codec::Compression,
) -> Result<Layout, Box<dyn Error>> {
    if source.kind() == target {
        return Ok(match source {
            Layout::ColumnarBinary {
                origin, metadata, ..
            } => Layout::ColumnarBinary {
                compression,
                origin: *origin,
                metadata: metadata.clone(),
            },
            other => other.clone(),
        });
    }

    let delimiter = match delimiter {
        Some(c) => delimiter_byte(c)?,
        None => config.delimiter()?,
    };
    Ok(match Layout::fresh(target, delimiter, compression) {
        Layout::ColumnarBinary {
            compression,
            metadata,
            ..
        } => Layout::ColumnarBinary {
            compression,
            origin: match source.kind() {
                PayloadKind::Text => OriginHint::Text,
                PayloadKind::RecordList => OriginHint::RecordList,
                PayloadKind::ColumnarBinary => OriginHint::Unknown,
            },
            metadata,
        },
        other => other,
    })
}

fn handle_inspect(
    config: &Config,
    locator: &str,
    format: InspectFormat,
) -> Result<(), Box<dyn Error>> {
    let payload = load_payload(config, locator, None, None)?;
    let Decoded { model, layout } =
        CodecSet::standard(ColumnarOptions::default()).read(&payload)?;

    let container = match &payload {
        Payload::ColumnarBinary { data } => Some(ColumnarCodec::default().inspect(data)?),
        _ => None,
    };

    let stdout = std::io::stdout();
    let mut writer = stdout.lock();
    match format {
        InspectFormat::Table => {
            writeln!(
                writer,
                "Kind: {}\nRows: {}\nColumns: {}\nBytes: {}",
                payload.kind(),
                model.row_count(),
                model.column_count(),
                payload.len()
            )?;
            if let Layout::ColumnarBinary {
                compression,
                origin,
                metadata,
            } = &layout
            {
                writeln!(
                    writer,
                    "Compression: {:?}\nOrigin: {:?}\nMetadata: {} bytes",
                    compression,
                    origin,
                    metadata.len()
                )?;
            }
            writeln!(writer)?;
            writeln!(writer, "Column\tType\tNulls\tSize")?;
            for (index, column) in model.columns().iter().enumerate() {
                let size = container
                    .as_ref()
                    .and_then(|info| info.directory.entries.get(index))
                    .map(|entry| entry.segment_compressed_len.to_string())
                    .unwrap_or_else(|| "-".to_string());
                writeln!(
                    writer,
                    "{}\t{}\t{}\t{}",
                    column.name(),
                    type_name(column.declared_type()),
                    null_count(&model, index),
                    size
                )?;
            }
        }
        InspectFormat::Json => {
            let columns: Vec<_> = model
                .columns()
                .iter()
                .enumerate()
                .map(|(index, column)| {
                    let entry = container
                        .as_ref()
                        .and_then(|info| info.directory.entries.get(index));
                    json!({
                        "name": column.name(),
                        "type": type_name(column.declared_type()),
                        "nulls": null_count(&model, index),
                        "compressed_size": entry.map(|e| e.segment_compressed_len),
                        "uncompressed_size": entry.map(|e| e.segment_uncompressed_len),
                    })
                })
                .collect();
            let report = json!({
                "kind": payload.kind(),
                "rows": model.row_count(),
                "bytes": payload.len(),
                "columns": columns,
            });
            serde_json::to_writer_pretty(&mut writer, &report)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

fn type_name(declared: Option<CellType>) -> &'static str {
    match declared {
        Some(CellType::Null) => "null",
        Some(CellType::Bool) => "bool",
        Some(CellType::Int) => "int",
        Some(CellType::UInt) => "uint",
        Some(CellType::Float) => "float",
        Some(CellType::Text) => "text",
        None => "mixed",
    }
}

fn null_count(model: &TabularModel, index: usize) -> usize {
    model.columns()[index]
        .cells()
        .iter()
        .filter(|cell| matches!(cell, tabmask_codec::Cell::Null))
        .count()
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
