//! Main entry point for the hwpx-text CLI application.
//!
//! Loads an HWPX document from the local filesystem or an HTTP URL and
//! prints its text, its local entries, or a JSON envelope.

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use hwpx_text::{
    Cli, Envelope, HttpSource, LocalSource, Prepared, Source, Upload, UploadKind, ZipParser,
    prepare,
};

/// Application entry point.
///
/// Parses command-line arguments, sets up logging and dispatches to the
/// appropriate handler based on whether the input is a local file or URL.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let source: Box<dyn Source> = if HttpSource::is_http_url(&cli.file) {
        // Handle remote file via HTTP
        Box::new(HttpSource::new(cli.file.clone())?)
    } else {
        Box::new(LocalSource::new(&cli.file))
    };

    let mut upload = source
        .load(cli.max_bytes)
        .await
        .with_context(|| format!("failed to load {}", source.name()))?;

    if let Some(name) = &cli.name {
        upload.file_name = name.clone();
    }

    // List mode: display package entries and exit
    if cli.list || cli.verbose {
        list_entries(&upload, cli.verbose);
        return Ok(());
    }

    process_upload(&upload, &cli)
}

/// Validate the upload, extract its text and print the outcome.
///
/// This function handles both output modes:
/// - Plain mode: extracted text to stdout, notes to stderr
/// - JSON mode (`--json`): the response envelope, for success and failure
///
/// # Arguments
///
/// * `upload` - The loaded file, with the name used for format detection
/// * `cli` - Parsed command-line arguments
///
/// # Returns
///
/// Returns `Ok(())` on success. A rejected upload is an error in plain
/// mode and exits with a status-specific code in JSON mode.
fn process_upload(upload: &Upload, cli: &Cli) -> Result<()> {
    let kind = UploadKind::from_file_name(&upload.file_name);
    let result = prepare(upload, &cli.limits());

    if cli.json {
        println!("{}", Envelope::new(upload, &kind, &result).to_json()?);
        if let Err(e) = &result {
            std::process::exit(exit_code(e.status()));
        }
        return Ok(());
    }

    match result {
        Ok(Prepared::Text { text, truncated, chars }) => {
            println!("{}", text);
            if truncated && !cli.is_quiet() {
                eprintln!(
                    "\n(text truncated to {} of {} characters)",
                    cli.max_chars, chars
                );
            }
            Ok(())
        }
        Ok(Prepared::Raw(bytes)) => {
            if !cli.is_quiet() {
                eprintln!(
                    "{}: {} file passed through unchanged ({})",
                    upload.file_name,
                    kind.as_str(),
                    format_size(bytes.len() as u64)
                );
            }
            Ok(())
        }
        Err(e) => bail!("{} ({}): {}", upload.file_name, e.status(), e),
    }
}

/// List local entries of the package.
///
/// Supports two output formats:
/// - Simple format (`-l`): Just entry names, one per line
/// - Verbose format (`-v`): Table with sizes, method and timestamps
///
/// Listing stops where the local-header walk stops, so a truncated
/// package shows only its readable leading entries.
///
/// # Arguments
///
/// * `upload` - The loaded package bytes
/// * `verbose` - If true, display detailed information in table format
fn list_entries(upload: &Upload, verbose: bool) {
    let parser = ZipParser::new(&upload.bytes);

    if verbose {
        println!(
            "{:>10}  {:<7}  {:>10}  {:>10}  {:>5}  Name",
            "Length", "Method", "Size", "Date", "Time"
        );
        println!("{}", "-".repeat(70));
    }

    let mut total_uncompressed = 0u64;
    let mut total_compressed = 0u64;
    let mut file_count = 0usize;

    for entry in parser.entries() {
        if !verbose {
            println!("{}", entry.file_name);
            continue;
        }

        let header = &entry.header;
        let (year, month, day) = header.mod_date();
        let (hour, minute, _second) = header.mod_time();
        println!(
            "{:>10}  {:<7}  {:>10}  {:04}-{:02}-{:02}  {:02}:{:02}  {}",
            header.uncompressed_size,
            header.compression_method.label(),
            header.compressed_size,
            year,
            month,
            day,
            hour,
            minute,
            entry.file_name
        );

        if !entry.is_directory() {
            total_uncompressed += header.uncompressed_size as u64;
            total_compressed += header.compressed_size as u64;
            file_count += 1;
        }
    }

    if verbose {
        println!("{}", "-".repeat(70));
        println!(
            "{:>10}  {:<7}  {:>10}  {:>19}  {} files",
            total_uncompressed, "", total_compressed, "", file_count
        );
    }
}

/// Map an HTTP-style status to a process exit code.
///
/// # Arguments
///
/// * `status` - The status from [`UploadError::status`](hwpx_text::UploadError::status)
///
/// # Returns
///
/// `3` for 413, `4` for 415, `2` for any other rejection.
fn exit_code(status: u16) -> i32 {
    match status {
        413 => 3,
        415 => 4,
        _ => 2,
    }
}

/// Format a byte size into a human-readable string.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(format_size(500), "500 bytes");
/// assert_eq!(format_size(1536), "1.50 KB");
/// ```
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
