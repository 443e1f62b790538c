use clap::Parser;

use crate::upload::{DEFAULT_MAX_BYTES, DEFAULT_MAX_CHARS, Limits};

#[derive(Parser, Debug)]
#[command(name = "hwpx-text")]
#[command(version)]
#[command(about = "Extract plain text from HWPX documents", long_about = None)]
#[command(after_help = "Examples:\n  \
  hwpx-text 가정통신문.hwpx              print the document text\n  \
  hwpx-text -l form.hwpx               list local entries of the package\n  \
  hwpx-text --json https://example.com/form.hwpx   JSON envelope for a remote file")]
pub struct Cli {
    /// HWPX file path or HTTP URL
    #[arg(value_name = "FILE")]
    pub file: String,

    /// List local entries (short format)
    #[arg(short = 'l')]
    pub list: bool,

    /// List verbosely
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// Print a JSON envelope instead of plain text
    #[arg(long)]
    pub json: bool,

    /// File name used for format detection (defaults to the name in FILE)
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Maximum upload size in bytes
    #[arg(long, value_name = "BYTES", env = "HWPX_TEXT_MAX_BYTES", default_value_t = DEFAULT_MAX_BYTES)]
    pub max_bytes: u64,

    /// Maximum number of extracted characters to output
    #[arg(long, value_name = "CHARS", env = "HWPX_TEXT_MAX_CHARS", default_value_t = DEFAULT_MAX_CHARS)]
    pub max_chars: usize,
}

impl Cli {
    pub fn is_quiet(&self) -> bool {
        self.quiet > 0 || self.json
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }

    pub fn limits(&self) -> Limits {
        Limits {
            max_bytes: self.max_bytes,
            max_chars: self.max_chars,
        }
    }

    /// Default tracing filter when `RUST_LOG` is unset
    pub fn log_level(&self) -> &'static str {
        if self.is_very_quiet() {
            "off"
        } else if self.quiet > 0 {
            "error"
        } else {
            "warn"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["hwpx-text", "letter.hwpx"]).unwrap();
        assert_eq!(cli.limits(), Limits::default());
        assert_eq!(cli.log_level(), "warn");
        assert!(!cli.is_quiet());
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "hwpx-text",
            "-qq",
            "--json",
            "--max-chars",
            "500",
            "--name",
            "form.hwpx",
            "upload.bin",
        ])
        .unwrap();
        assert!(cli.is_quiet());
        assert_eq!(cli.log_level(), "off");
        assert_eq!(cli.limits().max_chars, 500);
        assert_eq!(cli.name.as_deref(), Some("form.hwpx"));
    }
}
