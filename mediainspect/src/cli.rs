use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Prints the media items found in DIDL-Lite documents
#[derive(Parser, Debug)]
#[command(name = "mediainspect", version, about, long_about = None)]
pub struct Args {
    /// DIDL-Lite files to read. `-` or no file reads stdin.
    pub files: Vec<PathBuf>,

    /// Output format, defaults to `inspect.format` from the configuration
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Configuration directory
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Only keep items having an audio resource
    #[arg(short, long)]
    pub audio_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Markdown,
    Json,
    Yaml,
    Didl,
}

impl OutputFormat {
    /// Reads a format name from the configuration, case-insensitively
    pub fn from_config(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name.trim(), true).ok()
    }
}

impl Args {
    /// Input names, with stdin standing in for an empty list
    pub fn inputs(&self) -> Vec<PathBuf> {
        if self.files.is_empty() {
            vec![PathBuf::from("-")]
        } else {
            self.files.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_config() {
        assert_eq!(OutputFormat::from_config("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_config("DIDL"), Some(OutputFormat::Didl));
        assert_eq!(OutputFormat::from_config(" yaml "), Some(OutputFormat::Yaml));
        assert_eq!(OutputFormat::from_config("html"), None);
    }

    #[test]
    fn test_parse_arguments() {
        let args = Args::try_parse_from([
            "mediainspect",
            "--format",
            "didl",
            "--audio-only",
            "a.xml",
            "-",
        ])
        .unwrap();

        assert_eq!(args.format, Some(OutputFormat::Didl));
        assert!(args.audio_only);
        assert_eq!(args.inputs(), [PathBuf::from("a.xml"), PathBuf::from("-")]);
    }

    #[test]
    fn test_no_file_reads_stdin() {
        let args = Args::try_parse_from(["mediainspect"]).unwrap();
        assert_eq!(args.format, None);
        assert_eq!(args.inputs(), [PathBuf::from("-")]);
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!(Args::try_parse_from(["mediainspect", "-f", "html"]).is_err());
    }
}
