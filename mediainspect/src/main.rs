mod cli;
mod render;

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use mediaconfig::Config;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use cli::{Args, OutputFormat};
use render::Document;

fn main() -> Result<()> {
    let args = Args::parse();

    let (config, load_error) = load_config(args.config.as_deref())?;

    init_logging(&config.get_log_min_level());
    match (config.file_path(), load_error) {
        (_, Some(err)) => warn!(error = %err, "Cannot load configuration, using defaults"),
        (Some(path), None) => info!(config = %path, "Configuration loaded"),
        (None, None) => debug!("No configuration directory, using defaults"),
    }

    let format = match args.format {
        Some(format) => format,
        None => {
            let configured = config.get_output_format();
            OutputFormat::from_config(&configured).unwrap_or_else(|| {
                warn!(format = %configured, "Unknown output format in config, using markdown");
                OutputFormat::Markdown
            })
        }
    };
    let audio_only = args.audio_only || config.get_audio_only();

    let mut documents = Vec::new();
    for input in args.inputs() {
        let mut doc = read_document(&input)?;
        if audio_only {
            let before = doc.items.len();
            doc.items.retain(|item| item.has_audio());
            debug!(
                source = %doc.source,
                dropped = before - doc.items.len(),
                "Filtered items without audio"
            );
        }
        documents.push(doc);
    }

    let output = render::render(format, &documents, &config.get_preferred_mime_types())?;
    io::stdout()
        .lock()
        .write_all(output.as_bytes())
        .context("Failed to write output")?;

    Ok(())
}

/// Loads the configuration from `explicit` or from an existing config
/// directory. Nothing is created when there is none: the embedded defaults
/// are used instead. A load failure is returned alongside the defaults so it
/// can be logged once logging is set up.
fn load_config(explicit: Option<&Path>) -> Result<(Config, Option<anyhow::Error>)> {
    let dir: Option<PathBuf> = match explicit {
        Some(dir) => Some(dir.to_path_buf()),
        None => Config::existing_config_dir().map(PathBuf::from),
    };

    let Some(dir) = dir else {
        return Ok((Config::load_defaults()?, None));
    };

    match Config::load_config(&dir.to_string_lossy()) {
        Ok(config) => Ok((config, None)),
        Err(err) => {
            let err = err.context(format!("config directory {}", dir.display()));
            Ok((Config::load_defaults()?, Some(err)))
        }
    }
}

/// Logs to stderr, `RUST_LOG` taking precedence over the configured level
fn init_logging(min_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(min_level.to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_document(path: &Path) -> Result<Document> {
    let (source, xml) = if path == Path::new("-") {
        let mut xml = String::new();
        io::stdin()
            .read_to_string(&mut xml)
            .context("Failed to read stdin")?;
        ("<stdin>".to_string(), xml)
    } else {
        let xml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        (path.display().to_string(), xml)
    };

    let items = mediaitem::parse_items(&xml)
        .with_context(|| format!("Failed to parse DIDL-Lite from {}", source))?;
    info!(source = %source, items = items.len(), "Document parsed");

    Ok(Document { source, items })
}
