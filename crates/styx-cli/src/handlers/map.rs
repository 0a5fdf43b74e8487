//! Map command handler

use super::Sources;
use crate::cli::{MapArgs, OutputFormat};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::{OutputFormatter, OutputWriter};
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Handle the map command
#[instrument(skip_all, fields(type_name = %args.type_name, input = %args.input.display()))]
pub fn handle_map(args: MapArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let timer = Timer::with_details("map_command", &args.type_name);
    let sources = Sources::resolve(args.definitions.as_deref(), args.manifest.as_deref(), config);

    let registry = sources.build_registry()?;
    let source = read_source(&args.input)?;

    let mapped = {
        let _mapping = Timer::new("mapping");
        registry.map(&args.type_name, &source)?
    };
    info!(type_name = %args.type_name, "Source mapped");

    match &args.save_to {
        Some(path) => {
            let content = match output.format() {
                // Files always get a readable document
                OutputFormat::Human | OutputFormat::Json => OutputFormat::JsonPretty.format(&mapped)?,
                format => format.format(&mapped)?,
            };
            std::fs::write(path, content)?;
            output.success(&format!("✓ Output saved to {}", path.display()))?;
        }
        None => output.data(&mapped)?,
    }

    timer.finish();
    Ok(())
}

/// Read the JSON source object from a file, or stdin for `-`
fn read_source(input: &Path) -> Result<Value> {
    let (content, origin) = if input == Path::new("-") {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        (content, "stdin".to_string())
    } else {
        if !input.exists() {
            return Err(Error::FileNotFound {
                path: input.to_path_buf(),
            });
        }
        (std::fs::read_to_string(input)?, input.display().to_string())
    };
    debug!(origin = %origin, bytes = content.len(), "Read source object");

    serde_json::from_str(&content).map_err(|e| Error::InvalidFormat {
        path: input.to_path_buf(),
        expected: "JSON".to_string(),
        message: e.to_string(),
    })
}
