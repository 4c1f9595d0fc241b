//! Extract command - recover a hidden message or file from a stego image.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use log::info;

use veilpix::config::Settings;
use veilpix::payload::extension_for_mime;
use veilpix::stego::image::open;
use veilpix::{classify, extract_raw, Payload};

use super::CommandExecutor;

/// Base name for extracted files when no --output is given.
const DEFAULT_BLOB_NAME: &str = "secret";

/// Extract a hidden payload from a stego image.
///
/// Text is printed to stdout unless --output is given.
/// Files are written to --output, or to `secret.<ext>` in the configured
/// output directory.
#[derive(Args, Debug)]
pub struct ExtractCommand {
    /// Stego image produced by `veilpix hide`
    #[arg(short, long)]
    pub image: PathBuf,

    /// Password used when hiding
    #[arg(short, long)]
    pub password: String,

    /// Output file for the recovered payload
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Overwrite the output file if it exists
    #[arg(long)]
    pub force: bool,
}

impl CommandExecutor for ExtractCommand {
    fn execute(&self, settings: &Settings) -> Result<()> {
        let stego = open(&self.image)
            .with_context(|| format!("Failed to load image {}", self.image.display()))?;

        let raw = extract_raw(&stego, &self.password)
            .with_context(|| format!("Failed to extract from {}", self.image.display()))?;

        match classify(&raw) {
            // Files get the exact decrypted bytes; stdout gets the lossy text
            Payload::Text(text) => match &self.output {
                Some(path) => {
                    self.write_output(path, &raw, settings)?;
                    eprintln!("Wrote {} bytes of text to {}", raw.len(), path.display());
                }
                None => println!("{}", text),
            },
            Payload::TypedBlob { mime, data } => {
                let path = self.output.clone().unwrap_or_else(|| {
                    settings
                        .output_dir
                        .join(format!("{}.{}", DEFAULT_BLOB_NAME, extension_for_mime(&mime)))
                });
                self.write_output(&path, &data, settings)?;
                println!("Recovered {} ({} bytes) to {}", mime, data.len(), path.display());
            }
        }

        Ok(())
    }
}

impl ExtractCommand {
    fn write_output(&self, path: &Path, data: &[u8], settings: &Settings) -> Result<()> {
        if path.exists() && !(self.force || settings.overwrite) {
            bail!("{} already exists (use --force to overwrite)", path.display());
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        std::fs::write(path, data)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Wrote {} bytes to {}", data.len(), path.display());
        Ok(())
    }
}
