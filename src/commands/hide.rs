//! Hide command - seal a message or file inside a cover image.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use log::{info, warn};

use veilpix::config::Settings;
use veilpix::payload::{mime_from_path, to_data_uri};
use veilpix::stego::image::{open, save};
use veilpix::{hide, required_bits, OutputFormat};

use super::CommandExecutor;

/// Hide a text message or a file inside a cover image.
///
/// The payload is encrypted with the password before it touches the pixels.
/// Files are tagged with their MIME type so `extract` can restore them.
/// Output is always lossless (PNG or BMP).
#[derive(Args, Debug)]
pub struct HideCommand {
    /// Cover image (any format readable by the image decoder)
    #[arg(short, long)]
    pub cover: PathBuf,

    /// Text message to hide (mutually exclusive with --file)
    /// Reads from stdin when neither --message nor --file is given
    #[arg(short, long, conflicts_with = "file")]
    pub message: Option<String>,

    /// File to hide (image, document, anything)
    #[arg(short, long, conflicts_with = "message")]
    pub file: Option<PathBuf>,

    /// Password protecting the payload
    #[arg(short, long)]
    pub password: String,

    /// Where to write the stego image
    #[arg(short, long)]
    pub output: PathBuf,

    /// Output format: png or bmp (defaults to the configured format)
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// Overwrite the output file if it exists
    #[arg(long)]
    pub force: bool,
}

impl CommandExecutor for HideCommand {
    fn execute(&self, settings: &Settings) -> Result<()> {
        if self.output.exists() && !(self.force || settings.overwrite) {
            bail!(
                "{} already exists (use --force to overwrite)",
                self.output.display()
            );
        }

        let mut cover = open(&self.cover)
            .with_context(|| format!("Failed to load cover image {}", self.cover.display()))?;
        info!(
            "Cover {}: {}x{}, {} bits of capacity",
            self.cover.display(),
            cover.width(),
            cover.height(),
            cover.capacity_bits()
        );

        let payload = self.read_payload()?;
        let needed = required_bits(payload.len())
            .with_context(|| format!("A {}-byte payload is too large to hide", payload.len()))?;
        info!("Payload: {} bytes, needs {} bits", payload.len(), needed);

        hide(&mut cover, &payload, &self.password).context("Failed to hide payload")?;

        let format = self.format.unwrap_or(settings.output_format);
        warn_on_extension_mismatch(&self.output, format);

        save(&cover, &self.output, format)
            .with_context(|| format!("Failed to write {}", self.output.display()))?;

        println!(
            "Hid {} bytes in {} ({} bits of {} used)",
            payload.len(),
            self.output.display(),
            needed,
            cover.capacity_bits()
        );

        Ok(())
    }
}

impl HideCommand {
    /// Text goes in as UTF-8; files go in as a data URI.
    fn read_payload(&self) -> Result<Vec<u8>> {
        if let Some(file_path) = &self.file {
            let data = std::fs::read(file_path)
                .with_context(|| format!("Failed to read file {}", file_path.display()))?;

            let mime = mime_from_path(file_path);
            info!("Hiding file {} as {}", file_path.display(), mime);
            return Ok(to_data_uri(&data, mime).into_bytes());
        }

        let message = match &self.message {
            Some(m) => m.clone(),
            None => {
                eprintln!("Reading message from stdin (Ctrl+D to finish):");
                let mut buffer = String::new();
                io::stdin()
                    .read_to_string(&mut buffer)
                    .context("Failed to read message from stdin")?;
                buffer.trim_end_matches(['\r', '\n']).to_string()
            }
        };

        if message.is_empty() {
            warn!("Hiding an empty message");
        }

        Ok(message.into_bytes())
    }
}

fn warn_on_extension_mismatch(path: &Path, format: OutputFormat) {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    if ext != format.extension() {
        warn!(
            "Writing {} data to {} (extension does not match)",
            format,
            path.display()
        );
    }
}
