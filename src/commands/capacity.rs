//! Capacity command - show how much a cover image can hold.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use veilpix::config::Settings;
use veilpix::stego::image::open;
use veilpix::stego::HEADER_BITS;
use veilpix::{max_payload_len, required_bits};

use super::CommandExecutor;

/// Show the hiding capacity of a cover image.
#[derive(Args, Debug)]
pub struct CapacityCommand {
    /// Cover image to analyze
    #[arg(short, long)]
    pub cover: PathBuf,

    /// Check whether a payload of this many bytes would fit
    #[arg(long)]
    pub payload_bytes: Option<usize>,
}

impl CommandExecutor for CapacityCommand {
    fn execute(&self, _settings: &Settings) -> Result<()> {
        let cover = open(&self.cover)
            .with_context(|| format!("Failed to load cover image {}", self.cover.display()))?;

        let capacity = cover.capacity_bits();

        println!("Image:      {}x{} ({} pixels)", cover.width(), cover.height(), cover.pixel_count());
        println!("Header:     {} bits", HEADER_BITS);
        println!("Capacity:   {} bits ({} characters)", capacity, cover.max_message_len());

        match max_payload_len(capacity) {
            Some(n) => println!("Max payload: {} bytes after encryption overhead", n),
            None => println!("Max payload: none (image too small for an envelope)"),
        }

        if let Some(size) = self.payload_bytes {
            println!("{}", fit_report(size, capacity));
        }

        Ok(())
    }
}

/// One-line verdict on whether `size` payload bytes fit in `capacity` bits.
fn fit_report(size: usize, capacity: usize) -> String {
    match required_bits(size) {
        Some(needed) if needed <= capacity => {
            format!("A {}-byte payload fits ({} bits needed)", size, needed)
        }
        Some(needed) => format!(
            "A {}-byte payload does NOT fit ({} bits needed, {} short)",
            size,
            needed,
            needed - capacity
        ),
        None => format!(
            "A {}-byte payload does NOT fit (bit count overflows, {} bits available)",
            size, capacity
        ),
    }
}
