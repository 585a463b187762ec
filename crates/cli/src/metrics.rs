//! Prometheus registry for the command-line runner.
//!
//! A run is a short-lived process, so there is no scrape endpoint. The text
//! exposition is written to a file at the end of the run when
//! `[metrics].path` is configured.

use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use prometheus::{Encoder, Registry, TextEncoder};
use tracing::warn;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    for metric in vidscout_core::metrics::all_metrics() {
        if let Err(e) = registry.register(metric) {
            warn!("Failed to register core metric: {}", e);
        }
    }
    registry
});

/// Encode all metrics in Prometheus text format.
pub fn render() -> Result<String> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&REGISTRY.gather(), &mut buffer)
        .context("Failed to encode metrics")?;
    String::from_utf8(buffer).context("Metrics output is not UTF-8")
}

/// Write the current metrics to `path`, creating parent directories.
pub fn write_to(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {:?}", parent))?;
    }
    std::fs::write(path, render()?).with_context(|| format!("Failed to write {:?}", path))
}
