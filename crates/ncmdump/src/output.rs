//! Terminal output: colored progress on stderr, inventory tables and JSON
//! reports on stdout.
//!
//! Stdout is reserved for configuration text while streaming, so progress
//! always goes to stderr.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};
use url::Url;

use ncmdump_core::{
    Delivery, DeviceOutcome, DeviceRecord, InventorySummary, PipelineObserver, RunReport,
};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether progress output should be colored.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

#[derive(Debug, Clone, Copy)]
enum Tone {
    Alert,
    Info,
    Warn,
}

fn paint(text: &str, tone: Tone, color: bool) -> String {
    if !color {
        return text.to_owned();
    }
    match tone {
        Tone::Alert => text.red().to_string(),
        Tone::Info => text.bright_blue().to_string(),
        Tone::Warn => text.yellow().to_string(),
    }
}

// ── Progress observer ────────────────────────────────────────────────

/// Renders pipeline events as progress lines.
pub struct Progress<W: Write = io::Stderr> {
    out: W,
    color: bool,
    quiet: bool,
}

impl Progress {
    pub fn stderr(color: bool, quiet: bool) -> Self {
        Self::new(io::stderr(), color, quiet)
    }
}

impl<W: Write> Progress<W> {
    pub fn new(out: W, color: bool, quiet: bool) -> Self {
        Self { out, color, quiet }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        if !self.quiet {
            // Progress is best effort; a closed stderr must not end the run.
            let _ = writeln!(self.out, "{text}");
        }
    }

    /// One-line totals after a run.
    pub fn summary(&mut self, report: &RunReport) {
        let text = format!(
            "Retrieved {} of {} devices ({} skipped, {} failed)",
            report.retrieved(),
            report.devices.len(),
            report.skipped(),
            report.failed()
        );
        self.line("");
        self.line(&text);
    }
}

impl<W: Write> PipelineObserver for Progress<W> {
    fn session_established(&mut self, base_url: &Url) {
        self.line(&format!("Login successful for {base_url}"));
    }

    fn inventory_loaded(&mut self, summary: &InventorySummary) {
        let count = summary
            .declared_total
            .clone()
            .unwrap_or_else(|| summary.parsed.to_string());
        let label = paint("Discovered", Tone::Alert, self.color);
        let text = format!("{label} {count} managed devices");
        self.line(&text);
    }

    fn device_discovered(&mut self, device: &DeviceRecord) {
        let text = format!(
            "  {}  {}  {} {}  {}, {}",
            device.display_name(),
            device.address,
            device.vendor,
            device.machine_type,
            device.city,
            device.country
        );
        self.line(&text);
    }

    fn retrieving(&mut self, device: &DeviceRecord) {
        let text = format!("Retrieving config file from {}", device.display_name());
        self.line("");
        let text = paint(&text, Tone::Info, self.color);
        self.line(&text);
    }

    fn device_finished(&mut self, device: &DeviceRecord, outcome: &DeviceOutcome) {
        let name = device.display_name();
        let (text, tone) = match outcome {
            DeviceOutcome::Retrieved {
                delivery: Delivery::File(path),
                ..
            } => (format!("Writing contents to {}", path.display()), Tone::Info),
            DeviceOutcome::Retrieved {
                delivery: Delivery::Stdout,
                ..
            }
            | DeviceOutcome::NoConfigFile => return,
            DeviceOutcome::NoConfigs => {
                self.line("");
                (format!("No config files found on {name}"), Tone::Alert)
            }
            DeviceOutcome::EmptyContent => {
                (format!("No config content returned for {name}"), Tone::Warn)
            }
            DeviceOutcome::Failed { stage, message } => {
                (format!("Could not read {stage} for {name}: {message}"), Tone::Alert)
            }
        };
        let text = paint(&text, tone, self.color);
        self.line(&text);
    }
}

// ── Inventory listing ────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Vendor")]
    vendor: String,
    #[tabled(rename = "Model")]
    machine_type: String,
    #[tabled(rename = "Location")]
    location: String,
}

impl From<&DeviceRecord> for DeviceRow {
    fn from(d: &DeviceRecord) -> Self {
        let location = [d.city.as_str(), d.country.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            id: d.node_id(),
            name: d.name.clone(),
            address: d.address.clone(),
            vendor: d.vendor.clone(),
            machine_type: d.machine_type.clone(),
            location,
        }
    }
}

/// Render the inventory in the chosen format.
pub fn render_devices(format: OutputFormat, devices: &[DeviceRecord]) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => {
            let rows: Vec<DeviceRow> = devices.iter().map(DeviceRow::from).collect();
            Ok(Table::new(rows).with(Style::rounded()).to_string())
        }
        OutputFormat::Json => render_json(devices),
    }
}

/// Pretty-printed JSON.
pub fn render_json<T: Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// Print rendered output to stdout.
pub fn print_output(output: &str) -> Result<(), CliError> {
    if output.is_empty() {
        return Ok(());
    }
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{output}")?;
    Ok(())
}
