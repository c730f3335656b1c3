// ── Run reporting ──

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::device::DeviceRecord;
use crate::sink::Delivery;

/// Inventory totals: what the console declared versus what was parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventorySummary {
    pub declared_total: Option<String>,
    pub parsed: usize,
    /// Declared total exceeds the single page that was read.
    pub truncated: bool,
}

/// What happened to one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeviceOutcome {
    /// Config text was extracted and handed to the sink.
    Retrieved { bytes: usize, delivery: Delivery },
    /// The console stores no configs for this node.
    NoConfigs,
    /// The config list was empty or its id was the `{}` sentinel.
    NoConfigFile,
    /// The config page held no qualifying `<textarea>`.
    EmptyContent,
    /// A per-node request failed; the run moved on.
    Failed { stage: Stage, message: String },
}

/// Per-node step at which a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ConfigCount,
    ConfigFileId,
    ConfigBody,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ConfigCount => "config count",
            Self::ConfigFileId => "config file id",
            Self::ConfigBody => "config body",
        })
    }
}

/// Result of a full run, in inventory order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub devices: Vec<(DeviceRecord, DeviceOutcome)>,
}

impl RunReport {
    pub fn push(&mut self, device: DeviceRecord, outcome: DeviceOutcome) {
        self.devices.push((device, outcome));
    }

    pub fn retrieved(&self) -> usize {
        self.count(|o| matches!(o, DeviceOutcome::Retrieved { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| {
            matches!(
                o,
                DeviceOutcome::NoConfigs | DeviceOutcome::NoConfigFile | DeviceOutcome::EmptyContent
            )
        })
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, DeviceOutcome::Failed { .. }))
    }

    /// Files written by a [`FileSink`](crate::FileSink), in order.
    pub fn written_files(&self) -> Vec<PathBuf> {
        self.devices
            .iter()
            .filter_map(|(_, outcome)| match outcome {
                DeviceOutcome::Retrieved {
                    delivery: Delivery::File(path),
                    ..
                } => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    fn count(&self, pred: impl Fn(&DeviceOutcome) -> bool) -> usize {
        self.devices.iter().filter(|(_, o)| pred(o)).count()
    }
}
