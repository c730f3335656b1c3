// ── Retrieval pipeline ──
//
// Session → inventory → per node: count → file id → body → sink.
// Login and inventory failures end the run; anything that goes wrong for
// a single node is recorded as that node's outcome and the loop moves on.
// Sink errors are the exception: a failed write ends the run.

use secrecy::SecretString;
use tracing::{debug, info, warn};
use url::Url;

use ncmdump_api::{
    ColumnLayout, ConsoleClient, ConsoleSession, DEFAULT_PAGE_SIZE, ExtractionMode,
    TransportConfig, is_empty_file_id,
};

use crate::device::DeviceRecord;
use crate::error::CoreError;
use crate::report::{DeviceOutcome, InventorySummary, RunReport, Stage};
use crate::sink::ConfigSink;

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Console root, e.g. `https://orion.example.net:8443/`.
    pub base_url: Url,
    pub username: String,
    pub password: SecretString,
    pub transport: TransportConfig,
    pub mode: ExtractionMode,
    pub layout: ColumnLayout,
    pub page_size: u32,
}

impl PipelineConfig {
    /// Config with default transport, edit mode, Orion layout and page size.
    pub fn new(base_url: Url, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            base_url,
            username: username.into(),
            password,
            transport: TransportConfig::default(),
            mode: ExtractionMode::default(),
            layout: ColumnLayout::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Progress callbacks. Every method defaults to doing nothing.
pub trait PipelineObserver {
    fn session_established(&mut self, _base_url: &Url) {}
    fn inventory_loaded(&mut self, _summary: &InventorySummary) {}
    fn device_discovered(&mut self, _device: &DeviceRecord) {}
    /// The node has stored configs; file id and body lookups follow.
    fn retrieving(&mut self, _device: &DeviceRecord) {}
    fn device_finished(&mut self, _device: &DeviceRecord, _outcome: &DeviceOutcome) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// One pass over a console.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Log in and fetch the inventory without touching any configs.
    pub async fn inventory(
        &self,
        observer: &mut impl PipelineObserver,
    ) -> Result<Vec<DeviceRecord>, CoreError> {
        let session = self.connect(observer).await?;
        self.load_inventory(&session, observer).await
    }

    /// Full run: every node in inventory order, configs routed to `sink`.
    pub async fn run(
        &self,
        sink: &mut impl ConfigSink,
        observer: &mut impl PipelineObserver,
    ) -> Result<RunReport, CoreError> {
        let session = self.connect(observer).await?;
        let devices = self.load_inventory(&session, observer).await?;

        let mut report = RunReport::default();
        for mut device in devices {
            let outcome = self
                .process_device(&session, &mut device, sink, observer)
                .await?;
            observer.device_finished(&device, &outcome);
            report.push(device, outcome);
        }

        info!(
            retrieved = report.retrieved(),
            skipped = report.skipped(),
            failed = report.failed(),
            "run complete"
        );
        Ok(report)
    }

    // ── Stages ───────────────────────────────────────────────────────

    async fn connect(
        &self,
        observer: &mut impl PipelineObserver,
    ) -> Result<ConsoleSession, CoreError> {
        let client = ConsoleClient::new(self.config.base_url.clone(), &self.config.transport)?;
        let session = client
            .login(&self.config.username, &self.config.password)
            .await?;
        observer.session_established(session.base_url());
        Ok(session)
    }

    async fn load_inventory(
        &self,
        session: &ConsoleSession,
        observer: &mut impl PipelineObserver,
    ) -> Result<Vec<DeviceRecord>, CoreError> {
        let inventory = session
            .fetch_inventory(&self.config.layout, self.config.page_size)
            .await?;

        let summary = InventorySummary {
            declared_total: inventory.declared_total.clone(),
            parsed: inventory.nodes.len(),
            truncated: inventory.is_truncated(),
        };
        if summary.truncated {
            warn!(
                declared = summary.declared_total.as_deref().unwrap_or_default(),
                parsed = summary.parsed,
                page_size = self.config.page_size,
                "console declares more nodes than one page holds; raise the page size to see the rest"
            );
        }
        observer.inventory_loaded(&summary);

        let devices: Vec<DeviceRecord> =
            inventory.nodes.into_iter().map(DeviceRecord::from).collect();
        for device in &devices {
            observer.device_discovered(device);
        }
        Ok(devices)
    }

    /// Resolve and deliver one node's config.
    ///
    /// Only a sink failure escapes as `Err`; request failures become
    /// [`DeviceOutcome::Failed`].
    async fn process_device(
        &self,
        session: &ConsoleSession,
        device: &mut DeviceRecord,
        sink: &mut impl ConfigSink,
        observer: &mut impl PipelineObserver,
    ) -> Result<DeviceOutcome, CoreError> {
        let node_id = device.node_id();

        device.config_count = match session.config_count(&node_id).await {
            Ok(count) => count,
            Err(e) => return Ok(failed(device, Stage::ConfigCount, &e)),
        };
        if device.has_no_configs() {
            info!(device = %device.display_name(), "no config files found");
            return Ok(DeviceOutcome::NoConfigs);
        }

        observer.retrieving(device);

        device.config_file_id = match session.config_file_id(&node_id).await {
            Ok(file_id) => file_id,
            Err(e) if e.is_empty_table() => {
                debug!(device = %device.display_name(), "config list is empty");
                return Ok(DeviceOutcome::NoConfigFile);
            }
            Err(e) => return Ok(failed(device, Stage::ConfigFileId, &e)),
        };
        if is_empty_file_id(&device.config_file_id) {
            debug!(device = %device.display_name(), "config file id is empty");
            return Ok(DeviceOutcome::NoConfigFile);
        }

        let text = match session
            .config_body(&device.config_file_id, self.config.mode)
            .await
        {
            Ok(text) => text,
            Err(e) => return Ok(failed(device, Stage::ConfigBody, &e)),
        };
        if text.is_empty() {
            info!(
                device = %device.display_name(),
                mode = %self.config.mode,
                "config page held no content"
            );
            return Ok(DeviceOutcome::EmptyContent);
        }

        let delivery = sink
            .deliver(device, &text)
            .map_err(|source| CoreError::Sink {
                device: device.display_name().to_owned(),
                source,
            })?;

        Ok(DeviceOutcome::Retrieved {
            bytes: text.len(),
            delivery,
        })
    }
}

fn failed(device: &DeviceRecord, stage: Stage, err: &ncmdump_api::Error) -> DeviceOutcome {
    info!(device = %device.display_name(), %stage, error = %err, "device skipped");
    DeviceOutcome::Failed {
        stage,
        message: err.to_string(),
    }
}
