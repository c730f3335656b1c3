//! Retrieval pipeline between `ncmdump-api` and the command line.
//!
//! - **[`Pipeline`]**: runs one pass over the console: log in once, fetch
//!   the node inventory once, then walk the nodes in inventory order,
//!   resolving config count and file id before pulling the config text.
//!   [`Pipeline::inventory`] stops after the inventory for listing.
//!
//! - **[`ConfigSink`]**: where extracted text goes: [`StdoutSink`] streams
//!   it, [`FileSink`] writes `<name>.ncm` files.
//!
//! - **[`PipelineObserver`]**: progress callbacks, so front-ends can render
//!   output without the pipeline knowing about terminals.
//!
//! - **[`RunReport`]**: one [`DeviceOutcome`] per node plus totals.
//!
//! Requests are strictly sequential: one in flight at a time, no retries.

pub mod device;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod sink;

pub use device::DeviceRecord;
pub use error::CoreError;
pub use pipeline::{NoopObserver, Pipeline, PipelineConfig, PipelineObserver};
pub use report::{DeviceOutcome, InventorySummary, RunReport, Stage};
pub use sink::{ConfigSink, Delivery, FileSink, StdoutSink};

// Re-exported so front-ends configure the pipeline without a direct
// dependency on the API crate.
pub use ncmdump_api::{
    ColumnLayout, DEFAULT_PAGE_SIZE, DEFAULT_USER_AGENT, ExtractionMode, TransportConfig,
    console_url, sanitize,
};
