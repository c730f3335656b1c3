// ncmdump-api: Async client for the Orion NCM web console
//
// Login produces a `ConsoleSession`; every node-scoped call hangs off that
// session, so nothing can reach the console's data endpoints without
// first passing the authentication gate.

pub mod client;
pub mod error;
pub mod extract;
pub mod inventory;
pub mod metadata;
pub mod models;
pub mod sanitize;
pub mod session;
pub mod transport;

pub use client::{ConsoleClient, ConsoleSession, console_url};
pub use error::Error;
pub use extract::{ExtractionMode, extract_textarea};
pub use inventory::{DEFAULT_PAGE_SIZE, Inventory, InventoryNode};
pub use metadata::is_empty_file_id;
pub use models::{ColumnLayout, cell_text};
pub use sanitize::sanitize;
pub use session::{AUTH_COOKIE_MARKER, CredentialBundle, SessionCookie};
pub use transport::{DEFAULT_USER_AGENT, TransportConfig};
