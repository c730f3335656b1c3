// Per-node config metadata
//
// Two dependent lookups: how many configs the console stores for a node,
// then (when that is nonzero) the id of the config to download. Callers
// pass node ids already run through `sanitize`.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::client::ConsoleSession;
use crate::error::Error;
use crate::models::{PagedTable, cell_text};

const COUNT_PATH: &str = "/Orion/NCM/Services/ConfigManagement.asmx/GetConfigsTotalRows";
const CONFIGS_PATH: &str = "/Orion/NCM/Services/ConfigManagement.asmx/GetConfigsPaged";

/// File id the console reports when a node has no usable config.
pub const EMPTY_FILE_ID: &str = "{}";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CountQuery<'a> {
    node_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigsQuery<'a> {
    node_id: &'a str,
    start: &'a str,
    show_all_configs: &'a str,
    client_offset: &'a str,
}

/// Normalize a config count to a decimal string.
///
/// The console returns either a JSON number (`5.0`) or a pre-stringified
/// value (`"5"`); both come out as `"5"`. Fractions are truncated.
pub fn normalize_count(value: &Value) -> Result<String, Error> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(i.to_string()),
            None => n
                .as_f64()
                .map(|f| f.trunc().to_string())
                .ok_or_else(|| Error::UnexpectedShape {
                    path: "d",
                    message: format!("count {n} is not representable"),
                }),
        },
        other => Err(Error::UnexpectedShape {
            path: "d",
            message: format!("expected a number or string count, got {other}"),
        }),
    }
}

/// `true` for file ids that point at nothing: empty or `{}`.
pub fn is_empty_file_id(file_id: &str) -> bool {
    file_id.is_empty() || file_id == EMPTY_FILE_ID
}

impl ConsoleSession {
    /// Number of stored configs for `node_id`, as a decimal string.
    ///
    /// `"0"` is a normal answer, not an error.
    pub async fn config_count(&self, node_id: &str) -> Result<String, Error> {
        let url = self.url(COUNT_PATH, &[])?;
        let raw: Value = self.post_asmx(url, &CountQuery { node_id }).await?;
        let count = normalize_count(&raw)?;

        debug!(node_id, count = %count, "config count");
        Ok(count)
    }

    /// Id of the first stored config for `node_id`, ordered by name.
    ///
    /// Reads `d.DataTable.Rows[0][0]`. An empty table is
    /// [`Error::EmptyTable`]; callers treat it as "nothing to extract".
    pub async fn config_file_id(&self, node_id: &str) -> Result<String, Error> {
        let url = self.url(CONFIGS_PATH, &[("sort", "Name"), ("dir", "ASC")])?;
        let body = ConfigsQuery {
            node_id,
            start: "1",
            show_all_configs: "FALSE",
            client_offset: "240",
        };

        let table: PagedTable = self.post_asmx(url, &body).await?;
        let file_id = first_cell(&table)?;

        debug!(node_id, file_id = %file_id, "config file id");
        Ok(file_id)
    }
}

fn first_cell(table: &PagedTable) -> Result<String, Error> {
    let row = table
        .data_table
        .rows
        .first()
        .ok_or(Error::EmptyTable {
            endpoint: "GetConfigsPaged",
        })?;
    Ok(row.first().map(cell_text).unwrap_or_default())
}
