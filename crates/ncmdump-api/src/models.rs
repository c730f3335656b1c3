// ASMX response types
//
// The console's `ConfigManagement.asmx` services wrap every payload in
// `{"d": ...}`. Paged endpoints return a positional table: `Columns`
// describe the schema, `Rows` are arrays addressed by index. Cells are
// read through `cell_text` so numbers, nulls and strings all come out as
// plain text.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Envelope ─────────────────────────────────────────────────────────

/// ASP.NET AJAX script-service envelope: `{ "d": <payload> }`.
#[derive(Debug, Deserialize)]
pub struct AsmxResponse<T> {
    pub d: T,
}

/// Payload of the `Get*Paged` endpoints.
#[derive(Debug, Deserialize)]
pub struct PagedTable {
    #[serde(rename = "DataTable")]
    pub data_table: DataTable,
    /// Server-declared total. Informational only.
    #[serde(rename = "TotalRows", default)]
    pub total_rows: Value,
}

/// Raw row/column table.
#[derive(Debug, Default, Deserialize)]
pub struct DataTable {
    #[serde(rename = "Columns", default)]
    pub columns: Vec<Value>,
    #[serde(rename = "Rows", default)]
    pub rows: Vec<Vec<Value>>,
}

// ── Cell decoding ────────────────────────────────────────────────────

/// Render any JSON cell as text.
///
/// Strings are taken as-is, numbers in their shortest decimal form
/// (`5.0` → `"5"`), booleans as `true`/`false`, null as the empty string.
/// Arrays and objects keep their JSON form (an empty object is `"{}"`).
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                n.as_f64().map_or_else(|| n.to_string(), |f| f.to_string())
            }
        }
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

// ── Column layout ────────────────────────────────────────────────────

/// Positions of the node fields inside a `GetNodesPaged` row.
///
/// The console's column order is an external contract: it is not
/// discovered from `Columns` at runtime. The defaults match Orion NCM;
/// override them only when a console orders its columns differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLayout {
    pub id: usize,
    pub name: usize,
    pub address: usize,
    pub machine_type: usize,
    pub vendor: usize,
    pub city: usize,
    pub country: usize,
}

impl ColumnLayout {
    /// The column order served by Orion NCM.
    pub const ORION: Self = Self {
        id: 0,
        name: 2,
        address: 3,
        machine_type: 17,
        vendor: 18,
        city: 23,
        country: 26,
    };

    /// Text of the cell at `index`, or empty if the row is too short.
    pub fn cell(row: &[Value], index: usize) -> String {
        row.get(index).map(cell_text).unwrap_or_default()
    }
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self::ORION
    }
}
