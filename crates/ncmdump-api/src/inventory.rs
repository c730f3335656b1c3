// Node inventory
//
// One bulk `GetNodesPaged` call returns every managed node as a positional
// table. A single page is requested; `DEFAULT_PAGE_SIZE` is assumed to
// exceed any realistic node count, and callers are warned (via
// `Inventory::is_truncated`) when the declared total says otherwise.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::client::ConsoleSession;
use crate::error::Error;
use crate::models::{ColumnLayout, PagedTable, cell_text};

const NODES_PATH: &str = "/Orion/NCM/Services/ConfigManagement.asmx/GetNodesPaged";

/// Rows requested in the single inventory page.
pub const DEFAULT_PAGE_SIZE: u32 = 1000;

/// Request body for `GetNodesPaged`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NodesQuery<'a> {
    grouping_query_string: &'a str,
    show_selected_only: &'a str,
    col_to_search: &'a str,
    search_term: &'a str,
    client_offset: i32,
}

impl Default for NodesQuery<'_> {
    fn default() -> Self {
        Self {
            grouping_query_string: "",
            show_selected_only: "False",
            col_to_search: "Nodes.Caption",
            search_term: "",
            client_offset: 240,
        }
    }
}

/// One row of the node table, decoded through a [`ColumnLayout`].
///
/// Every field is text: the console mixes numbers, strings and nulls in
/// the same columns, and nulls decode to the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryNode {
    pub id: String,
    pub name: String,
    pub address: String,
    pub machine_type: String,
    pub vendor: String,
    pub city: String,
    pub country: String,
}

impl InventoryNode {
    pub fn from_row(row: &[Value], layout: &ColumnLayout) -> Self {
        Self {
            id: ColumnLayout::cell(row, layout.id),
            name: ColumnLayout::cell(row, layout.name),
            address: ColumnLayout::cell(row, layout.address),
            machine_type: ColumnLayout::cell(row, layout.machine_type),
            vendor: ColumnLayout::cell(row, layout.vendor),
            city: ColumnLayout::cell(row, layout.city),
            country: ColumnLayout::cell(row, layout.country),
        }
    }
}

/// Decoded inventory page.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    pub nodes: Vec<InventoryNode>,
    /// `TotalRows` as the console declared it; `None` if absent or null.
    pub declared_total: Option<String>,
    /// Number of columns the console described.
    pub column_count: usize,
}

impl Inventory {
    /// Decode a `GetNodesPaged` payload.
    pub fn from_table(table: &PagedTable, layout: &ColumnLayout) -> Self {
        let nodes = table
            .data_table
            .rows
            .iter()
            .map(|row| InventoryNode::from_row(row, layout))
            .collect();
        let declared = cell_text(&table.total_rows);

        Self {
            nodes,
            declared_total: (!declared.is_empty()).then_some(declared),
            column_count: table.data_table.columns.len(),
        }
    }

    /// `true` when the console declares more nodes than were parsed.
    pub fn is_truncated(&self) -> bool {
        self.declared_total
            .as_deref()
            .and_then(|total| total.parse::<usize>().ok())
            .is_some_and(|total| total > self.nodes.len())
    }
}

impl ConsoleSession {
    /// Fetch the node inventory: one page, newest transfer first.
    ///
    /// A response without `d.DataTable` is a deserialization error; an
    /// empty `Rows` array is a valid, empty inventory.
    pub async fn fetch_inventory(
        &self,
        layout: &ColumnLayout,
        page_size: u32,
    ) -> Result<Inventory, Error> {
        let limit = page_size.to_string();
        let url = self.url(
            NODES_PATH,
            &[
                ("start", "0"),
                ("limit", limit.as_str()),
                ("sort", "LastTransferDate"),
                ("dir", "DESC"),
            ],
        )?;

        let table: PagedTable = self.post_asmx(url, &NodesQuery::default()).await?;
        let inventory = Inventory::from_table(&table, layout);

        debug!(
            parsed = inventory.nodes.len(),
            declared = inventory.declared_total.as_deref().unwrap_or("?"),
            "decoded node inventory"
        );
        Ok(inventory)
    }
}
