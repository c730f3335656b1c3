// ── Device domain type ──

use serde::{Deserialize, Serialize};

use ncmdump_api::{InventoryNode, sanitize};

/// One managed node and its retrieval state.
///
/// The identity fields come from the inventory. `config_count` and
/// `config_file_id` start empty and are filled in by the pipeline as the
/// per-node lookups complete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub id: String,
    pub name: String,
    pub address: String,
    pub machine_type: String,
    pub vendor: String,
    pub city: String,
    pub country: String,
    pub config_count: String,
    pub config_file_id: String,
}

impl DeviceRecord {
    /// Node id with JSON fragment characters removed, as sent upstream.
    pub fn node_id(&self) -> String {
        sanitize(&self.id)
    }

    /// Name to show in messages; falls back to the id for unnamed nodes.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() { &self.id } else { &self.name }
    }

    /// `true` once the count lookup reported no stored configs.
    pub fn has_no_configs(&self) -> bool {
        self.config_count == "0"
    }
}

impl From<InventoryNode> for DeviceRecord {
    fn from(node: InventoryNode) -> Self {
        Self {
            id: node.id,
            name: node.name,
            address: node.address,
            machine_type: node.machine_type,
            vendor: node.vendor,
            city: node.city,
            country: node.country,
            config_count: String::new(),
            config_file_id: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_inventory_leaves_retrieval_state_empty() {
        let record = DeviceRecord::from(InventoryNode {
            id: r#"["12"]"#.into(),
            name: "edge-fw".into(),
            ..InventoryNode::default()
        });
        assert_eq!(record.node_id(), "12");
        assert!(record.config_count.is_empty());
        assert!(record.config_file_id.is_empty());
        assert!(!record.has_no_configs());
    }

    #[test]
    fn display_name_falls_back_to_id() {
        let record = DeviceRecord {
            id: "7".into(),
            ..DeviceRecord::default()
        };
        assert_eq!(record.display_name(), "7");
    }
}
