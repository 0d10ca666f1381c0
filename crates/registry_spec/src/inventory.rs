use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InventoryPluginSpec {
	pub name: String,
	#[serde(default)]
	pub sections: Vec<String>,
	pub inventory_function: String,
	#[serde(default)]
	pub inventory_default_parameters: Option<serde_json::Value>,
	#[serde(default)]
	pub inventory_ruleset_name: Option<String>,
}
