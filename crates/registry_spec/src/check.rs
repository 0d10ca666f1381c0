use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckPluginSpec {
	pub name: String,
	/// Service name template, `%s` marks the item.
	pub service_name: String,
	/// Parsed sections the plug-in subscribes to. Defaults to the plug-in name.
	#[serde(default)]
	pub sections: Vec<String>,
	pub discovery_function: String,
	#[serde(default)]
	pub discovery_default_parameters: Option<serde_json::Value>,
	#[serde(default)]
	pub discovery_ruleset_name: Option<String>,
	pub check_function: String,
	#[serde(default)]
	pub check_default_parameters: Option<serde_json::Value>,
	#[serde(default)]
	pub check_ruleset_name: Option<String>,
}
