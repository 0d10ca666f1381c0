use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentSectionSpec {
	pub name: String,
	/// Defaults to `name` when absent.
	#[serde(default)]
	pub parsed_section_name: Option<String>,
	/// Handler name looked up in the agent parse table.
	pub parse_function: String,
	#[serde(default)]
	pub host_label_ruleset_name: Option<String>,
	#[serde(default)]
	pub supersedes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnmpSectionSpec {
	pub name: String,
	#[serde(default)]
	pub parsed_section_name: Option<String>,
	/// Handler name looked up in the SNMP parse table.
	pub parse_function: String,
	#[serde(default)]
	pub host_label_ruleset_name: Option<String>,
	#[serde(default)]
	pub supersedes: Vec<String>,
	pub fetch: Vec<SnmpTreeSpec>,
	/// Disjunction of conjunctions of OID conditions.
	#[serde(default)]
	pub detect: Vec<Vec<DetectAtomSpec>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnmpTreeSpec {
	pub base: String,
	pub oids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetectAtomSpec {
	pub oid: String,
	pub pattern: String,
	#[serde(default)]
	pub negate: bool,
}
