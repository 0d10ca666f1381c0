//! Management board variants of check plug-ins.
//!
//! A variant shares every function and ruleset with its basic plug-in and only
//! differs in name and service name. Variants are derived on demand and never
//! stored, so they always reflect the current basic definition.

use cmk_primitives::NameError;

use crate::check::CheckPlugin;

/// Service name prefix of management board services.
pub const MANAGEMENT_DESCR_PREFIX: &str = "Management Interface: ";

/// Derives the management variant of `basic`.
///
/// Fails if `basic` already carries a management name.
pub fn management_plugin_factory(basic: &CheckPlugin) -> Result<CheckPlugin, NameError> {
	Ok(CheckPlugin {
		name: basic.name.create_management_name()?,
		service_name: format!("{MANAGEMENT_DESCR_PREFIX}{}", basic.service_name),
		..basic.clone()
	})
}
