use std::collections::BTreeSet;

use cmk_primitives::InventoryPluginName;
use proptest::prelude::*;

use super::test_fixtures::*;
use super::*;

const PARSED: [&str; 4] = ["mem", "cpu", "if", "df"];

/// One section declaration: (section index, parsed index, from SNMP).
type Decl = (usize, usize, bool);

fn arb_decls() -> impl Strategy<Value = Vec<Decl>> {
	prop::collection::btree_map(0usize..12, (0..PARSED.len(), any::<bool>()), 0..12).prop_map(|m| {
		m.into_iter()
			.map(|(section, (parsed, snmp))| (section, parsed, snmp))
			.collect()
	})
}

fn register(registry: &mut PluginRegistry, decls: &[Decl]) {
	for &(section, parsed, snmp) in decls {
		let name = format!("sec{section}");
		if snmp {
			registry.add_section_plugin(snmp_section(&name, PARSED[parsed]));
		} else {
			registry.add_section_plugin(agent_section(&name, PARSED[parsed]));
		}
	}
}

fn producer_sets(registry: &PluginRegistry) -> Vec<BTreeSet<SectionName>> {
	PARSED
		.iter()
		.map(|p| registry.get_section_producers(&parsed_name(p)).into_iter().collect())
		.collect()
}

fn relevant_names(registry: &PluginRegistry, checks: &[usize]) -> BTreeSet<SectionName> {
	registry
		.get_relevant_raw_sections(
			checks.iter().map(|i| check_name(&format!("chk_{}", PARSED[*i]))),
			Vec::<InventoryPluginName>::new(),
		)
		.into_keys()
		.collect()
}

fn with_checks(decls: &[Decl]) -> PluginRegistry {
	let mut registry = PluginRegistry::new();
	register(&mut registry, decls);
	for parsed in PARSED {
		registry
			.add_check_plugin(check_plugin(&format!("chk_{parsed}"), "Item %s", &[parsed], None))
			.unwrap();
	}
	registry
}

proptest! {
	/// Registration order does not change who produces a parsed section.
	#[test]
	fn prop_producers_are_order_independent(
		(decls, shuffled) in arb_decls().prop_flat_map(|d| (Just(d.clone()), Just(d).prop_shuffle()))
	) {
		let mut forward = PluginRegistry::new();
		register(&mut forward, &decls);
		let mut reordered = PluginRegistry::new();
		register(&mut reordered, &shuffled);

		prop_assert_eq!(producer_sets(&forward), producer_sets(&reordered));
	}

	/// Redetection is needed exactly when the resolved parsed section has competing producers.
	#[test]
	fn prop_redetection_matches_producer_count(decls in arb_decls(), probe in 0usize..14) {
		let mut registry = PluginRegistry::new();
		register(&mut registry, &decls);

		let section = section_name(&format!("sec{probe}"));
		let parsed = match registry.get_section_plugin(&section) {
			Some(plugin) => plugin.parsed_section_name().clone(),
			None => ParsedSectionName::from(&section),
		};
		prop_assert_eq!(
			registry.needs_redetection(&section),
			registry.get_section_producers(&parsed).len() > 1
		);
	}

	/// Adding plug-ins to the request never removes relevant raw sections.
	#[test]
	fn prop_relevant_sections_are_monotonic(
		decls in arb_decls(),
		smaller in prop::collection::btree_set(0..PARSED.len(), 0..PARSED.len()),
		extra in prop::collection::btree_set(0..PARSED.len(), 0..PARSED.len()),
	) {
		let registry = with_checks(&decls);
		let smaller: Vec<usize> = smaller.into_iter().collect();
		let larger: Vec<usize> = smaller.iter().copied().chain(extra).collect();

		let small = relevant_names(&registry, &smaller);
		let large = relevant_names(&registry, &larger);
		prop_assert!(small.is_subset(&large), "{small:?} not within {large:?}");
	}

	/// Registering the same declarations again leaves every query unchanged.
	#[test]
	fn prop_reregistration_is_idempotent(decls in arb_decls()) {
		let once = with_checks(&decls);
		let mut twice = with_checks(&decls);
		register(&mut twice, &decls);

		prop_assert_eq!(producer_sets(&once), producer_sets(&twice));
		prop_assert_eq!(
			relevant_names(&once, &[0, 1, 2, 3]),
			relevant_names(&twice, &[0, 1, 2, 3])
		);
	}
}
