//! CSS custom-property blocks, one per variant

use crate::config::constants::selectors::{INDENT, ROOT};
use crate::config::runtime::EmitterPreferences;
use crate::references::ResolvedTokenSet;
use crate::variants::Variant;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Serialize every variant set into a stylesheet.
///
/// The default variant is emitted first under `:root`, then every variant in
/// `Variant` order under its attribute selector. Declarations are sorted by
/// flattened name, so identical input gives byte-identical output.
pub fn emit_stylesheet(
    sets: &BTreeMap<Variant, ResolvedTokenSet>,
    preferences: &EmitterPreferences,
) -> String {
    let prefix = normalized_prefix(&preferences.custom_property_prefix);
    let mut css = String::new();

    if preferences.include_header_comment {
        let _ = writeln!(
            css,
            "/* Generated by dtk-compiler {}. Do not edit. */\n",
            env!("CARGO_PKG_VERSION")
        );
    }

    let mut blocks = Vec::with_capacity(sets.len() + 1);
    if let Some(default_set) = sets.get(&Variant::DEFAULT) {
        blocks.push(rule_block(ROOT, default_set, &prefix));
    }
    for (variant, set) in sets {
        blocks.push(rule_block(&variant_selector(*variant, preferences), set, &prefix));
    }

    css.push_str(&blocks.join("\n"));
    css
}

/// `[data-theme="dark"][data-density="compact"]`
pub fn variant_selector(variant: Variant, preferences: &EmitterPreferences) -> String {
    format!(
        "[{}=\"{}\"][{}=\"{}\"]",
        preferences.theme_attribute, variant.theme, preferences.density_attribute, variant.density
    )
}

/// `--{prefix}{flat-name}`
pub fn custom_property_name(prefix: &str, flat_name: &str) -> String {
    format!("--{}{}", normalized_prefix(prefix), flat_name)
}

fn normalized_prefix(prefix: &str) -> String {
    if prefix.is_empty() || prefix.ends_with('-') {
        prefix.to_string()
    } else {
        format!("{}-", prefix)
    }
}

fn rule_block(selector: &str, set: &ResolvedTokenSet, prefix: &str) -> String {
    let mut block = String::with_capacity(64 + set.len() * 32);
    let _ = writeln!(block, "{} {{", selector);
    for token in set.iter() {
        let _ = writeln!(block, "{}--{}{}: {};", INDENT, prefix, token.flat_name(), token.value);
    }
    block.push_str("}\n");
    block
}
