//! Typed constant tables for downstream build steps

use crate::variants::{DensityLevel, ThemeMode};
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityMultiplier {
    pub level: DensityLevel,
    pub multiplier: f64,
    pub label: &'static str,
}

/// Multiplier and label per level, in the requested order
pub fn emit_density_multipliers(levels: &[DensityLevel]) -> Vec<DensityMultiplier> {
    levels
        .iter()
        .map(|level| DensityMultiplier {
            level: *level,
            multiplier: level.multiplier(),
            label: level.label(),
        })
        .collect()
}

/// Mode names in the requested order
pub fn emit_theme_enum(modes: &[ThemeMode]) -> Vec<&'static str> {
    modes.iter().map(ThemeMode::as_str).collect()
}

/// Both tables, renderable as TypeScript or JSON
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedConstants {
    pub density_multipliers: Vec<DensityMultiplier>,
    pub theme_modes: Vec<&'static str>,
}

impl DerivedConstants {
    pub fn new(levels: &[DensityLevel], modes: &[ThemeMode]) -> Self {
        Self {
            density_multipliers: emit_density_multipliers(levels),
            theme_modes: emit_theme_enum(modes),
        }
    }

    /// Every level and mode
    pub fn all() -> Self {
        Self::new(&DensityLevel::ALL, &ThemeMode::ALL)
    }

    pub fn to_typescript(&self) -> String {
        let mut ts = String::new();
        ts.push_str("// Generated by dtk-compiler. Do not edit.\n\n");

        ts.push_str("export const DENSITY_MULTIPLIERS = {\n");
        for entry in &self.density_multipliers {
            let _ = writeln!(
                ts,
                "  {}: {{ multiplier: {:?}, label: {:?} }},",
                entry.level, entry.multiplier, entry.label
            );
        }
        ts.push_str("} as const;\n\n");
        ts.push_str("export type DensityLevel = keyof typeof DENSITY_MULTIPLIERS;\n\n");

        let modes: Vec<String> = self.theme_modes.iter().map(|m| format!("{:?}", m)).collect();
        let _ = writeln!(ts, "export const THEME_MODES = [{}] as const;\n", modes.join(", "));
        ts.push_str("export type ThemeMode = (typeof THEME_MODES)[number];\n");

        ts
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_density_table() {
        let table = emit_density_multipliers(&[
            DensityLevel::Compact,
            DensityLevel::Default,
            DensityLevel::Comfortable,
        ]);

        let multipliers: Vec<f64> = table.iter().map(|e| e.multiplier).collect();
        let labels: Vec<&str> = table.iter().map(|e| e.label).collect();
        assert_eq!(multipliers, vec![0.85, 1.0, 1.15]);
        assert_eq!(labels, vec!["Compact", "Default", "Comfortable"]);
    }

    #[test]
    fn test_requested_order_is_kept() {
        let table = emit_density_multipliers(&[DensityLevel::Comfortable, DensityLevel::Compact]);
        assert_eq!(table[0].level, DensityLevel::Comfortable);
        assert_eq!(table.len(), 2);

        assert_eq!(
            emit_theme_enum(&[ThemeMode::HighContrast, ThemeMode::Light]),
            vec!["high-contrast", "light"]
        );
    }

    #[test]
    fn test_typescript_rendering() {
        let ts = DerivedConstants::all().to_typescript();
        assert!(ts.contains("  compact: { multiplier: 0.85, label: \"Compact\" },"));
        assert!(ts.contains("  default: { multiplier: 1.0, label: \"Default\" },"));
        assert!(ts.contains("export const THEME_MODES = [\"light\", \"dark\", \"high-contrast\"] as const;"));
    }

    #[test]
    fn test_json_rendering() {
        let json = DerivedConstants::all().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["theme_modes"][2], "high-contrast");
        assert_eq!(value["density_multipliers"][2]["level"], "comfortable");
        assert_eq!(value["density_multipliers"][0]["multiplier"], 0.85);
    }
}
