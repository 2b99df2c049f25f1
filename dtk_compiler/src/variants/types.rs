use crate::store::types::TokenNode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeMode {
    Light,
    Dark,
    HighContrast,
}

impl ThemeMode {
    pub const ALL: [ThemeMode; 3] = [ThemeMode::Light, ThemeMode::Dark, ThemeMode::HighContrast];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::HighContrast => "high-contrast",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DensityLevel {
    Compact,
    Default,
    Comfortable,
}

impl DensityLevel {
    pub const ALL: [DensityLevel; 3] = [
        DensityLevel::Compact,
        DensityLevel::Default,
        DensityLevel::Comfortable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DensityLevel::Compact => "compact",
            DensityLevel::Default => "default",
            DensityLevel::Comfortable => "comfortable",
        }
    }

    /// Spacing multiplier applied by components at this density
    pub fn multiplier(&self) -> f64 {
        match self {
            DensityLevel::Compact => 0.85,
            DensityLevel::Default => 1.0,
            DensityLevel::Comfortable => 1.15,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DensityLevel::Compact => "Compact",
            DensityLevel::Default => "Default",
            DensityLevel::Comfortable => "Comfortable",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} '{value}'")]
pub struct ParseVariantError {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for ThemeMode {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ThemeMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| ParseVariantError {
                kind: "theme mode",
                value: s.to_string(),
            })
    }
}

impl FromStr for DensityLevel {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DensityLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| ParseVariantError {
                kind: "density level",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for DensityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One (theme, density) combination; ordered theme first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Variant {
    pub theme: ThemeMode,
    pub density: DensityLevel,
}

impl Variant {
    /// Emitted unscoped so pages are styled before any attribute is set
    pub const DEFAULT: Variant = Variant {
        theme: ThemeMode::Light,
        density: DensityLevel::Default,
    };

    pub fn new(theme: ThemeMode, density: DensityLevel) -> Self {
        Self { theme, density }
    }

    /// All nine variants in order
    pub fn all() -> Vec<Variant> {
        ThemeMode::ALL
            .into_iter()
            .flat_map(|theme| DensityLevel::ALL.into_iter().map(move |density| Variant::new(theme, density)))
            .collect()
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.theme, self.density)
    }
}

impl FromStr for Variant {
    type Err = ParseVariantError;

    /// `dark/compact`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (theme, density) = s.split_once('/').ok_or_else(|| ParseVariantError {
            kind: "variant",
            value: s.to_string(),
        })?;
        Ok(Variant::new(theme.parse()?, density.parse()?))
    }
}

/// What an override document applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OverrideTarget {
    Theme(ThemeMode),
    Density(DensityLevel),
    Pair(Variant),
}

impl OverrideTarget {
    pub fn applies_to(&self, variant: Variant) -> bool {
        match self {
            OverrideTarget::Theme(theme) => variant.theme == *theme,
            OverrideTarget::Density(density) => variant.density == *density,
            OverrideTarget::Pair(pair) => variant == *pair,
        }
    }
}

impl fmt::Display for OverrideTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverrideTarget::Theme(theme) => write!(f, "theme:{}", theme),
            OverrideTarget::Density(density) => write!(f, "density:{}", density),
            OverrideTarget::Pair(variant) => write!(f, "variant:{}", variant),
        }
    }
}

/// Override documents keyed by axis value or by exact pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantOverrides {
    pub themes: BTreeMap<ThemeMode, TokenNode>,
    pub densities: BTreeMap<DensityLevel, TokenNode>,
    pub pairs: BTreeMap<Variant, TokenNode>,
}

impl VariantOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: BTreeMap<Variant, TokenNode>) -> Self {
        Self {
            pairs,
            ..Self::default()
        }
    }

    /// Returns the document previously registered for the same target
    pub fn insert(&mut self, target: OverrideTarget, node: TokenNode) -> Option<TokenNode> {
        match target {
            OverrideTarget::Theme(theme) => self.themes.insert(theme, node),
            OverrideTarget::Density(density) => self.densities.insert(density, node),
            OverrideTarget::Pair(variant) => self.pairs.insert(variant, node),
        }
    }

    pub fn len(&self) -> usize {
        self.themes.len() + self.densities.len() + self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Documents applying to `variant`, in application order: theme, density, pair
    pub fn documents_for(&self, variant: Variant) -> Vec<(OverrideTarget, &TokenNode)> {
        let mut documents = Vec::new();
        if let Some(node) = self.themes.get(&variant.theme) {
            documents.push((OverrideTarget::Theme(variant.theme), node));
        }
        if let Some(node) = self.densities.get(&variant.density) {
            documents.push((OverrideTarget::Density(variant.density), node));
        }
        if let Some(node) = self.pairs.get(&variant) {
            documents.push((OverrideTarget::Pair(variant), node));
        }
        documents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_variants_in_order() {
        let all = Variant::all();
        assert_eq!(all.len(), 9);
        assert_eq!(all[0], Variant::new(ThemeMode::Light, DensityLevel::Compact));
        assert_eq!(all[1], Variant::DEFAULT);
        assert_eq!(all[8], Variant::new(ThemeMode::HighContrast, DensityLevel::Comfortable));

        let mut sorted = all.clone();
        sorted.sort();
        assert_eq!(sorted, all);
    }

    #[test]
    fn test_parse_and_display() {
        let variant: Variant = "high-contrast/comfortable".parse().unwrap();
        assert_eq!(variant.theme, ThemeMode::HighContrast);
        assert_eq!(variant.to_string(), "high-contrast/comfortable");

        assert!("sepia".parse::<ThemeMode>().is_err());
        assert!("dark".parse::<Variant>().is_err());
        assert_eq!(
            serde_json::to_string(&ThemeMode::HighContrast).unwrap(),
            "\"high-contrast\""
        );
    }

    #[test]
    fn test_documents_for_orders_by_specificity() {
        let mut overrides = VariantOverrides::new();
        let pair = Variant::new(ThemeMode::Dark, DensityLevel::Compact);
        overrides.insert(OverrideTarget::Pair(pair), TokenNode::empty_group());
        overrides.insert(OverrideTarget::Density(DensityLevel::Compact), TokenNode::empty_group());
        overrides.insert(OverrideTarget::Theme(ThemeMode::Dark), TokenNode::empty_group());

        let targets: Vec<OverrideTarget> = overrides
            .documents_for(pair)
            .into_iter()
            .map(|(target, _)| target)
            .collect();
        assert_eq!(
            targets,
            vec![
                OverrideTarget::Theme(ThemeMode::Dark),
                OverrideTarget::Density(DensityLevel::Compact),
                OverrideTarget::Pair(pair),
            ]
        );
        assert!(overrides
            .documents_for(Variant::DEFAULT)
            .is_empty());
        assert!(OverrideTarget::Theme(ThemeMode::Dark).applies_to(pair));
    }
}
