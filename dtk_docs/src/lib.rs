//! # Design token documentation bridge
//!
//! Read-only queries used when rendering documentation: component manifest
//! entries, usage examples per component, and color swatches from the
//! primitive token layer. Loading never fails; missing data shows up as empty
//! results and placeholders.

pub mod bridge;
pub mod config;
mod error;
pub mod examples;
pub mod manifest;
pub mod swatches;

pub use bridge::{DocsBridge, ManifestView, PropRow, PLACEHOLDER_TEXT};
pub use config::DocsConfig;
pub use examples::{ExampleSolution, UsageExample};
pub use manifest::{slugify, ComponentManifestEntry, PropDescriptor};
pub use swatches::{color_swatches, ColorSwatch};
