//! Stylesheet Emitter
//!
//! Turns the expanded variant sets into stylesheet text and the derived
//! constant tables. Emission itself cannot fail; `emit_checked` adds the
//! option and size checks the pipeline relies on.

pub mod constants;
pub mod stylesheet;

pub use constants::{emit_density_multipliers, emit_theme_enum, DensityMultiplier, DerivedConstants};
pub use stylesheet::{custom_property_name, emit_stylesheet, variant_selector};

use crate::config::compile_time::emitter::{MAX_PREFIX_LENGTH, MAX_STYLESHEET_SIZE};
use crate::config::runtime::EmitterPreferences;
use crate::logging::{codes, Code};
use crate::references::ResolvedTokenSet;
use crate::variants::Variant;
use crate::{log_debug, log_error, log_performance};
use std::collections::BTreeMap;
use std::time::Instant;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmitError {
    #[error("Generated stylesheet is {size} bytes, limit is {max_size}")]
    StylesheetTooLarge { size: usize, max_size: usize },

    #[error("Invalid {option} '{value}': {reason}")]
    InvalidOption {
        option: &'static str,
        value: String,
        reason: String,
    },
}

impl EmitError {
    pub fn error_code(&self) -> Code {
        match self {
            EmitError::StylesheetTooLarge { .. } => codes::emitter::STYLESHEET_TOO_LARGE,
            EmitError::InvalidOption { .. } => codes::emitter::INVALID_OPTION,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }
}

fn is_identifier(value: &str) -> bool {
    value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Prefix and attribute names must be plain identifiers
pub fn validate_preferences(preferences: &EmitterPreferences) -> Result<(), EmitError> {
    let prefix = &preferences.custom_property_prefix;
    if prefix.len() > MAX_PREFIX_LENGTH {
        return Err(EmitError::InvalidOption {
            option: "custom property prefix",
            value: prefix.clone(),
            reason: format!("longer than {} characters", MAX_PREFIX_LENGTH),
        });
    }
    if !is_identifier(prefix) {
        return Err(EmitError::InvalidOption {
            option: "custom property prefix",
            value: prefix.clone(),
            reason: "only letters, digits, '-' and '_' are allowed".to_string(),
        });
    }

    for (option, value) in [
        ("theme attribute", &preferences.theme_attribute),
        ("density attribute", &preferences.density_attribute),
    ] {
        if value.is_empty() || !is_identifier(value) {
            return Err(EmitError::InvalidOption {
                option,
                value: value.clone(),
                reason: "attribute names must be non-empty identifiers".to_string(),
            });
        }
    }

    Ok(())
}

/// Validate options, emit, and enforce the stylesheet size limit
pub fn emit_checked(
    sets: &BTreeMap<Variant, ResolvedTokenSet>,
    preferences: &EmitterPreferences,
) -> Result<String, EmitError> {
    validate_preferences(preferences).inspect_err(|error| {
        log_error!(error.error_code(), &error.to_string());
    })?;

    let start = Instant::now();
    let css = emit_stylesheet(sets, preferences);

    if css.len() > MAX_STYLESHEET_SIZE {
        let error = EmitError::StylesheetTooLarge {
            size: css.len(),
            max_size: MAX_STYLESHEET_SIZE,
        };
        log_error!(error.error_code(), "Generated stylesheet exceeds size limit",
            "size_bytes" => css.len(),
            "limit_bytes" => MAX_STYLESHEET_SIZE);
        return Err(error);
    }

    log_performance!(codes::success::STYLESHEET_EMITTED, "Stylesheet emitted",
        duration = start.elapsed(),
        "variants" => sets.len(),
        "bytes" => css.len());

    Ok(css)
}

/// Startup check that emitter codes are registered
pub fn init_emitter_logging() -> Result<(), String> {
    for code in [codes::emitter::STYLESHEET_TOO_LARGE, codes::emitter::INVALID_OPTION] {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Emitter error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    log_debug!("Emitter compile-time configuration loaded",
        "max_stylesheet_size" => MAX_STYLESHEET_SIZE,
        "max_prefix_length" => MAX_PREFIX_LENGTH);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn preferences() -> EmitterPreferences {
        EmitterPreferences {
            custom_property_prefix: String::new(),
            theme_attribute: "data-theme".to_string(),
            density_attribute: "data-density".to_string(),
            include_header_comment: false,
        }
    }

    #[test]
    fn test_valid_preferences() {
        assert!(validate_preferences(&preferences()).is_ok());

        let mut prefs = preferences();
        prefs.custom_property_prefix = "ds_v2-".to_string();
        assert!(validate_preferences(&prefs).is_ok());
    }

    #[test]
    fn test_invalid_prefix() {
        let mut prefs = preferences();
        prefs.custom_property_prefix = "ds;".to_string();
        assert_matches!(
            validate_preferences(&prefs),
            Err(EmitError::InvalidOption { option: "custom property prefix", .. })
        );

        prefs.custom_property_prefix = "x".repeat(MAX_PREFIX_LENGTH + 1);
        assert_matches!(validate_preferences(&prefs), Err(EmitError::InvalidOption { .. }));
    }

    #[test]
    fn test_invalid_attribute() {
        let mut prefs = preferences();
        prefs.density_attribute = String::new();
        assert_matches!(
            emit_checked(&BTreeMap::new(), &prefs),
            Err(EmitError::InvalidOption { option: "density attribute", .. })
        );
    }

    #[test]
    fn test_emit_checked_matches_plain_emission() {
        let mut sets = BTreeMap::new();
        sets.insert(Variant::DEFAULT, ResolvedTokenSet::new());
        let prefs = preferences();
        assert_eq!(emit_checked(&sets, &prefs).unwrap(), emit_stylesheet(&sets, &prefs));
    }

    #[test]
    fn test_error_codes() {
        let error = EmitError::StylesheetTooLarge { size: 2, max_size: 1 };
        assert_eq!(error.error_code().as_str(), "E060");
        assert!(error.requires_halt());
    }
}
