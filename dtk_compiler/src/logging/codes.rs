//! Consolidated error codes and classification system
//!
//! Single source of truth for all error codes, their metadata, and classification functions.
//! Error codes are `E`/`ERR`, warnings `W`, success and info `I`.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for error, warning and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Registry entry, if this code is registered
    pub fn metadata(&self) -> Option<&'static ErrorMetadata> {
        get_error_metadata(self.0)
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// Project configuration error codes
pub mod config {
    use super::Code;

    pub const CONFIG_UNREADABLE: Code = Code::new("E001");
    pub const CONFIG_MALFORMED: Code = Code::new("E002");
    pub const CONFIG_INVALID: Code = Code::new("E003");
}

/// Token store error codes
pub mod store {
    use super::Code;

    pub const SOURCE_UNAVAILABLE: Code = Code::new("E005");
    pub const DOCUMENT_TOO_LARGE: Code = Code::new("E006");
    pub const MALFORMED_DOCUMENT: Code = Code::new("E007");
    pub const MIXED_NODE: Code = Code::new("E008");
    pub const INVALID_LEAF_VALUE: Code = Code::new("E009");
    pub const TREE_TOO_DEEP: Code = Code::new("E010");
    pub const TOO_MANY_TOKENS: Code = Code::new("E011");
    pub const INVALID_KEY: Code = Code::new("E012");
}

/// Reference resolution error codes
pub mod references {
    use super::Code;

    pub const MALFORMED_REFERENCE: Code = Code::new("E020");
    pub const LEGACY_REFERENCE_SYNTAX: Code = Code::new("E021");
    pub const UNRESOLVED_REFERENCE: Code = Code::new("E022");
    pub const CYCLIC_REFERENCE: Code = Code::new("E023");
    pub const REFERENCE_DEPTH_EXCEEDED: Code = Code::new("E024");
    pub const NAME_CONFLICT: Code = Code::new("E025");
}

/// Variant expansion codes
pub mod variants {
    use super::Code;

    pub const OVERRIDE_RESOLUTION_FAILED: Code = Code::new("E040");
    pub const NEW_OVERRIDE_PATH: Code = Code::new("W041");
}

/// Stylesheet emitter error codes
pub mod emitter {
    use super::Code;

    pub const STYLESHEET_TOO_LARGE: Code = Code::new("E060");
    pub const INVALID_OPTION: Code = Code::new("E061");
}

/// Runtime cache codes
pub mod cache {
    use super::Code;

    pub const CACHED_FAILURE: Code = Code::new("E080");
    pub const CACHE_CAPACITY_EXCEEDED: Code = Code::new("W081");
}

/// Documentation bridge warnings (the bridge never fails)
pub mod docs {
    use super::Code;

    pub const MANIFEST_UNAVAILABLE: Code = Code::new("W100");
    pub const MANIFEST_MALFORMED: Code = Code::new("W101");
    pub const EXAMPLES_UNAVAILABLE: Code = Code::new("W102");
    pub const EXAMPLES_MALFORMED: Code = Code::new("W103");
    pub const SWATCHES_UNAVAILABLE: Code = Code::new("W104");
    pub const DOCS_LIMIT_EXCEEDED: Code = Code::new("W105");
}

/// Pipeline orchestration error codes
pub mod pipeline {
    use super::Code;

    pub const PIPELINE_FAILURE: Code = Code::new("E120");
    pub const OUTPUT_WRITE_FAILURE: Code = Code::new("E121");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const PIPELINE_COMPLETE: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const DOCUMENT_LOADED: Code = Code::new("I006");
    pub const RESOLUTION_COMPLETE: Code = Code::new("I020");
    pub const EXPANSION_COMPLETE: Code = Code::new("I040");
    pub const STYLESHEET_EMITTED: Code = Code::new("I060");
    pub const CONSTANTS_EMITTED: Code = Code::new("I061");
    pub const CACHE_POPULATED: Code = Code::new("I080");
    pub const DOCS_LOADED: Code = Code::new("I100");
    pub const ARTIFACTS_WRITTEN: Code = Code::new("I120");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn register(registry: &mut HashMap<&'static str, ErrorMetadata>, metadata: ErrorMetadata) {
    registry.insert(metadata.code, metadata);
}

/// Initialize and get the error registry
#[rustfmt::skip]
fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let mut registry = HashMap::new();
        let r = &mut registry;

        // System errors
        register(r, ErrorMetadata::new(
            "ERR001", "System", Severity::Critical, false, true,
            "Critical internal error",
            "File a bug report with the failing token documents attached",
        ));
        register(r, ErrorMetadata::new(
            "ERR002", "System", Severity::Critical, false, true,
            "Logging or pipeline initialization failed",
            "Check the DTK_* environment variables and compile-time profile",
        ));

        // Configuration errors
        register(r, ErrorMetadata::new(
            "E001", "Configuration", Severity::High, false, true,
            "Project configuration file could not be read",
            "Check that tokens.toml exists and is readable",
        ));
        register(r, ErrorMetadata::new(
            "E002", "Configuration", Severity::High, false, true,
            "Project configuration is not valid TOML",
            "Fix the TOML syntax reported in the message",
        ));
        register(r, ErrorMetadata::new(
            "E003", "Configuration", Severity::High, false, true,
            "Project configuration violates a constraint",
            "Review override targets, emitter prefix and source paths",
        ));

        // Token store errors
        register(r, ErrorMetadata::new(
            "E005", "TokenStore", Severity::Critical, false, true,
            "Token source document is unavailable",
            "Check the layer's source path and file permissions",
        ));
        register(r, ErrorMetadata::new(
            "E006", "TokenStore", Severity::High, false, true,
            "Token document exceeds the maximum size",
            "Split the document or raise max_document_size for this profile",
        ));
        register(r, ErrorMetadata::new(
            "E007", "TokenStore", Severity::High, false, true,
            "Token document is malformed",
            "Fix the document structure at the reported location",
        ));
        register(r, ErrorMetadata::new(
            "E008", "TokenStore", Severity::High, false, true,
            "Node mixes a $value with child tokens",
            "Move the child tokens into a sibling group",
        ));
        register(r, ErrorMetadata::new(
            "E009", "TokenStore", Severity::High, false, true,
            "Leaf $value is not a string or number",
            "Use a string, a number, or a {reference}",
        ));
        register(r, ErrorMetadata::new(
            "E010", "TokenStore", Severity::High, false, true,
            "Token tree nesting exceeds the depth limit",
            "Flatten the group hierarchy",
        ));
        register(r, ErrorMetadata::new(
            "E011", "TokenStore", Severity::High, false, true,
            "Layer defines more tokens than allowed",
            "Split the layer or raise max_tokens_per_layer",
        ));
        register(r, ErrorMetadata::new(
            "E012", "TokenStore", Severity::High, false, true,
            "Token or group key is not a valid name",
            "Use letters, digits, '-' and '_' only",
        ));

        // Reference errors
        register(r, ErrorMetadata::new(
            "E020", "References", Severity::High, false, true,
            "Reference expression is malformed",
            "Close every '{' and reference a non-empty token path",
        ));
        register(r, ErrorMetadata::new(
            "E021", "References", Severity::High, false, true,
            "Legacy $path reference notation is not supported",
            "Rewrite the value as {path.to.token}",
        ));
        register(r, ErrorMetadata::new(
            "E022", "References", Severity::High, false, true,
            "Reference target does not exist in this or any lower layer",
            "Define the target token or correct the reference path",
        ));
        register(r, ErrorMetadata::new(
            "E023", "References", Severity::High, false, true,
            "Cyclic reference between tokens",
            "Break the cycle by giving one token a literal value",
        ));
        register(r, ErrorMetadata::new(
            "E024", "References", Severity::High, false, true,
            "Reference chain exceeds the maximum depth",
            "Shorten the chain of aliases",
        ));
        register(r, ErrorMetadata::new(
            "E025", "References", Severity::High, false, true,
            "Two token paths produce conflicting names",
            "Rename one of the tokens so flattened names stay unique",
        ));

        // Variant expansion
        register(r, ErrorMetadata::new(
            "E040", "Variants", Severity::High, false, true,
            "Variant override could not be resolved",
            "Fix the references in the override document",
        ));
        register(r, ErrorMetadata::new(
            "W041", "Variants", Severity::Low, true, false,
            "Override introduces a token absent from the base set",
            "Add the token to a base layer so every variant defines it",
        ));

        // Emitter
        register(r, ErrorMetadata::new(
            "E060", "Emitter", Severity::High, false, true,
            "Generated stylesheet exceeds the size limit",
            "Reduce the token count or raise max_stylesheet_size",
        ));
        register(r, ErrorMetadata::new(
            "E061", "Emitter", Severity::High, false, true,
            "Emitter option is invalid",
            "Use letters, digits, '-' and '_' in prefixes and attribute names",
        ));

        // Cache
        register(r, ErrorMetadata::new(
            "E080", "Cache", Severity::High, false, true,
            "Cached build previously failed",
            "Fix the reported error and restart the process",
        ));
        register(r, ErrorMetadata::new(
            "W081", "Cache", Severity::Medium, true, false,
            "Cache table is full; value computed without caching",
            "Raise max_cache_entries for this profile",
        ));

        // Docs bridge
        register(r, ErrorMetadata::new(
            "W100", "Docs", Severity::Low, true, false,
            "Component manifest is unavailable",
            "Generate the manifest or fix the configured path",
        ));
        register(r, ErrorMetadata::new(
            "W101", "Docs", Severity::Low, true, false,
            "Component manifest could not be parsed",
            "Regenerate the manifest document",
        ));
        register(r, ErrorMetadata::new(
            "W102", "Docs", Severity::Low, true, false,
            "Usage examples are unavailable",
            "Fix the configured examples path",
        ));
        register(r, ErrorMetadata::new(
            "W103", "Docs", Severity::Low, true, false,
            "Usage examples could not be parsed",
            "Fix the examples document",
        ));
        register(r, ErrorMetadata::new(
            "W104", "Docs", Severity::Low, true, false,
            "Color swatches could not be derived",
            "Check the primitive layer source",
        ));
        register(r, ErrorMetadata::new(
            "W105", "Docs", Severity::Low, true, false,
            "Documentation data exceeds a configured limit; extra entries ignored",
            "Raise the docs limits for this profile",
        ));

        // Pipeline
        register(r, ErrorMetadata::new(
            "E120", "Pipeline", Severity::High, false, true,
            "Token pipeline failed",
            "Review the stage error reported above",
        ));
        register(r, ErrorMetadata::new(
            "E121", "Pipeline", Severity::High, false, true,
            "Generated artifacts could not be written",
            "Check the output directory and its permissions",
        ));

        // Success codes
        register(r, ErrorMetadata::new(
            "I001", "Pipeline", Severity::Low, true, false,
            "Token pipeline completed successfully",
            "Artifacts are ready for use",
        ));
        register(r, ErrorMetadata::new(
            "I004", "System", Severity::Low, true, false,
            "System initialization completed",
            "Ready to process token documents",
        ));
        register(r, ErrorMetadata::new(
            "I006", "TokenStore", Severity::Low, true, false,
            "Token document loaded",
            "Continue to reference resolution",
        ));
        register(r, ErrorMetadata::new(
            "I020", "References", Severity::Low, true, false,
            "Reference resolution completed",
            "Continue to variant expansion",
        ));
        register(r, ErrorMetadata::new(
            "I040", "Variants", Severity::Low, true, false,
            "Variant expansion completed",
            "Continue to stylesheet emission",
        ));
        register(r, ErrorMetadata::new(
            "I060", "Emitter", Severity::Low, true, false,
            "Stylesheet emitted",
            "Stylesheet is ready to serve",
        ));
        register(r, ErrorMetadata::new(
            "I061", "Emitter", Severity::Low, true, false,
            "Derived constants emitted",
            "Constants are ready for downstream builds",
        ));
        register(r, ErrorMetadata::new(
            "I080", "Cache", Severity::Low, true, false,
            "Cache entry populated",
            "Subsequent requests reuse the cached value",
        ));
        register(r, ErrorMetadata::new(
            "I100", "Docs", Severity::Low, true, false,
            "Documentation data loaded",
            "Lookups are ready",
        ));
        register(r, ErrorMetadata::new(
            "I120", "Pipeline", Severity::Low, true, false,
            "Build artifacts written",
            "Publish the output directory",
        ));

        registry
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get error metadata for a specific code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get severity from code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get category from code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_code_constant_is_registered() {
        let all = [
            system::INTERNAL_ERROR,
            system::INITIALIZATION_FAILURE,
            config::CONFIG_UNREADABLE,
            config::CONFIG_MALFORMED,
            config::CONFIG_INVALID,
            store::SOURCE_UNAVAILABLE,
            store::DOCUMENT_TOO_LARGE,
            store::MALFORMED_DOCUMENT,
            store::MIXED_NODE,
            store::INVALID_LEAF_VALUE,
            store::TREE_TOO_DEEP,
            store::TOO_MANY_TOKENS,
            store::INVALID_KEY,
            references::MALFORMED_REFERENCE,
            references::LEGACY_REFERENCE_SYNTAX,
            references::UNRESOLVED_REFERENCE,
            references::CYCLIC_REFERENCE,
            references::REFERENCE_DEPTH_EXCEEDED,
            references::NAME_CONFLICT,
            variants::OVERRIDE_RESOLUTION_FAILED,
            variants::NEW_OVERRIDE_PATH,
            emitter::STYLESHEET_TOO_LARGE,
            emitter::INVALID_OPTION,
            cache::CACHED_FAILURE,
            cache::CACHE_CAPACITY_EXCEEDED,
            docs::MANIFEST_UNAVAILABLE,
            docs::MANIFEST_MALFORMED,
            docs::EXAMPLES_UNAVAILABLE,
            docs::EXAMPLES_MALFORMED,
            docs::SWATCHES_UNAVAILABLE,
            docs::DOCS_LIMIT_EXCEEDED,
            pipeline::PIPELINE_FAILURE,
            pipeline::OUTPUT_WRITE_FAILURE,
            success::PIPELINE_COMPLETE,
            success::SYSTEM_INITIALIZATION_COMPLETED,
            success::DOCUMENT_LOADED,
            success::RESOLUTION_COMPLETE,
            success::EXPANSION_COMPLETE,
            success::STYLESHEET_EMITTED,
            success::CONSTANTS_EMITTED,
            success::CACHE_POPULATED,
            success::DOCS_LOADED,
            success::ARTIFACTS_WRITTEN,
        ];

        for code in all {
            assert!(
                get_error_metadata(code.as_str()).is_some(),
                "code {} has no metadata",
                code
            );
        }
    }

    #[test]
    fn test_docs_codes_never_halt() {
        assert!(!requires_halt(docs::MANIFEST_UNAVAILABLE.as_str()));
        assert!(is_recoverable(docs::EXAMPLES_MALFORMED.as_str()));
        assert_eq!(get_category(docs::MANIFEST_MALFORMED.as_str()), "Docs");
    }

    #[test]
    fn test_unknown_code_fallbacks() {
        assert_eq!(get_description("Z999"), "Unknown error");
        assert_eq!(get_category("Z999"), "Unknown");
        assert_eq!(get_severity("Z999"), Severity::Medium);
        assert!(!requires_halt("Z999"));
    }

    #[test]
    fn test_reference_errors_halt() {
        assert!(requires_halt(references::CYCLIC_REFERENCE.as_str()));
        assert_eq!(
            get_severity(references::UNRESOLVED_REFERENCE.as_str()),
            Severity::High
        );
    }
}
