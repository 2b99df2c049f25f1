// build.rs - TOML-driven compile-time limit generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    documents: DocumentLimits,
    references: ReferenceLimits,
    variants: VariantLimits,
    emitter: EmitterLimits,
    cache: CacheLimits,
    docs: DocsLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct DocumentLimits {
    max_document_size: u64,
    large_document_threshold: u64,
    max_tree_depth: usize,
    max_tokens_per_layer: usize,
    max_key_length: usize,
}

#[derive(serde::Deserialize)]
struct ReferenceLimits {
    max_reference_depth: usize,
    max_references_per_value: usize,
    max_reported_chain_length: usize,
}

#[derive(serde::Deserialize)]
struct VariantLimits {
    max_override_documents: usize,
}

#[derive(serde::Deserialize)]
struct EmitterLimits {
    max_stylesheet_size: usize,
    max_prefix_length: usize,
}

#[derive(serde::Deserialize)]
struct CacheLimits {
    max_cache_entries: usize,
}

#[derive(serde::Deserialize)]
struct DocsLimits {
    max_manifest_entries: usize,
    max_manifest_files: usize,
    max_examples: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    max_error_collection: usize,
    log_buffer_size: usize,
    max_log_message_length: usize,
    max_log_events_per_source: usize,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=DTK_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=DTK_CONFIG_DIR");

    let profile = env::var("DTK_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("DTK_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Find workspace root (parent of dtk_compiler directory)
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_DOCUMENT_SIZE: u64 = 100_000_000;
    // Resolution recurses once per chain link
    const ABSOLUTE_MAX_REFERENCE_DEPTH: usize = 1_000;
    const ABSOLUTE_MAX_TREE_DEPTH: usize = 100;

    if config.documents.max_document_size > ABSOLUTE_MAX_DOCUMENT_SIZE {
        panic!("LIMITS: max_document_size exceeds absolute maximum");
    }

    if config.documents.large_document_threshold > config.documents.max_document_size {
        panic!("LIMITS: large_document_threshold must not exceed max_document_size");
    }

    if config.documents.max_tree_depth == 0
        || config.documents.max_tree_depth > ABSOLUTE_MAX_TREE_DEPTH
    {
        panic!("LIMITS: max_tree_depth must be between 1 and {ABSOLUTE_MAX_TREE_DEPTH}");
    }

    if config.references.max_reference_depth == 0
        || config.references.max_reference_depth > ABSOLUTE_MAX_REFERENCE_DEPTH
    {
        panic!("LIMITS: max_reference_depth must be between 1 and {ABSOLUTE_MAX_REFERENCE_DEPTH}");
    }

    // Nine variants plus the unscoped default block
    if config.cache.max_cache_entries < 10 {
        panic!("LIMITS: max_cache_entries must hold at least one entry per variant");
    }

    if config.logging.log_buffer_size < 100 || config.logging.log_buffer_size > 100_000 {
        panic!("LIMITS: log_buffer_size must be between 100 and 100000");
    }

    if profile == "production" {
        if config.documents.max_document_size > 10_000_000 {
            panic!("PRODUCTION: max_document_size too high for production");
        }
        if config.references.max_reference_depth > 128 {
            panic!("PRODUCTION: max_reference_depth too high for production");
        }
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod documents {{
        pub const MAX_DOCUMENT_SIZE: u64 = {};
        pub const LARGE_DOCUMENT_THRESHOLD: u64 = {};
        pub const MAX_TREE_DEPTH: usize = {};
        pub const MAX_TOKENS_PER_LAYER: usize = {};
        pub const MAX_KEY_LENGTH: usize = {};
    }}

    pub mod references {{
        pub const MAX_REFERENCE_DEPTH: usize = {};
        pub const MAX_REFERENCES_PER_VALUE: usize = {};
        pub const MAX_REPORTED_CHAIN_LENGTH: usize = {};
    }}

    pub mod variants {{
        pub const MAX_OVERRIDE_DOCUMENTS: usize = {};
    }}

    pub mod emitter {{
        pub const MAX_STYLESHEET_SIZE: usize = {};
        pub const MAX_PREFIX_LENGTH: usize = {};
    }}

    pub mod cache {{
        pub const MAX_CACHE_ENTRIES: usize = {};
    }}

    pub mod docs {{
        pub const MAX_MANIFEST_ENTRIES: usize = {};
        pub const MAX_MANIFEST_FILES: usize = {};
        pub const MAX_EXAMPLES: usize = {};
    }}

    pub mod logging {{
        pub const MAX_ERROR_COLLECTION: usize = {};
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const MAX_LOG_EVENTS_PER_SOURCE: usize = {};
    }}
}}
"#,
        profile,
        // Documents
        config.documents.max_document_size,
        config.documents.large_document_threshold,
        config.documents.max_tree_depth,
        config.documents.max_tokens_per_layer,
        config.documents.max_key_length,
        // References
        config.references.max_reference_depth,
        config.references.max_references_per_value,
        config.references.max_reported_chain_length,
        // Variants
        config.variants.max_override_documents,
        // Emitter
        config.emitter.max_stylesheet_size,
        config.emitter.max_prefix_length,
        // Cache
        config.cache.max_cache_entries,
        // Docs
        config.docs.max_manifest_entries,
        config.docs.max_manifest_files,
        config.docs.max_examples,
        // Logging
        config.logging.max_error_collection,
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
        config.logging.max_log_events_per_source,
    );

    fs::write(output_path, constants_code).unwrap();
}
