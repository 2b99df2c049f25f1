/// Validate that every stage's codes and limits are in place
pub fn validate_pipeline() -> Result<(), String> {
    crate::log_debug!("Validating token pipeline configuration");

    crate::store::init_store_logging()?;
    crate::references::init_reference_logging()?;
    crate::emit::init_emitter_logging()?;
    crate::cache::init_cache_logging()?;

    for code in [
        crate::logging::codes::variants::OVERRIDE_RESOLUTION_FAILED,
        crate::logging::codes::pipeline::PIPELINE_FAILURE,
        crate::logging::codes::pipeline::OUTPUT_WRITE_FAILURE,
    ] {
        if crate::logging::codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Pipeline error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    crate::log_success!(
        crate::logging::codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Token pipeline validation succeeded",
        "stages_validated" => 4,
        "token_store" => true,
        "reference_resolution" => true,
        "variant_expansion" => true,
        "stylesheet_emission" => true,
        "runtime_cache" => true
    );

    Ok(())
}
