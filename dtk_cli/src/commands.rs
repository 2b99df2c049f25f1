use crate::OutputFormat;
use dtk_compiler::config::{build_info, RuntimeConfig};
use dtk_compiler::{
    init_global_cache, logging, pipeline, ProjectConfig, ResolvedTokenSet, ThemeCache, TokenValue, Variant,
};
use dtk_docs::{DocsBridge, DocsConfig};
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::path::{Path, PathBuf};

type CommandResult = Result<(), Box<dyn Error>>;

fn load_project(path: &Path) -> Result<ProjectConfig, Box<dyn Error>> {
    ProjectConfig::load(path).map_err(|e| e.into())
}

fn cache_for(path: &Path) -> Result<(ProjectConfig, &'static ThemeCache), Box<dyn Error>> {
    let project = load_project(path)?;
    let cache = init_global_cache(project.clone())?;
    Ok((project, cache))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CommandResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn build(config: &Path, out_dir: Option<PathBuf>) -> CommandResult {
    let (project, cache) = cache_for(config)?;
    let output = cache.build()?;

    let build_id = uuid::Uuid::new_v4().to_string();
    let report = output.report(build_id.as_str(), project.name.as_str());
    let directory = out_dir.unwrap_or_else(|| project.output_dir());
    let written = output.write_artifacts(&directory, &report)?;

    log::info!("build {} finished at {}", build_id, report.generated_at.to_rfc3339());
    println!("Built {} ({})", project.name, output.stats.summary());
    for path in written {
        println!("  wrote {}", path.display());
    }
    Ok(())
}

/// Flattened name and value of every token matching `filter`, in name order
fn filtered_tokens<'a>(set: &'a ResolvedTokenSet, filter: Option<&str>) -> Vec<(String, &'a TokenValue)> {
    set.iter()
        .map(|token| (token.flat_name(), &token.value))
        .filter(|(name, _)| filter.map_or(true, |prefix| name.starts_with(prefix)))
        .collect()
}

/// JSON object of the matching tokens; numbers stay numbers
fn tokens_json(set: &ResolvedTokenSet, filter: Option<&str>) -> serde_json::Result<serde_json::Value> {
    let tokens: BTreeMap<String, &TokenValue> = filtered_tokens(set, filter).into_iter().collect();
    serde_json::to_value(tokens)
}

pub fn resolve(config: &Path, variant: Variant, filter: Option<&str>, format: OutputFormat) -> CommandResult {
    let (_, cache) = cache_for(config)?;
    let set = cache.variant_set(variant)?;

    match format {
        OutputFormat::Json => print_json(&tokens_json(&set, filter)?),
        OutputFormat::Text => {
            let tokens = filtered_tokens(&set, filter);
            println!("# {} ({} tokens)", variant, tokens.len());
            for (name, value) in tokens {
                println!("{} = {}", name, value);
            }
            Ok(())
        }
    }
}

pub fn swatches(config: &Path, format: OutputFormat) -> CommandResult {
    let (project, cache) = cache_for(config)?;
    let output = cache.build()?;
    let bridge = DocsBridge::load(&DocsConfig::from_project(&project), Some(&output.primitive));

    match format {
        OutputFormat::Json => print_json(bridge.color_swatches()),
        OutputFormat::Text => {
            for swatch in bridge.color_swatches() {
                println!("{:<32} {:<12} {}", swatch.name, swatch.value, swatch.css_variable);
            }
            Ok(())
        }
    }
}

pub fn manifest(config: &Path, slug: &str, props_only: bool, format: OutputFormat) -> CommandResult {
    let bridge = DocsBridge::from_project(&load_project(config)?);
    log::debug!("docs data loaded at {}", bridge.loaded_at().to_rfc3339());

    if props_only {
        let rows = bridge.props_table(slug);
        return match format {
            OutputFormat::Json => print_json(&rows),
            OutputFormat::Text => {
                for row in rows {
                    let marker = if row.required { "*" } else { " " };
                    println!("{}{:<20} {:<28} {:<12} {}", marker, row.name, row.type_label, row.default, row.description);
                }
                Ok(())
            }
        };
    }

    let view = bridge.lookup_or_placeholder(slug);
    match format {
        OutputFormat::Json => print_json(&view),
        OutputFormat::Text => {
            print!("{}", view);
            Ok(())
        }
    }
}

pub fn examples(config: &Path, component: &str, format: OutputFormat) -> CommandResult {
    let bridge = DocsBridge::from_project(&load_project(config)?);
    let examples = bridge.get_examples_for_component(component);

    match format {
        OutputFormat::Json => print_json(&examples),
        OutputFormat::Text => {
            if examples.is_empty() {
                println!("No examples for {}", component);
            }
            for example in examples {
                println!("- {}", example.title);
                if let Some(code) = &example.solution.code {
                    println!("{}", code);
                }
            }
            Ok(())
        }
    }
}

pub fn info(format: OutputFormat) -> CommandResult {
    let info = pipeline::get_pipeline_info();
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "stages": info.pipeline_stages,
            "layers": info.layers,
            "theme_modes": info.theme_modes,
            "density_levels": info.density_levels,
            "variants": info.variants,
            "profile": info.profile,
            "source": build_info::source_info(),
            "logging": logging::get_system_diagnostics(),
            "runtime": RuntimeConfig::default(),
        })),
        OutputFormat::Text => {
            println!("{}", info.report());
            println!("{}", build_info::source_info());
            println!("\n{}", logging::get_system_diagnostics());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtk_compiler::references::resolve;
    use dtk_compiler::store::parser::parse_document;
    use dtk_compiler::TokenLayer;

    fn tokens() -> ResolvedTokenSet {
        let node = parse_document(
            r##"{
                "button": {
                    "font-weight": { "$value": 700 },
                    "padding": { "$value": "4px 8px" }
                },
                "color": { "white": { "$value": "#ffffff" } }
            }"##,
            "component",
            false,
        )
        .unwrap();
        resolve(&[(TokenLayer::Primitive, node)]).unwrap()
    }

    #[test]
    fn test_json_keeps_number_values() {
        let json = tokens_json(&tokens(), None).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "button-font-weight": 700,
                "button-padding": "4px 8px",
                "color-white": "#ffffff",
            })
        );
    }

    #[test]
    fn test_filter_by_prefix() {
        let set = tokens();
        let names: Vec<String> = filtered_tokens(&set, Some("button-"))
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["button-font-weight", "button-padding"]);
    }
}
