use dtk_compiler::emit::custom_property_name;
use dtk_compiler::{ResolvedTokenSet, TokenPath};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorSwatch {
    /// Flattened token name, e.g. `color-blue-500`
    pub name: String,
    pub value: String,
    pub css_variable: String,
}

/// Every token under `group`, sorted by flattened name
pub fn color_swatches(primitive: &ResolvedTokenSet, group: &str, prefix: &str) -> Vec<ColorSwatch> {
    let Some(root) = TokenPath::parse(group) else {
        return Vec::new();
    };

    let mut swatches: Vec<ColorSwatch> = primitive
        .under(&root)
        .map(|token| {
            let name = token.flat_name();
            ColorSwatch {
                css_variable: custom_property_name(prefix, &name),
                value: token.value.to_string(),
                name,
            }
        })
        .collect();
    swatches.sort_by(|a, b| a.name.cmp(&b.name));
    swatches
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtk_compiler::references::resolve;
    use dtk_compiler::store::parser::parse_document;
    use dtk_compiler::TokenLayer;

    fn primitive() -> ResolvedTokenSet {
        let node = parse_document(
            r##"{
                "color": {
                    "white": { "$value": "#ffffff" },
                    "blue": { "500": { "$value": "#3b82f6" }, "100": { "$value": "#dbeafe" } }
                },
                "colorful": { "$value": "not a color group member" },
                "space": { "md": { "$value": "8px" } }
            }"##,
            "primitive",
            false,
        )
        .unwrap();
        resolve(&[(TokenLayer::Primitive, node)]).unwrap()
    }

    #[test]
    fn test_swatches_sorted_by_name() {
        let swatches = color_swatches(&primitive(), "color", "");
        let names: Vec<&str> = swatches.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["color-blue-100", "color-blue-500", "color-white"]);
        assert_eq!(swatches[1].value, "#3b82f6");
        assert_eq!(swatches[1].css_variable, "--color-blue-500");
    }

    #[test]
    fn test_prefix_and_missing_group() {
        let set = primitive();
        assert_eq!(color_swatches(&set, "color", "ds")[2].css_variable, "--ds-color-white");
        assert!(color_swatches(&set, "palette", "").is_empty());
        assert!(color_swatches(&set, "", "").is_empty());
    }
}
