//! Fixed vocabulary of the token document format and the emitted stylesheet.
//! Tunable limits live in the generated `compile_time` module instead.

pub mod document {
    /// Key that marks a mapping as a leaf
    pub const VALUE_KEY: &str = "$value";

    /// Optional leaf metadata
    pub const TYPE_KEY: &str = "$type";
    pub const DESCRIPTION_KEY: &str = "$description";

    /// Keys with this prefix never name child groups
    pub const METADATA_PREFIX: char = '$';
}

pub mod reference {
    pub const OPEN: char = '{';
    pub const CLOSE: char = '}';

    /// Accepted separators inside a reference and in path text
    pub const SEPARATORS: [char; 2] = ['.', '/'];

    /// Separator used when flattening a path into a property name
    pub const FLAT_SEPARATOR: char = '-';

    /// Canonical separator for display
    pub const DISPLAY_SEPARATOR: char = '.';
}

pub mod selectors {
    pub const ROOT: &str = ":root";
    pub const THEME_ATTRIBUTE: &str = "data-theme";
    pub const DENSITY_ATTRIBUTE: &str = "data-density";
    pub const INDENT: &str = "  ";
}
