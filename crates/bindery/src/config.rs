//! Configuration schema for bindery
//!
//! Config lives at `.config/bindery/config.kdl` relative to the working
//! directory. Everything in it is optional; a missing file at the default
//! location means built-in defaults.

use eyre::{Result, WrapErr};
use facet::Facet;
use facet_kdl as kdl;
use std::path::Path;

/// Root configuration for bindery
#[derive(Debug, Clone, Facet)]
pub struct Config {
    /// Link pattern override
    #[facet(kdl::child, default)]
    pub pattern: Option<Pattern>,
}

/// Link pattern configuration
#[derive(Debug, Clone, Facet)]
pub struct Pattern {
    /// Path template for fragment links; `*` matches a run of digits
    #[facet(kdl::child)]
    pub template: Template,
}

#[derive(Debug, Clone, Facet)]
pub struct Template {
    #[facet(kdl::argument)]
    pub value: String,
}

/// Load the config file. A missing file is an error only when the path was
/// given explicitly; the default location falls back to `None`.
pub fn load(path: &Path, required: bool) -> Result<Option<Config>> {
    if !path.exists() {
        if required {
            eyre::bail!(
                "Config file not found at {}\n\n\
                 Create a config file with your link pattern:\n\n\
                 pattern {{\n    \
                     template \"chapters/chapter-*/ch*-section-*.*.md\"\n\
                 }}",
                path.display()
            );
        }
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = facet_kdl::from_str(&content)
        .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(Some(config))
}
