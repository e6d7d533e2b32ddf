//! Rewrite configuration and the synthetic names derived from it.
//!
//! A config can be built in code or read from a TOML file:
//!
//! ```toml
//! hidden_symbol_suffix = "_filter3"
//! alias_precision = "highp"
//! declare_tex_coord_varying = true
//! require_entry_function = true
//! ```

use std::path::Path;

use serde::Deserialize;
use shade_ir::Precision;

/// The shader's natural output color.
pub const OUTPUT_COLOR: &str = "gl_FragColor";
/// Mangled name of `void main()`.
pub const ENTRY_FUNCTION: &str = "main(";
/// Mangled name of `texture2D(sampler2D, vec2)`.
pub const TEXTURE2D: &str = "texture2D(s21;vf2;";

pub const TEXTURE_UNIFORM_PREFIX: &str = "css_u_texture";
pub const TEX_COORD_VARYING_PREFIX: &str = "css_v_texCoord";
pub const FRAG_COLOR_ALIAS_PREFIX: &str = "css_gl_FragColor";

fn default_true() -> bool {
    true
}

/// Parameters of one rewrite instance.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RewriteConfig {
    /// Appended to every synthetic name so independent rewrites of related
    /// shaders never share a name.
    #[serde(default)]
    pub hidden_symbol_suffix: String,
    /// Precision of the output-color alias declaration.
    pub alias_precision: Precision,
    /// Declare the texture-coordinate varying. Hosts that already declare it
    /// by convention turn this off.
    #[serde(default = "default_true")]
    pub declare_tex_coord_varying: bool,
    /// Fail when the shader has no entry function instead of leaving it
    /// uncomposited.
    #[serde(default = "default_true")]
    pub require_entry_function: bool,
}

impl RewriteConfig {
    /// Precision has no safe default across GPUs, so it is always explicit.
    pub fn new(hidden_symbol_suffix: impl Into<String>, alias_precision: Precision) -> Self {
        Self {
            hidden_symbol_suffix: hidden_symbol_suffix.into(),
            alias_precision,
            declare_tex_coord_varying: true,
            require_entry_function: true,
        }
    }

    pub fn with_tex_coord_varying(mut self, declare: bool) -> Self {
        self.declare_tex_coord_varying = declare;
        self
    }

    pub fn with_entry_function_required(mut self, required: bool) -> Self {
        self.require_entry_function = required;
        self
    }

    /// Read and parse a TOML config file.
    pub fn from_file(path: &Path) -> Result<RewriteConfig, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Self::from_str(&content)
    }

    /// Parse a TOML config from a string.
    pub fn from_str(content: &str) -> Result<RewriteConfig, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse rewrite config: {}", e))
    }

    pub fn texture_uniform_name(&self) -> String {
        format!("{}{}", TEXTURE_UNIFORM_PREFIX, self.hidden_symbol_suffix)
    }

    pub fn tex_coord_varying_name(&self) -> String {
        format!("{}{}", TEX_COORD_VARYING_PREFIX, self.hidden_symbol_suffix)
    }

    pub fn frag_color_alias_name(&self) -> String {
        format!("{}{}", FRAG_COLOR_ALIAS_PREFIX, self.hidden_symbol_suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_names_carry_suffix() {
        let config = RewriteConfig::new("_7", Precision::High);
        assert_eq!(config.texture_uniform_name(), "css_u_texture_7");
        assert_eq!(config.tex_coord_varying_name(), "css_v_texCoord_7");
        assert_eq!(config.frag_color_alias_name(), "css_gl_FragColor_7");
    }

    #[test]
    fn empty_suffix_gives_bare_names() {
        let config = RewriteConfig::new("", Precision::Medium);
        assert_eq!(config.texture_uniform_name(), "css_u_texture");
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
hidden_symbol_suffix = "_blur"
alias_precision = "mediump"
declare_tex_coord_varying = false
require_entry_function = false
"#;
        let config = RewriteConfig::from_str(toml).unwrap();
        assert_eq!(config.hidden_symbol_suffix, "_blur");
        assert_eq!(config.alias_precision, Precision::Medium);
        assert!(!config.declare_tex_coord_varying);
        assert!(!config.require_entry_function);
    }

    #[test]
    fn parse_minimal_config_uses_defaults() {
        let config = RewriteConfig::from_str("alias_precision = \"highp\"").unwrap();
        assert_eq!(config, RewriteConfig::new("", Precision::High));
    }

    #[test]
    fn missing_precision_is_rejected() {
        let err = RewriteConfig::from_str("hidden_symbol_suffix = \"_x\"").unwrap_err();
        assert!(err.contains("alias_precision"), "{err}");
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rewrite.toml");
        std::fs::write(&path, "alias_precision = \"lowp\"\nhidden_symbol_suffix = \"_f\"\n").unwrap();
        let config = RewriteConfig::from_file(&path).unwrap();
        assert_eq!(config.alias_precision, Precision::Low);
        assert_eq!(config.hidden_symbol_suffix, "_f");
    }

    #[test]
    fn from_file_reports_missing_path() {
        let err = RewriteConfig::from_file(Path::new("/nonexistent/rewrite.toml")).unwrap_err();
        assert!(err.starts_with("Failed to read"), "{err}");
    }
}
