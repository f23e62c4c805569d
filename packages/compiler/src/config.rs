//! Configuration for the card compiler

use serde::{Deserialize, Serialize};

/// URL of the card every adoption chain ends at
pub const BASE_CARD_URL: &str = "https://cardstack.com/base/base";

/// Module schema annotations (`@contains`, `@adopts`, ...) are imported from
pub const TYPES_MODULE: &str = "@cardstack/types";

/// Schema file name looked for when card.json does not name one
pub const CONVENTIONAL_SCHEMA_FILE: &str = "schema.js";

/// Module `precompileTemplate` is imported from in JS template files
pub const TEMPLATE_COMPILATION_MODULE: &str = "@ember/template-compilation";

/// Compiler settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompilerConfig {
    /// Designated base card; compiling it never resolves a parent
    pub base_card_url: String,

    /// Module specifier annotation imports must come from
    pub types_module: String,

    /// Schema file name that triggers a warning when present but unreferenced
    pub conventional_schema_file: String,

    /// Module specifier of `precompileTemplate`
    pub template_compilation_module: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            base_card_url: BASE_CARD_URL.to_string(),
            types_module: TYPES_MODULE.to_string(),
            conventional_schema_file: CONVENTIONAL_SCHEMA_FILE.to_string(),
            template_compilation_module: TEMPLATE_COMPILATION_MODULE.to_string(),
        }
    }
}

impl CompilerConfig {
    /// Whether `url` is the designated base card
    pub fn is_base_card(&self, url: &str) -> bool {
        url == self.base_card_url
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.base_card_url.is_empty() {
            return Err("base_card_url cannot be empty".to_string());
        }

        if url::Url::parse(&self.base_card_url).is_err() {
            return Err(format!(
                "base_card_url must be an absolute URL, got '{}'",
                self.base_card_url
            ));
        }

        if self.types_module.is_empty() {
            return Err("types_module cannot be empty".to_string());
        }

        if self.conventional_schema_file.is_empty() {
            return Err("conventional_schema_file cannot be empty".to_string());
        }

        if self.template_compilation_module.is_empty() {
            return Err("template_compilation_module cannot be empty".to_string());
        }

        Ok(())
    }
}
