//! In-memory module sink

use super::DefineModule;
use anyhow::Result;
use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;

/// Records every defined module, keyed by `{card_url}/{local_module}`
///
/// Redefining a module replaces its source.
#[derive(Debug, Default)]
pub struct InMemoryModules {
    modules: RwLock<IndexMap<String, String>>,
}

impl InMemoryModules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source of a defined module
    pub async fn source(&self, module: &str) -> Option<String> {
        self.modules.read().await.get(module).cloned()
    }

    /// Defined module names in definition order
    pub async fn module_names(&self) -> Vec<String> {
        self.modules.read().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.modules.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.modules.read().await.is_empty()
    }
}

#[async_trait]
impl DefineModule for InMemoryModules {
    async fn define(&self, card_url: &str, local_module: &str, source: String) -> Result<String> {
        let module = format!("{}/{}", card_url.trim_end_matches('/'), local_module);
        self.modules.write().await.insert(module.clone(), source);
        Ok(module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_define_records_source() {
        let modules = InMemoryModules::new();
        let name = modules
            .define("https://demo.com/person/", "schema.js", "export default class Person {}".to_string())
            .await
            .unwrap();

        assert_eq!(name, "https://demo.com/person/schema.js");
        assert_eq!(
            modules.source(&name).await.as_deref(),
            Some("export default class Person {}")
        );
        assert_eq!(modules.len().await, 1);
    }

    #[tokio::test]
    async fn test_redefine_replaces_source() {
        let modules = InMemoryModules::new();
        modules.define("https://demo.com/a", "x.js", "one".to_string()).await.unwrap();
        modules.define("https://demo.com/a", "x.js", "two".to_string()).await.unwrap();

        assert_eq!(modules.module_names().await, vec!["https://demo.com/a/x.js"]);
        assert_eq!(modules.source("https://demo.com/a/x.js").await.as_deref(), Some("two"));
    }
}
