//! Card Compilation
//!
//! [`Compiler::compile`] turns one [`RawCard`] into a [`CompiledCard`]. Every
//! other card it needs (the parent, each field's card, the card that authored
//! an inherited template) is requested from the [`Builder`], and every piece of
//! generated code is handed to the [`DefineModule`] sink. The compiler keeps no
//! cache; memoization belongs to the builder.
//!
//! # Steps
//!
//! 1. Validate the raw card and seed the result with its url, data and deserializer
//! 2. Extract the schema and define the rewritten schema module
//! 3. Resolve the parent URL (skipped for the base card)
//! 4. Fetch the card of every own field
//! 5. Collect assets
//! 6. Fetch the parent, merge fields, inherit the schema module and serializer
//! 7. Compile, recompile or reuse a component per format
//! 8. Check the assembled card
//!
//! # Cycles
//!
//! Each compile runs inside a task-local stack of in-flight card URLs. Reaching
//! a URL that is already on the stack (through adoption or through a field
//! type) fails with [`CompileError::Cycle`] instead of recursing forever.

mod draft;
mod error;
pub mod inheritance;

pub use error::{CompileError, Result};

use crate::builder::{Builder, BuilderError, DefineModule};
use crate::config::CompilerConfig;
use crate::models::{
    normalize_path, Asset, AssetType, CompiledCard, ComponentInfo, Field, Fields, Format, RawCard,
};
use crate::schema::{compile_schema, CompiledSchema, SchemaContext, SchemaMeta};
use crate::template::{compile_template, TemplateContext};
use crate::utils::hashed_module_path;
use draft::CardDraft;
use futures::future::try_join_all;
use std::collections::HashSet;
use std::sync::Arc;

tokio::task_local! {
    /// Card URLs being compiled on the current task, outermost first
    static COMPILE_STACK: Vec<String>;
}

/// Compiles raw cards against a builder and a module sink
pub struct Compiler {
    builder: Arc<dyn Builder>,
    define: Arc<dyn DefineModule>,
    config: CompilerConfig,
}

impl Compiler {
    /// Create a compiler with the default configuration
    pub fn new(builder: Arc<dyn Builder>, define: Arc<dyn DefineModule>) -> Self {
        Self {
            builder,
            define,
            config: CompilerConfig::default(),
        }
    }

    /// Create a compiler with a custom configuration
    ///
    /// # Errors
    ///
    /// Returns `CompileError::Config` if the configuration is invalid
    pub fn with_config(
        builder: Arc<dyn Builder>,
        define: Arc<dyn DefineModule>,
        config: CompilerConfig,
    ) -> Result<Self> {
        config.validate().map_err(CompileError::Config)?;
        Ok(Self {
            builder,
            define,
            config,
        })
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile one raw card
    ///
    /// Nothing is returned unless every step succeeds; the first error aborts
    /// the whole compile, including errors raised while the builder compiles
    /// the parent or a field card.
    pub async fn compile(&self, raw: &RawCard) -> Result<CompiledCard> {
        let mut stack = COMPILE_STACK
            .try_with(|stack| stack.clone())
            .unwrap_or_default();

        if let Some(start) = stack.iter().position(|url| url == &raw.url) {
            let mut chain = stack.split_off(start);
            chain.push(raw.url.clone());
            return Err(CompileError::Cycle { chain });
        }

        stack.push(raw.url.clone());
        COMPILE_STACK.scope(stack, self.compile_card(raw)).await
    }

    async fn compile_card(&self, raw: &RawCard) -> Result<CompiledCard> {
        raw.validate()?;
        tracing::debug!("Compiling card {}", raw.url);

        let mut draft = CardDraft::seed(raw);

        let meta = match self.prepare_schema(raw).await? {
            Some((meta, module)) => {
                draft.schema_module = Some(module);
                meta
            }
            None => SchemaMeta::default(),
        };

        // Self-parenting and conflicting parents fail before anything is fetched
        let parent_url = if self.config.is_base_card(&raw.url) {
            None
        } else {
            let declared = meta.parent.as_ref().map(|parent| parent.card_url.as_str());
            Some(inheritance::parent_url(raw, declared, &self.config)?)
        };

        let own_fields = self.lookup_fields(&meta).await?;
        let extends_schema = !own_fields.is_empty();
        draft.assets = collect_assets(raw);

        let parent = match parent_url {
            Some(url) => Some(self.fetch_parent(raw, &url).await?),
            None => None,
        };

        match &parent {
            Some(parent) => {
                draft.fields = inheritance::adopt_fields(own_fields, parent)?;
                if draft.schema_module.is_none() {
                    draft.schema_module = Some(parent.schema_module.clone());
                }
                draft.serializer = inheritance::inherit_serializer(&raw.url, draft.serializer, parent)?;
                draft.adopts_from = Some(Arc::clone(parent));
            }
            None => draft.fields = own_fields,
        }

        if draft.schema_module.is_none() {
            return Err(CompileError::MissingSchema {
                url: raw.url.clone(),
            });
        }

        for format in Format::ALL {
            let component = self
                .prepare_component(raw, &draft.fields, parent.as_deref(), extends_schema, format)
                .await?;
            draft.components.insert(format, component);
        }

        let card = draft.finish()?;
        tracing::debug!("Compiled card {} ({} fields)", card.url, card.fields.len());
        Ok(card)
    }

    /// Extract the card's own schema and define its rewritten module
    async fn prepare_schema(&self, raw: &RawCard) -> Result<Option<(SchemaMeta, String)>> {
        let Some(path) = raw.schema.as_deref() else {
            if raw.file(&self.config.conventional_schema_file).is_some() {
                tracing::warn!(
                    "{} contains a {} but card.json does not reference it; the card is compiled without a schema of its own",
                    raw.url,
                    self.config.conventional_schema_file
                );
            }
            return Ok(None);
        };

        let local_file = normalize_path(path);
        let source = raw
            .file(local_file)
            .ok_or_else(|| CompileError::missing_file(&raw.url, path))?;

        let ctx = SchemaContext {
            card_url: &raw.url,
            types_module: &self.config.types_module,
        };
        let CompiledSchema { meta, code } = compile_schema(source, ctx)
            .map_err(|e| CompileError::schema(format!("{}/{}", raw.url, local_file), e))?;

        let module = self.define_module(&raw.url, local_file, code).await?;
        Ok(Some((meta, module)))
    }

    /// Fetch the compiled card behind every declared field, in declaration order
    async fn lookup_fields(&self, meta: &SchemaMeta) -> Result<Fields> {
        let cards = try_join_all(
            meta.fields
                .values()
                .map(|field| self.builder.get_compiled_card(&field.card_url)),
        )
        .await?;

        Ok(meta
            .fields
            .values()
            .zip(cards)
            .map(|(field, card)| {
                (
                    field.name.clone(),
                    Field {
                        field_type: field.field_type,
                        card,
                        name: field.name.clone(),
                    },
                )
            })
            .collect())
    }

    async fn fetch_parent(&self, raw: &RawCard, parent_url: &str) -> Result<Arc<CompiledCard>> {
        match self.builder.get_compiled_card(parent_url).await {
            Ok(parent) => Ok(parent),
            Err(err) => {
                if let Some(BuilderError::NotFound { url }) = err.downcast_ref::<BuilderError>() {
                    if url == parent_url {
                        return Err(CompileError::MissingParent {
                            url: raw.url.clone(),
                        });
                    }
                }
                Err(err.into())
            }
        }
    }

    async fn prepare_component(
        &self,
        raw: &RawCard,
        fields: &Fields,
        parent: Option<&CompiledCard>,
        extends_schema: bool,
        format: Format,
    ) -> Result<ComponentInfo> {
        if let Some(path) = raw.template_path(format) {
            let source = raw
                .file(path)
                .ok_or_else(|| CompileError::missing_file(&raw.url, path))?;
            return self.compile_component(&raw.url, path, source, fields, format).await;
        }

        let Some(parent) = parent else {
            return Err(CompileError::MissingComponent {
                url: raw.url.clone(),
                format,
            });
        };
        let inherited = parent.component(format);

        if !extends_schema {
            tracing::debug!("Reusing {} component of {} for {}", format, parent.url, raw.url);
            return Ok(inherited.clone());
        }

        // Field set changed, so the authoring card's template is compiled again
        tracing::debug!(
            "Recompiling {} component of {} for {}",
            format,
            inherited.source_card_url,
            raw.url
        );
        let source_card = self.builder.get_raw_card(&inherited.source_card_url).await?;
        let Some(path) = source_card.template_path(format) else {
            return Err(CompileError::MissingInheritedComponent {
                parent_url: parent.url.clone(),
                format,
                source_card_url: inherited.source_card_url.clone(),
            });
        };
        let source = source_card
            .file(path)
            .ok_or_else(|| CompileError::missing_file(&source_card.url, path))?;
        self.compile_component(&source_card.url, path, source, fields, format)
            .await
    }

    /// Compile a template against `fields` and define it under the authoring card
    async fn compile_component(
        &self,
        card_url: &str,
        local_file: &str,
        source: &str,
        fields: &Fields,
        format: Format,
    ) -> Result<ComponentInfo> {
        let local_file = normalize_path(local_file);
        let ctx = TemplateContext {
            card_url,
            local_file,
            fields,
            format,
            template_compilation_module: &self.config.template_compilation_module,
        };
        let compiled = compile_template(source, ctx)
            .map_err(|e| CompileError::template(format!("{}/{}", card_url, local_file), e))?;

        let module_name = self
            .define_module(card_url, &hashed_module_path(local_file, fields), compiled.code)
            .await?;

        Ok(ComponentInfo {
            module_name,
            used_fields: compiled.used_fields,
            inline_hbs: compiled.inline_hbs,
            source_card_url: card_url.to_string(),
            deserialize: (!compiled.deserialize.is_empty()).then_some(compiled.deserialize),
        })
    }

    async fn define_module(&self, card_url: &str, local_module: &str, source: String) -> Result<String> {
        let module = self.define.define(card_url, local_module, source).await?;
        tracing::debug!("Defined module {} for {}", module, card_url);
        Ok(module)
    }
}

/// Every file that is not the schema or a template
fn collect_assets(raw: &RawCard) -> Vec<Asset> {
    let features: HashSet<&str> = raw
        .feature_paths()
        .map(|(_, path)| normalize_path(path))
        .collect();

    raw.files
        .keys()
        .filter(|path| !features.contains(normalize_path(path)))
        .map(|path| Asset {
            asset_type: AssetType::from_path(path),
            path: path.clone(),
        })
        .collect()
}
