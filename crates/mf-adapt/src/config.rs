//! Adapter registry and compiled mapping cache.

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use dashmap::DashMap;
use itertools::Itertools;
use mf_core::ast::{Expr, Ty, Value};
use mf_core::id::Ident;
use mf_core::pretty::{pretty, PrettyOptions};
use mf_core::{config, config_bail, debug, Result};
use mf_interpret::{compile_program, CompiledProgram};

use crate::adapter::TypeAdapter;
use crate::argument::CompileArgument;
use crate::dictionary::DictionaryAdapter;
use crate::settings::{MapKind, TypeAdapterSettings};

const SOURCE_PARAM: &str = "src";
const DESTINATION_PARAM: &str = "dest";

/// Cache key: the exact source and destination types plus the operation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MappingKey {
    source: String,
    destination: String,
    kind: MapKind,
}

impl MappingKey {
    fn new(source: &Ty, destination: &Ty, kind: MapKind) -> Result<Self> {
        Ok(Self {
            source: serde_json::to_string(source)?,
            destination: serde_json::to_string(destination)?,
            kind,
        })
    }
}

/// A generated program together with its lowered form
#[derive(Debug, Clone)]
pub struct CompiledMapping {
    pub source: Ty,
    pub destination: Ty,
    pub kind: MapKind,
    pub adapter: &'static str,
    program: Expr,
    compiled: CompiledProgram,
}

impl CompiledMapping {
    pub fn program(&self) -> &Expr {
        &self.program
    }

    pub fn invoke(&self, args: Vec<Value>) -> Result<Value> {
        self.compiled.invoke(args)
    }
}

pub struct TypeAdapterConfig {
    settings: Arc<TypeAdapterSettings>,
    /// highest score first
    adapters: Vec<Arc<dyn TypeAdapter>>,
    cache: DashMap<MappingKey, Arc<CompiledMapping>>,
    use_cache: bool,
    trace_programs: bool,
}

impl TypeAdapterConfig {
    pub fn new(settings: TypeAdapterSettings) -> Self {
        let mut config = Self {
            settings: Arc::new(settings),
            adapters: Vec::new(),
            cache: DashMap::new(),
            use_cache: !config::cache_disabled(),
            trace_programs: config::trace_programs(),
        };
        config.register(Arc::new(DictionaryAdapter::default()));
        config
    }

    /// Overrides `MAPFORGE_NO_CACHE` for this registry
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.use_cache = enabled;
        if !enabled {
            self.cache.clear();
        }
        self
    }

    /// Overrides `MAPFORGE_TRACE_PROGRAMS` for this registry
    pub fn with_program_tracing(mut self, enabled: bool) -> Self {
        self.trace_programs = enabled;
        self
    }

    pub fn settings(&self) -> &TypeAdapterSettings {
        &self.settings
    }

    pub fn register(&mut self, adapter: Arc<dyn TypeAdapter>) {
        self.adapters.push(adapter);
        self.adapters.sort_by_key(|adapter| std::cmp::Reverse(adapter.score()));
        self.cache.clear();
    }

    pub fn adapter_names(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|adapter| adapter.name()).collect()
    }

    pub fn select(&self, source: &Ty, destination: &Ty, kind: MapKind) -> Result<Arc<dyn TypeAdapter>> {
        match self
            .adapters
            .iter()
            .find(|adapter| adapter.can_map(source, destination, kind))
        {
            Some(adapter) => Ok(adapter.clone()),
            None => config_bail!(
                "no adapter maps {} to {} ({}); registered: [{}]",
                source,
                destination,
                kind,
                self.adapter_names().iter().join(", ")
            ),
        }
    }

    fn params(kind: MapKind) -> Vec<Ident> {
        match kind {
            MapKind::MergeIntoExisting => vec![Ident::new(SOURCE_PARAM), Ident::new(DESTINATION_PARAM)],
            MapKind::NewInstance | MapKind::Projection => vec![Ident::new(SOURCE_PARAM)],
        }
    }

    /// Generates the program body for one request. Its parameters are `src`,
    /// plus `dest` for merges.
    pub fn build_expression(&self, source: &Ty, destination: &Ty, kind: MapKind) -> Result<Expr> {
        let adapter = self.select(source, destination, kind)?;
        let arg = CompileArgument::new(
            source.clone(),
            destination.clone(),
            kind,
            self.settings.clone(),
        );
        let src = Expr::ident(SOURCE_PARAM).with_ty(source.clone());
        let dest = match kind {
            MapKind::MergeIntoExisting => {
                Some(Expr::ident(DESTINATION_PARAM).with_ty(destination.clone()))
            }
            MapKind::NewInstance | MapKind::Projection => None,
        };
        adapter.create_expression(&src, dest.as_ref(), &arg)
    }

    /// The single-expression program handed to external query translators
    pub fn projection(&self, source: &Ty, destination: &Ty) -> Result<Expr> {
        self.build_expression(source, destination, MapKind::Projection)
    }

    /// Generates and lowers the program for a type pair once; later calls
    /// reuse it
    pub fn compile(&self, source: &Ty, destination: &Ty, kind: MapKind) -> Result<Arc<CompiledMapping>> {
        let key = MappingKey::new(source, destination, kind)?;
        if self.use_cache {
            if let Some(mapping) = self.cache.get(&key) {
                return Ok(mapping.value().clone());
            }
        }

        let adapter = self.select(source, destination, kind)?;
        let program = self.build_expression(source, destination, kind)?;
        let compiled = compile_program(&program, &Self::params(kind))?;
        if self.trace_programs {
            debug!(
                "compiled {} mapping {} -> {}:\n{}",
                kind,
                source,
                destination,
                pretty(&program, PrettyOptions::default())
            );
        }
        let mapping = Arc::new(CompiledMapping {
            source: source.clone(),
            destination: destination.clone(),
            kind,
            adapter: adapter.name(),
            program,
            compiled,
        });
        if !self.use_cache {
            return Ok(mapping);
        }
        Ok(self.cache.entry(key).or_insert(mapping).value().clone())
    }

    /// Maps `value` into a new destination
    pub fn map(&self, value: &Value, source: &Ty, destination: &Ty) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::null());
        }
        let mapping = self.compile(source, destination, MapKind::NewInstance)?;
        mapping.invoke(vec![value.clone()])
    }

    /// Merges `value` into `target` and returns the updated target. A null
    /// target is mapped like a new destination.
    pub fn map_to_target(
        &self,
        value: &Value,
        target: Value,
        source: &Ty,
        destination: &Ty,
    ) -> Result<Value> {
        if value.is_null() {
            return Ok(target);
        }
        if target.is_null() {
            return self.map(value, source, destination);
        }
        let mapping = self.compile(source, destination, MapKind::MergeIntoExisting)?;
        mapping.invoke(vec![value.clone(), target])
    }

    pub fn cached_mappings(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

impl Default for TypeAdapterConfig {
    fn default() -> Self {
        Self::new(TypeAdapterSettings::default())
    }
}

impl Debug for TypeAdapterConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeAdapterConfig")
            .field("settings", &self.settings)
            .field("adapters", &self.adapter_names())
            .field("cached", &self.cache.len())
            .field("use_cache", &self.use_cache)
            .finish()
    }
}
