//! Import resolution for generated files
//!
//! Every artifact starts from the same runtime-support imports and adds one
//! `use` per foreign module its types reference. Entries are keyed by module
//! path in a sorted map, so the emitted block is identical across runs.

use crate::error::SchemaError;
use crate::schema::{SchemaFile, TypeRef, validate_module_path};
use crate::walker::SchemaWalker;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Runtime-support imports present in every generated file
pub const BASE_IMPORTS: [(&str, Option<&str>); 10] = [
    ("std::sync::Arc", None),
    ("busbridge::async_trait::async_trait", None),
    ("busbridge::client", None),
    ("busbridge::codec", None),
    ("busbridge::context", None),
    ("busbridge::service", None),
    ("busbridge::status", None),
    ("busbridge::transport", None),
    ("busbridge::tracing", None),
    ("busbridge::tracing::Instrument", Some("_")),
];

/// Appended to an alias until it no longer collides
const ALIAS_SUFFIX: &str = "_pb";

/// One `use` item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEntry {
    pub path: String,
    pub alias: Option<String>,
}

impl ImportEntry {
    pub fn new(path: impl Into<String>, alias: Option<String>) -> Self {
        Self {
            path: path.into(),
            alias,
        }
    }

    /// Name the import is reachable under in generated code
    pub fn binding(&self) -> &str {
        match &self.alias {
            Some(alias) => alias,
            None => self.path.rsplit("::").next().unwrap_or(&self.path),
        }
    }

    /// Render as a `use` item
    pub fn render(&self) -> String {
        match &self.alias {
            Some(alias) => format!("use {} as {};", self.path, alias),
            None => format!("use {};", self.path),
        }
    }
}

/// Deduplicated, sorted imports for one generated file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSet {
    module: String,
    entries: BTreeMap<String, ImportEntry>,
}

impl ImportSet {
    /// Start from the base imports for a file living in `module`
    pub fn new(module: impl Into<String>) -> Self {
        let entries = BASE_IMPORTS
            .iter()
            .map(|(path, alias)| {
                let entry = ImportEntry::new(*path, alias.map(str::to_string));
                (entry.path.clone(), entry)
            })
            .collect();
        Self {
            module: module.into(),
            entries,
        }
    }

    /// Collect every foreign module referenced by `file`
    pub fn resolve(file: &SchemaFile) -> Result<Self, SchemaError> {
        validate_module_path(&file.module)?;

        let mut imports = ImportSet::new(file.module.clone());
        for ty in SchemaWalker::new(file).type_refs() {
            imports.insert_type(ty)?;
        }
        Ok(imports)
    }

    /// Module the generated file lives in
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Record the module of `ty`, unless it is the file's own module
    ///
    /// Returns `true` if a new entry was added.
    pub fn insert_type(&mut self, ty: &TypeRef) -> Result<bool, SchemaError> {
        ty.validate()?;

        if ty.module == self.module {
            tracing::trace!(ty = %ty.name, module = %ty.module, "same module, no import");
            return Ok(false);
        }
        if self.entries.contains_key(&ty.module) {
            return Ok(false);
        }

        let alias = self.alias_for(&ty.module);
        tracing::debug!(module = %ty.module, alias = ?alias, "importing module");
        self.entries
            .insert(ty.module.clone(), ImportEntry::new(ty.module.clone(), alias));
        Ok(true)
    }

    /// Type path as written in generated code
    pub fn qualify(&self, ty: &TypeRef) -> String {
        if ty.module == self.module {
            return ty.name.clone();
        }
        match self.entries.get(&ty.module) {
            Some(entry) => format!("{}::{}", entry.binding(), ty.name),
            None => ty.full_path(),
        }
    }

    /// Check if `path` is imported
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Look up the entry for `path`
    pub fn get(&self, path: &str) -> Option<&ImportEntry> {
        self.entries.get(path)
    }

    /// Entries in emission order
    pub fn entries(&self) -> impl Iterator<Item = &ImportEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the `use` block
    ///
    /// Each item is marked `allow(unused_imports)` since not every file
    /// exercises every runtime module.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in self.entries() {
            let _ = writeln!(out, "#[allow(unused_imports)]\n{}", entry.render());
        }
        out
    }

    fn alias_for(&self, module: &str) -> Option<String> {
        let last = module.rsplit("::").next().unwrap_or(module);
        let mut candidate = default_alias(module);
        while self.is_bound(&candidate) {
            candidate.push_str(ALIAS_SUFFIX);
        }
        (candidate != last).then_some(candidate)
    }

    fn is_bound(&self, name: &str) -> bool {
        self.entries.values().any(|entry| entry.binding() == name)
    }
}

/// Segments after a leading `crate`, `super`, `self`, or `::`, joined by `_`
fn default_alias(module: &str) -> String {
    let relative = module.strip_prefix("::").unwrap_or(module);
    let segments: Vec<&str> = relative
        .split("::")
        .skip_while(|segment| matches!(*segment, "crate" | "super" | "self"))
        .collect();
    match segments.as_slice() {
        [] => "crate_root".to_string(),
        [single] => single.to_string(),
        _ => segments
            .iter()
            .map(|segment| segment.strip_prefix("r#").unwrap_or(segment))
            .collect::<Vec<_>>()
            .join("_"),
    }
}
