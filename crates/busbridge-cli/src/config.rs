//! Plugin configuration
//!
//! Settings come from three layers, later ones winning: built-in defaults,
//! a TOML config file, and the protoc parameter string
//! (`--busbridge_opt=suffix=...,module_root=...`).

use anyhow::{Context, Result, bail};
use busbridge_codegen::{DEFAULT_SUFFIX, GeneratorOptions, validate_module_path};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Config file looked up in the home directory when no path is given
pub const CONFIG_FILE_NAME: &str = ".busbridge.toml";

/// Module the generated code for package-less files lives in
pub const DEFAULT_MODULE_ROOT: &str = "crate";

/// Packages mapped to external crates unless overridden
pub const DEFAULT_EXTERN_PATHS: [(&str, &str); 1] = [(".google.protobuf", "::prost_types")];

/// Plugin settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Enable debug logging
    pub debug: bool,

    /// Artifact suffix
    pub suffix: String,

    /// Module that package modules are nested under
    pub module_root: String,

    /// Schema package (with leading dot) to Rust module overrides
    pub extern_paths: BTreeMap<String, String>,

    /// Directory of template overrides
    pub templates: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            suffix: DEFAULT_SUFFIX.to_string(),
            module_root: DEFAULT_MODULE_ROOT.to_string(),
            extern_paths: BTreeMap::new(),
            templates: None,
        }
    }
}

impl Config {
    /// Load settings from `explicit`, or from the home directory config file
    /// if one exists, or fall back to defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {path:?}"))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config: {path:?}"))
    }

    /// Parse settings from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    /// Apply a protoc parameter string such as
    /// `suffix=nats.rs,module_root=crate::pb,extern_path=.common=crate::shared`
    pub fn apply_parameter(&mut self, parameter: &str) -> Result<()> {
        for part in parameter.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = part
                .split_once('=')
                .with_context(|| format!("Parameter `{part}` is not key=value"))?;
            match key.trim() {
                "suffix" => self.suffix = value.to_string(),
                "module_root" => self.module_root = value.to_string(),
                "templates" => self.templates = Some(PathBuf::from(value)),
                "debug" => {
                    self.debug = value
                        .parse()
                        .with_context(|| format!("Parameter `debug` expects true or false, got `{value}`"))?
                }
                "extern_path" => {
                    let (package, module) = value.split_once('=').with_context(|| {
                        format!("Parameter `extern_path` expects .package=module, got `{value}`")
                    })?;
                    self.extern_paths
                        .insert(package.to_string(), module.to_string());
                }
                other => bail!("Unknown parameter `{other}`"),
            }
        }
        self.validate()
    }

    /// Check every setting is usable
    pub fn validate(&self) -> Result<()> {
        if self.suffix.is_empty() {
            bail!("suffix cannot be empty");
        }
        validate_module_path(&self.module_root)
            .with_context(|| format!("Invalid module_root `{}`", self.module_root))?;
        for (package, module) in &self.extern_paths {
            if !package.starts_with('.') {
                bail!("extern_path package `{package}` must start with '.'");
            }
            validate_module_path(module)
                .with_context(|| format!("Invalid extern_path module for `{package}`"))?;
        }
        Ok(())
    }

    /// Extern package mappings including the built-in ones
    pub fn resolved_extern_paths(&self) -> BTreeMap<String, String> {
        let mut paths: BTreeMap<String, String> = DEFAULT_EXTERN_PATHS
            .iter()
            .map(|(package, module)| (package.to_string(), module.to_string()))
            .collect();
        paths.extend(self.extern_paths.clone());
        paths
    }

    /// Generator options derived from these settings
    pub fn generator_options(&self) -> GeneratorOptions {
        GeneratorOptions::new()
            .with_suffix(self.suffix.clone())
            .with_generator_name(concat!("protoc-gen-busbridge ", env!("CARGO_PKG_VERSION")))
    }
}

fn default_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(CONFIG_FILE_NAME))
}
