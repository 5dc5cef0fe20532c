//! Generation pipeline: resolve imports, synthesize, report per file

use crate::error::GenerateError;
use crate::imports::ImportSet;
use crate::schema::SchemaFile;
use crate::synth::CodeSynthesizer;
use crate::template::TemplateSet;
use crate::walker::SchemaWalker;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Default artifact suffix, appended to each file's generated prefix
pub const DEFAULT_SUFFIX: &str = "bus-adaptor.rs";

/// Options for a generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Artifact name suffix
    pub suffix: String,

    /// Name written into the generated file header
    pub generator_name: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_SUFFIX.to_string(),
            generator_name: concat!("busbridge-codegen ", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl GeneratorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the artifact suffix
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Set the generator name written into file headers
    pub fn with_generator_name(mut self, name: impl Into<String>) -> Self {
        self.generator_name = name.into();
        self
    }
}

/// One rendered artifact, not yet on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Path relative to the output root
    pub name: String,
    pub content: String,
}

impl GeneratedFile {
    /// Write the artifact below `root`, creating directories as needed
    pub fn write_to(&self, root: &Path) -> io::Result<PathBuf> {
        let path = root.join(&self.name);
        write_atomic(&path, self.content.as_bytes())?;
        Ok(path)
    }
}

/// Outcome of generating a batch of files
#[derive(Debug, Default)]
pub struct GenerationReport {
    /// Artifacts for files that generated successfully
    pub files: Vec<GeneratedFile>,

    /// Files that failed; their siblings are unaffected
    pub failures: Vec<GenerateError>,
}

impl GenerationReport {
    /// Check if every file generated
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Write every successful artifact below `root`
    pub fn write_all(&self, root: &Path) -> io::Result<Vec<PathBuf>> {
        self.files.iter().map(|file| file.write_to(root)).collect()
    }
}

/// Turns schema files into adaptor source
#[derive(Debug, Clone, Default)]
pub struct Generator {
    options: GeneratorOptions,
    synthesizer: CodeSynthesizer,
}

impl Generator {
    /// Create a generator using the embedded templates
    pub fn new(options: GeneratorOptions) -> Self {
        Self::with_templates(options, TemplateSet::embedded())
    }

    /// Create a generator using custom templates
    pub fn with_templates(options: GeneratorOptions, templates: TemplateSet) -> Self {
        Self {
            options,
            synthesizer: CodeSynthesizer::new(templates),
        }
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Generate one file
    ///
    /// `Ok(None)` means the file declares no services and needs no artifact.
    pub fn generate_file(&self, file: &SchemaFile) -> Result<Option<GeneratedFile>, GenerateError> {
        if !SchemaWalker::new(file).has_services() {
            tracing::trace!(file = %file.name, "no services, skipping");
            return Ok(None);
        }
        let imports = ImportSet::resolve(file).map_err(|err| GenerateError::new(&file.name, err))?;
        self.synthesizer
            .synthesize(file, &imports, &self.options)
            .map_err(|err| GenerateError::new(&file.name, err))
    }

    /// Generate every file, continuing past failures
    pub fn generate(&self, files: &[SchemaFile]) -> GenerationReport {
        let mut report = GenerationReport::default();
        for file in files {
            match self.generate_file(file) {
                Ok(Some(generated)) => {
                    tracing::debug!(file = %file.name, output = %generated.name, "generated");
                    report.files.push(generated);
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::error!(file = %err.file, reason = %err.kind, "generation failed");
                    report.failures.push(err);
                }
            }
        }
        report
    }
}

/// Write `contents` to `path` so readers never observe a partial file
///
/// The data goes to a temporary file in the same directory which is then
/// renamed over `path`.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}
