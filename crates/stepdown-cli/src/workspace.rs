//! Loading concept and spec files into parsed form.
//!
//! Concept files are read and resolved first, on the calling thread, into a
//! single [`ConceptDictionary`]. Spec files are then parsed on scoped worker
//! threads which share the finished dictionary by reference.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::thread;

use stepdown::{
    ConceptDictionary, ParseConfig, ParseError, ParsedSpec, SpecParser, Specification, Warning,
};

use crate::discovery::{CONCEPT_EXTENSIONS, SPEC_EXTENSIONS, collect_files};
use crate::error::CliError;

/// A file read into memory.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Label used in diagnostics.
    pub origin: String,
    /// File contents.
    pub text: String,
}

impl SourceFile {
    /// Read `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Io`] when the file cannot be read as UTF-8 text.
    pub fn read(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            origin: path.display().to_string(),
            text,
        })
    }
}

/// Directories to search.
#[derive(Debug, Clone, Default)]
pub struct Roots {
    /// Roots holding spec files.
    pub specs: Vec<PathBuf>,
    /// Roots holding concept files; the spec roots are used when empty.
    pub concepts: Vec<PathBuf>,
}

impl Roots {
    fn concept_roots(&self) -> &[PathBuf] {
        if self.concepts.is_empty() {
            &self.specs
        } else {
            &self.concepts
        }
    }
}

/// Everything parsed for one command.
#[derive(Debug, Default)]
pub struct Workspace {
    /// The resolved concept dictionary.
    pub concepts: ConceptDictionary,
    /// Problems found in concept files.
    pub concept_errors: Vec<ParseError>,
    /// Warnings from concept files.
    pub concept_warnings: Vec<Warning>,
    /// Parsed specs, in file order.
    pub specs: Vec<ParsedSpec>,
}

impl Workspace {
    /// Discover, read and parse every concept and spec file under `roots`.
    ///
    /// # Errors
    ///
    /// Returns a [`CliError`] when discovery or reading fails, or when a
    /// parsing worker panics. Parse problems are not errors here; they are
    /// collected in the returned workspace.
    pub fn load(roots: &Roots, config: &ParseConfig) -> Result<Self, CliError> {
        let concept_files = read_all(&collect_files(roots.concept_roots(), CONCEPT_EXTENSIONS)?)?;
        let spec_files = read_all(&collect_files(&roots.specs, SPEC_EXTENSIONS)?)?;
        tracing::debug!(
            concepts = concept_files.len(),
            specs = spec_files.len(),
            "discovered files"
        );

        let resolver = config.resolver();
        let mut builder = ConceptDictionary::builder(&resolver);
        let mut concept_errors = Vec::new();
        let mut concept_warnings = Vec::new();
        for file in &concept_files {
            let result = builder.add_file(&file.text, &file.origin);
            concept_errors.extend(result.errors);
            concept_warnings.extend(result.warnings);
        }
        let build = builder.build();
        concept_errors.extend(build.errors);

        let parser = SpecParser::new(&build.dictionary, &resolver);
        let specs = parse_concurrently(&spec_files, &parser)?;
        Ok(Self {
            concepts: build.dictionary,
            concept_errors,
            concept_warnings,
            specs,
        })
    }

    /// Every parse error, concept files first.
    pub fn errors(&self) -> impl Iterator<Item = &ParseError> {
        self.concept_errors
            .iter()
            .chain(self.specs.iter().flat_map(|spec| &spec.result.errors))
    }

    /// Every warning, concept files first.
    pub fn warnings(&self) -> impl Iterator<Item = &Warning> {
        self.concept_warnings
            .iter()
            .chain(self.specs.iter().flat_map(|spec| &spec.result.warnings))
    }

    /// Whether any file failed to parse.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Send every warning to the log.
    pub fn log_warnings(&self) {
        for warning in self.warnings() {
            tracing::warn!("{warning}");
        }
    }

    /// The specs that parsed without errors.
    #[must_use]
    pub fn into_valid_specs(self) -> Vec<Specification> {
        self.specs
            .into_iter()
            .filter(|spec| spec.result.is_ok())
            .map(|spec| spec.specification)
            .collect()
    }
}

fn read_all(paths: &[PathBuf]) -> Result<Vec<SourceFile>, CliError> {
    paths.iter().map(|path| SourceFile::read(path)).collect()
}

fn parse_concurrently(
    files: &[SourceFile],
    parser: &SpecParser<'_>,
) -> Result<Vec<ParsedSpec>, CliError> {
    if files.is_empty() {
        return Ok(Vec::new());
    }
    let workers = thread::available_parallelism().map_or(1, NonZeroUsize::get);
    let batch_size = files.len().div_ceil(workers).max(1);
    thread::scope(|scope| {
        let handles: Vec<_> = files
            .chunks(batch_size)
            .map(|batch| {
                scope.spawn(move || {
                    batch
                        .iter()
                        .map(|file| parser.parse(&file.text, &file.origin))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .try_fold(Vec::with_capacity(files.len()), |mut parsed, handle| {
                let batch = handle.join().map_err(|_| CliError::WorkerPanicked)?;
                parsed.extend(batch);
                Ok(parsed)
            })
    })
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests require explicit panic messages for debugging failures"
)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn write(dir: &Path, name: &str, text: &str) {
        fs::write(dir.join(name), text).expect("write fixture");
    }

    #[test]
    fn specs_see_concepts_from_the_same_roots() {
        let dir = TempDir::new().expect("temp dir");
        write(
            dir.path(),
            "login.cpt",
            "# log in as <user>\n* open the login page\n* enter <user>\n",
        );
        for index in 0..6 {
            write(
                dir.path(),
                &format!("spec{index}.spec"),
                &format!("# Spec {index}\n## Scenario\n* log in as \"user{index}\"\n"),
            );
        }
        let roots = Roots {
            specs: vec![dir.path().to_path_buf()],
            concepts: Vec::new(),
        };
        let workspace = Workspace::load(&roots, &ParseConfig::default()).expect("load");
        assert!(!workspace.has_errors());
        assert_eq!(workspace.concepts.len(), 1);
        assert_eq!(workspace.specs.len(), 6);
        let origins: Vec<_> = workspace
            .specs
            .iter()
            .map(|spec| spec.specification.heading_text().to_owned())
            .collect();
        assert_eq!(origins, ["Spec 0", "Spec 1", "Spec 2", "Spec 3", "Spec 4", "Spec 5"]);
        assert!(
            workspace
                .specs
                .iter()
                .flat_map(|spec| spec.specification.steps())
                .all(stepdown::Step::is_concept)
        );
    }

    #[test]
    fn errors_are_collected_not_returned() {
        let dir = TempDir::new().expect("temp dir");
        write(dir.path(), "broken.spec", "# Broken\n## Scenario\n* enter <pwd>\n");
        write(dir.path(), "fine.spec", "# Fine\n## Scenario\n* do it\n");
        let roots = Roots {
            specs: vec![dir.path().to_path_buf()],
            concepts: Vec::new(),
        };
        let workspace = Workspace::load(&roots, &ParseConfig::default()).expect("load");
        let errors: Vec<_> = workspace.errors().collect();
        assert_eq!(errors.len(), 1);
        assert!(errors.iter().all(|error| error.line == 3));
        assert_eq!(workspace.into_valid_specs().len(), 1);
    }

    #[test]
    fn missing_spec_root_fails_the_load() {
        let roots = Roots {
            specs: vec![PathBuf::from("no/such/specs")],
            concepts: Vec::new(),
        };
        let result = Workspace::load(&roots, &ParseConfig::default());
        assert!(matches!(result, Err(CliError::MissingPath(_))));
    }
}
