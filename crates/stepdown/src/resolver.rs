//! Special parameters resolved from external resources.
//!
//! A `<kind:value>` parameter is resolved while parsing: `file:` loads text
//! into a [`StepArg::SpecialString`] and `table:` loads CSV into a
//! [`StepArg::SpecialTable`]. Resources are read through a
//! [`ResourceLoader`], so the core stays independent of where content lives.

use std::io;
use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use thiserror::Error;

use crate::datatable::{DataTableError, Table};
use crate::step_args::StepArg;

/// Resolver name for file contents.
pub const FILE_RESOLVER: &str = "file";
/// Resolver name for CSV tables.
pub const TABLE_RESOLVER: &str = "table";

/// Failures while resolving a special parameter.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No resolver is registered for the parameter's kind.
    #[error("Resolver not found for special param <{descriptor}>")]
    UnknownResolver {
        /// The full `kind:value` descriptor.
        descriptor: String,
    },
    /// The resource could not be read.
    #[error("unable to read '{location}': {source}")]
    Read {
        /// Resource location as written.
        location: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The resource is not a valid table.
    #[error("invalid table in '{location}': {source}")]
    Table {
        /// Resource location as written.
        location: String,
        /// Table construction error.
        #[source]
        source: DataTableError,
    },
}

/// Source of external resource content.
pub trait ResourceLoader: Send + Sync {
    /// Read the resource at `location` as text.
    ///
    /// # Errors
    /// Returns the underlying I/O error when the resource is unavailable.
    fn load(&self, location: &str) -> io::Result<String>;
}

/// Reads resources from the filesystem, relative to a data directory.
#[derive(Debug, Clone)]
pub struct FsResources {
    root: PathBuf,
}

impl FsResources {
    /// Resolve relative locations against `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ResourceLoader for FsResources {
    fn load(&self, location: &str) -> io::Result<String> {
        let path = Path::new(location);
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        std::fs::read_to_string(path)
    }
}

/// Resources held in memory, keyed by location.
#[derive(Debug, Clone, Default)]
pub struct InMemoryResources {
    entries: HashMap<String, String>,
}

impl InMemoryResources {
    /// Add or replace the content at `location`.
    #[must_use]
    pub fn with(mut self, location: impl Into<String>, content: impl Into<String>) -> Self {
        self.entries.insert(location.into(), content.into());
        self
    }
}

impl ResourceLoader for InMemoryResources {
    fn load(&self, location: &str) -> io::Result<String> {
        self.entries.get(location).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no resource at {location}"))
        })
    }
}

/// Resolves `file:` and `table:` special parameters.
pub struct SpecialResolver {
    loader: Box<dyn ResourceLoader>,
}

impl Default for SpecialResolver {
    fn default() -> Self {
        Self::new(FsResources::new("."))
    }
}

impl std::fmt::Debug for SpecialResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecialResolver").finish_non_exhaustive()
    }
}

impl SpecialResolver {
    /// A resolver reading through `loader`.
    #[must_use]
    pub fn new(loader: impl ResourceLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
        }
    }

    /// A resolver reading files relative to `data_dir`.
    #[must_use]
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self::new(FsResources::new(data_dir))
    }

    /// Resolve the special parameter `<kind:value>`.
    ///
    /// # Errors
    /// Returns [`ResolveError`] for an unknown kind or an unreadable or
    /// malformed resource.
    pub fn resolve(&self, kind: &str, value: &str) -> Result<StepArg, ResolveError> {
        let descriptor = format!("{kind}:{value}");
        match kind {
            FILE_RESOLVER => {
                let value = self.read(value)?;
                log::debug!("resolved special parameter <{descriptor}>");
                Ok(StepArg::SpecialString {
                    name: descriptor,
                    value,
                })
            }
            TABLE_RESOLVER => {
                let table = self.load_table(value)?;
                log::debug!(
                    "resolved special parameter <{descriptor}> with {} rows",
                    table.row_count()
                );
                Ok(StepArg::SpecialTable {
                    name: descriptor,
                    table,
                })
            }
            _ => Err(ResolveError::UnknownResolver { descriptor }),
        }
    }

    /// Load the CSV table at `location`.
    ///
    /// # Errors
    /// Returns [`ResolveError`] when the resource is unreadable or not a
    /// valid table.
    pub fn load_table(&self, location: &str) -> Result<Table, ResolveError> {
        let text = self.read(location)?;
        Table::from_csv(&text).map_err(|source| ResolveError::Table {
            location: location.to_owned(),
            source,
        })
    }

    fn read(&self, location: &str) -> Result<String, ResolveError> {
        self.loader
            .load(location)
            .map_err(|source| ResolveError::Read {
                location: location.to_owned(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> SpecialResolver {
        SpecialResolver::new(
            InMemoryResources::default()
                .with("notes.txt", "hello")
                .with("users.csv", "name\nalice\nbob\n"),
        )
    }

    #[test]
    fn resolves_file_contents() {
        let arg = resolver().resolve("file", "notes.txt");
        assert!(matches!(
            arg,
            Ok(StepArg::SpecialString { ref name, ref value }) if name == "file:notes.txt" && value == "hello"
        ));
    }

    #[test]
    fn resolves_csv_tables() {
        match resolver().resolve("table", "users.csv") {
            Ok(StepArg::SpecialTable { table, .. }) => {
                assert_eq!(table.column_values("name"), Some(vec!["alice", "bob"]));
            }
            other => panic!("expected a special table, got {other:?}"),
        }
    }

    #[test]
    fn unknown_kind_names_the_descriptor() {
        let err = resolver().resolve("blob", "x").err().map(|e| e.to_string());
        assert_eq!(
            err.as_deref(),
            Some("Resolver not found for special param <blob:x>")
        );
    }

    #[test]
    fn missing_resource_is_a_read_error() {
        assert!(matches!(
            resolver().resolve("file", "absent.txt"),
            Err(ResolveError::Read { .. })
        ));
    }

    #[test]
    fn filesystem_loader_reads_relative_to_root() {
        let dir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(err) => panic!("tempdir: {err}"),
        };
        if let Err(err) = std::fs::write(dir.path().join("data.txt"), "on disk") {
            panic!("write fixture: {err}");
        }
        let resolver = SpecialResolver::with_data_dir(dir.path());
        assert!(matches!(
            resolver.resolve("file", "data.txt"),
            Ok(StepArg::SpecialString { value, .. }) if value == "on disk"
        ));
    }
}
