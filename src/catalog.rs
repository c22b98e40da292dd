//! The on-disk SQL catalog.
//!
//! A catalog root holds three sibling folders, `queries/`, `functions/` and
//! `procedures/`, each containing `*.sql` files. A file's stem is its key and
//! its full text is its content. There is no manifest; presence in a folder
//! is registration.

use crate::metadata::{CallableKind, MetadataResult, parse_metadata};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// One of the three catalog folders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SqlFolder {
    Queries,
    Functions,
    Procedures,
}

impl SqlFolder {
    /// All folders in display order.
    pub const ALL: [SqlFolder; 3] = [SqlFolder::Queries, SqlFolder::Functions, SqlFolder::Procedures];

    /// Directory name under the catalog root.
    pub fn dir_name(self) -> &'static str {
        match self {
            SqlFolder::Queries => "queries",
            SqlFolder::Functions => "functions",
            SqlFolder::Procedures => "procedures",
        }
    }

    /// The folder holding sources of `kind`.
    pub fn for_kind(kind: CallableKind) -> Self {
        match kind {
            CallableKind::Function => SqlFolder::Functions,
            CallableKind::Procedure => SqlFolder::Procedures,
        }
    }

    /// The callable kind whose metadata files live here, if any.
    pub fn callable_kind(self) -> Option<CallableKind> {
        match self {
            SqlFolder::Queries => None,
            SqlFolder::Functions => Some(CallableKind::Function),
            SqlFolder::Procedures => Some(CallableKind::Procedure),
        }
    }
}

impl fmt::Display for SqlFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Loaded catalog contents, keyed by file stem in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    root: PathBuf,
    queries: BTreeMap<String, String>,
    functions: BTreeMap<String, String>,
    procedures: BTreeMap<String, String>,
}

impl Catalog {
    /// Reads all three folders under `root`. Missing folders are empty.
    pub fn load(root: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let root = root.as_ref();
        let catalog = Self {
            root: root.to_path_buf(),
            queries: load_sql_files(&root.join(SqlFolder::Queries.dir_name()))?,
            functions: load_sql_files(&root.join(SqlFolder::Functions.dir_name()))?,
            procedures: load_sql_files(&root.join(SqlFolder::Procedures.dir_name()))?,
        };
        log::info!(
            "loaded catalog {}: {} queries, {} functions, {} procedures",
            root.display(),
            catalog.queries.len(),
            catalog.functions.len(),
            catalog.procedures.len()
        );
        Ok(catalog)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the stem → content map for `folder`.
    pub fn folder(&self, folder: SqlFolder) -> &BTreeMap<String, String> {
        match folder {
            SqlFolder::Queries => &self.queries,
            SqlFolder::Functions => &self.functions,
            SqlFolder::Procedures => &self.procedures,
        }
    }

    /// Returns the content of `stem` in `folder`.
    pub fn source(&self, folder: SqlFolder, stem: &str) -> Option<&str> {
        self.folder(folder).get(stem).map(String::as_str)
    }

    /// Parses the metadata of a function or procedure file.
    pub fn metadata(&self, kind: CallableKind, stem: &str) -> Option<MetadataResult> {
        self.source(SqlFolder::for_kind(kind), stem).map(|source| parse_metadata(kind, source))
    }
}

/// Reads every `*.sql` file directly inside `dir` into a stem → content map.
///
/// A missing directory yields an empty map. Subdirectories and files with
/// non-UTF-8 names are skipped.
pub fn load_sql_files(dir: &Path) -> Result<BTreeMap<String, String>, CatalogError> {
    let mut files = BTreeMap::new();
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            log::debug!("catalog folder {} does not exist", dir.display());
            return Ok(files);
        }
        Err(err) => return Err(CatalogError::io(dir, err)),
    };

    for entry in entries {
        let path = entry.map_err(|err| CatalogError::io(dir, err))?.path();
        if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("sql") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            log::warn!("skipping {} (file name is not UTF-8)", path.display());
            continue;
        };
        let content = fs::read_to_string(&path).map_err(|err| CatalogError::io(&path, err))?;
        files.insert(stem.to_string(), content);
    }
    Ok(files)
}

/// Errors from reading the catalog.
#[derive(Debug)]
pub enum CatalogError {
    /// A folder or file could not be read.
    Io { path: PathBuf, source: io::Error },
}

impl CatalogError {
    fn io(path: &Path, source: io::Error) -> Self {
        CatalogError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Io { path, source } => {
                write!(f, "cannot read {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Io { source, .. } => Some(source),
        }
    }
}
