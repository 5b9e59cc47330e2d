//! Lazy discovery of candidate files under a directory root.
//!
//! [`find_files`] walks one root and yields paths whose file name matches a
//! glob, optionally filtered by a validation predicate such as
//! [`crate::dicom::is_rtstruct`]. The walk is lazy: nothing is read until
//! the iterator is polled.
//!
//! Failures are split into two classes:
//!
//! - soft: a missing root, a root that is not a directory, unreadable
//!   entries, entries that vanish mid-walk, and predicate errors. These are
//!   logged and skipped.
//! - hard: any other traversal error. It is yielded once as
//!   [`RtscanError::Traversal`] and the iterator is then exhausted.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use glob::Pattern;
use tracing::Span;
use walkdir::{DirEntry, WalkDir};

use crate::error::RtscanError;

/// Default file name glob.
pub const DEFAULT_PATTERN: &str = "*.dcm";

/// Predicate deciding whether a candidate file is yielded.
pub type Validator = Arc<dyn Fn(&Path) -> Result<bool, RtscanError> + Send + Sync>;

/// Options for a single discovery walk.
#[derive(Clone, Debug)]
pub struct DiscoveryOptions {
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Yield directories whose name matches the pattern.
    pub yield_directories: bool,
    /// Glob matched against each entry's file name.
    pub pattern: String,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            yield_directories: false,
            pattern: DEFAULT_PATTERN.to_string(),
        }
    }
}

/// Starts a lazy walk of `root`.
///
/// Only an invalid pattern fails here. A missing root produces an empty
/// iterator.
pub fn find_files(
    root: impl AsRef<Path>,
    options: &DiscoveryOptions,
) -> Result<Discovery, RtscanError> {
    Discovery::new(root.as_ref(), options)
}

/// Iterator over the matching paths under one root.
pub struct Discovery {
    root: PathBuf,
    pattern: Pattern,
    yield_directories: bool,
    walker: Option<walkdir::IntoIter>,
    validator: Option<Validator>,
    span: Span,
    started: bool,
}

impl Discovery {
    pub(crate) fn new(root: &Path, options: &DiscoveryOptions) -> Result<Self, RtscanError> {
        let pattern =
            Pattern::new(&options.pattern).map_err(|source| RtscanError::InvalidPattern {
                pattern: options.pattern.clone(),
                source,
            })?;

        let mut walk = WalkDir::new(root)
            .follow_links(false)
            .min_depth(1)
            .sort_by_file_name();
        if !options.recursive {
            walk = walk.max_depth(1);
        }

        Ok(Self {
            root: root.to_path_buf(),
            pattern,
            yield_directories: options.yield_directories,
            walker: Some(walk.into_iter()),
            validator: None,
            span: tracing::info_span!("discovery", root = %root.display()),
            started: false,
        })
    }

    /// Filters candidate files through `validator`.
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&Path) -> Result<bool, RtscanError> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Shares an existing validator.
    pub fn with_shared_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Emits all diagnostics inside `span` instead of the default one.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn check_root(&mut self) {
        match std::fs::metadata(&self.root) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                tracing::error!("{} is not a directory", self.root.display());
                self.walker = None;
            }
            Err(err) => {
                tracing::error!("Cannot read root {}: {err}", self.root.display());
                self.walker = None;
            }
        }
    }

    /// Applies the name, type and predicate filters to one entry.
    fn accept(&self, entry: DirEntry) -> Result<Option<PathBuf>, RtscanError> {
        if !self.pattern.matches(&entry.file_name().to_string_lossy()) {
            return Ok(None);
        }

        let path = entry.into_path();
        // Follows symlinks, so a link to a file counts as a file.
        let meta = match std::fs::metadata(&path) {
            Ok(meta) => meta,
            Err(err) if is_soft_io(err.kind()) => {
                tracing::warn!("Skipping {}: {err}", path.display());
                return Ok(None);
            }
            Err(err) => return Err(RtscanError::Io(err)),
        };

        if meta.is_dir() {
            return Ok(self.yield_directories.then_some(path));
        }
        if !meta.is_file() {
            return Ok(None);
        }

        let Some(validator) = &self.validator else {
            return Ok(Some(path));
        };
        match validator(&path) {
            Ok(true) => Ok(Some(path)),
            Ok(false) => Ok(None),
            Err(err) => {
                tracing::debug!("Skipping {}: {err}", path.display());
                Ok(None)
            }
        }
    }
}

impl Iterator for Discovery {
    type Item = Result<PathBuf, RtscanError>;

    fn next(&mut self) -> Option<Self::Item> {
        let span = self.span.clone();
        let _entered = span.enter();

        if !self.started {
            self.started = true;
            self.check_root();
        }

        loop {
            let entry = match self.walker.as_mut()?.next() {
                None => {
                    self.walker = None;
                    return None;
                }
                Some(Ok(entry)) => entry,
                Some(Err(err)) if err.io_error().is_some_and(|io| is_soft_io(io.kind())) => {
                    let location = err.path().unwrap_or(&self.root);
                    tracing::warn!("Skipping {}: {err}", location.display());
                    continue;
                }
                Some(Err(source)) => {
                    self.walker = None;
                    return Some(Err(RtscanError::Traversal {
                        root: self.root.clone(),
                        source,
                    }));
                }
            };

            match self.accept(entry) {
                Ok(Some(path)) => return Some(Ok(path)),
                Ok(None) => continue,
                Err(err) => {
                    self.walker = None;
                    return Some(Err(err));
                }
            }
        }
    }
}

impl fmt::Debug for Discovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Discovery")
            .field("root", &self.root)
            .field("pattern", &self.pattern.as_str())
            .field("yield_directories", &self.yield_directories)
            .field("finished", &self.walker.is_none())
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}

fn is_soft_io(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::PermissionDenied | ErrorKind::NotFound)
}
