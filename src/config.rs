//! Settings that affect how inputs are decoded and filtered. Built once by
//! the caller and passed down explicitly.

use std::io;
use std::path::{Path, PathBuf};

use crate::detect::Format;

#[derive(Debug, Clone, Default)]
pub struct Config {
    source_root: Option<PathBuf>,
    /// Keep files with absolute paths (system headers and the like).
    pub include_external: bool,
    /// Regular expression; matching filenames are dropped.
    pub exclude: Option<String>,
    /// Decode explicitly named inputs with this format instead of
    /// classifying them by extension.
    pub format: Option<Format>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source root. A relative path is resolved against the
    /// current directory.
    pub fn with_source_root(mut self, root: impl AsRef<Path>) -> io::Result<Self> {
        self.source_root = Some(std::path::absolute(root)?);
        Ok(self)
    }

    pub fn with_include_external(mut self, include: bool) -> Self {
        self.include_external = include;
        self
    }

    pub fn with_exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude = Some(pattern.into());
        self
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// The absolute source root, if one was configured.
    pub fn source_root(&self) -> Option<&Path> {
        self.source_root.as_deref()
    }
}
