//! Native library lifecycle
//!
//! Loads the library once, resolves every entry point up front and keeps
//! the link alive until an explicit `close`. Adapters receive the library
//! by reference; nothing reaches for a global.

use super::abi::{names, Symbols};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Paths currently held open by some `NativeLibrary`
static OPEN_PATHS: Lazy<Mutex<HashSet<PathBuf>>> = Lazy::new(|| Mutex::new(HashSet::new()));

pub type LibraryResult<T> = Result<T, LibraryError>;

/// Library loading and teardown errors
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("library not found: {0}")]
    NotFound(String),

    #[error("failed to load library {path}: {source}")]
    LoadFailed {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("symbol '{symbol}' not found in library {path}")]
    SymbolNotFound { path: PathBuf, symbol: &'static str },

    #[error("library {0} is already open in this process")]
    AlreadyOpen(PathBuf),

    #[error("library still in use ({refs} outstanding references)")]
    InUse { refs: usize },

    #[error("failed to unload library: {0}")]
    CloseFailed(#[source] libloading::Error),
}

enum Origin {
    InProcess,
    Dynamic {
        path: PathBuf,
        library: libloading::Library,
    },
}

/// A loaded native library and its resolved entry points
pub struct NativeLibrary {
    symbols: Symbols,
    origin: Origin,
}

impl NativeLibrary {
    /// Load the library at `path` and resolve all boundary symbols.
    ///
    /// # Safety
    /// Loading runs the library's initializers, and the exports must have the
    /// signatures declared in `abi`. Only load libraries built for this
    /// boundary.
    pub unsafe fn open(path: impl AsRef<Path>) -> LibraryResult<Self> {
        let requested = path.as_ref();
        // every spelling of one file (`..`, relative, symlink) shares a registry key
        let path = std::fs::canonicalize(requested)
            .map_err(|_| LibraryError::NotFound(requested.display().to_string()))?;

        if !OPEN_PATHS.lock().insert(path.clone()) {
            return Err(LibraryError::AlreadyOpen(path));
        }

        match Self::load(&path) {
            Ok(library) => {
                info!(event = "library_open", path = %path.display(), "Native library loaded");
                Ok(library)
            }
            Err(err) => {
                OPEN_PATHS.lock().remove(&path);
                Err(err)
            }
        }
    }

    unsafe fn load(path: &Path) -> LibraryResult<Self> {
        let library = libloading::Library::new(path).map_err(|source| LibraryError::LoadFailed {
            path: path.to_path_buf(),
            source,
        })?;

        let symbols = Symbols {
            free_buffer: resolve(&library, path, names::FREE_BUFFER)?,
            greet: resolve(&library, path, names::GREET)?,
            create_person: resolve(&library, path, names::CREATE_PERSON)?,
            person_greet: resolve(&library, path, names::PERSON_GREET)?,
            free_person: resolve(&library, path, names::FREE_PERSON)?,
        };

        Ok(Self {
            symbols,
            origin: Origin::Dynamic {
                path: path.to_path_buf(),
                library,
            },
        })
    }

    /// Bind to this crate's own exports without any dynamic loading.
    pub fn in_process() -> Self {
        debug!(event = "library_open", path = "<in-process>", "Using in-process exports");
        Self {
            symbols: Symbols::in_process(),
            origin: Origin::InProcess,
        }
    }

    /// Bind to an arbitrary symbol table.
    ///
    /// # Safety
    /// Every entry point must honour the boundary contract, in particular
    /// `free_buffer` must accept exactly what the other entry points return.
    pub unsafe fn from_symbols(symbols: Symbols) -> Self {
        Self {
            symbols,
            origin: Origin::InProcess,
        }
    }

    #[inline]
    pub fn symbols(&self) -> &Symbols {
        &self.symbols
    }

    /// Canonical filesystem path, or `None` for in-process tables
    pub fn path(&self) -> Option<&Path> {
        match &self.origin {
            Origin::InProcess => None,
            Origin::Dynamic { path, .. } => Some(path),
        }
    }

    /// Wrap for sharing with instances and threads.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Explicit teardown. Fails while other references (live instances,
    /// other threads) still hold the library.
    pub fn close(library: Arc<Self>) -> LibraryResult<()> {
        let library = Arc::try_unwrap(library).map_err(|still_shared| LibraryError::InUse {
            refs: Arc::strong_count(&still_shared) - 1,
        })?;
        library.unload()
    }

    fn unload(mut self) -> LibraryResult<()> {
        match std::mem::replace(&mut self.origin, Origin::InProcess) {
            Origin::InProcess => Ok(()),
            Origin::Dynamic { path, library } => {
                OPEN_PATHS.lock().remove(&path);
                library.close().map_err(LibraryError::CloseFailed)?;
                info!(event = "library_close", path = %path.display(), "Native library unloaded");
                Ok(())
            }
        }
    }
}

impl Drop for NativeLibrary {
    fn drop(&mut self) {
        if let Origin::Dynamic { path, .. } = &self.origin {
            OPEN_PATHS.lock().remove(path);
        }
    }
}

impl std::fmt::Debug for NativeLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeLibrary")
            .field("path", &self.path())
            .finish()
    }
}

unsafe fn resolve<T: Copy>(
    library: &libloading::Library,
    path: &Path,
    symbol: &'static str,
) -> LibraryResult<T> {
    library
        .get::<T>(symbol.as_bytes())
        .map(|sym| *sym)
        .map_err(|_| LibraryError::SymbolNotFound {
            path: path.to_path_buf(),
            symbol,
        })
}
