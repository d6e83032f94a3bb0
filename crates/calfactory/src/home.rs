//! Home directory resolution and `~` expansion.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{FactoryError, FactoryResult};

/// Resolves the user's home directory.
///
/// Implemented by [`EnvHome`] for the process environment and by any
/// `Fn() -> Option<PathBuf>` closure.
pub trait HomeResolver {
    /// Returns the home directory, or `None` if it cannot be determined.
    fn home_dir(&self) -> Option<PathBuf>;
}

impl<F> HomeResolver for F
where
    F: Fn() -> Option<PathBuf>,
{
    fn home_dir(&self) -> Option<PathBuf> {
        self()
    }
}

type VarLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Reads the home directory from environment variables.
///
/// `HOME` wins when set and non-empty. Otherwise `HOMEDRIVE` and `HOMEPATH`
/// are concatenated, as on Windows.
pub struct EnvHome {
    lookup: VarLookup,
}

impl EnvHome {
    /// Resolves against the process environment.
    pub fn new() -> Self {
        Self::with_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves against a custom variable lookup.
    pub fn with_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            lookup: Box::new(lookup),
        }
    }

    fn var(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.is_empty())
    }
}

impl Default for EnvHome {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EnvHome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvHome").finish_non_exhaustive()
    }
}

impl HomeResolver for EnvHome {
    fn home_dir(&self) -> Option<PathBuf> {
        if let Some(home) = self.var("HOME") {
            return Some(PathBuf::from(home));
        }

        let drive = self.var("HOMEDRIVE").unwrap_or_default();
        let path = self.var("HOMEPATH").unwrap_or_default();
        let combined = format!("{drive}{path}");
        if combined.is_empty() {
            None
        } else {
            Some(PathBuf::from(combined))
        }
    }
}

/// Replaces every `~` in `path` with the resolved home directory.
///
/// The home directory is canonicalized when it exists on disk. Paths
/// without `~` are returned untouched and never consult the resolver. If a
/// `~` is present but no home directory can be resolved, this is a
/// configuration error. The path is never handed back with `~` left in
/// place, since that would put the cache under a literal `~` directory
/// relative to the working directory.
pub fn expand_home(path: &str, resolver: &dyn HomeResolver) -> FactoryResult<PathBuf> {
    if !path.contains('~') {
        return Ok(PathBuf::from(path));
    }

    let home = resolver.home_dir().ok_or_else(|| {
        warn!("cannot expand {:?}: no home directory", path);
        FactoryError::configuration(format!(
            "cannot expand '~' in {}: neither HOME nor HOMEDRIVE/HOMEPATH is set",
            path
        ))
    })?;

    let home = canonical_or_verbatim(&home);
    let expanded = PathBuf::from(path.replace('~', &home.to_string_lossy()));
    debug!("expanded {:?} to {:?}", path, expanded);
    Ok(expanded)
}

fn canonical_or_verbatim(home: &Path) -> PathBuf {
    std::fs::canonicalize(home).unwrap_or_else(|_| home.to_path_buf())
}
