//! Process-wide config file cache.
//!
//! A [`ConfigStore`] loads one key/value file lazily and hands out the same
//! [`Arc<ConfigFile>`] until an explicit path asks for a reload.
//!
//! Path resolution (highest to lowest):
//! 1. Explicit path passed to [`ConfigStore::load`]
//! 2. `AWS_CONFIG_FILE` environment variable
//! 3. `~/.awsconfig`
//!
//! Reload policy: an explicit path always re-reads from disk and replaces
//! the cache on success. A failed load leaves the previous cache in place.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use indexmap::IndexMap;
use thiserror::Error;

use super::parser::parse_key_values;
use crate::constants::{DEFAULT_CONFIG_FILENAME, ENV_CONFIG_FILE};
use crate::env::Env;

/// Errors during config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read config file {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot locate the default config file: no home directory")]
    NoHomeDir,
}

/// Disk access used by [`ConfigStore`].
///
/// The real implementation is [`DiskReader`]; tests substitute readers
/// that count or refuse calls.
pub trait ConfigReader: Send + Sync {
    /// Whether `path` exists.
    fn exists(&self, path: &Path) -> bool;

    /// Read the whole file as UTF-8.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// [`ConfigReader`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskReader;

impl ConfigReader for DiskReader {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// A parsed config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    path: PathBuf,
    entries: IndexMap<String, String>,
}

impl ConfigFile {
    /// Parse `content` as the config file found at `path`.
    pub fn parse(path: impl Into<PathBuf>, content: &str) -> Self {
        Self {
            path: path.into(),
            entries: parse_key_values(content),
        }
    }

    /// Absolute path the file was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// All entries in file order.
    pub fn entries(&self) -> &IndexMap<String, String> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lazily-loaded, shared config file cache.
pub struct ConfigStore {
    env: Env,
    reader: Box<dyn ConfigReader>,
    cached: Mutex<Option<Arc<ConfigFile>>>,
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("env", &self.env)
            .field("cached", &self.cached().map(|c| c.path().to_path_buf()))
            .finish()
    }
}

impl ConfigStore {
    /// Create a store reading from disk.
    pub fn new(env: Env) -> Self {
        Self::with_reader(env, DiskReader)
    }

    /// Create a store with a custom disk reader.
    pub fn with_reader(env: Env, reader: impl ConfigReader + 'static) -> Self {
        Self {
            env,
            reader: Box::new(reader),
            cached: Mutex::new(None),
        }
    }

    /// The process-wide store over the real environment and disk.
    pub fn global() -> &'static ConfigStore {
        static GLOBAL: OnceLock<ConfigStore> = OnceLock::new();
        GLOBAL.get_or_init(|| ConfigStore::new(Env::real()))
    }

    /// Load the config file, or return the cached one.
    ///
    /// Without `path`, a cached file is returned untouched. With `path`, the
    /// file is re-read and replaces the cache. The lock is held across the
    /// read so concurrent first loads perform a single read.
    pub fn load(&self, path: Option<&Path>) -> Result<Arc<ConfigFile>, ConfigError> {
        let mut slot = self.slot();

        if path.is_none() {
            if let Some(config) = slot.as_ref() {
                tracing::debug!(path = %config.path().display(), "config cache hit");
                return Ok(Arc::clone(config));
            }
        }

        let effective = self.effective_path(path)?;
        let config = Arc::new(self.read_file(&effective)?);
        tracing::info!(
            path = %effective.display(),
            entries = config.len(),
            replaced = slot.is_some(),
            "loaded config file"
        );
        *slot = Some(Arc::clone(&config));
        Ok(config)
    }

    /// Look up `key`, loading the default config first if nothing is cached.
    pub fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let config = self.load(None)?;
        Ok(config.get(key).map(str::to_string))
    }

    /// The cached config, without triggering a load.
    pub fn cached(&self) -> Option<Arc<ConfigFile>> {
        self.slot().clone()
    }

    /// Drop the cached config so the next access reads from disk again.
    pub fn reset(&self) {
        *self.slot() = None;
    }

    /// Resolve the path a load would read: explicit, env override, or default.
    pub fn effective_path(&self, explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
        let raw = match explicit {
            Some(p) => p.to_path_buf(),
            None => match self.env.non_empty_var(ENV_CONFIG_FILE) {
                Some(p) => PathBuf::from(p),
                None => self
                    .env
                    .home_dir()
                    .ok_or(ConfigError::NoHomeDir)?
                    .join(DEFAULT_CONFIG_FILENAME),
            },
        };
        self.absolutize(raw)
    }

    fn read_file(&self, path: &Path) -> Result<ConfigFile, ConfigError> {
        if !self.reader.exists(path) {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let content = self
            .reader
            .read_to_string(path)
            .map_err(|e| ConfigError::Read {
                path: path.to_path_buf(),
                source: e,
            })?;
        Ok(ConfigFile::parse(path, &content))
    }

    /// Expand a leading `~` and anchor relative paths at the working directory.
    fn absolutize(&self, raw: PathBuf) -> Result<PathBuf, ConfigError> {
        let expanded = match raw.strip_prefix("~") {
            Ok(rest) => self.env.home_dir().ok_or(ConfigError::NoHomeDir)?.join(rest),
            Err(_) => raw,
        };
        std::path::absolute(&expanded).map_err(|_| ConfigError::NotFound { path: expanded })
    }

    fn slot(&self) -> MutexGuard<'_, Option<Arc<ConfigFile>>> {
        self.cached.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Disk reader that counts reads.
    #[derive(Clone, Default)]
    struct CountingReader {
        reads: Arc<AtomicUsize>,
    }

    impl ConfigReader for CountingReader {
        fn exists(&self, path: &Path) -> bool {
            DiskReader.exists(path)
        }

        fn read_to_string(&self, path: &Path) -> io::Result<String> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            DiskReader.read_to_string(path)
        }
    }

    fn write_config(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn store_with_home(home: &Path) -> (ConfigStore, Arc<AtomicUsize>) {
        let reader = CountingReader::default();
        let reads = Arc::clone(&reader.reads);
        let env = Env::mock([("HOME", home.to_str().unwrap())]);
        (ConfigStore::with_reader(env, reader), reads)
    }

    #[test]
    fn load_reads_default_path_under_home() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), ".awsconfig", "AWSRegion = us-east-1\n");
        let (store, _) = store_with_home(dir.path());

        let config = store.load(None).unwrap();
        assert_eq!(config.get("AWSRegion"), Some("us-east-1"));
        assert_eq!(config.path(), dir.path().join(".awsconfig"));
    }

    #[test]
    fn env_override_beats_default_path() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), ".awsconfig", "AWSRegion = default\n");
        let custom = write_config(dir.path(), "custom.conf", "AWSRegion = custom\n");
        let env = Env::mock([
            ("HOME", dir.path().to_str().unwrap()),
            ("AWS_CONFIG_FILE", custom.to_str().unwrap()),
        ]);
        let store = ConfigStore::new(env);

        assert_eq!(store.get("AWSRegion").unwrap(), Some("custom".to_string()));
    }

    #[test]
    fn empty_env_override_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let env = Env::mock([
            ("HOME", dir.path().to_str().unwrap()),
            ("AWS_CONFIG_FILE", ""),
        ]);
        let store = ConfigStore::new(env);
        assert_eq!(
            store.effective_path(None).unwrap(),
            dir.path().join(".awsconfig")
        );
    }

    #[test]
    fn second_load_returns_same_instance_with_one_read() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), ".awsconfig", "AWSRegion = us-east-1\n");
        let (store, reads) = store_with_home(dir.path());

        let first = store.load(None).unwrap();
        let second = store.load(None).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn get_loads_implicitly_once() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), ".awsconfig", "a = 1\nb = 2\n");
        let (store, reads) = store_with_home(dir.path());

        assert!(store.cached().is_none());
        assert_eq!(store.get("a").unwrap(), Some("1".to_string()));
        assert_eq!(store.get("b").unwrap(), Some("2".to_string()));
        assert_eq!(store.get("missing").unwrap(), None);
        assert_eq!(reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn explicit_path_reloads_and_replaces_cache() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), ".awsconfig", "AWSRegion = default\n");
        let other = write_config(dir.path(), "other.conf", "AWSRegion = other\n");
        let (store, reads) = store_with_home(dir.path());

        store.load(None).unwrap();
        let reloaded = store.load(Some(&other)).unwrap();
        assert_eq!(reloaded.get("AWSRegion"), Some("other"));

        let cached = store.load(None).unwrap();
        assert!(Arc::ptr_eq(&reloaded, &cached));
        assert_eq!(reads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn explicit_same_path_rereads() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "a.conf", "k = v1\n");
        let (store, reads) = store_with_home(dir.path());

        store.load(Some(&path)).unwrap();
        std::fs::write(&path, "k = v2\n").unwrap();
        let config = store.load(Some(&path)).unwrap();
        assert_eq!(config.get("k"), Some("v2"));
        assert_eq!(reads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let (store, reads) = store_with_home(dir.path());

        let err = store.load(Some(Path::new("/nonexistent/path"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { ref path } if path == Path::new("/nonexistent/path")));
        assert_eq!(reads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failed_reload_keeps_previous_cache() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), ".awsconfig", "AWSRegion = us-east-1\n");
        let (store, _) = store_with_home(dir.path());

        let original = store.load(None).unwrap();
        let err = store.load(Some(Path::new("/nonexistent/path"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));

        let cached = store.cached().unwrap();
        assert!(Arc::ptr_eq(&original, &cached));
        assert_eq!(store.get("AWSRegion").unwrap(), Some("us-east-1".to_string()));
    }

    #[test]
    fn get_without_any_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _) = store_with_home(dir.path());
        assert!(matches!(
            store.get("AWSRegion"),
            Err(ConfigError::NotFound { .. })
        ));
        assert!(store.cached().is_none());
    }

    #[test]
    fn no_home_dir_is_reported() {
        let store = ConfigStore::new(Env::mock(Vec::<(&str, &str)>::new()));
        assert!(matches!(store.load(None), Err(ConfigError::NoHomeDir)));
    }

    #[test]
    fn tilde_is_expanded_against_home() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "creds.conf", "k = v\n");
        let (store, _) = store_with_home(dir.path());

        let config = store.load(Some(Path::new("~/creds.conf"))).unwrap();
        assert_eq!(config.path(), dir.path().join("creds.conf"));
    }

    #[test]
    fn relative_path_is_made_absolute() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _) = store_with_home(dir.path());
        let resolved = store.effective_path(Some(Path::new("relative.conf"))).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("relative.conf"));
    }

    #[test]
    fn reset_forces_a_fresh_read() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), ".awsconfig", "k = v\n");
        let (store, reads) = store_with_home(dir.path());

        let first = store.load(None).unwrap();
        store.reset();
        assert!(store.cached().is_none());
        let second = store.load(None).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(reads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn concurrent_first_loads_read_once() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), ".awsconfig", "k = v\n");
        let (store, reads) = store_with_home(dir.path());
        let store = Arc::new(store);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.load(None).unwrap())
            })
            .collect();
        let loaded: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(reads.load(Ordering::SeqCst), 1);
        assert!(loaded.iter().all(|c| Arc::ptr_eq(c, &loaded[0])));
    }

    #[test]
    fn unreadable_file_is_a_read_error() {
        struct BrokenReader;
        impl ConfigReader for BrokenReader {
            fn exists(&self, _path: &Path) -> bool {
                true
            }
            fn read_to_string(&self, _path: &Path) -> io::Result<String> {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
            }
        }

        let store = ConfigStore::with_reader(Env::mock([("HOME", "/home/ops")]), BrokenReader);
        let err = store.load(None).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("failed to read"));
    }
}
