//! Shared context for running CLI commands.

use std::{
    env,
    path::{Path, PathBuf},
    process::ExitCode,
};

use tracing::{debug, info};
use vault_catalog::{CatalogError, Category, LocalCatalog, RecordProvider};
use vault_config::{Config, SearchSettings, Strategy};
use vault_index::{Corpus, SearchService};

/// Command execution context built once per CLI invocation.
pub struct CommandContext {
    /// Current working directory.
    pub cwd: PathBuf,
    /// Loaded configuration (may be default if no config files found).
    pub config: Config,
}

impl CommandContext {
    /// Loads the current directory and configuration.
    pub fn load() -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        let config = load_config_or_failure(&cwd)?;
        Ok(Self { cwd, config })
    }

    /// Loads only the current directory, skipping configuration parsing.
    ///
    /// Used by `init`, which should work even when an existing config file is invalid.
    pub fn load_cwd_only() -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        Ok(Self {
            cwd,
            config: Config::default(),
        })
    }

    /// Search settings with an optional strategy override applied.
    pub fn search_settings(&self, strategy: Option<Strategy>) -> SearchSettings {
        let mut settings = self.config.search.clone();
        if let Some(strategy) = strategy {
            settings.strategy = strategy;
        }
        settings
    }

    /// Path of the persisted snapshot, if configured.
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.config.snapshot.path.as_deref()
    }

    /// Creates a search service, persisting to the configured snapshot file.
    pub fn service(&self, settings: SearchSettings) -> SearchService {
        let service = SearchService::new(settings);
        match self.snapshot_path() {
            Some(path) => service.with_snapshot_path(path),
            None => service,
        }
    }

    /// Opens the configured catalog.
    pub fn catalog(&self) -> Result<LocalCatalog, ExitCode> {
        LocalCatalog::from_settings(&self.config.catalog).map_err(|e| {
            eprintln!("error: {e}");
            if matches!(e, CatalogError::NoRoot) {
                eprintln!("Set root in the [catalog] section of .vault.toml, or run 'vault init'.");
            }
            ExitCode::FAILURE
        })
    }

    /// Resolves the categories to read.
    ///
    /// Categories given on the command line win, then those in the configuration. With
    /// neither, every category in the catalog is read.
    pub fn categories(
        &self,
        catalog: &LocalCatalog,
        requested: &[String],
    ) -> Result<Vec<Category>, ExitCode> {
        let names = if requested.is_empty() {
            self.config.catalog.categories.as_slice()
        } else {
            requested
        };

        let categories = if names.is_empty() {
            catalog.categories()
        } else {
            names.iter().map(|name| name.parse()).collect()
        };
        categories.map_err(|e| {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        })
    }

    /// Reads the records of the requested categories.
    pub fn load_corpus(&self, requested: &[String]) -> Result<Corpus, ExitCode> {
        let catalog = self.catalog()?;
        let categories = self.categories(&catalog, requested)?;
        debug!(root = %catalog.root().display(), categories = categories.len(), "reading catalog");

        let records = catalog.fetch_all(&categories).map_err(|e| {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        })?;
        info!(records = records.len(), "catalog loaded");
        Ok(Corpus::new(records))
    }
}

/// Returns the current working directory or exits with a consistent error.
fn current_dir_or_failure() -> Result<PathBuf, ExitCode> {
    env::current_dir().map_err(|e| {
        eprintln!("error: could not determine current directory: {e}");
        ExitCode::FAILURE
    })
}

/// Loads configuration from the provided directory or exits with an error.
fn load_config_or_failure(cwd: &Path) -> Result<Config, ExitCode> {
    Config::load(cwd).map_err(|e| {
        eprintln!("error: failed to load configuration: {e}");
        ExitCode::FAILURE
    })
}
