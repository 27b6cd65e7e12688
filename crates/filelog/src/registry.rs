//! Logger registry
//!
//! Hands out one [`FileLogger`] per `(component, category)` pair so every
//! part of a process that asks for the same log writes through the same
//! streams. The registry is an ordinary value; create one at startup and
//! share it.

use std::fs;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::task::JoinSet;

use crate::config::{FileLogConfig, StreamOptions};
use crate::error::{FileLogError, Result};
use crate::logger::{FileLogger, Logger, StdoutLogger};

/// Cache of file loggers built from one configuration
#[derive(Debug)]
pub struct Registry {
    config: FileLogConfig,
    options: StreamOptions,
    loggers: DashMap<(String, String), Arc<FileLogger>>,
}

impl Registry {
    pub fn new(config: FileLogConfig) -> Self {
        Self::with_options(config, StreamOptions::default())
    }

    /// Registry whose streams use non-default tunables
    pub fn with_options(config: FileLogConfig, options: StreamOptions) -> Self {
        Self {
            config,
            options,
            loggers: DashMap::new(),
        }
    }

    pub fn config(&self) -> &FileLogConfig {
        &self.config
    }

    /// Get or create the file logger for `component` and `category`
    ///
    /// The first call creates the log and history directories, opens the
    /// level files and starts their tasks. Later calls return the cached
    /// logger and ignore `suffix`. An empty `log_dir` falls back to the
    /// default directory.
    ///
    /// Outside a Tokio runtime nothing is cached and
    /// [`FileLogError::NoRuntime`] is returned.
    pub fn file_logger(
        &self,
        component: &str,
        category: &str,
        suffix: Option<&str>,
    ) -> Result<Arc<FileLogger>> {
        let key = (component.to_string(), category.to_string());

        // Fast path: logger exists
        if let Some(logger) = self.loggers.get(&key) {
            return Ok(Arc::clone(&logger));
        }

        match self.loggers.entry(key) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let logger = Arc::new(self.create(component, category, suffix)?);
                logger.start()?;
                Ok(Arc::clone(entry.insert(logger).value()))
            }
        }
    }

    fn create(&self, component: &str, category: &str, suffix: Option<&str>) -> Result<FileLogger> {
        let config = if self.config.is_stdout() {
            tracing::warn!(component, category, "no log directory configured, using default");
            FileLogConfig::default().with_level(self.config.level)
        } else {
            self.config.clone()
        };

        fs::create_dir_all(&config.log_dir)
            .map_err(|e| FileLogError::create_dir(&config.log_dir, e))?;
        if let Some(history) = config.history() {
            fs::create_dir_all(history).map_err(|e| FileLogError::create_dir(history, e))?;
        }

        FileLogger::open(
            &config.log_dir,
            component,
            category,
            suffix,
            config.history(),
            config.level,
            self.options,
        )
    }

    /// Stdout logger when no log directory is configured, file logger otherwise
    pub fn logger(&self, component: &str, category: &str, suffix: Option<&str>) -> Result<Logger> {
        if self.config.is_stdout() {
            return Ok(Logger::Stdout(StdoutLogger::new(self.config.level)));
        }
        self.file_logger(component, category, suffix).map(Logger::File)
    }

    /// Number of cached file loggers
    pub fn len(&self) -> usize {
        self.loggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }

    /// Shut down every cached logger concurrently
    ///
    /// Loggers stay cached; records written afterwards are dropped.
    pub async fn shutdown_all(&self) {
        let mut tasks = JoinSet::new();
        for entry in self.loggers.iter() {
            let logger = Arc::clone(entry.value());
            tasks.spawn(async move { logger.shutdown().await });
        }
        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                tracing::error!(error = %e, "logger shutdown task failed");
            }
        }
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;
