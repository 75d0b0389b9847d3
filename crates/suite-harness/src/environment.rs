//! Process-wide configuration shared with suites and test executors
//!
//! The environment is built once, before suite discovery, and handed to every
//! collaborator behind an `Arc`. Apart from the registry of open resources it
//! is never mutated after construction.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

/// A long-lived resource opened by a test that must be closed before the
/// driver reports (database session factories, spawned servers, ...).
pub trait OpenResource: Send + Sync {
    /// Identifier used in diagnostics
    fn key(&self) -> &str;

    /// Release the resource
    fn close(&self);
}

/// Configuration visible to suites and executors
pub struct Environment {
    debug: bool,
    adapter: Option<String>,
    /// File extension -> interpreter program
    interpreters: BTreeMap<String, String>,
    resources: Mutex<Vec<Arc<dyn OpenResource>>>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// Create an environment with the default interpreter table
    pub fn new() -> Self {
        let interpreters = [("js", "node"), ("sh", "sh"), ("py", "python3")]
            .into_iter()
            .map(|(ext, program)| (ext.to_string(), program.to_string()))
            .collect();

        Self {
            debug: false,
            adapter: None,
            interpreters,
            resources: Mutex::new(Vec::new()),
        }
    }

    /// Set the debug flag
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set the adapter name passed through to tests
    pub fn with_adapter(mut self, adapter: Option<String>) -> Self {
        self.adapter = adapter;
        self
    }

    /// Register (or replace) the interpreter used for an extension
    pub fn with_interpreter(mut self, extension: &str, program: &str) -> Self {
        self.interpreters
            .insert(extension.to_string(), program.to_string());
        self
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn adapter(&self) -> Option<&str> {
        self.adapter.as_deref()
    }

    /// Interpreter for a test file, chosen by its extension
    pub fn interpreter_for(&self, path: &Path) -> Option<&str> {
        let ext = path.extension()?.to_str()?;
        self.interpreters.get(ext).map(String::as_str)
    }

    /// Register a resource to be closed at report time
    pub fn register_resource(&self, resource: Arc<dyn OpenResource>) {
        tracing::debug!(key = resource.key(), "registering open resource");
        self.lock_resources().push(resource);
    }

    /// Keys of the resources that are still open
    pub fn open_resources(&self) -> Vec<String> {
        self.lock_resources()
            .iter()
            .map(|r| r.key().to_string())
            .collect()
    }

    /// Close every registered resource and empty the registry.
    ///
    /// Returns the number of resources closed. A second call closes nothing.
    pub fn close_open_resources(&self) -> usize {
        let resources = std::mem::take(&mut *self.lock_resources());
        for resource in &resources {
            tracing::debug!(key = resource.key(), "closing open resource");
            resource.close();
        }
        resources.len()
    }

    fn lock_resources(&self) -> std::sync::MutexGuard<'_, Vec<Arc<dyn OpenResource>>> {
        self.resources.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("debug", &self.debug)
            .field("adapter", &self.adapter)
            .field("interpreters", &self.interpreters)
            .field("resources", &self.open_resources())
            .finish()
    }
}
