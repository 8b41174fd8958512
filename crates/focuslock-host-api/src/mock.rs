//! Mock catalog for testing

use async_trait::async_trait;
use focuslock_api::AppInfo;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::{AppCatalog, HostError, HostResult};

/// Mock catalog for unit/integration testing
#[derive(Clone, Default)]
pub struct MockCatalog {
    apps: Arc<Mutex<Vec<AppInfo>>>,
    calls: Arc<AtomicUsize>,

    /// Configure enumeration to fail
    pub fail: Arc<AtomicBool>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_apps(apps: Vec<AppInfo>) -> Self {
        let catalog = Self::new();
        catalog.set_apps(apps);
        catalog
    }

    /// Shorthand for a catalog entry
    pub fn app(name: &str, exe: &str) -> AppInfo {
        AppInfo {
            name: name.to_string(),
            exe: exe.to_string(),
            icon: None,
        }
    }

    pub fn set_apps(&self, apps: Vec<AppInfo>) {
        if let Ok(mut guard) = self.apps.lock() {
            *guard = apps;
        }
    }

    /// Number of times the catalog was enumerated
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AppCatalog for MockCatalog {
    async fn installed_apps(&self) -> HostResult<Vec<AppInfo>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail.load(Ordering::SeqCst) {
            return Err(HostError::EnumerationFailed("Mock enumeration failure".into()));
        }

        self.apps
            .lock()
            .map(|apps| apps.clone())
            .map_err(|_| HostError::Internal("mock lock poisoned".into()))
    }

    fn is_healthy(&self) -> bool {
        !self.fail.load(Ordering::SeqCst)
    }
}
