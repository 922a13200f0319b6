use super::descriptor::{PackageDescriptor, UpdateServer};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type CacheKey = (String, String);

/// Memoizes descriptor lookups per `(package_id, version_selector)`.
///
/// Misses and server failures are not cached, so the next lookup asks again.
pub struct PackageDescriptorCache {
    server: Arc<dyn UpdateServer>,
    entries: Mutex<HashMap<CacheKey, Arc<PackageDescriptor>>>,
}

impl PackageDescriptorCache {
    pub fn new(server: Arc<dyn UpdateServer>) -> Self {
        Self {
            server,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn server(&self) -> &Arc<dyn UpdateServer> {
        &self.server
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<CacheKey, Arc<PackageDescriptor>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_package_info(
        &self,
        package_id: &str,
        version_selector: &str,
    ) -> Option<Arc<PackageDescriptor>> {
        let key = (package_id.to_string(), version_selector.to_string());
        if let Some(found) = self.entries().get(&key) {
            return Some(found.clone());
        }
        // The lock is not held while the server answers.
        match self.server.package_info(package_id, version_selector) {
            Ok(Some(descriptor)) => {
                let descriptor = Arc::new(descriptor);
                self.entries().insert(key, descriptor.clone());
                Some(descriptor)
            }
            Ok(None) => {
                log::debug!("no package '{package_id}' for version {version_selector}");
                None
            }
            Err(err) => {
                log::error!("Failed to fetch package info for '{package_id}': {err}");
                None
            }
        }
    }

    /// Stores a descriptor obtained elsewhere, e.g. from a search.
    pub fn insert(&self, descriptor: PackageDescriptor, version_selector: &str) -> Arc<PackageDescriptor> {
        let key = (descriptor.package_id.clone(), version_selector.to_string());
        let descriptor = Arc::new(descriptor);
        self.entries().insert(key, descriptor.clone());
        descriptor
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries().clear();
    }
}
