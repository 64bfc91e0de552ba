//! Persistent endpoint list, stored as a JSON array in a single file

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::endpoint::Endpoint;

/// File-backed endpoint store.
///
/// The file holds a JSON array of `{name, url}` objects; an absent file
/// reads as an empty list. Endpoints are unique by URL, and everything is
/// validated before it is written.
#[derive(Debug, Clone)]
pub struct EndpointStore {
    path: PathBuf,
}

impl EndpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored endpoint list; an absent file is an empty list
    pub fn load(&self) -> crate::Result<Vec<Endpoint>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let endpoints: Vec<Endpoint> = serde_json::from_str(&content)?;
        Ok(endpoints)
    }

    /// Replace the stored list wholesale.
    ///
    /// Every endpoint is validated and URLs must be unique; nothing is
    /// written when any entry is rejected.
    pub fn save(&self, endpoints: &[Endpoint]) -> crate::Result<()> {
        let mut seen = HashSet::new();
        for endpoint in endpoints {
            endpoint.validate()?;
            if !seen.insert(endpoint.url.as_str()) {
                return Err(crate::VigilError::Validation(format!(
                    "duplicate endpoint URL '{}'",
                    endpoint.url
                )));
            }
        }

        let json = serde_json::to_string_pretty(endpoints)?;
        std::fs::write(&self.path, json)?;
        tracing::debug!("Saved {} endpoints to {:?}", endpoints.len(), self.path);
        Ok(())
    }

    /// Validate and append one endpoint
    pub fn add(&self, endpoint: Endpoint) -> crate::Result<()> {
        endpoint.validate()?;
        let mut endpoints = self.load()?;
        if endpoints.iter().any(|e| e.url == endpoint.url) {
            return Err(crate::VigilError::Validation(format!(
                "endpoint with URL '{}' already exists",
                endpoint.url
            )));
        }
        endpoints.push(endpoint);
        self.save(&endpoints)
    }

    /// Remove the endpoint with the given URL, returning whether one existed
    pub fn remove(&self, url: &str) -> crate::Result<bool> {
        let mut endpoints = self.load()?;
        let before = endpoints.len();
        endpoints.retain(|e| e.url != url);
        let removed = endpoints.len() != before;
        if removed {
            self.save(&endpoints)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, EndpointStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = EndpointStore::new(dir.path().join("endpoints.json"));
        (dir, store)
    }

    fn endpoints() -> Vec<Endpoint> {
        vec![
            Endpoint::new("API", "https://api.example.com/health"),
            Endpoint::new("Site", "https://www.example.com"),
        ]
    }

    #[test]
    fn load_absent_file_is_empty() {
        let (_dir, store) = temp_store();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load_roundtrip() {
        let (_dir, store) = temp_store();
        store.save(&endpoints()).unwrap();
        assert_eq!(store.load().unwrap(), endpoints());
    }

    #[test]
    fn resaving_a_loaded_list_changes_nothing() {
        let (_dir, store) = temp_store();
        store.save(&endpoints()).unwrap();

        let loaded = store.load().unwrap();
        store.save(&loaded).unwrap();
        assert_eq!(store.load().unwrap(), loaded);
    }

    #[test]
    fn save_rejects_invalid_endpoint() {
        let (_dir, store) = temp_store();
        let result = store.save(&[Endpoint::new("", "https://api.example.com")]);
        assert!(matches!(result, Err(crate::VigilError::Validation(_))));
        // Nothing was written
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_rejects_duplicate_urls() {
        let (_dir, store) = temp_store();
        let result = store.save(&[
            Endpoint::new("One", "https://api.example.com"),
            Endpoint::new("Two", "https://api.example.com"),
        ]);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("duplicate endpoint URL"));
    }

    #[test]
    fn add_appends_to_existing_list() {
        let (_dir, store) = temp_store();
        store.save(&endpoints()).unwrap();
        store
            .add(Endpoint::new("Docs", "https://docs.example.com"))
            .unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[2].name, "Docs");
    }

    #[test]
    fn add_rejects_duplicate_url() {
        let (_dir, store) = temp_store();
        store.save(&endpoints()).unwrap();

        let err = store
            .add(Endpoint::new("Again", "https://api.example.com/health"))
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(store.load().unwrap().len(), 2);
    }

    #[test]
    fn add_rejects_invalid_endpoint() {
        let (_dir, store) = temp_store();
        let result = store.add(Endpoint::new("Bad", "ftp://example.com"));
        assert!(matches!(result, Err(crate::VigilError::Validation(_))));
    }

    #[test]
    fn remove_existing_endpoint() {
        let (_dir, store) = temp_store();
        store.save(&endpoints()).unwrap();

        assert!(store.remove("https://api.example.com/health").unwrap());
        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "Site");
    }

    #[test]
    fn remove_missing_endpoint_returns_false() {
        let (_dir, store) = temp_store();
        store.save(&endpoints()).unwrap();
        assert!(!store.remove("https://nope.example.com").unwrap());
        assert_eq!(store.load().unwrap().len(), 2);
    }

    #[test]
    fn load_invalid_json_is_an_error() {
        let (_dir, store) = temp_store();
        std::fs::write(store.path(), "not json").unwrap();
        assert!(matches!(store.load(), Err(crate::VigilError::Json(_))));
    }
}
