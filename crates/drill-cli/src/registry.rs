//! Directory-backed schema registry
//!
//! Serves `<dir>/<name>.json` as the named schema `name`.

use async_trait::async_trait;
use drill_schema::{LookupError, Schema, SchemaRegistry};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Registry reading one JSON file per named schema
#[derive(Debug, Clone)]
pub(crate) struct DirectoryRegistry {
    root: PathBuf,
}

impl DirectoryRegistry {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn file_for(&self, name: &str) -> Option<PathBuf> {
        // Names map to a single file directly under the root
        let file = Path::new(name);
        if name.is_empty() || file.components().count() != 1 || name.starts_with('.') {
            return None;
        }
        Some(self.root.join(format!("{name}.json")))
    }
}

#[async_trait]
impl SchemaRegistry for DirectoryRegistry {
    async fn lookup(&self, name: &str) -> Result<Schema, LookupError> {
        let file = self
            .file_for(name)
            .ok_or_else(|| LookupError::NotFound(name.to_string()))?;

        let source = match tokio::fs::read_to_string(&file).await {
            Ok(source) => source,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(LookupError::NotFound(name.to_string()));
            }
            Err(e) => return Err(LookupError::backend(name, e.to_string())),
        };

        tracing::debug!("Loaded schema {} from {}", name, file.display());
        serde_json::from_str(&source).map_err(|e| LookupError::backend(name, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drill_schema::SchemaType;

    fn registry_with(files: &[(&str, &str)]) -> (tempfile::TempDir, DirectoryRegistry) {
        let dir = tempfile::tempdir().unwrap();
        for (name, body) in files {
            std::fs::write(dir.path().join(format!("{name}.json")), body).unwrap();
        }
        let registry = DirectoryRegistry::new(dir.path());
        (dir, registry)
    }

    #[tokio::test]
    async fn reads_named_file() {
        let (_dir, registry) = registry_with(&[("tag", r#"{"type": "string"}"#)]);
        let schema = registry.lookup("tag").await.unwrap();
        assert_eq!(schema.schema_type, Some(SchemaType::String));
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let (_dir, registry) = registry_with(&[]);
        assert!(matches!(
            registry.lookup("ghost").await,
            Err(LookupError::NotFound(name)) if name == "ghost"
        ));
    }

    #[tokio::test]
    async fn names_cannot_escape_the_directory() {
        let (_dir, registry) = registry_with(&[]);
        for name in ["../etc/passwd", "a/b", "", ".hidden"] {
            assert!(matches!(
                registry.lookup(name).await,
                Err(LookupError::NotFound(_))
            ));
        }
    }

    #[tokio::test]
    async fn malformed_json_is_backend_error() {
        let (_dir, registry) = registry_with(&[("bad", "{ not json")]);
        assert!(matches!(
            registry.lookup("bad").await,
            Err(LookupError::Backend { .. })
        ));
    }
}
