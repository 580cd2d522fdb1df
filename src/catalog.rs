//! Service catalog: maps a budget's service name to its display icon and color.
//!
//! The catalog is immutable once built and is handed to request handlers
//! through application state. Lookups of unknown names fall back to
//! [`ServiceStyle::fallback`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

const ICON_BASE: &str = "https://cdn.jsdelivr.net/npm/simple-icons@v11/icons";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStyle {
    pub icon: String,
    pub color: String,
}

impl ServiceStyle {
    fn new(slug: &str, color: &str) -> Self {
        Self {
            icon: format!("{}/{}.svg", ICON_BASE, slug),
            color: color.to_string(),
        }
    }

    /// Style used for names the catalog does not know.
    pub fn fallback() -> Self {
        Self {
            icon: format!("{}/{}.svg", ICON_BASE, "serverless"),
            color: "#6B7280".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read service catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid service catalog: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("service catalog is empty")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCatalog {
    services: BTreeMap<String, ServiceStyle>,
}

impl ServiceCatalog {
    pub fn new(services: BTreeMap<String, ServiceStyle>) -> Result<Self, CatalogError> {
        if services.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { services })
    }

    /// Parse a YAML mapping of `name: { icon, color }`.
    pub fn from_yaml(source: &str) -> Result<Self, CatalogError> {
        let services: BTreeMap<String, ServiceStyle> = serde_yaml::from_str(source)?;
        Self::new(services)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&source)
    }

    /// Load from the configured file, or use the built-in catalog.
    pub fn load(path: Option<&str>) -> Result<Self, CatalogError> {
        match path {
            Some(path) => {
                let catalog = Self::from_file(path)?;
                tracing::info!("Loaded {} services from {}", catalog.services.len(), path);
                Ok(catalog)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn contains(&self, service: &str) -> bool {
        self.services.contains_key(service)
    }

    pub fn lookup(&self, service: &str) -> ServiceStyle {
        self.services
            .get(service)
            .cloned()
            .unwrap_or_else(ServiceStyle::fallback)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }
}

impl Default for ServiceCatalog {
    fn default() -> Self {
        let services = [
            ("AWS", ServiceStyle::new("amazonaws", "#FF9900")),
            ("MongoDB", ServiceStyle::new("mongodb", "#47A248")),
            ("Elastic", ServiceStyle::new("elastic", "#005571")),
            ("Jira", ServiceStyle::new("jira", "#0052CC")),
            ("Figma", ServiceStyle::new("figma", "#F24E1E")),
            ("Office365", ServiceStyle::new("microsoftoffice", "#D83B01")),
            ("Slack", ServiceStyle::new("slack", "#4A154B")),
            ("Google Cloud", ServiceStyle::new("googlecloud", "#4285F4")),
            ("Azure", ServiceStyle::new("microsoftazure", "#0078D4")),
            ("GitHub", ServiceStyle::new("github", "#181717")),
        ]
        .into_iter()
        .map(|(name, style)| (name.to_string(), style))
        .collect();

        Self { services }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_known_services() {
        let catalog = ServiceCatalog::default();
        assert!(catalog.contains("AWS"));
        assert!(catalog.contains("Google Cloud"));
        assert!(!catalog.contains("aws"));
        assert_eq!(catalog.names().count(), 10);

        let aws = catalog.lookup("AWS");
        assert_eq!(aws.color, "#FF9900");
        assert!(aws.icon.ends_with("/amazonaws.svg"));
    }

    #[test]
    fn unknown_service_uses_fallback() {
        let catalog = ServiceCatalog::default();
        assert_eq!(catalog.lookup("Heroku"), ServiceStyle::fallback());
    }

    #[test]
    fn loads_catalog_from_yaml() {
        let yaml = r##"
Heroku:
  icon: https://example.com/heroku.svg
  color: "#430098"
"##;
        let catalog = ServiceCatalog::from_yaml(yaml).unwrap();
        assert!(catalog.contains("Heroku"));
        assert!(!catalog.contains("AWS"));
        assert_eq!(catalog.lookup("Heroku").color, "#430098");
    }

    #[test]
    fn empty_yaml_catalog_is_rejected() {
        assert!(matches!(ServiceCatalog::from_yaml("{}"), Err(CatalogError::Empty)));
    }
}
