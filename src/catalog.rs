//! API catalog: the static list of endpoints read from `db.json`.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Port recorded for descriptors that do not carry one.
pub const DEFAULT_API_PORT: u16 = 8000;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No API with id {0} in catalog")]
    UnknownApi(u32),
}

/// HTTP verbs a descriptor may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }

    /// Case-insensitive lookup.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "PATCH" => Some(Self::Patch),
            "DELETE" => Some(Self::Delete),
            "HEAD" => Some(Self::Head),
            "OPTIONS" => Some(Self::Options),
            _ => None,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for HttpMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for HttpMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unsupported HTTP method: {}", raw)))
    }
}

/// One remote endpoint to call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiDescriptor {
    pub id: u32,
    pub name: String,
    pub url: String,
    pub method: HttpMethod,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl ApiDescriptor {
    /// The configured port, or [`DEFAULT_API_PORT`].
    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_API_PORT)
    }
}

/// The `{"apis": [...]}` document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiCatalog {
    pub apis: Vec<ApiDescriptor>,
}

impl ApiCatalog {
    /// Read and parse a catalog file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json(&contents).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(
            "Loaded {} API descriptors from {}",
            catalog.apis.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        let catalog: Self = serde_json::from_str(contents)?;
        let mut seen = HashSet::new();
        for api in &catalog.apis {
            if !seen.insert(api.id) {
                tracing::warn!("Duplicate API id {} ({}); first entry wins", api.id, api.name);
            }
        }
        Ok(catalog)
    }

    /// First descriptor with the given id.
    pub fn get(&self, id: u32) -> Result<&ApiDescriptor, CatalogError> {
        self.apis
            .iter()
            .find(|api| api.id == id)
            .ok_or(CatalogError::UnknownApi(id))
    }

    pub fn len(&self) -> usize {
        self.apis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apis.is_empty()
    }
}
