use std::{fs, path::Path};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

const BUILTIN_PRODUCTS: &str = include_str!("../content/products.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProductRecord {
    pub name: String,
    pub category: String,
    pub price: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_campaign: bool,
}

/// Product records keyed by barcode, in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    products: IndexMap<String, ProductRecord>,
}

impl Catalog {
    /// The catalog bundled with the engine. A broken bundle degrades to an
    /// empty catalog so generation stays total.
    pub fn builtin() -> Self {
        match serde_json::from_str(BUILTIN_PRODUCTS) {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::warn!(error = %e, "built-in product catalog failed to parse");
                Self::default()
            }
        }
    }

    /// Load a catalog from `.json`, `.yaml` or `.yml`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog: {}", path.display()))?;
        let catalog = if is_yaml(path) {
            serde_yaml::from_str(&text)
                .with_context(|| format!("failed to parse catalog YAML: {}", path.display()))?
        } else {
            serde_json::from_str(&text)
                .with_context(|| format!("failed to parse catalog JSON: {}", path.display()))?
        };
        Ok(catalog)
    }

    pub fn get(&self, code: &str) -> Option<&ProductRecord> {
        self.products.get(code)
    }

    pub fn insert(&mut self, code: impl Into<String>, record: ProductRecord) {
        self.products.insert(code.into(), record);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProductRecord)> {
        self.products.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

pub(crate) fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}
