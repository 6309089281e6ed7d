//! Static reference tables consulted by every inference strategy.
//!
//! Tables are built once at startup, either from the built-in defaults or
//! from a JSON/YAML file, and shared read-only behind an `Arc`.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EcoError, Result};
use crate::types::{AlternativeProduct, DisposalMethod};

/// A material the mock engine can recognise in a filename.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialEntry {
    pub name: String,
    pub base_score: f64,
    /// `None` means the material has no disposal mapping and falls back to landfill.
    #[serde(default)]
    pub disposal: Option<DisposalMethod>,
}

impl MaterialEntry {
    pub fn new(name: impl Into<String>, base_score: f64, disposal: Option<DisposalMethod>) -> Self {
        Self {
            name: name.into(),
            base_score,
            disposal,
        }
    }

    /// Disposal method, defaulting to `Landfill` when unmapped.
    pub fn disposal_or_default(&self) -> DisposalMethod {
        self.disposal.unwrap_or(DisposalMethod::Landfill)
    }

    /// Whether the material name occurs in an already-lowercased filename,
    /// either with underscores as spaces or with underscores removed.
    pub fn matches(&self, lowered: &str) -> bool {
        lowered.contains(&self.name.replace('_', " ")) || lowered.contains(&self.name.replace('_', ""))
    }
}

/// Ordered material catalog. Iteration order is declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialCatalog {
    entries: Vec<MaterialEntry>,
}

impl MaterialCatalog {
    pub fn new(entries: Vec<MaterialEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[MaterialEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, name: &str) -> Option<&MaterialEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Disposal for a material name; unknown or unmapped materials go to landfill.
    pub fn disposal_for(&self, name: &str) -> DisposalMethod {
        self.lookup(name)
            .map(MaterialEntry::disposal_or_default)
            .unwrap_or(DisposalMethod::Landfill)
    }

    /// All entries whose name occurs in the filename, in catalog order.
    pub fn detect<'a>(&'a self, filename: &str) -> Vec<&'a MaterialEntry> {
        let lowered = filename.to_lowercase();
        self.entries.iter().filter(|e| e.matches(&lowered)).collect()
    }
}

/// Base carbon footprint in kilograms per disposal method.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarbonRateTable {
    #[serde(rename = "Recycle")]
    pub recycle: f64,
    #[serde(rename = "Compost")]
    pub compost: f64,
    #[serde(rename = "Landfill")]
    pub landfill: f64,
    #[serde(rename = "Hazardous")]
    pub hazardous: f64,
}

impl CarbonRateTable {
    pub fn rate_for(&self, method: DisposalMethod) -> f64 {
        match method {
            DisposalMethod::Recycle => self.recycle,
            DisposalMethod::Compost => self.compost,
            DisposalMethod::Landfill => self.landfill,
            DisposalMethod::Hazardous => self.hazardous,
        }
    }
}

impl Default for CarbonRateTable {
    fn default() -> Self {
        Self {
            recycle: 0.5,
            compost: 0.2,
            landfill: 2.0,
            hazardous: 5.0,
        }
    }
}

/// Minimum number of alternatives needed to fill a result.
pub const ALTERNATIVES_PER_RESULT: usize = 3;

/// The full set of reference data handed to classifiers at construction time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceTables {
    pub materials: MaterialCatalog,
    #[serde(default)]
    pub carbon_rates: CarbonRateTable,
    pub alternatives: Vec<AlternativeProduct>,
}

impl ReferenceTables {
    /// Built-in demo tables.
    pub fn builtin() -> Self {
        use DisposalMethod::*;

        let materials = [
            ("bamboo", 9.5, Some(Compost)),
            ("wood", 8.8, Some(Compost)),
            ("glass", 8.2, Some(Recycle)),
            ("aluminum", 7.8, Some(Recycle)),
            ("jute", 8.0, None),
            ("cardboard", 7.5, Some(Recycle)),
            ("paper", 7.2, Some(Recycle)),
            ("stainless_steel", 7.0, Some(Recycle)),
            ("ceramic", 6.8, Some(Landfill)),
            ("cotton", 6.5, Some(Compost)),
            ("plastic_pet", 3.2, Some(Recycle)),
            ("plastic_hdpe", 3.0, Some(Recycle)),
            ("plastic_pvc", 2.1, Some(Hazardous)),
            ("polystyrene", 1.8, Some(Landfill)),
            ("composite", 2.5, Some(Landfill)),
            ("synthetic_fabric", 2.8, Some(Landfill)),
        ]
        .into_iter()
        .map(|(name, score, disposal)| MaterialEntry::new(name, score, disposal))
        .collect();

        let alternatives = [
            (1, "Bamboo Water Bottle", 9.2),
            (2, "Stainless Steel Container", 8.8),
            (3, "Glass Storage Jar", 8.5),
            (4, "Organic Cotton Bag", 8.3),
            (5, "Recycled Paper Packaging", 7.8),
            (6, "Biodegradable Plates", 9.0),
            (7, "Hemp Fiber Products", 8.9),
            (8, "Cork-based Items", 8.7),
        ]
        .into_iter()
        .map(|(id, name, score)| AlternativeProduct {
            id,
            name: name.to_string(),
            score,
        })
        .collect();

        Self {
            materials: MaterialCatalog::new(materials),
            carbon_rates: CarbonRateTable::default(),
            alternatives,
        }
    }

    /// Load tables from a `.json`, `.yaml` or `.yml` file and validate them.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let tables: Self = match ext.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&raw)?,
            _ => serde_json::from_str(&raw)?,
        };
        tables.validate()?;

        info!(
            path = %path.display(),
            materials = tables.materials.len(),
            alternatives = tables.alternatives.len(),
            "Loaded reference tables"
        );
        Ok(tables)
    }

    /// Check the invariants every strategy relies on.
    pub fn validate(&self) -> Result<()> {
        if self.materials.is_empty() {
            return Err(EcoError::InvalidTables("material catalog is empty".into()));
        }

        let mut seen = HashSet::new();
        for entry in self.materials.entries() {
            if entry.name.trim().is_empty() {
                return Err(EcoError::InvalidTables("material with empty name".into()));
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(EcoError::InvalidTables(format!(
                    "duplicate material '{}'",
                    entry.name
                )));
            }
            if !(0.0..=10.0).contains(&entry.base_score) {
                return Err(EcoError::InvalidTables(format!(
                    "score {} for '{}' is outside [0, 10]",
                    entry.base_score, entry.name
                )));
            }
        }

        for method in DisposalMethod::ALL {
            let rate = self.carbon_rates.rate_for(method);
            if !rate.is_finite() || rate < 0.0 {
                return Err(EcoError::InvalidTables(format!(
                    "carbon rate for {method} must be non-negative, got {rate}"
                )));
            }
        }

        if self.alternatives.len() < ALTERNATIVES_PER_RESULT {
            return Err(EcoError::InvalidTables(format!(
                "need at least {ALTERNATIVES_PER_RESULT} alternative products, got {}",
                self.alternatives.len()
            )));
        }
        let mut ids = HashSet::new();
        if let Some(dup) = self.alternatives.iter().find(|p| !ids.insert(p.id)) {
            return Err(EcoError::InvalidTables(format!(
                "duplicate alternative product id {}",
                dup.id
            )));
        }

        Ok(())
    }

    /// The highest-scoring alternatives, best first.
    pub fn top_alternatives(&self, n: usize) -> Vec<AlternativeProduct> {
        let mut sorted = self.alternatives.clone();
        sorted.sort_by(|a, b| b.score.total_cmp(&a.score));
        sorted.truncate(n);
        sorted
    }
}

impl Default for ReferenceTables {
    fn default() -> Self {
        Self::builtin()
    }
}
