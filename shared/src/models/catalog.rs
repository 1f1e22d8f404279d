//! Commodity catalog models: commodity → variety → grade

use serde::{Deserialize, Serialize};

/// A stored commodity such as "Chilli" or "Turmeric"
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Commodity {
    pub id: i64,
    pub name: String,
    pub hsn_code: Option<String>,
}

/// A variety belonging to exactly one commodity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Variety {
    pub id: i64,
    pub commodity_id: i64,
    pub name: String,
}

/// A grade belonging to exactly one variety
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Grade {
    pub id: i64,
    pub variety_id: i64,
    pub name: String,
}

/// One commodity/variety pair with its derived commodity code
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    pub commodity_id: i64,
    pub variety_id: i64,
    pub name: String,
    pub variety: String,
    pub hsn_code: Option<String>,
    pub commodity_code: String,
}

/// `POST /commodities` payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateCommodityInput {
    pub name: String,
    pub variety: String,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub hsn_code: Option<String>,
}

/// One row of a bulk catalog upload
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BulkCommodityRow {
    #[serde(default)]
    pub commodity: Option<String>,
    #[serde(default)]
    pub variety: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub hsn_code: Option<String>,
}

/// A bulk row reduced to the catalog levels it will touch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPath {
    pub commodity: String,
    pub hsn_code: Option<String>,
    pub variety: Option<String>,
    /// Only ever set together with `variety`
    pub grade: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl BulkCommodityRow {
    /// Trim every cell and drop what cannot be stored: `None` when the
    /// commodity is blank, and no grade when the variety is blank.
    pub fn catalog_path(&self) -> Option<CatalogPath> {
        let commodity = non_blank(&self.commodity)?;
        let variety = non_blank(&self.variety);
        let grade = variety.as_ref().and_then(|_| non_blank(&self.grade));

        Some(CatalogPath {
            commodity,
            hsn_code: non_blank(&self.hsn_code),
            variety,
            grade,
        })
    }
}

/// What a catalog write actually created
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogImportSummary {
    pub commodities_created: u32,
    pub varieties_created: u32,
    pub grades_created: u32,
    pub rows_skipped: u32,
}

impl CatalogImportSummary {
    pub fn merge(&mut self, other: CatalogImportSummary) {
        self.commodities_created += other.commodities_created;
        self.varieties_created += other.varieties_created;
        self.grades_created += other.grades_created;
        self.rows_skipped += other.rows_skipped;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogWriteResponse {
    pub message: String,
    pub summary: CatalogImportSummary,
}
