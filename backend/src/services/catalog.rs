//! Commodity catalog service: commodity → variety → grade
//!
//! Writes are find-or-create at every level so that re-submitting an entry,
//! or re-uploading a catalog sheet, never duplicates existing rows.

use sqlx::{FromRow, PgConnection, PgPool};

use crate::error::{AppError, AppResult};
use crate::models::{
    BulkCommodityRow, CatalogEntry, CatalogImportSummary, Commodity, CreateCommodityInput, Grade,
    Variety,
};
use shared::validation::derive_commodity_code;

/// Catalog service
#[derive(Clone)]
pub struct CatalogService {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct CommodityRow {
    id: i64,
    name: String,
    hsn_code: Option<String>,
}

#[derive(Debug, FromRow)]
struct VarietyRow {
    id: i64,
    commodity_id: i64,
    name: String,
}

#[derive(Debug, FromRow)]
struct GradeRow {
    id: i64,
    variety_id: i64,
    name: String,
}

#[derive(Debug, FromRow)]
struct EntryRow {
    commodity_id: i64,
    variety_id: i64,
    name: String,
    variety: String,
    hsn_code: Option<String>,
}

impl From<EntryRow> for CatalogEntry {
    fn from(row: EntryRow) -> Self {
        let commodity_code = derive_commodity_code(&row.name, &row.variety);
        CatalogEntry {
            commodity_id: row.commodity_id,
            variety_id: row.variety_id,
            name: row.name,
            variety: row.variety,
            hsn_code: row.hsn_code,
            commodity_code,
        }
    }
}

/// CSV header columns of a catalog upload
pub const CSV_COLUMNS: [&str; 4] = ["Commodity Name", "Variety", "Grade", "HSN Code"];

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Parse a catalog sheet exported as CSV.
///
/// Header names are matched after trimming, case-insensitively; column order
/// does not matter. Blank cells become `None`.
pub fn parse_catalog_csv(body: &str) -> AppResult<Vec<BulkCommodityRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::ValidationError(format!("Invalid CSV header: {}", e)))?
        .clone();

    let position = |column: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(column))
    };

    let missing: Vec<&str> = CSV_COLUMNS
        .iter()
        .copied()
        .filter(|column| position(column).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(AppError::ValidationError(format!(
            "CSV is missing columns: {}",
            missing.join(", ")
        )));
    }

    let [commodity, variety, grade, hsn_code] =
        CSV_COLUMNS.map(|column| position(column).unwrap_or_default());

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            AppError::ValidationError(format!("Invalid CSV row {}: {}", line + 2, e))
        })?;

        rows.push(BulkCommodityRow {
            commodity: non_blank(record.get(commodity)),
            variety: non_blank(record.get(variety)),
            grade: non_blank(record.get(grade)),
            hsn_code: non_blank(record.get(hsn_code)),
        });
    }

    Ok(rows)
}

/// Pick the catalog entry whose derived code and variety name match
pub fn matching_entry<'a>(
    entries: &'a [CatalogEntry],
    commodity_code: &str,
    variety: &str,
) -> Option<&'a CatalogEntry> {
    let variety = variety.trim().to_lowercase();
    entries.iter().find(|entry| {
        entry.commodity_code == commodity_code.trim() && entry.variety.to_lowercase() == variety
    })
}

async fn find_or_create_commodity(
    conn: &mut PgConnection,
    name: &str,
    hsn_code: Option<&str>,
    summary: &mut CatalogImportSummary,
) -> AppResult<i64> {
    let existing = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM commodities WHERE LOWER(name) = LOWER($1)",
    )
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(id) = existing {
        return Ok(id);
    }

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO commodities (name, hsn_code) VALUES ($1, $2) RETURNING id",
    )
    .bind(name)
    .bind(hsn_code)
    .fetch_one(&mut *conn)
    .await?;

    summary.commodities_created += 1;
    Ok(id)
}

async fn find_or_create_variety(
    conn: &mut PgConnection,
    commodity_id: i64,
    name: &str,
    summary: &mut CatalogImportSummary,
) -> AppResult<i64> {
    let existing = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM varieties WHERE commodity_id = $1 AND LOWER(name) = LOWER($2)",
    )
    .bind(commodity_id)
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(id) = existing {
        return Ok(id);
    }

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO varieties (commodity_id, name) VALUES ($1, $2) RETURNING id",
    )
    .bind(commodity_id)
    .bind(name)
    .fetch_one(&mut *conn)
    .await?;

    summary.varieties_created += 1;
    Ok(id)
}

async fn find_or_create_grade(
    conn: &mut PgConnection,
    variety_id: i64,
    name: &str,
    summary: &mut CatalogImportSummary,
) -> AppResult<()> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM grades WHERE variety_id = $1 AND LOWER(name) = LOWER($2))",
    )
    .bind(variety_id)
    .bind(name)
    .fetch_one(&mut *conn)
    .await?;

    if !exists {
        sqlx::query("INSERT INTO grades (variety_id, name) VALUES ($1, $2)")
            .bind(variety_id)
            .bind(name)
            .execute(&mut *conn)
            .await?;
        summary.grades_created += 1;
    }

    Ok(())
}

/// Store one catalog row. Rows without a commodity are skipped; a grade
/// without a variety is ignored.
async fn import_row(
    conn: &mut PgConnection,
    row: &BulkCommodityRow,
) -> AppResult<CatalogImportSummary> {
    let mut summary = CatalogImportSummary::default();

    let Some(path) = row.catalog_path() else {
        summary.rows_skipped += 1;
        return Ok(summary);
    };

    let commodity_id =
        find_or_create_commodity(conn, &path.commodity, path.hsn_code.as_deref(), &mut summary)
            .await?;

    if let Some(variety) = &path.variety {
        let variety_id = find_or_create_variety(conn, commodity_id, variety, &mut summary).await?;

        if let Some(grade) = &path.grade {
            find_or_create_grade(conn, variety_id, grade, &mut summary).await?;
        }
    }

    Ok(summary)
}

impl CatalogService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Add a commodity/variety pair and optionally a grade under it
    pub async fn create_entry(&self, input: CreateCommodityInput) -> AppResult<CatalogImportSummary> {
        if input.name.trim().is_empty() || input.variety.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Commodity Name and Variety are required".to_string(),
            ));
        }

        let row = BulkCommodityRow {
            commodity: Some(input.name),
            variety: Some(input.variety),
            grade: input.grade,
            hsn_code: input.hsn_code,
        };

        let mut tx = self.db.begin().await?;
        let summary = import_row(&mut *tx, &row).await?;
        tx.commit().await?;

        tracing::info!(?summary, "Catalog entry stored");
        Ok(summary)
    }

    /// Import many rows in a single transaction; any failure rolls back all
    pub async fn import_rows(&self, rows: &[BulkCommodityRow]) -> AppResult<CatalogImportSummary> {
        let mut tx = self.db.begin().await?;
        let mut summary = CatalogImportSummary::default();

        for row in rows {
            summary.merge(import_row(&mut *tx, row).await?);
        }

        tx.commit().await?;

        tracing::info!(rows = rows.len(), ?summary, "Catalog import committed");
        Ok(summary)
    }

    /// Commodities without their children
    pub async fn list_commodities(&self) -> AppResult<Vec<Commodity>> {
        let rows = sqlx::query_as::<_, CommodityRow>(
            "SELECT id, name, hsn_code FROM commodities ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Commodity {
                id: r.id,
                name: r.name,
                hsn_code: r.hsn_code,
            })
            .collect())
    }

    /// Varieties of one commodity; empty when the commodity is unknown
    pub async fn list_varieties(&self, commodity_id: i64) -> AppResult<Vec<Variety>> {
        let rows = sqlx::query_as::<_, VarietyRow>(
            "SELECT id, commodity_id, name FROM varieties WHERE commodity_id = $1 ORDER BY name",
        )
        .bind(commodity_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Variety {
                id: r.id,
                commodity_id: r.commodity_id,
                name: r.name,
            })
            .collect())
    }

    /// Grades of one variety; empty when the variety is unknown
    pub async fn list_grades(&self, variety_id: i64) -> AppResult<Vec<Grade>> {
        let rows = sqlx::query_as::<_, GradeRow>(
            "SELECT id, variety_id, name FROM grades WHERE variety_id = $1 ORDER BY name",
        )
        .bind(variety_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Grade {
                id: r.id,
                variety_id: r.variety_id,
                name: r.name,
            })
            .collect())
    }

    /// Every commodity/variety pair with its derived code
    pub async fn list_entries(&self) -> AppResult<Vec<CatalogEntry>> {
        let rows = sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT c.id AS commodity_id, v.id AS variety_id, c.name, v.name AS variety, c.hsn_code
            FROM commodities c
            JOIN varieties v ON v.commodity_id = c.id
            ORDER BY c.name, v.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(CatalogEntry::from).collect())
    }

    /// Catalog entry that `commodity_code` and `variety` refer to, if any
    pub async fn find_entry(
        &self,
        commodity_code: &str,
        variety: &str,
    ) -> AppResult<Option<CatalogEntry>> {
        let rows = sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT c.id AS commodity_id, v.id AS variety_id, c.name, v.name AS variety, c.hsn_code
            FROM commodities c
            JOIN varieties v ON v.commodity_id = c.id
            WHERE LOWER(v.name) = LOWER($1)
            "#,
        )
        .bind(variety.trim())
        .fetch_all(&self.db)
        .await?;

        let entries: Vec<CatalogEntry> = rows.into_iter().map(CatalogEntry::from).collect();
        Ok(matching_entry(&entries, commodity_code, variety).cloned())
    }
}
