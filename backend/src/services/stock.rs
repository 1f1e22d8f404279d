//! Stock service: goods accepted into and delivered out of the warehouse

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::{
    AcceptStockInput, DeliverStockInput, StockAcceptance, StockBalance, StockDelivery,
};
use crate::services::CatalogService;
use shared::validation::validate_quantity;

/// Stock movement service
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct AcceptanceRow {
    id: i64,
    reference: Uuid,
    client_id: i64,
    commodity_code: String,
    variety: String,
    grade: String,
    quantity: Decimal,
    accepted_by: String,
    created_at: DateTime<Utc>,
}

impl From<AcceptanceRow> for StockAcceptance {
    fn from(row: AcceptanceRow) -> Self {
        StockAcceptance {
            id: row.id,
            reference: row.reference,
            client_id: row.client_id,
            commodity_code: row.commodity_code,
            variety: row.variety,
            grade: row.grade,
            quantity: row.quantity,
            accepted_by: row.accepted_by,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct DeliveryRow {
    id: i64,
    reference: Uuid,
    client_id: i64,
    commodity_code: String,
    variety: String,
    quantity: Decimal,
    delivered_by: String,
    created_at: DateTime<Utc>,
}

impl From<DeliveryRow> for StockDelivery {
    fn from(row: DeliveryRow) -> Self {
        StockDelivery {
            id: row.id,
            reference: row.reference,
            client_id: row.client_id,
            commodity_code: row.commodity_code,
            variety: row.variety,
            quantity: row.quantity,
            delivered_by: row.delivered_by,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct BalanceRow {
    client_id: i64,
    commodity_code: String,
    variety: String,
    accepted: Decimal,
    delivered: Decimal,
}

fn required_text(value: &str, field: &'static str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation {
            field: field.to_string(),
            message: format!("{} is required", field),
        });
    }
    Ok(value.to_string())
}

fn check_quantity(quantity: Decimal) -> AppResult<()> {
    validate_quantity(quantity).map_err(|m| AppError::Validation {
        field: "quantity".to_string(),
        message: m.to_string(),
    })
}

/// Reject a delivery larger than what the client holds
pub fn ensure_covered(balance: &StockBalance, quantity: Decimal) -> AppResult<()> {
    if balance.covers(quantity) {
        Ok(())
    } else {
        Err(AppError::InsufficientStock(format!(
            "Requested {} but only {} of {} {} is in stock",
            quantity,
            balance.balance.max(Decimal::ZERO),
            balance.commodity_code,
            balance.variety
        )))
    }
}

impl StockService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn ensure_client_exists(&self, client_id: i64) -> AppResult<()> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1)",
        )
        .bind(client_id)
        .fetch_one(&self.db)
        .await?;

        if exists {
            Ok(())
        } else {
            Err(AppError::NotFound("Client".to_string()))
        }
    }

    /// Record goods received from a client
    pub async fn accept(
        &self,
        user: &AuthUser,
        input: AcceptStockInput,
    ) -> AppResult<StockAcceptance> {
        let commodity_code = required_text(&input.commodity_code, "commodity_code")?;
        let variety = required_text(&input.variety, "variety")?;
        let grade = required_text(&input.grade, "grade")?;
        check_quantity(input.quantity)?;

        self.ensure_client_exists(input.client_id).await?;

        let entry = CatalogService::new(self.db.clone())
            .find_entry(&commodity_code, &variety)
            .await?
            .ok_or_else(|| AppError::Validation {
                field: "commodity_code".to_string(),
                message: format!(
                    "{} does not match any catalog commodity with variety {}",
                    commodity_code, variety
                ),
            })?;

        let row = sqlx::query_as::<_, AcceptanceRow>(
            r#"
            INSERT INTO stock_acceptances (
                reference, client_id, commodity_code, variety, grade, quantity, accepted_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, reference, client_id, commodity_code, variety, grade, quantity,
                      accepted_by, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.client_id)
        .bind(&entry.commodity_code)
        .bind(&entry.variety)
        .bind(&grade)
        .bind(input.quantity)
        .bind(&user.username)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(
            reference = %row.reference,
            client_id = row.client_id,
            commodity_code = %row.commodity_code,
            quantity = %row.quantity,
            accepted_by = %row.accepted_by,
            "Stock accepted"
        );

        Ok(row.into())
    }

    /// Record goods handed back to a client.
    ///
    /// The balance check and the insert share a transaction holding a
    /// per-client advisory lock, so concurrent deliveries cannot overdraw.
    pub async fn deliver(
        &self,
        user: &AuthUser,
        input: DeliverStockInput,
    ) -> AppResult<StockDelivery> {
        let commodity_code = required_text(&input.commodity_code, "commodity_code")?;
        let variety = required_text(&input.variety, "variety")?;
        check_quantity(input.quantity)?;

        self.ensure_client_exists(input.client_id).await?;

        let mut tx = self.db.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(input.client_id)
            .execute(&mut *tx)
            .await?;

        let (accepted, delivered) = sqlx::query_as::<_, (Decimal, Decimal)>(
            r#"
            SELECT
                COALESCE((
                    SELECT SUM(quantity) FROM stock_acceptances
                    WHERE client_id = $1 AND commodity_code = $2 AND LOWER(variety) = LOWER($3)
                ), 0) AS accepted,
                COALESCE((
                    SELECT SUM(quantity) FROM stock_deliveries
                    WHERE client_id = $1 AND commodity_code = $2 AND LOWER(variety) = LOWER($3)
                ), 0) AS delivered
            "#,
        )
        .bind(input.client_id)
        .bind(&commodity_code)
        .bind(&variety)
        .fetch_one(&mut *tx)
        .await?;

        let balance = StockBalance::new(
            input.client_id,
            commodity_code.clone(),
            variety.clone(),
            accepted,
            delivered,
        );
        ensure_covered(&balance, input.quantity)?;

        let row = sqlx::query_as::<_, DeliveryRow>(
            r#"
            INSERT INTO stock_deliveries (
                reference, client_id, commodity_code, variety, quantity, delivered_by
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, reference, client_id, commodity_code, variety, quantity,
                      delivered_by, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.client_id)
        .bind(&commodity_code)
        .bind(&variety)
        .bind(input.quantity)
        .bind(&user.username)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            reference = %row.reference,
            client_id = row.client_id,
            commodity_code = %row.commodity_code,
            quantity = %row.quantity,
            remaining = %(balance.balance - row.quantity),
            delivered_by = %row.delivered_by,
            "Stock delivered"
        );

        Ok(row.into())
    }

    /// Acceptances, newest first
    pub async fn list_acceptances(&self, client_id: Option<i64>) -> AppResult<Vec<StockAcceptance>> {
        let rows = sqlx::query_as::<_, AcceptanceRow>(
            r#"
            SELECT id, reference, client_id, commodity_code, variety, grade, quantity,
                   accepted_by, created_at
            FROM stock_acceptances
            WHERE ($1::BIGINT IS NULL OR client_id = $1)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(StockAcceptance::from).collect())
    }

    /// Deliveries, newest first
    pub async fn list_deliveries(&self, client_id: Option<i64>) -> AppResult<Vec<StockDelivery>> {
        let rows = sqlx::query_as::<_, DeliveryRow>(
            r#"
            SELECT id, reference, client_id, commodity_code, variety, quantity,
                   delivered_by, created_at
            FROM stock_deliveries
            WHERE ($1::BIGINT IS NULL OR client_id = $1)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(StockDelivery::from).collect())
    }

    /// Stock held per client, commodity code and variety
    pub async fn balances(&self, client_id: Option<i64>) -> AppResult<Vec<StockBalance>> {
        let rows = sqlx::query_as::<_, BalanceRow>(
            r#"
            WITH movements AS (
                SELECT client_id, commodity_code, variety,
                       quantity AS accepted, 0::NUMERIC AS delivered
                FROM stock_acceptances
                UNION ALL
                SELECT client_id, commodity_code, variety,
                       0::NUMERIC AS accepted, quantity AS delivered
                FROM stock_deliveries
            )
            SELECT client_id, commodity_code, MIN(variety) AS variety,
                   SUM(accepted) AS accepted, SUM(delivered) AS delivered
            FROM movements
            WHERE ($1::BIGINT IS NULL OR client_id = $1)
            GROUP BY client_id, commodity_code, LOWER(variety)
            ORDER BY client_id, commodity_code, MIN(variety)
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| StockBalance::new(r.client_id, r.commodity_code, r.variety, r.accepted, r.delivered))
            .collect())
    }
}
