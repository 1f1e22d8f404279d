//! Stock acceptance and delivery models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `POST /stocks/accept` payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AcceptStockInput {
    pub client_id: i64,
    /// Derived from the commodity and variety names, e.g. "WHE-SHA"
    pub commodity_code: String,
    pub variety: String,
    pub grade: String,
    pub quantity: Decimal,
}

/// `POST /stocks/deliver` payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeliverStockInput {
    pub client_id: i64,
    /// Selected from the catalog entry list, never derived client-side
    pub commodity_code: String,
    pub variety: String,
    pub quantity: Decimal,
}

/// A recorded inbound movement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StockAcceptance {
    pub id: i64,
    /// Receipt number handed to the client
    pub reference: Uuid,
    pub client_id: i64,
    pub commodity_code: String,
    pub variety: String,
    pub grade: String,
    pub quantity: Decimal,
    pub accepted_by: String,
    pub created_at: DateTime<Utc>,
}

/// A recorded outbound movement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StockDelivery {
    pub id: i64,
    pub reference: Uuid,
    pub client_id: i64,
    pub commodity_code: String,
    pub variety: String,
    pub quantity: Decimal,
    pub delivered_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptStockResponse {
    pub message: String,
    pub acceptance: StockAcceptance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliverStockResponse {
    pub message: String,
    pub delivery: StockDelivery,
}

/// Stock held for one client, per commodity code and variety
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StockBalance {
    pub client_id: i64,
    pub commodity_code: String,
    pub variety: String,
    pub accepted: Decimal,
    pub delivered: Decimal,
    pub balance: Decimal,
}

impl StockBalance {
    pub fn new(
        client_id: i64,
        commodity_code: String,
        variety: String,
        accepted: Decimal,
        delivered: Decimal,
    ) -> Self {
        Self {
            client_id,
            commodity_code,
            variety,
            accepted,
            delivered,
            balance: accepted - delivered,
        }
    }

    /// Whether `quantity` can be delivered out of this balance
    pub fn covers(&self, quantity: Decimal) -> bool {
        quantity <= self.balance
    }
}

/// Optional `?client_id=` filter on stock listings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockQuery {
    #[serde(default)]
    pub client_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_balance_is_accepted_minus_delivered() {
        let balance = StockBalance::new(
            7,
            "WHE-SHA".to_string(),
            "Sharbati".to_string(),
            dec("120.5"),
            dec("20.25"),
        );
        assert_eq!(balance.balance, dec("100.25"));
        assert!(balance.covers(dec("100.25")));
        assert!(!balance.covers(dec("100.26")));
    }

    #[test]
    fn test_quantity_accepts_string_or_number() {
        let from_str: DeliverStockInput = serde_json::from_str(
            r#"{"client_id":1,"commodity_code":"CHI-TEJ","variety":"Teja","quantity":"12.5"}"#,
        )
        .unwrap();
        let from_num: DeliverStockInput = serde_json::from_str(
            r#"{"client_id":1,"commodity_code":"CHI-TEJ","variety":"Teja","quantity":12.5}"#,
        )
        .unwrap();
        assert_eq!(from_str.quantity, dec("12.5"));
        assert_eq!(from_num.quantity, dec("12.5"));
    }
}
