//! Client registry service: farmers and traders who store goods

use sqlx::{FromRow, PgPool};

use crate::error::{AppError, AppResult};
use crate::models::{Client, ClientInput, ClientType};
use shared::validation::{validate_client_input, ClientWrite};

/// Client registry service
#[derive(Clone)]
pub struct ClientService {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct ClientRow {
    id: i64,
    client_type: String,
    first_name: String,
    last_name: String,
    org_name: String,
    s_o: Option<String>,
    address: Option<String>,
    village: Option<String>,
    mandal: Option<String>,
    district: Option<String>,
    state: Option<String>,
    city: Option<String>,
    pincode: Option<String>,
    phone: String,
    alt_phone: Option<String>,
    email: Option<String>,
}

impl TryFrom<ClientRow> for Client {
    type Error = AppError;

    fn try_from(row: ClientRow) -> AppResult<Self> {
        let client_type: ClientType = row.client_type.parse().map_err(|_| {
            AppError::Internal(format!(
                "Client {} has unknown type '{}'",
                row.id, row.client_type
            ))
        })?;

        Ok(Client {
            id: row.id,
            client_type,
            first_name: row.first_name,
            last_name: row.last_name,
            org_name: row.org_name,
            s_o: row.s_o,
            address: row.address,
            village: row.village,
            mandal: row.mandal,
            district: row.district,
            state: row.state,
            city: row.city,
            pincode: row.pincode,
            phone: row.phone,
            alt_phone: row.alt_phone,
            email: row.email,
        })
    }
}

const CLIENT_COLUMNS: &str = "id, client_type, first_name, last_name, org_name, s_o, address, \
     village, mandal, district, state, city, pincode, phone, alt_phone, email";

/// Escape `%`, `_` and `\` so user text matches literally inside ILIKE
pub fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// The client as it will be stored after `update`, normalized.
///
/// Takes the raw update so a field sent as blank clears the stored value.
pub fn merge_update(existing: Client, update: ClientInput) -> ClientInput {
    update.overlaid_on(existing).normalized()
}

fn required(value: Option<String>, field: &'static str) -> AppResult<String> {
    value.ok_or_else(|| AppError::Validation {
        field: field.to_string(),
        message: format!("Missing fields: {}", field),
    })
}

impl ClientService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// All clients, oldest first
    pub async fn list_clients(&self) -> AppResult<Vec<Client>> {
        let rows = sqlx::query_as::<_, ClientRow>(&format!(
            "SELECT {} FROM clients ORDER BY id",
            CLIENT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(Client::try_from).collect()
    }

    pub async fn get_client(&self, client_id: i64) -> AppResult<Client> {
        let row = sqlx::query_as::<_, ClientRow>(&format!(
            "SELECT {} FROM clients WHERE id = $1",
            CLIENT_COLUMNS
        ))
        .bind(client_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Client".to_string()))?;

        Client::try_from(row)
    }

    /// Case-insensitive substring search over names, parentage, village,
    /// mandal and phone. A blank query matches nothing.
    pub async fn search_clients(&self, query: &str) -> AppResult<Vec<Client>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, ClientRow>(&format!(
            r#"
            SELECT {}
            FROM clients
            WHERE first_name ILIKE $1
               OR last_name ILIKE $1
               OR s_o ILIKE $1
               OR org_name ILIKE $1
               OR village ILIKE $1
               OR mandal ILIKE $1
               OR phone ILIKE $1
            ORDER BY id
            "#,
            CLIENT_COLUMNS
        ))
        .bind(like_pattern(query))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(Client::try_from).collect()
    }

    /// Reject a client that collides with another on phone, email, full
    /// name or organisation name
    async fn check_duplicates(&self, input: &ClientInput, exclude_id: Option<i64>) -> AppResult<()> {
        let exclude_id = exclude_id.unwrap_or(0);

        let phone_taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM clients WHERE phone = $1 AND id <> $2)",
        )
        .bind(&input.phone)
        .bind(exclude_id)
        .fetch_one(&self.db)
        .await?;
        if phone_taken {
            return Err(AppError::DuplicateEntry("Phone number already exists.".to_string()));
        }

        if let Some(email) = &input.email {
            let email_taken = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM clients WHERE LOWER(email) = LOWER($1) AND id <> $2)",
            )
            .bind(email)
            .bind(exclude_id)
            .fetch_one(&self.db)
            .await?;
            if email_taken {
                return Err(AppError::DuplicateEntry(
                    "Email address already exists.".to_string(),
                ));
            }
        }

        let name_taken = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM clients
                WHERE LOWER(first_name) = LOWER($1) AND LOWER(last_name) = LOWER($2) AND id <> $3
            )
            "#,
        )
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(exclude_id)
        .fetch_one(&self.db)
        .await?;
        if name_taken {
            return Err(AppError::DuplicateEntry(
                "Client with this first and last name already exists.".to_string(),
            ));
        }

        if let Some(org_name) = &input.org_name {
            let org_taken = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM clients WHERE LOWER(org_name) = LOWER($1) AND id <> $2)",
            )
            .bind(org_name)
            .bind(exclude_id)
            .fetch_one(&self.db)
            .await?;
            if org_taken {
                return Err(AppError::DuplicateEntry(
                    "Client with this organization name already exists.".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Register a new client
    pub async fn create_client(&self, input: ClientInput) -> AppResult<Client> {
        let input = input.normalized();
        validate_client_input(&input, ClientWrite::Create)?;
        self.check_duplicates(&input, None).await?;

        let client_type = input
            .client_type
            .ok_or_else(|| AppError::Validation {
                field: "client_type".to_string(),
                message: "Missing fields: client_type".to_string(),
            })?;

        let row = sqlx::query_as::<_, ClientRow>(&format!(
            r#"
            INSERT INTO clients (
                client_type, first_name, last_name, org_name, s_o, address, village,
                mandal, district, state, city, pincode, phone, alt_phone, email
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {}
            "#,
            CLIENT_COLUMNS
        ))
        .bind(client_type.as_str())
        .bind(required(input.first_name, "first_name")?)
        .bind(required(input.last_name, "last_name")?)
        .bind(required(input.org_name, "org_name")?)
        .bind(input.s_o)
        .bind(input.address)
        .bind(input.village)
        .bind(input.mandal)
        .bind(input.district)
        .bind(input.state)
        .bind(input.city)
        .bind(input.pincode)
        .bind(required(input.phone, "phone")?)
        .bind(input.alt_phone)
        .bind(input.email)
        .fetch_one(&self.db)
        .await?;

        let client = Client::try_from(row)?;
        tracing::info!(client_id = client.id, client_type = %client.client_type, "Client created");
        Ok(client)
    }

    /// Apply the supplied fields to an existing client
    pub async fn update_client(&self, client_id: i64, update: ClientInput) -> AppResult<Client> {
        validate_client_input(&update.clone().normalized(), ClientWrite::Update)?;

        let existing = self.get_client(client_id).await?;
        let merged = merge_update(existing, update);
        validate_client_input(&merged, ClientWrite::Create)?;
        self.check_duplicates(&merged, Some(client_id)).await?;

        let client_type = merged.client_type.unwrap_or(ClientType::Farmer);

        let row = sqlx::query_as::<_, ClientRow>(&format!(
            r#"
            UPDATE clients SET
                client_type = $2, first_name = $3, last_name = $4, org_name = $5, s_o = $6,
                address = $7, village = $8, mandal = $9, district = $10, state = $11,
                city = $12, pincode = $13, phone = $14, alt_phone = $15, email = $16,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CLIENT_COLUMNS
        ))
        .bind(client_id)
        .bind(client_type.as_str())
        .bind(required(merged.first_name, "first_name")?)
        .bind(required(merged.last_name, "last_name")?)
        .bind(required(merged.org_name, "org_name")?)
        .bind(merged.s_o)
        .bind(merged.address)
        .bind(merged.village)
        .bind(merged.mandal)
        .bind(merged.district)
        .bind(merged.state)
        .bind(merged.city)
        .bind(merged.pincode)
        .bind(required(merged.phone, "phone")?)
        .bind(merged.alt_phone)
        .bind(merged.email)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Client".to_string()))?;

        tracing::info!(client_id, "Client updated");
        Client::try_from(row)
    }

    /// Remove a client; clients with recorded stock cannot be removed
    pub async fn delete_client(&self, client_id: i64) -> AppResult<()> {
        let has_stock = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM stock_acceptances WHERE client_id = $1)
                OR EXISTS(SELECT 1 FROM stock_deliveries WHERE client_id = $1)
            "#,
        )
        .bind(client_id)
        .fetch_one(&self.db)
        .await?;

        if has_stock {
            return Err(AppError::Conflict(
                "Client has recorded stock movements and cannot be deleted".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(client_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Client".to_string()));
        }

        tracing::info!(client_id, "Client deleted");
        Ok(())
    }
}
