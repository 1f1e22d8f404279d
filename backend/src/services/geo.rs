//! Geography service: state list and state → city lookup

use crate::error::{AppError, AppResult};
use crate::external::{GeoClient, GeoState};

/// Geography service backed by the CountryStateCity API
#[derive(Clone)]
pub struct GeoService {
    client: GeoClient,
}

/// Resolve a state ISO2 code or a state name to the ISO2 code.
///
/// Codes match case-insensitively; names match case-insensitively after
/// trimming. Returns `None` when nothing matches.
pub fn resolve_state_code(states: &[GeoState], state: &str) -> Option<String> {
    let wanted = state.trim();
    if wanted.is_empty() {
        return None;
    }

    states
        .iter()
        .find(|s| s.iso2.eq_ignore_ascii_case(wanted))
        .or_else(|| {
            states
                .iter()
                .find(|s| s.name.to_lowercase() == wanted.to_lowercase())
        })
        .map(|s| s.iso2.clone())
}

impl GeoService {
    pub fn new(client: GeoClient) -> Self {
        Self { client }
    }

    /// State names
    pub async fn list_states(&self) -> AppResult<Vec<String>> {
        let states = self.client.states().await?;
        Ok(states.into_iter().map(|s| s.name).collect())
    }

    /// City names for a state given by ISO2 code or name
    pub async fn list_cities(&self, state: &str) -> AppResult<Vec<String>> {
        if state.trim().is_empty() {
            return Err(AppError::Validation {
                field: "state_code".to_string(),
                message: "state_code is required".to_string(),
            });
        }

        let states = self.client.states().await?;
        let code = resolve_state_code(&states, state)
            .ok_or_else(|| AppError::NotFound(format!("State '{}'", state.trim())))?;

        tracing::debug!(state = %state, code = %code, "Fetching cities");
        self.client.cities(&code).await
    }
}
