use crate::config::SheetsConfig;
use crate::domain::model::{CleanTable, COLUMNS};
use crate::domain::ports::Sink;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

#[derive(Debug, Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    token_uri: String,
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Writes the cleaned table into a spreadsheet starting at A1, header row
/// first, every cell serialized as text. Authenticates with a
/// service-account keyfile via the JWT bearer flow.
pub struct SheetsSink {
    config: SheetsConfig,
    client: Client,
}

impl SheetsSink {
    pub fn new(config: SheetsConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    async fn access_token(&self, key: &ServiceAccountKey) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: &key.client_email,
            scope: SHEETS_SCOPE,
            aud: &key.token_uri,
            iat: now,
            exp: now + 3600,
        };

        let assertion = jsonwebtoken::encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &EncodingKey::from_rsa_pem(key.private_key.as_bytes())?,
        )?;

        let response = self
            .client
            .post(&key.token_uri)
            .form(&[
                ("grant_type", JWT_BEARER_GRANT),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }
}

/// Header row plus one row per record, all values as text.
pub fn sheet_values(table: &CleanTable) -> Vec<Vec<String>> {
    let mut values = Vec::with_capacity(table.len() + 1);
    values.push(COLUMNS.iter().map(|c| c.to_string()).collect());
    for record in table {
        values.push(vec![
            record.title.clone(),
            record.price.to_string(),
            record.rating.to_string(),
            record.colors.to_string(),
            record.size.clone(),
            record.gender.clone(),
            record.timestamp.clone(),
        ]);
    }
    values
}

#[async_trait]
impl Sink for SheetsSink {
    fn name(&self) -> &str {
        "sheets"
    }

    async fn write(&self, table: &CleanTable) -> Result<()> {
        let raw_key = std::fs::read_to_string(&self.config.keyfile)?;
        let key: ServiceAccountKey = serde_json::from_str(&raw_key)
            .map_err(|e| EtlError::sheets(format!("invalid service-account keyfile: {e}")))?;

        let token = self.access_token(&key).await?;

        let url = format!(
            "https://sheets.googleapis.com/v4/spreadsheets/{}/values/{}!A1?valueInputOption=RAW",
            self.config.spreadsheet_id, self.config.sheet_name
        );
        let body = serde_json::json!({
            "range": format!("{}!A1", self.config.sheet_name),
            "majorDimension": "ROWS",
            "values": sheet_values(table),
        });

        self.client
            .put(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        tracing::info!(
            spreadsheet = %self.config.spreadsheet_id,
            rows = table.len(),
            "Sheet updated"
        );
        Ok(())
    }
}
