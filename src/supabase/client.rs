// src/supabase/client.rs
//! Thin PostgREST client for the staking tables

use reqwest::{Client as HttpClient, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::config::SupabaseConfig;
use crate::storage::StoreError;
use crate::supabase::types::{PayoutRecord, StakeRecord, UserRecord};

type Result<T> = std::result::Result<T, StoreError>;

const STAKES_TABLE: &str = "stakes";
const USERS_TABLE: &str = "users";
const PAYOUTS_TABLE: &str = "payouts";

pub struct SupabaseClient {
    base_url: String,
    api_key: String,
    http_client: HttpClient,
}

impl SupabaseClient {
    pub fn new(config: &SupabaseConfig) -> Self {
        Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.anon_key.clone(),
            http_client: HttpClient::new(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    /// Insert a stake row and return it as stored, with `id` filled in
    pub async fn insert_stake(&self, record: &StakeRecord) -> Result<StakeRecord> {
        let request = self
            .authorized(self.http_client.post(self.table_url(STAKES_TABLE)))
            .header("Prefer", "return=representation")
            .json(record);

        let response = check_status(request.send().await?).await?;

        // The row is committed from here on
        let text = response
            .text()
            .await
            .map_err(|e| StoreError::Unconfirmed(format!("insert response unreadable: {}", e)))?;
        let rows: Vec<StakeRecord> = serde_json::from_str(&text)
            .map_err(|e| StoreError::Unconfirmed(format!("insert response malformed: {}", e)))?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Unconfirmed("insert returned no rows".to_string()))
    }

    /// Unclaimed stakes for a wallet, newest first
    pub async fn select_active_stakes(&self, wallet: &str) -> Result<Vec<StakeRecord>> {
        let request = self
            .authorized(self.http_client.get(self.table_url(STAKES_TABLE)))
            .query(&[
                ("select", "*".to_string()),
                ("wallet_address", format!("eq.{}", wallet)),
                ("claimed", "eq.false".to_string()),
                ("order", "created_at.desc".to_string()),
            ]);

        read_rows(request.send().await?).await
    }

    /// Flip `claimed` on one row. Returns the rows that matched.
    pub async fn mark_stake_claimed(&self, row_id: i64, wallet: &str) -> Result<Vec<StakeRecord>> {
        let request = self
            .authorized(self.http_client.patch(self.table_url(STAKES_TABLE)))
            .header("Prefer", "return=representation")
            .query(&[
                ("id", format!("eq.{}", row_id)),
                ("wallet_address", format!("eq.{}", wallet)),
            ])
            .json(&json!({ "claimed": true }));

        read_rows(request.send().await?).await
    }

    /// Create or update the wallet's `users` rollup row
    pub async fn upsert_user_total_staked(&self, wallet: &str, total_staked: f64) -> Result<()> {
        let request = self
            .authorized(self.http_client.post(self.table_url(USERS_TABLE)))
            .header("Prefer", "resolution=merge-duplicates")
            .query(&[("on_conflict", "wallet_address")])
            .json(&json!({
                "wallet_address": wallet,
                "total_staked": total_staked,
            }));

        let response = request.send().await?;
        check_status(response).await.map(|_| ())
    }

    pub async fn select_user(&self, wallet: &str) -> Result<Option<UserRecord>> {
        let request = self
            .authorized(self.http_client.get(self.table_url(USERS_TABLE)))
            .query(&[
                ("select", "*".to_string()),
                ("wallet_address", format!("eq.{}", wallet)),
                ("limit", "1".to_string()),
            ]);

        let rows: Vec<UserRecord> = read_rows(request.send().await?).await?;
        Ok(rows.into_iter().next())
    }

    /// Most recent payouts first
    pub async fn select_payouts(&self, wallet: &str, limit: usize) -> Result<Vec<PayoutRecord>> {
        let request = self
            .authorized(self.http_client.get(self.table_url(PAYOUTS_TABLE)))
            .query(&[
                ("select", "*".to_string()),
                ("wallet_address", format!("eq.{}", wallet)),
                ("order", "created_at.desc".to_string()),
                ("limit", limit.to_string()),
            ]);

        read_rows(request.send().await?).await
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn read_rows<T: DeserializeOwned>(response: Response) -> Result<Vec<T>> {
    let response = check_status(response).await?;
    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(&text)?)
}
