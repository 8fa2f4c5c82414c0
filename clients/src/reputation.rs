//! Uptime / reputation provider client.
//!
//! `GET {base}/accounts/{id}` returns the provider's view of a
//! representative. A 404 means the provider does not know it.

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use repwatch_monitor::{ReputationSource, SourceError, UptimeRecord};
use repwatch_types::{RepAddress, Timestamp};

use crate::ClientError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct ReputationClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Default, Deserialize)]
struct UptimeOver {
    #[serde(default)]
    day: f64,
    #[serde(default)]
    week: f64,
    #[serde(default)]
    month: f64,
}

#[derive(Debug, Deserialize)]
struct Donation {
    account: Option<RepAddress>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    #[serde(default)]
    account: Option<RepAddress>,
    #[serde(default, rename = "uptime_over")]
    uptime_over: UptimeOver,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    last_voted: Option<String>,
    #[serde(default)]
    closing: bool,
    #[serde(default)]
    alias: Option<String>,
    #[serde(default)]
    donation: Option<Donation>,
}

impl ReputationClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Setup(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Reputation of `account`, `None` if the provider does not know it.
    pub async fn account(&self, account: &RepAddress) -> Result<Option<UptimeRecord>, ClientError> {
        let url = format!("{}/accounts/{}", self.base_url.trim_end_matches('/'), account);
        debug!(%url, "fetching representative reputation");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(ClientError::from_transport)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ClientError::RequestFailed(format!(
                "HTTP status {}",
                response.status()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("failed to parse reputation: {e}")))?;
        parse_account(account, body).map(Some)
    }
}

#[async_trait]
impl ReputationSource for ReputationClient {
    async fn account_reputation(
        &self,
        account: &RepAddress,
    ) -> Result<Option<UptimeRecord>, SourceError> {
        Ok(self.account(account).await?)
    }
}

fn parse_account(requested: &RepAddress, body: serde_json::Value) -> Result<UptimeRecord, ClientError> {
    let resp: AccountResponse = serde_json::from_value(body)
        .map_err(|e| ClientError::InvalidResponse(format!("failed to parse reputation: {e}")))?;

    let last_voted_at = resp
        .last_voted
        .as_deref()
        .map(parse_last_voted)
        .transpose()?;

    Ok(UptimeRecord {
        id: resp.account.unwrap_or_else(|| requested.clone()),
        daily_pct: resp.uptime_over.day,
        weekly_pct: resp.uptime_over.week,
        monthly_pct: resp.uptime_over.month,
        score: resp.score,
        last_voted_at,
        closing: resp.closing,
        donation_address: resp.donation.and_then(|d| d.account),
        alias: resp.alias.filter(|a| !a.trim().is_empty()),
    })
}

/// RFC 3339 to epoch seconds. Dates before the epoch read as the epoch.
fn parse_last_voted(raw: &str) -> Result<Timestamp, ClientError> {
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map_err(|e| ClientError::InvalidResponse(format!("invalid lastVoted {raw:?}: {e}")))?;
    Ok(Timestamp::new(u64::try_from(parsed.timestamp()).unwrap_or(0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rep() -> RepAddress {
        RepAddress::new("ban_1hootubxy68fhhrctjmaias148tz91tsse3pq1pgmfedsm3cubhobuihqnxd")
    }

    #[test]
    fn parses_full_record() {
        let record = parse_account(
            &rep(),
            json!({
                "account": rep(),
                "alias": "Hoot",
                "uptime_over": { "day": 100, "week": 98.5, "month": 97.25 },
                "score": 91,
                "lastVoted": "2023-11-14T22:13:20.000Z",
                "closing": false,
                "donation": { "account": "ban_1donate" },
                "votingweight": 123
            }),
        )
        .unwrap();

        assert_eq!(record.id, rep());
        assert_eq!(record.alias.as_deref(), Some("Hoot"));
        assert_eq!(record.daily_pct, 100.0);
        assert_eq!(record.weekly_pct, 98.5);
        assert_eq!(record.monthly_pct, 97.25);
        assert_eq!(record.score, 91.0);
        assert_eq!(record.last_voted_at, Some(Timestamp::new(1_700_000_000)));
        assert!(!record.closing);
        assert_eq!(record.donation_address, Some(RepAddress::new("ban_1donate")));
    }

    #[test]
    fn missing_fields_default() {
        let record = parse_account(&rep(), json!({ "closing": true, "alias": "  " })).unwrap();
        assert_eq!(record.id, rep());
        assert!(record.closing);
        assert_eq!(record.weekly_pct, 0.0);
        assert_eq!(record.last_voted_at, None);
        assert_eq!(record.alias, None);
        assert_eq!(record.donation_address, None);
    }

    #[test]
    fn offset_dates_are_converted_to_utc() {
        assert_eq!(
            parse_last_voted("2023-11-15T00:13:20+02:00").unwrap(),
            Timestamp::new(1_700_000_000)
        );
        assert_eq!(parse_last_voted("1960-01-01T00:00:00Z").unwrap(), Timestamp::EPOCH);
    }

    #[test]
    fn bad_date_is_invalid_response() {
        let err = parse_account(&rep(), json!({ "lastVoted": "yesterday" })).unwrap_err();
        assert!(matches!(err, ClientError::InvalidResponse(_)));
    }

    #[test]
    fn wrong_types_are_invalid_response() {
        let err = parse_account(&rep(), json!({ "uptime_over": "high" })).unwrap_err();
        assert!(matches!(err, ClientError::InvalidResponse(_)));
    }
}
