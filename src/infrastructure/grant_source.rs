//! Delegation grant source - authorization backend lookup

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::shared::errors::GrantError;
use crate::shared::types::{DelegationGrant, RiskTolerance};

/// Authorization source consumed by the grant cache.
/// Implementations return the user's currently active grants, unordered;
/// selection of the newest grant happens in the cache.
#[async_trait]
pub trait GrantSource: Send + Sync {
    async fn fetch_grants(&self, user: &str) -> Result<Vec<DelegationGrant>, GrantError>;
}

/// Response envelope from the delegation backend
#[derive(Debug, Deserialize)]
struct DelegationsResponse {
    success: bool,
    data: Option<Vec<DelegationDto>>,
}

/// Single delegation record as the backend serializes it.
/// Numeric fields arrive as strings or numbers depending on the route, so
/// they are parsed leniently.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DelegationDto {
    #[serde(default)]
    max_amount: Option<Value>,
    #[serde(default)]
    expiry: Option<String>,
    #[serde(default)]
    allowed_pools: Vec<String>,
    #[serde(default)]
    risk_tolerance: Option<String>,
    #[serde(default)]
    daily_limit: Option<Value>,
    #[serde(default)]
    transaction_limit: Option<Value>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

/// HTTP-backed grant source hitting `GET {base}/api/delegations/{user}`
pub struct HttpGrantSource {
    base_url: String,
    client: Client,
}

impl HttpGrantSource {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl GrantSource for HttpGrantSource {
    async fn fetch_grants(&self, user: &str) -> Result<Vec<DelegationGrant>, GrantError> {
        let url = format!("{}/api/delegations/{}", self.base_url, user);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GrantError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GrantError::Backend(format!(
                "delegation lookup returned {}",
                response.status()
            )));
        }

        let body: DelegationsResponse = response
            .json()
            .await
            .map_err(|e| GrantError::InvalidGrant(e.to_string()))?;

        if !body.success {
            return Err(GrantError::Backend("delegation lookup unsuccessful".to_string()));
        }

        let grants = body
            .data
            .unwrap_or_default()
            .into_iter()
            .filter(|dto| dto.status.as_deref() == Some("active"))
            .filter_map(|dto| match dto.into_grant(user) {
                Ok(grant) => Some(grant),
                Err(e) => {
                    warn!(user, error = %e, "Skipping malformed delegation record");
                    None
                }
            })
            .collect();

        Ok(grants)
    }
}

impl DelegationDto {
    fn into_grant(self, user: &str) -> Result<DelegationGrant, GrantError> {
        let expiry = parse_timestamp(self.expiry.as_deref())
            .ok_or_else(|| GrantError::InvalidGrant("missing or unparseable expiry".to_string()))?;
        let issued_at = parse_timestamp(self.created_at.as_deref()).unwrap_or_else(Utc::now);

        Ok(DelegationGrant {
            user: user.to_string(),
            max_amount: parse_numeric(self.max_amount.as_ref()).unwrap_or(0.0),
            allowed_pools: self.allowed_pools,
            expiry,
            risk_tolerance: parse_risk_tolerance(self.risk_tolerance.as_deref()),
            daily_limit: parse_numeric(self.daily_limit.as_ref()).filter(|v| *v > 0.0),
            transaction_limit: parse_numeric(self.transaction_limit.as_ref())
                .filter(|v| *v > 0.0)
                .map(|v| v as u32),
            issued_at,
        })
    }
}

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_numeric(raw: Option<&Value>) -> Option<f64> {
    match raw {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    }
}

fn parse_risk_tolerance(raw: Option<&str>) -> RiskTolerance {
    match raw {
        Some("low") => RiskTolerance::Low,
        Some("high") => RiskTolerance::High,
        _ => RiskTolerance::Medium,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dto_conversion_with_string_numerics() {
        let dto: DelegationDto = serde_json::from_value(serde_json::json!({
            "maxAmount": "2.5",
            "expiry": "2030-01-01T00:00:00Z",
            "allowedPools": ["pool-a"],
            "riskTolerance": "low",
            "dailyLimit": 1.0,
            "transactionLimit": "10",
            "status": "active",
            "createdAt": "2026-01-01T00:00:00Z"
        }))
        .unwrap();

        let grant = dto.into_grant("alice").unwrap();
        assert_eq!(grant.max_amount, 2.5);
        assert_eq!(grant.daily_limit, Some(1.0));
        assert_eq!(grant.transaction_limit, Some(10));
        assert_eq!(grant.risk_tolerance, RiskTolerance::Low);
        assert_eq!(grant.user, "alice");
    }

    #[test]
    fn test_absent_limits_map_to_none() {
        let dto: DelegationDto = serde_json::from_value(serde_json::json!({
            "maxAmount": 5,
            "expiry": "2030-01-01T00:00:00Z",
            "status": "active"
        }))
        .unwrap();

        let grant = dto.into_grant("alice").unwrap();
        assert_eq!(grant.daily_limit, None);
        assert_eq!(grant.transaction_limit, None);
        // unknown tolerance defaults to medium
        assert_eq!(grant.risk_tolerance, RiskTolerance::Medium);
    }

    #[test]
    fn test_unparseable_expiry_is_rejected() {
        let dto: DelegationDto = serde_json::from_value(serde_json::json!({
            "maxAmount": 5,
            "expiry": "tomorrow",
            "status": "active"
        }))
        .unwrap();

        assert!(dto.into_grant("alice").is_err());
    }
}
