//! Pool metrics source - market data backend lookup

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::shared::errors::MetricsError;
use crate::shared::types::PoolMetrics;

/// Market-data source consumed by the rebalance service.
/// Metrics are assumed to be internally consistent snapshots.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    async fn fetch_pool_metrics(&self, pool_ids: &[String]) -> Result<Vec<PoolMetrics>, MetricsError>;
}

#[derive(Debug, Deserialize)]
struct PoolsResponse {
    success: bool,
    data: Option<Vec<PoolDto>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PoolDto {
    address: String,
    name: String,
    apy: f64,
    tvl: f64,
    #[serde(default)]
    volume_24h: f64,
    #[serde(default)]
    risk_score: f64,
    #[serde(default)]
    liquidity_depth: f64,
    #[serde(default)]
    volatility: f64,
}

impl From<PoolDto> for PoolMetrics {
    fn from(dto: PoolDto) -> Self {
        PoolMetrics {
            id: dto.address,
            name: dto.name,
            yield_rate: dto.apy,
            tvl: dto.tvl,
            volume_24h: dto.volume_24h,
            risk_score: dto.risk_score,
            liquidity_depth: dto.liquidity_depth,
            volatility: dto.volatility,
        }
    }
}

/// HTTP-backed metrics source hitting `GET {base}/api/pools`
pub struct HttpMetricsSource {
    base_url: String,
    client: Client,
}

impl HttpMetricsSource {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl MetricsSource for HttpMetricsSource {
    async fn fetch_pool_metrics(&self, pool_ids: &[String]) -> Result<Vec<PoolMetrics>, MetricsError> {
        let url = format!("{}/api/pools", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("ids", pool_ids.join(","))])
            .send()
            .await
            .map_err(|e| MetricsError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MetricsError::Backend(format!(
                "pool metrics lookup returned {}",
                response.status()
            )));
        }

        let body: PoolsResponse = response
            .json()
            .await
            .map_err(|e| MetricsError::Backend(e.to_string()))?;

        if !body.success {
            return Err(MetricsError::Backend("pool metrics lookup unsuccessful".to_string()));
        }

        Ok(body
            .data
            .unwrap_or_default()
            .into_iter()
            .map(PoolMetrics::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_dto_maps_to_metrics() {
        let dto: PoolDto = serde_json::from_value(serde_json::json!({
            "address": "pool-a",
            "name": "Aave USDC",
            "apy": 8.2,
            "tvl": 2_000_000.0,
            "volume24h": 150_000.0,
            "riskScore": 0.15
        }))
        .unwrap();

        let metrics = PoolMetrics::from(dto);
        assert_eq!(metrics.id, "pool-a");
        assert_eq!(metrics.yield_rate, 8.2);
        assert_eq!(metrics.volume_24h, 150_000.0);
        // optional scores default to zero
        assert_eq!(metrics.liquidity_depth, 0.0);
    }
}
