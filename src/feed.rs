use crate::config::FeedConfig;
use crate::constants::{AGENCY_SOURCE_TAG, MIRROR_SOURCE_TAG};
use crate::error::{MonitorError, Result};
use crate::normalize::{normalize_feed, normalize_list};
use crate::types::{CompositeData, DataSource, FeedData, FeedEnvelope, Quake, RawQuake};
use metrics::{counter, histogram};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Historical envelope published by the national agency's felt-report feed
#[derive(Debug, Deserialize)]
struct AgencyFeed {
    #[serde(rename = "Infogempa")]
    infogempa: AgencyInfo,
}

#[derive(Debug, Deserialize)]
struct AgencyInfo {
    #[serde(rename = "gempa")]
    gempa: Vec<RawQuake>,
}

/// Decode a mirror response body into the payload shape its selector mode
/// promises. The envelope's `status: false` is a logical failure even on
/// HTTP 200; its message becomes the error detail when present.
fn decode_mirror_payload(source: DataSource, body: &str) -> Result<FeedData> {
    fn check<T>(envelope: FeedEnvelope<T>) -> Result<T> {
        if !envelope.status {
            let message = if envelope.message.is_empty() {
                "API returned unsuccessful status".to_string()
            } else {
                envelope.message
            };
            return Err(MonitorError::Feed { message });
        }
        Ok(envelope.data)
    }

    match source {
        DataSource::Latest => {
            let envelope: FeedEnvelope<RawQuake> = serde_json::from_str(body)?;
            Ok(FeedData::Single(check(envelope)?))
        }
        DataSource::Latest15 | DataSource::Felt => {
            let envelope: FeedEnvelope<Vec<RawQuake>> = serde_json::from_str(body)?;
            Ok(FeedData::List(check(envelope)?))
        }
        DataSource::All => {
            let envelope: FeedEnvelope<CompositeData> = serde_json::from_str(body)?;
            Ok(FeedData::Composite(check(envelope)?))
        }
    }
}

fn decode_agency_payload(body: &str) -> Result<Vec<RawQuake>> {
    let feed: AgencyFeed = serde_json::from_str(body)?;
    Ok(feed.infogempa.gempa)
}

/// HTTP client over the earthquake feeds. One fetch call issues one request
/// against the endpoint matching the selector; only the felt mode carries a
/// fallback (the agency's historical feed, then the mirror).
pub struct FeedClient {
    client: reqwest::Client,
    config: FeedConfig,
}

impl FeedClient {
    pub fn new(config: FeedConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self { client, config })
    }

    fn mirror_endpoint(&self, source: DataSource) -> String {
        let base = self.config.mirror_base_url.trim_end_matches('/');
        let path = match source {
            DataSource::Latest => "latest",
            DataSource::Latest15 => "latest-15",
            DataSource::Felt => "felt",
            DataSource::All => "all",
        };
        format!("{}/{}", base, path)
    }

    async fn get_body(&self, url: &str) -> Result<String> {
        debug!("Fetching {}", url);
        let started = std::time::Instant::now();
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .header("Cache-Control", "no-cache")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        histogram!("gempa_fetch_duration_seconds").record(started.elapsed().as_secs_f64());
        histogram!("gempa_fetch_payload_bytes").record(body.len() as f64);

        if !status.is_success() {
            counter!("gempa_fetch_error_total").increment(1);
            return Err(MonitorError::Feed {
                message: format!("HTTP error {} from {}", status.as_u16(), url),
            });
        }
        counter!("gempa_fetch_success_total").increment(1);
        Ok(body)
    }

    /// One fetch-and-normalize cycle for the given selector. The felt mode
    /// falls back to the legacy path on any failure; no other mode retries.
    #[instrument(skip(self))]
    pub async fn fetch(&self, source: DataSource) -> Result<Vec<Quake>> {
        match self.fetch_mirror(source).await {
            Ok(quakes) => Ok(quakes),
            Err(e) if source == DataSource::Felt => {
                warn!("Felt fetch failed ({}), trying legacy endpoints", e);
                self.fetch_felt_legacy().await
            }
            Err(e) => Err(e),
        }
    }

    async fn fetch_mirror(&self, source: DataSource) -> Result<Vec<Quake>> {
        let url = self.mirror_endpoint(source);
        let body = self.get_body(&url).await?;
        let data = decode_mirror_payload(source, &body)?;
        let quakes = normalize_feed(MIRROR_SOURCE_TAG, &data);
        info!(
            "Fetched {} record(s) from mirror source '{}'",
            quakes.len(),
            source
        );
        Ok(quakes)
    }

    /// Legacy felt-report path: the agency feed first, then the mirror felt
    /// endpoint; the last error propagates when every endpoint fails.
    #[instrument(skip(self))]
    pub async fn fetch_felt_legacy(&self) -> Result<Vec<Quake>> {
        let agency_result = self.fetch_agency_felt().await;
        match agency_result {
            Ok(quakes) => Ok(quakes),
            Err(agency_err) => {
                warn!(
                    "Agency felt feed failed ({}), falling back to mirror",
                    agency_err
                );
                match self.fetch_mirror_felt_raw().await {
                    Ok(quakes) => Ok(quakes),
                    Err(mirror_err) => {
                        warn!("Mirror felt fallback failed: {}", mirror_err);
                        Err(mirror_err)
                    }
                }
            }
        }
    }

    async fn fetch_agency_felt(&self) -> Result<Vec<Quake>> {
        let body = self.get_body(&self.config.agency_felt_url).await?;
        let raws = decode_agency_payload(&body)?;
        let quakes = normalize_list(AGENCY_SOURCE_TAG, &raws);
        info!("Fetched {} record(s) from agency felt feed", quakes.len());
        Ok(quakes)
    }

    async fn fetch_mirror_felt_raw(&self) -> Result<Vec<Quake>> {
        let url = self.mirror_endpoint(DataSource::Felt);
        let body = self.get_body(&url).await?;
        match decode_mirror_payload(DataSource::Felt, &body)? {
            FeedData::List(raws) => Ok(normalize_list(MIRROR_SOURCE_TAG, &raws)),
            _ => Err(MonitorError::Feed {
                message: "Unexpected payload shape from mirror felt endpoint".to_string(),
            }),
        }
    }
}
