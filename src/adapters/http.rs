use crate::utils::error::{Result, TrackError};
use reqwest::{Client, Response};
use std::time::Duration;
use url::Url;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) \
                                      AppleWebKit/537.36 (KHTML, like Gecko) \
                                      Chrome/131.0.0.0 Safari/537.36";

/// Settings shared by every courier request.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// 所有快遞共用一個 client，連線池與逾時設定一致
pub fn build_client(settings: &HttpSettings) -> Result<Client> {
    let client = Client::builder()
        .timeout(settings.timeout)
        .user_agent(settings.user_agent.as_str())
        .build()?;
    Ok(client)
}

/// Appends path segments to a base URL, percent-encoding each one.
pub(crate) fn endpoint(base_url: &str, segments: &[&str]) -> Result<Url> {
    let invalid = |reason: String| TrackError::InvalidConfigValueError {
        field: "base_url".to_string(),
        value: base_url.to_string(),
        reason,
    };

    let mut url = Url::parse(base_url).map_err(|e| invalid(format!("Invalid URL format: {}", e)))?;
    url.path_segments_mut()
        .map_err(|_| invalid("URL cannot be used as a base".to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

pub(crate) fn ensure_success(courier: &str, response: Response) -> Result<Response> {
    let status = response.status();
    tracing::debug!("{} response status: {}", courier, status);

    if !status.is_success() {
        return Err(TrackError::HttpStatus {
            courier: courier.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response)
}

#[cfg(test)]
pub(crate) fn test_client() -> Client {
    build_client(&HttpSettings {
        timeout: Duration::from_secs(2),
        user_agent: "parcel-track-tests".to_string(),
    })
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_appends_segments() {
        let url = endpoint("https://api.acscourier.net", &["api", "parcels", "search", "1234567890"]).unwrap();
        assert_eq!(url.as_str(), "https://api.acscourier.net/api/parcels/search/1234567890");
    }

    #[test]
    fn test_endpoint_handles_trailing_slash_and_encoding() {
        let url = endpoint("http://127.0.0.1:9000/", &["track", "SL 12/34.json"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/track/SL%2012%2F34.json");
    }

    #[test]
    fn test_endpoint_rejects_invalid_base() {
        assert!(endpoint("not a url", &["x"]).is_err());
    }

    #[test]
    fn test_default_settings() {
        let settings = HttpSettings::default();
        assert_eq!(settings.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(build_client(&settings).is_ok());
    }
}
