use crate::cache::DiskCache;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::utils::{MAX_BODY_EXCERPT, truncate_body};
use reqwest::{Client, StatusCode};
use serde_json::{Map, Value};
use std::sync::Arc;
use url::Url;

/// HTTP fetcher that consults an optional disk cache before going to the network
pub struct Fetcher {
    client: Client,
    cache: Option<Arc<DiskCache>>,
}

impl Fetcher {
    /// Create a fetcher. Passing `None` for `cache` disables caching entirely.
    pub fn new(config: &ClientConfig, cache: Option<Arc<DiskCache>>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(config.connect_timeout())
            .timeout(config.read_timeout())
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client, cache })
    }

    /// The injected cache, if caching is enabled
    pub fn cache(&self) -> Option<&DiskCache> {
        self.cache.as_deref()
    }

    /// Fetch the body at `url` as text.
    ///
    /// The cache is used only when it is configured and `allow_cache` is set.
    /// A hit returns without touching the network; otherwise exactly one GET
    /// is issued and a successful body is stored before being returned.
    pub async fn fetch_raw(&self, url: &Url, allow_cache: bool) -> Result<String> {
        let key = url.as_str();
        let cache = self.cache.as_deref().filter(|_| allow_cache);

        if let Some(cache) = cache {
            if let Some(body) = cache.get(key) {
                return Ok(body);
            }
        }

        ::log::debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| Error::Network {
                url: key.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            if status == StatusCode::NOT_FOUND {
                return Err(Error::NotFound {
                    url: key.to_string(),
                });
            }
            return Err(Error::Api {
                message: format!("HTTP error {} for URL: {}", status, url),
                payload: None,
            });
        }

        let body = response.text().await.map_err(|source| Error::Network {
            url: key.to_string(),
            source,
        })?;
        if body.is_empty() {
            return Err(Error::EmptyBody {
                url: key.to_string(),
            });
        }

        ::log::info!("Fetched {} bytes from {}", body.len(), url);

        if let Some(cache) = cache {
            cache.put(key, &body);
        }

        Ok(body)
    }

    /// Fetch `url` and parse the body as a JSON object, checking for API error envelopes
    pub async fn fetch_json(&self, url: &Url) -> Result<Map<String, Value>> {
        let raw = self.fetch_raw(url, true).await?;
        parse_json_object(url, &raw)
    }

    /// Remove every entry from the injected cache.
    ///
    /// Returns `false` when there is no cache to clear.
    pub fn clear_cache(&self) -> bool {
        match &self.cache {
            Some(cache) => {
                cache.clear();
                true
            }
            None => {
                ::log::warn!("Caching is disabled; there is no cache to clear");
                false
            }
        }
    }
}

fn parse_json_object(url: &Url, raw: &str) -> Result<Map<String, Value>> {
    let not_json = || Error::NotJson {
        url: url.to_string(),
        body: truncate_body(raw, MAX_BODY_EXCERPT),
    };

    let object = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(object)) => object,
        Ok(_) | Err(_) => return Err(not_json()),
    };

    if let Some(error) = object.get("error").filter(|e| is_primitive(e)) {
        let message = match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let code = object.get("code").and_then(Value::as_i64).unwrap_or(-1);
        return Err(Error::Api {
            message: format!("API returned an error: {} (Code: {})", message, code),
            payload: Some(Value::Object(object)),
        });
    }

    if object.contains_key("error_code") {
        return Err(Error::Api {
            message: "API returned an error".to_string(),
            payload: Some(Value::Object(object)),
        });
    }

    Ok(object)
}

fn is_primitive(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path, query_param},
    };

    fn fetcher_with_cache(dir: &tempfile::TempDir) -> Fetcher {
        let cache = Arc::new(DiskCache::new(dir.path()));
        Fetcher::new(&ClientConfig::default(), Some(cache)).unwrap()
    }

    fn url(server: &MockServer, rest: &str) -> Url {
        Url::parse(&format!("{}{}", server.uri(), rest)).unwrap()
    }

    #[tokio::test]
    async fn test_second_fetch_is_served_from_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apiv2/"))
            .and(query_param("id", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>one</p>"))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let fetcher = fetcher_with_cache(&dir);
        let target = url(&server, "/apiv2/?m=storytext&id=1");

        let first = fetcher.fetch_raw(&target, true).await.unwrap();
        let second = fetcher.fetch_raw(&target, true).await.unwrap();
        assert_eq!(first, "<p>one</p>");
        assert_eq!(first, second);
        assert_eq!(
            fetcher.cache().unwrap().get(target.as_str()).as_deref(),
            Some("<p>one</p>")
        );
    }

    #[tokio::test]
    async fn test_clear_forces_network_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/text"))
            .respond_with(ResponseTemplate::new(200).set_body_string("body"))
            .expect(2)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let fetcher = fetcher_with_cache(&dir);
        let target = url(&server, "/text");

        fetcher.fetch_raw(&target, true).await.unwrap();
        assert!(fetcher.clear_cache());
        fetcher.fetch_raw(&target, true).await.unwrap();
    }

    #[tokio::test]
    async fn test_per_call_override_skips_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/text"))
            .respond_with(ResponseTemplate::new(200).set_body_string("fresh"))
            .expect(2)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let fetcher = fetcher_with_cache(&dir);
        let target = url(&server, "/text");

        fetcher.fetch_raw(&target, false).await.unwrap();
        fetcher.fetch_raw(&target, false).await.unwrap();
        assert_eq!(fetcher.cache().unwrap().get(target.as_str()), None);
    }

    #[tokio::test]
    async fn test_without_cache_always_fetches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/text"))
            .respond_with(ResponseTemplate::new(200).set_body_string("fresh"))
            .expect(2)
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&ClientConfig::default(), None).unwrap();
        let target = url(&server, "/text");

        fetcher.fetch_raw(&target, true).await.unwrap();
        fetcher.fetch_raw(&target, true).await.unwrap();
        assert!(fetcher.cache().is_none());
        assert!(!fetcher.clear_cache());
    }

    #[tokio::test]
    async fn test_sends_configured_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("user-agent", "pages-test/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let config = ClientConfig {
            user_agent: "pages-test/1.0".to_string(),
            ..ClientConfig::default()
        };
        let fetcher = Fetcher::new(&config, None).unwrap();
        let body = fetcher.fetch_raw(&url(&server, "/ua"), true).await.unwrap();
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/empty"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let fetcher = fetcher_with_cache(&dir);

        let missing = fetcher.fetch_raw(&url(&server, "/missing"), true).await;
        assert!(matches!(missing, Err(Error::NotFound { .. })));

        let broken = fetcher.fetch_raw(&url(&server, "/broken"), true).await;
        match broken {
            Err(Error::Api { message, payload }) => {
                assert!(message.contains("500"));
                assert!(payload.is_none());
            }
            other => panic!("expected Api error, got {:?}", other),
        }

        let empty = fetcher.fetch_raw(&url(&server, "/empty"), true).await;
        assert!(matches!(empty, Err(Error::EmptyBody { .. })));

        // Failures are never cached
        let cache = fetcher.cache().unwrap();
        assert_eq!(cache.get(url(&server, "/broken").as_str()), None);
    }

    #[tokio::test]
    async fn test_transport_failure_is_network_error() {
        let fetcher = Fetcher::new(&ClientConfig::default(), None).unwrap();
        let target = Url::parse("http://127.0.0.1:1/unreachable").unwrap();
        let result = fetcher.fetch_raw(&target, true).await;
        assert!(matches!(result, Err(Error::Network { .. })));
    }

    #[tokio::test]
    async fn test_fetch_json_object() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/stories/42"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"id": 42, "title": "Story"}"#),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let fetcher = fetcher_with_cache(&dir);
        let object = fetcher
            .fetch_json(&url(&server, "/api/v3/stories/42"))
            .await
            .unwrap();
        assert_eq!(object.get("title"), Some(&Value::from("Story")));
    }

    #[tokio::test]
    async fn test_fetch_json_rejects_non_json() {
        let server = MockServer::start().await;
        let body = format!("<html>{}</html>", "x".repeat(800));
        Mock::given(method("GET"))
            .and(path("/html"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body.clone()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/array"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[1, 2, 3]"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let fetcher = fetcher_with_cache(&dir);

        match fetcher.fetch_json(&url(&server, "/html")).await {
            Err(Error::NotJson { body: excerpt, .. }) => {
                assert!(excerpt.ends_with("..."));
                assert_eq!(excerpt.chars().count(), MAX_BODY_EXCERPT + 3);
                assert!(body.starts_with(excerpt.trim_end_matches("...")));
            }
            other => panic!("expected NotJson, got {:?}", other),
        }

        match fetcher.fetch_json(&url(&server, "/array")).await {
            Err(Error::NotJson { body, .. }) => assert_eq!(body, "[1, 2, 3]"),
            other => panic!("expected NotJson, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_json_error_envelopes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/error"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"error": "Story not available", "code": 1017}"#),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/error-code"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"error_code": 1001, "message": "bad"}"#),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let fetcher = fetcher_with_cache(&dir);

        let err = fetcher.fetch_json(&url(&server, "/error")).await.unwrap_err();
        assert!(err.to_string().contains("Story not available"));
        assert!(err.to_string().contains("1017"));
        assert_eq!(
            err.api_payload().and_then(|p| p.get("code")),
            Some(&Value::from(1017))
        );

        let err = fetcher
            .fetch_json(&url(&server, "/error-code"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api { payload: Some(_), .. }));
    }

    #[test]
    fn test_error_object_is_not_an_envelope() {
        let target = Url::parse("https://example.com/x").unwrap();
        let object = parse_json_object(&target, r#"{"error": {"nested": true}}"#).unwrap();
        assert!(object.contains_key("error"));
    }
}
