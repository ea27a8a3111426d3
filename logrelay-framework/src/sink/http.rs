//! HTTP POST delivery to a remote collector.

use std::borrow::Cow;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Certificate, Client, ClientBuilder, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Sink, default_min_level};
use crate::error::{RelayError, Result, SinkError};
use logrelay_common::{LogEntry, Severity};

const JSON_CONTENT_TYPE: &str = "application/json";

/// HTTP sink configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSinkConfig {
    /// Collector URL, e.g. "http://collector:8080/log".
    pub url: String,

    /// Value of the `content-type` request header.
    #[serde(default = "default_content_type")]
    pub content_type: String,

    /// Key wrapping plain-text payloads in JSON bodies.
    #[serde(default = "default_json_key")]
    pub json_default_key: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Post messages whose text is a JSON object as that object.
    #[serde(default)]
    pub structured_messages: bool,

    /// TLS root material. Required for https URLs.
    #[serde(default)]
    pub trust: Option<TrustConfig>,

    #[serde(default = "default_min_level")]
    pub min_level: Severity,
}

fn default_content_type() -> String {
    JSON_CONTENT_TYPE.to_string()
}

fn default_json_key() -> String {
    "msg".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl HttpSinkConfig {
    /// Config with defaults for everything but the URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content_type: default_content_type(),
            json_default_key: default_json_key(),
            timeout_secs: default_timeout_secs(),
            structured_messages: false,
            trust: None,
            min_level: default_min_level(),
        }
    }

    /// Parse the URL and check its scheme.
    pub fn parsed_url(&self) -> Result<Url> {
        let url = Url::parse(&self.url)
            .map_err(|e| RelayError::validation(format!("Invalid HTTP URL '{}': {}", self.url, e)))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(RelayError::validation(format!(
                "Unsupported URL scheme '{}' for HTTP sink",
                other
            ))),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.parsed_url()?;
        require_trust_for_https(&url, self.trust.is_some())?;

        if let Some(trust) = &self.trust {
            trust.validate()?;
        }
        if self.timeout_secs == 0 {
            return Err(RelayError::validation("HTTP sink timeout must be positive"));
        }
        HeaderValue::from_str(&self.content_type).map_err(|_| {
            RelayError::validation(format!("Invalid content type '{}'", self.content_type))
        })?;

        Ok(())
    }
}

fn require_trust_for_https(url: &Url, has_trust: bool) -> Result<()> {
    if url.scheme() == "https" && !has_trust {
        return Err(RelayError::validation(format!(
            "A trust context must be provided for https URL '{}'",
            url
        )));
    }
    Ok(())
}

/// Where TLS roots come from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrustConfig {
    /// PEM bundle of root certificates.
    #[serde(default)]
    pub ca_file: Option<PathBuf>,

    /// Also trust the built-in web PKI roots.
    #[serde(default)]
    pub builtin_roots: bool,
}

impl TrustConfig {
    pub fn validate(&self) -> Result<()> {
        if self.ca_file.is_none() && !self.builtin_roots {
            return Err(RelayError::validation(
                "Trust context needs a ca_file or builtin_roots",
            ));
        }
        Ok(())
    }
}

/// Opaque TLS verification material for https delivery.
#[derive(Clone, Default)]
pub struct TrustContext {
    roots: Vec<Certificate>,
    builtin_roots: bool,
}

impl TrustContext {
    /// Trust the built-in web PKI roots only.
    pub fn builtin_roots() -> Self {
        Self {
            roots: Vec::new(),
            builtin_roots: true,
        }
    }

    /// Trust the certificates of a PEM bundle.
    pub fn from_pem(pem: &[u8]) -> Result<Self> {
        let roots = Certificate::from_pem_bundle(pem)
            .map_err(|e| RelayError::sink_setup("http", format!("Invalid PEM bundle: {}", e)))?;

        if roots.is_empty() {
            return Err(RelayError::sink_setup(
                "http",
                "PEM bundle contains no certificates",
            ));
        }

        Ok(Self {
            roots,
            builtin_roots: false,
        })
    }

    pub fn from_config(config: &TrustConfig) -> Result<Self> {
        config.validate()?;

        let mut context = match &config.ca_file {
            Some(path) => {
                let pem = std::fs::read(path).map_err(|e| {
                    RelayError::with_context(format!("Failed to read {}", path.display()), e)
                })?;
                Self::from_pem(&pem)?
            }
            None => Self::default(),
        };
        context.builtin_roots = config.builtin_roots;

        Ok(context)
    }

    fn apply(&self, builder: ClientBuilder) -> ClientBuilder {
        let builder = builder
            .use_rustls_tls()
            .tls_built_in_root_certs(self.builtin_roots);

        self.roots
            .iter()
            .cloned()
            .fold(builder, |builder, cert| builder.add_root_certificate(cert))
    }
}

impl std::fmt::Debug for TrustContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustContext")
            .field("roots", &self.roots.len())
            .field("builtin_roots", &self.builtin_roots)
            .finish()
    }
}

/// What gets posted for one entry.
#[derive(Debug, Clone, PartialEq)]
pub enum HttpPayload {
    /// Key-value pairs, posted as a JSON object in their original order.
    Mapping(Map<String, Value>),
    /// A plain message.
    PlainText(String),
}

impl HttpPayload {
    /// Payload for a message, treating JSON objects as mappings when `structured` is set.
    pub fn from_message(message: &str, structured: bool) -> Self {
        if structured {
            if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(message) {
                return Self::Mapping(map);
            }
        }
        Self::PlainText(message.to_string())
    }

    fn as_text(&self) -> std::result::Result<Cow<'_, str>, SinkError> {
        match self {
            Self::Mapping(map) => Ok(Cow::Owned(serde_json::to_string(map)?)),
            Self::PlainText(text) => Ok(Cow::Borrowed(text)),
        }
    }
}

/// Posts each entry to a remote collector, exactly once.
pub struct HttpSink {
    client: Client,
    url: Url,
    content_type: HeaderValue,
    json: bool,
    json_default_key: String,
    structured_messages: bool,
    min_level: Severity,
}

impl HttpSink {
    /// Build the sink, loading the trust context named by the config.
    pub fn from_config(config: &HttpSinkConfig) -> Result<Self> {
        config.validate()?;
        let trust = config
            .trust
            .as_ref()
            .map(TrustContext::from_config)
            .transpose()?;
        Self::new(config, trust)
    }

    /// Build the sink with an explicit trust context.
    ///
    /// An https URL without a trust context is rejected here.
    pub fn new(config: &HttpSinkConfig, trust: Option<TrustContext>) -> Result<Self> {
        let url = config.parsed_url()?;
        require_trust_for_https(&url, trust.is_some())?;

        let content_type = HeaderValue::from_str(&config.content_type).map_err(|_| {
            RelayError::validation(format!("Invalid content type '{}'", config.content_type))
        })?;

        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::none());
        if let Some(trust) = &trust {
            builder = trust.apply(builder);
        }
        let client = builder
            .build()
            .map_err(|e| RelayError::sink_setup("http", e.to_string()))?;

        Ok(Self {
            client,
            url,
            content_type,
            json: is_json_content_type(&config.content_type),
            json_default_key: config.json_default_key.clone(),
            structured_messages: config.structured_messages,
            min_level: config.min_level,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn payload_for(&self, entry: &LogEntry) -> HttpPayload {
        HttpPayload::from_message(&entry.message, self.structured_messages)
    }

    /// Request body for a payload under the configured content type.
    pub fn build_body(&self, payload: &HttpPayload) -> std::result::Result<String, SinkError> {
        if !self.json {
            let text = payload.as_text()?;
            return Ok(url::form_urlencoded::byte_serialize(text.as_bytes()).collect());
        }

        let body = match payload {
            HttpPayload::Mapping(map) => serde_json::to_string(map)?,
            HttpPayload::PlainText(text) => {
                let mut map = Map::new();
                map.insert(self.json_default_key.clone(), Value::String(text.clone()));
                serde_json::to_string(&map)?
            }
        };
        Ok(body)
    }

    /// POST one payload. 2xx and 3xx responses count as delivered.
    pub async fn post(&self, payload: &HttpPayload) -> std::result::Result<(), SinkError> {
        let body = self.build_body(payload)?;
        tracing::debug!(url = %self.url, body = %body, "Posting entry");

        let response = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, self.content_type.clone())
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() || status.is_redirection() {
            Ok(())
        } else {
            Err(SinkError::HttpStatus {
                status: status.as_u16(),
            })
        }
    }
}

fn is_json_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(JSON_CONTENT_TYPE))
}

#[async_trait]
impl Sink for HttpSink {
    fn name(&self) -> &str {
        "http"
    }

    fn min_level(&self) -> Severity {
        self.min_level
    }

    async fn deliver(&self, entry: &LogEntry) -> std::result::Result<(), SinkError> {
        self.post(&self.payload_for(entry)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sink(config: HttpSinkConfig) -> HttpSink {
        HttpSink::new(&config, None).unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config: HttpSinkConfig =
            json5::from_str(r#"{ url: "http://localhost:8080/log" }"#).unwrap();
        assert_eq!(config.content_type, "application/json");
        assert_eq!(config.json_default_key, "msg");
        assert_eq!(config.timeout_secs, 10);
        assert!(!config.structured_messages);
        assert!(config.trust.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_https_requires_trust() {
        let config = HttpSinkConfig::new("https://collector.example.com/log");
        assert!(matches!(
            config.validate(),
            Err(RelayError::ConfigValidation(_))
        ));
        assert!(matches!(
            HttpSink::new(&config, None),
            Err(RelayError::ConfigValidation(_))
        ));
    }

    #[test]
    fn test_https_with_builtin_roots() {
        let mut config = HttpSinkConfig::new("https://collector.example.com/log");
        config.trust = Some(TrustConfig {
            ca_file: None,
            builtin_roots: true,
        });
        assert!(config.validate().is_ok());

        let sink = HttpSink::new(&config, Some(TrustContext::builtin_roots())).unwrap();
        assert_eq!(sink.url().scheme(), "https");
    }

    #[test]
    fn test_trust_config_needs_a_source() {
        let mut config = HttpSinkConfig::new("https://collector.example.com/log");
        config.trust = Some(TrustConfig::default());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_pem() {
        assert!(TrustContext::from_pem(b"not a certificate").is_err());
    }

    #[test]
    fn test_invalid_url_and_scheme() {
        assert!(HttpSinkConfig::new("not a url").validate().is_err());
        assert!(HttpSinkConfig::new("ftp://example.com/log").validate().is_err());
    }

    #[test]
    fn test_json_body_plain_text() {
        let sink = sink(HttpSinkConfig::new("http://localhost/log"));
        let body = sink
            .build_body(&HttpPayload::PlainText("foo".to_string()))
            .unwrap();
        assert_eq!(body, r#"{"msg":"foo"}"#);
    }

    #[test]
    fn test_json_body_custom_key() {
        let mut config = HttpSinkConfig::new("http://localhost/log");
        config.json_default_key = "message".to_string();
        let body = sink(config)
            .build_body(&HttpPayload::PlainText("foo".to_string()))
            .unwrap();
        assert_eq!(body, r#"{"message":"foo"}"#);
    }

    #[test]
    fn test_json_body_mapping_round_trip() {
        let sink = sink(HttpSinkConfig::new("http://localhost/log"));
        let Value::Object(map) = serde_json::json!({"foo": 1, "bar": "buzz"}) else {
            unreachable!()
        };

        let body = sink.build_body(&HttpPayload::Mapping(map.clone())).unwrap();
        let parsed: Map<String, Value> = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed, map);
        assert_eq!(body, r#"{"foo":1,"bar":"buzz"}"#);
    }

    #[test]
    fn test_non_json_body_is_percent_encoded() {
        let mut config = HttpSinkConfig::new("http://localhost/log");
        config.content_type = "application/x-www-form-urlencoded".to_string();
        let body = sink(config)
            .build_body(&HttpPayload::PlainText("disk full: /var & /tmp".to_string()))
            .unwrap();
        assert_eq!(body, "disk+full%3A+%2Fvar+%26+%2Ftmp");
    }

    #[test]
    fn test_json_content_type_with_charset() {
        assert!(is_json_content_type("application/json"));
        assert!(is_json_content_type("Application/JSON; charset=utf-8"));
        assert!(!is_json_content_type("text/plain"));
    }

    #[test]
    fn test_payload_from_message() {
        assert_eq!(
            HttpPayload::from_message(r#"{"a":1}"#, false),
            HttpPayload::PlainText(r#"{"a":1}"#.to_string())
        );
        assert!(matches!(
            HttpPayload::from_message(r#"{"a":1}"#, true),
            HttpPayload::Mapping(_)
        ));
        assert_eq!(
            HttpPayload::from_message("[1, 2]", true),
            HttpPayload::PlainText("[1, 2]".to_string())
        );
    }
}
