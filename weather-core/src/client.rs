use std::{fmt, future::Future};

use async_trait::async_trait;
use reqwest::{Client, header::ACCEPT};
use url::Url;

use crate::{
    decode::{decode, provider_error_message},
    error::{QueryError, TransportError, WeatherError},
    model::{Unit, WeatherResult},
    presentation::DisplayModel,
    query::build_request_url,
};

/// Endpoint and credentials a [`WeatherClient`] talks to.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub base_url: Url,
    pub api_key: String,
}

impl fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSettings")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Status and raw body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues a single GET. Implementations must not retry or cache.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    async fn get(&self, url: &Url) -> Result<TransportResponse, TransportError>;
}

/// [`Transport`] backed by `reqwest`, using its default timeouts.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self { http: Client::new() }
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<TransportResponse, TransportError> {
        let res = self
            .http
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                TransportError::with_source("Failed to send request to weather service", e)
            })?;

        let status = res.status().as_u16();
        let body = res.bytes().await.map_err(|e| {
            TransportError::with_source("Failed to read weather service response body", e)
        })?;

        Ok(TransportResponse { status, body: body.to_vec() })
    }
}

/// Looks up current conditions: one query, one GET, one decoded result.
#[derive(Debug, Clone)]
pub struct WeatherClient<T = HttpTransport> {
    settings: ClientSettings,
    transport: T,
}

impl WeatherClient<HttpTransport> {
    pub fn new(settings: ClientSettings) -> Self {
        Self::with_transport(settings, HttpTransport::new())
    }
}

impl<T: Transport> WeatherClient<T> {
    pub fn with_transport(settings: ClientSettings, transport: T) -> Self {
        Self { settings, transport }
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// The URL [`fetch_weather`](Self::fetch_weather) would request for `query`.
    pub fn request_url(&self, query: &str) -> Result<Url, QueryError> {
        build_request_url(&self.settings.base_url, query, &self.settings.api_key)
    }

    pub async fn fetch_weather(&self, query: &str) -> Result<WeatherResult, WeatherError> {
        let url = self.request_url(query)?;

        let response = self.transport.get(&url).await.map_err(WeatherError::NetworkFailure)?;

        if !response.is_success() {
            return Err(WeatherError::EmptyResponse {
                status: response.status,
                message: provider_error_message(&response.body),
            });
        }

        if response.body.iter().all(u8::is_ascii_whitespace) {
            return Err(WeatherError::EmptyResponse { status: response.status, message: None });
        }

        Ok(decode(&response.body)?)
    }

    /// Like [`fetch_weather`](Self::fetch_weather), but gives up with
    /// [`WeatherError::Cancelled`] as soon as `cancel` resolves. An already
    /// resolved `cancel` means no request is sent.
    pub async fn fetch_weather_until<C>(
        &self,
        query: &str,
        cancel: C,
    ) -> Result<WeatherResult, WeatherError>
    where
        C: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            () = cancel => Err(WeatherError::Cancelled),
            result = self.fetch_weather(query) => result,
        }
    }

    /// Fetch and turn the result into display-ready values for `unit`.
    pub async fn lookup(&self, query: &str, unit: Unit) -> Result<DisplayModel, WeatherError> {
        let result = self.fetch_weather(query).await?;
        Ok(DisplayModel::new(&result, unit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    const LONDON: &str = r#"{"location":{"name":"London"},"current":{"temp_c":18.0,"condition":{"text":"Partly cloudy","code":1003}}}"#;

    #[derive(Debug, Clone)]
    enum Reply {
        Respond(u16, &'static str),
        Fail(&'static str),
    }

    #[derive(Debug, Clone)]
    struct StubTransport {
        reply: Reply,
        requests: Arc<Mutex<Vec<Url>>>,
    }

    impl StubTransport {
        fn new(reply: Reply) -> Self {
            Self { reply, requests: Arc::default() }
        }

        fn requests(&self) -> Vec<Url> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn get(&self, url: &Url) -> Result<TransportResponse, TransportError> {
            self.requests.lock().unwrap().push(url.clone());

            match &self.reply {
                Reply::Respond(status, body) => {
                    Ok(TransportResponse { status: *status, body: body.as_bytes().to_vec() })
                }
                Reply::Fail(msg) => Err(TransportError::new(*msg)),
            }
        }
    }

    /// Never answers; counts how often it was asked.
    #[derive(Debug, Default)]
    struct HangingTransport {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Transport for HangingTransport {
        async fn get(&self, _url: &Url) -> Result<TransportResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::future::pending().await
        }
    }

    fn settings() -> ClientSettings {
        ClientSettings {
            base_url: Url::parse("https://api.weatherapi.com/v1").unwrap(),
            api_key: "TEST_KEY".into(),
        }
    }

    fn client(reply: Reply) -> (WeatherClient<StubTransport>, StubTransport) {
        let transport = StubTransport::new(reply);
        (WeatherClient::with_transport(settings(), transport.clone()), transport)
    }

    #[tokio::test]
    async fn london_lookup_yields_display_model() {
        let (client, _) = client(Reply::Respond(200, LONDON));

        let model = client.lookup("London", Unit::Celsius).await.unwrap();

        assert_eq!(
            model,
            DisplayModel {
                location_name: "London".into(),
                temperature_text: "18.0°C".into(),
                icon_key: "partly-cloudy".into(),
            }
        );
    }

    #[tokio::test]
    async fn unit_is_applied_per_call() {
        let (client, transport) = client(Reply::Respond(200, LONDON));

        let f = client.lookup("London", Unit::Fahrenheit).await.unwrap();
        let c = client.lookup("London", Unit::Celsius).await.unwrap();

        assert_eq!(f.temperature_text, "64.4°F");
        assert_eq!(c.temperature_text, "18.0°C");
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn sends_exactly_one_request_to_built_url() {
        let (client, transport) = client(Reply::Respond(200, LONDON));

        client.fetch_weather("New York").await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].as_str(),
            "https://api.weatherapi.com/v1/current.json?key=TEST_KEY&q=New+York"
        );
    }

    #[tokio::test]
    async fn empty_query_never_reaches_transport() {
        let (client, transport) = client(Reply::Respond(200, LONDON));

        let err = client.fetch_weather("   ").await.unwrap_err();

        assert!(matches!(err, WeatherError::Query(QueryError::EmptyQuery)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_is_network_failure() {
        let (client, _) = client(Reply::Fail("connection reset"));

        let err = client.fetch_weather("London").await.unwrap_err();

        assert!(matches!(&err, WeatherError::NetworkFailure(cause) if cause.to_string() == "connection reset"));
    }

    #[tokio::test]
    async fn error_status_is_empty_response_with_provider_message() {
        let body = r#"{"error":{"code":1006,"message":"No matching location found."}}"#;
        let (client, _) = client(Reply::Respond(400, body));

        let err = client.fetch_weather("Atlantis").await.unwrap_err();

        match err {
            WeatherError::EmptyResponse { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message.as_deref(), Some("No matching location found."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn error_status_with_valid_weather_body_is_still_an_error() {
        let (client, _) = client(Reply::Respond(503, LONDON));

        let err = client.fetch_weather("London").await.unwrap_err();

        assert!(matches!(err, WeatherError::EmptyResponse { status: 503, message: None }));
    }

    #[tokio::test]
    async fn blank_body_is_empty_response() {
        for body in ["", " \n"] {
            let (client, _) = client(Reply::Respond(200, body));

            let err = client.fetch_weather("London").await.unwrap_err();

            assert!(matches!(err, WeatherError::EmptyResponse { status: 200, message: None }));
        }
    }

    #[tokio::test]
    async fn undecodable_body_is_decoding_failure() {
        let (malformed, _) = client(Reply::Respond(200, r#"{"location":{"#));
        let err = malformed.fetch_weather("London").await.unwrap_err();
        assert!(matches!(err, WeatherError::DecodingFailed(DecodeError::MalformedJson(_))));

        let (partial, _) = client(Reply::Respond(200, r#"{"location":{"name":"London"}}"#));
        let err = partial.fetch_weather("London").await.unwrap_err();
        assert!(matches!(
            err,
            WeatherError::DecodingFailed(DecodeError::MissingField("current.temp_c"))
        ));
    }

    #[tokio::test]
    async fn cancellation_abandons_pending_request() {
        let client = WeatherClient::with_transport(settings(), HangingTransport::default());
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let cancel = async move {
            let _ = rx.await;
        };
        tx.send(()).unwrap();

        let err = client.fetch_weather_until("London", cancel).await.unwrap_err();
        assert!(matches!(err, WeatherError::Cancelled));
        assert_eq!(client.transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cancel_while_in_flight() {
        let transport = HangingTransport::default();
        let client = WeatherClient::with_transport(settings(), transport);

        let cancel = tokio::time::sleep(std::time::Duration::from_millis(20));
        let err = client.fetch_weather_until("London", cancel).await.unwrap_err();

        assert!(matches!(err, WeatherError::Cancelled));
        assert_eq!(client.transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn uncancelled_fetch_completes_normally() {
        let (client, _) = client(Reply::Respond(200, LONDON));

        let result = client
            .fetch_weather_until("London", std::future::pending::<()>())
            .await
            .unwrap();

        assert_eq!(result.location_name, "London");
    }

    #[test]
    fn settings_debug_hides_api_key() {
        let rendered = format!("{:?}", settings());

        assert!(!rendered.contains("TEST_KEY"));
        assert!(rendered.contains("<redacted>"));
    }
}
