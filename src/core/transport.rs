//! HTTP transport used for key pages and translate calls

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use tracing::debug;

use crate::core::errors::{Result, TranslationError};

/// Desktop Safari user agent; the endpoint serves a different page to unknown agents
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Form request method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMethod {
    /// Parameters go in the query string
    Get,
    /// Parameters go in an urlencoded body
    Post,
}

impl fmt::Display for FormMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormMethod::Get => write!(f, "GET"),
            FormMethod::Post => write!(f, "POST"),
        }
    }
}

/// Raw response handed back by a transport
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw body bytes
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, replacing invalid UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// At most `limit` characters of the body, with `...` appended when cut
    pub fn snippet(&self, limit: usize) -> String {
        let text = self.text();
        match text.char_indices().nth(limit) {
            Some((end, _)) => format!("{}...", &text[..end]),
            None => text,
        }
    }
}

/// Performs a form request and returns the raw response.
///
/// Implementations report connection-level failures as
/// [`TranslationError::Transport`]; HTTP status handling is left to the caller.
pub trait Transport: Send + Sync {
    /// Send `params` to `url` as a form request
    fn send(&self, method: FormMethod, url: &str, params: &[(&str, String)]) -> Result<HttpResponse>;
}

/// Chooses a proxy for each outgoing request
pub trait ProxyResolver: Send + Sync {
    /// Proxy to route `url` through, or `None` to connect directly
    fn resolve(&self, url: &Url) -> Option<Url>;
}

/// Routes every request through one proxy
#[derive(Debug, Clone)]
pub struct StaticProxy {
    proxy: Url,
}

impl StaticProxy {
    /// Parse `proxy` as a URL such as `http://127.0.0.1:6152`
    pub fn new(proxy: &str) -> Result<Self> {
        let proxy = Url::parse(proxy).map_err(|e| TranslationError::Config {
            message: format!("invalid proxy url '{}': {}", proxy, e),
        })?;
        Ok(Self { proxy })
    }
}

impl ProxyResolver for StaticProxy {
    fn resolve(&self, _url: &Url) -> Option<Url> {
        Some(self.proxy.clone())
    }
}

/// Settings for the HTTP transport
#[derive(Clone)]
pub struct TransportConfig {
    /// Whole-request timeout
    pub timeout: Duration,
    /// `User-Agent` header sent with every request
    pub user_agent: String,
    /// Per-request proxy selection; `None` connects directly
    pub proxy: Option<Arc<dyn ProxyResolver>>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy: None,
        }
    }
}

impl fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportConfig")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("proxy", &self.proxy.is_some())
            .finish()
    }
}

impl TransportConfig {
    /// Route requests through `proxy`
    pub fn with_proxy(mut self, proxy: Arc<dyn ProxyResolver>) -> Self {
        self.proxy = Some(proxy);
        self
    }
}

/// Blocking reqwest transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Build the underlying client from `config`
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .pool_idle_timeout(Some(Duration::from_secs(30)));

        if let Some(resolver) = &config.proxy {
            let resolver = Arc::clone(resolver);
            builder = builder.proxy(reqwest::Proxy::custom(move |url| resolver.resolve(url)));
        }

        let client = builder.build().map_err(|e| TranslationError::Config {
            message: format!("failed to build HTTP client: {}", e),
        })?;

        Ok(Self { client })
    }

    /// Build the request `send` would issue, without sending it
    pub fn build(&self, method: FormMethod, url: &str, params: &[(&str, String)]) -> Result<reqwest::blocking::Request> {
        let request = match method {
            FormMethod::Get => self.client.get(url).query(params),
            FormMethod::Post => self.client.post(url).form(params),
        };

        request.build().map_err(|e| TranslationError::Transport {
            server: url.to_string(),
            status: None,
            message: format!("invalid request: {}", e),
        })
    }
}

impl Transport for HttpTransport {
    fn send(&self, method: FormMethod, url: &str, params: &[(&str, String)]) -> Result<HttpResponse> {
        debug!("{} {} ({} params)", method, url, params.len());

        let request = self.build(method, url, params)?;

        let transport_error = |e: reqwest::Error| TranslationError::Transport {
            server: url.to_string(),
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        };

        let response = self.client.execute(request).map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().map_err(transport_error)?.to_vec();

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted transport for tests

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// One recorded call
    #[derive(Debug, Clone)]
    pub struct RecordedCall {
        pub method: FormMethod,
        pub url: String,
        pub params: Vec<(String, String)>,
    }

    type Handler = dyn Fn(&str, &[(&str, String)]) -> Result<HttpResponse> + Send + Sync;

    /// Answers every request with `handler` and records it
    pub struct StubTransport {
        handler: Box<Handler>,
        calls: AtomicUsize,
        recorded: Mutex<Vec<RecordedCall>>,
    }

    impl StubTransport {
        pub fn new<F>(handler: F) -> Self
        where
            F: Fn(&str, &[(&str, String)]) -> Result<HttpResponse> + Send + Sync + 'static,
        {
            Self {
                handler: Box::new(handler),
                calls: AtomicUsize::new(0),
                recorded: Mutex::new(Vec::new()),
            }
        }

        /// Transport that fails the test if it is ever used
        pub fn unreachable() -> Self {
            Self::new(|url, _| panic!("unexpected network call to {}", url))
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn recorded(&self) -> Vec<RecordedCall> {
            self.recorded.lock().unwrap().clone()
        }
    }

    impl Transport for StubTransport {
        fn send(&self, method: FormMethod, url: &str, params: &[(&str, String)]) -> Result<HttpResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.recorded.lock().unwrap().push(RecordedCall {
                method,
                url: url.to_string(),
                params: params.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
            });
            (self.handler)(url, params)
        }
    }

    pub fn ok(body: &str) -> Result<HttpResponse> {
        Ok(HttpResponse {
            status: 200,
            body: body.as_bytes().to_vec(),
        })
    }
}
