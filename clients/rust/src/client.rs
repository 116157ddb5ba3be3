use async_trait::async_trait;
use http::Method;
use reqwest::{IntoUrl, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::log::info;
use url::Url;

use crate::constants::{BASE_URL_ENV, DEFAULT_BASE_URL};
use crate::{Response, Result};

/// An asynchronous client for the back-office REST API.
///
/// The client has various configuration options, but has reasonable defaults
/// that should suit most use-cases. To configure a client, use
/// [`Client::builder()`] or [`ClientBuilder::new()`]
///
/// a `Client` manages an internal connection pool, it's designed to be created
/// once and reused (via `Client::clone()`). You do **not** need to wrap
/// `Client` in [`Rc`] or [`Arc`] to reuse it.
///
/// [`Rc`]: std::rc::Rc
/// [`Arc`]: std::sync::Arc
#[derive(Clone)]
pub struct Client {
    http_client: reqwest::Client,
    config: ClientConfig,
}

/// A `ClientBuilder` is what should be used to construct a `Client` with custom
/// configuration.
///
/// We default to the compiled-in API url unless `BASECAMP_BASE_URL`
/// environment variable is defined. Alternatively, the `base_url` can be used
/// to override the server url for this particular client instance.
#[must_use]
#[derive(Default, Clone)]
pub struct ClientBuilder {
    config: Config,
}

impl ClientBuilder {
    /// Construct a new client builder with reasonable defaults. Use
    /// [`ClientBuilder::build`] to construct a client.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn base_url<T: IntoUrl>(mut self, base_url: T) -> Result<Self> {
        self.config.base_url = Some(normalize_base_url(base_url.into_url()?));
        Ok(self)
    }

    /// Bearer token attached to state-changing requests. Reads are sent
    /// without it.
    pub fn secret_token(mut self, secret_token: Option<String>) -> Self {
        self.config.secret_token = secret_token;
        self
    }

    /// Construct the client.
    pub fn build(self) -> Result<Client> {
        let http_client = match self.config.reqwest_client {
            | Some(c) => c,
            | None => {
                reqwest::ClientBuilder::new()
                    .redirect(reqwest::redirect::Policy::none())
                    .build()?
            }
        };

        let base_url = match self.config.base_url {
            | Some(c) => c,
            | None => {
                // Attempt to read from environment variable before fallback to
                // default.
                let url = match std::env::var(BASE_URL_ENV) {
                    | Ok(raw) => Url::parse(&raw)?,
                    | Err(_) => DEFAULT_BASE_URL.clone(),
                };
                normalize_base_url(url)
            }
        };
        Ok(Client {
            http_client,
            config: ClientConfig {
                base_url,
                secret_token: self.config.secret_token,
            },
        })
    }

    /// Use a pre-configured [`reqwest::Client`] instance instead of creating
    /// our own. This allows customising TLS, timeout, and other low-level http
    /// client configuration options.
    pub fn reqwest_client(mut self, c: reqwest::Client) -> Self {
        self.config.reqwest_client = Some(c);
        self
    }
}

/// Resource paths are joined relative to the base url, so the base needs an
/// empty query and a trailing slash (`/api` would otherwise be replaced by
/// the first path segment).
fn normalize_base_url(mut url: Url) -> Url {
    url.set_query(None);
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Methods that change server state and therefore carry the bearer token.
fn is_mutation(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// The seam every request goes through. [`Client`] is the plain
/// implementation; front-ends wrap it to decorate requests (user agent,
/// logging) or to react to responses (auth hints, meta output).
#[async_trait]
pub trait RequestRunner: Send + Sync {
    fn make_url(&self, path: &str) -> Result<Url>;

    fn prepare_request(
        &self,
        method: Method,
        url: Url,
    ) -> Result<RequestBuilder>;

    async fn process_response<T>(
        &self,
        response: reqwest::Response,
    ) -> Result<Response<T>>
    where
        T: DeserializeOwned + Send;

    async fn run<T>(&self, method: Method, url: Url) -> Result<Response<T>>
    where
        T: DeserializeOwned + Send,
    {
        info!("Sending a request '{} {}'", method, url);
        let request = self.prepare_request(method, url)?;
        let resp = request.send().await?;
        self.process_response(resp).await
    }

    async fn run_with_body<T, B>(
        &self,
        method: Method,
        url: Url,
        body: B,
    ) -> Result<Response<T>>
    where
        T: DeserializeOwned + Send,
        B: Serialize + std::fmt::Debug + Send + Sync,
    {
        info!("Sending a request '{} {}': {:?}", method, url, body);
        let request = self.prepare_request(method, url)?;
        let resp = request.json(&body).send().await?;
        self.process_response(resp).await
    }

    async fn run_with_form<T>(
        &self,
        method: Method,
        url: Url,
        form: reqwest::multipart::Form,
    ) -> Result<Response<T>>
    where
        T: DeserializeOwned + Send,
    {
        info!("Sending a multipart request '{} {}'", method, url);
        let request = self.prepare_request(method, url)?;
        let resp = request.multipart(form).send().await?;
        self.process_response(resp).await
    }
}

#[async_trait]
impl RequestRunner for Client {
    fn make_url(&self, path: &str) -> Result<Url> {
        Ok(self.config.base_url.join(path.trim_start_matches('/'))?)
    }

    fn prepare_request(
        &self,
        method: Method,
        url: Url,
    ) -> Result<RequestBuilder> {
        let with_token = is_mutation(&method);
        let request = self.http_client.request(method, url);
        Ok(match self.config.secret_token {
            | Some(ref token) if with_token => request.bearer_auth(token),
            | _ => request,
        })
    }

    async fn process_response<T>(
        &self,
        response: reqwest::Response,
    ) -> Result<Response<T>>
    where
        T: DeserializeOwned + Send,
    {
        Response::from_raw_response(response).await
    }
}

impl Client {
    /// Constructs a new client with the default configuration. This is **not**
    /// the recommended way to construct a client. We recommend using
    /// `Client::builder().build()` instead.
    ///
    /// # Panics
    ///
    /// This method panics if TLS backend cannot be initialised, or the
    /// underlying resolver cannot load the system configuration. Use
    /// [`Client::builder()`] if you wish to handle the failure as an
    /// [`crate::Error`] instead of panicking.
    pub fn new() -> Self {
        Self::builder().build().expect("Client::new()")
    }

    /// Creates a `ClientBuilder` to configure a `Client`.
    ///
    /// This is the same as `ClientBuilder::new()`.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn base_url(&self) -> &Url {
        &self.config.base_url
    }

    pub fn has_secret_token(&self) -> bool {
        self.config.secret_token.is_some()
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default, Clone)]
struct Config {
    base_url: Option<Url>,
    secret_token: Option<String>,
    reqwest_client: Option<reqwest::Client>,
}

#[derive(Clone)]
struct ClientConfig {
    base_url: Url,
    secret_token: Option<String>,
}

// Ensure that Client is Send + Sync. Compiler will fail if it's not.
const _: () = {
    fn assert_send<T: Send + Sync>() {}
    let _ = assert_send::<Client>;
};

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str, token: Option<&str>) -> Client {
        Client::builder()
            .base_url(base)
            .unwrap()
            .secret_token(token.map(ToOwned::to_owned))
            .build()
            .unwrap()
    }

    #[test]
    fn test_base_url_normalization() {
        let c = client("https://admin.example.com/api?debug=1", None);
        assert_eq!("https://admin.example.com/api/", c.base_url().as_str());
        assert_eq!(
            "https://admin.example.com/api/trek/all",
            c.make_url("trek/all").unwrap().as_str()
        );
        // a leading slash doesn't escape the api prefix
        assert_eq!(
            "https://admin.example.com/api/trek/all",
            c.make_url("/trek/all").unwrap().as_str()
        );
    }

    #[test]
    fn test_token_only_on_mutations() {
        let c = client("https://admin.example.com/api/", Some("s3cret"));
        assert!(c.has_secret_token());
        let url = c.make_url("trek/all").unwrap();

        let get = c
            .prepare_request(Method::GET, url.clone())
            .unwrap()
            .build()
            .unwrap();
        assert!(get.headers().get(http::header::AUTHORIZATION).is_none());

        let delete = c
            .prepare_request(Method::DELETE, url)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(
            "Bearer s3cret",
            delete.headers()[http::header::AUTHORIZATION].to_str().unwrap()
        );
    }

    #[test]
    fn test_no_token_configured() {
        let c = client("https://admin.example.com/api/", None);
        let url = c.make_url("trek/delete/1").unwrap();
        let delete = c
            .prepare_request(Method::DELETE, url)
            .unwrap()
            .build()
            .unwrap();
        assert!(delete.headers().get(http::header::AUTHORIZATION).is_none());
    }
}
