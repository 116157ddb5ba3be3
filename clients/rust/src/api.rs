use basecamp_api_model::Envelope;
use http::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::log::warn;
use url::Url;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Deserialize, Debug)]
struct ApiErrorBody {
    message: String,
}

/// A request the server refused, either with a non-2xx status or with a
/// `success: false` envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    status_code: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status_code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}) {}", self.status_code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[derive(Debug, Clone)]
pub struct Response<T> {
    inner: Result<T, ApiError>,
    url: Url,
    request_id: Option<String>,
    message: Option<String>,
    total_pages: Option<u32>,
    status_code: StatusCode,
    headers: http::HeaderMap,
}

impl<T> Response<T> {
    pub fn into_inner(self) -> Result<T, ApiError> {
        self.inner
    }

    pub fn inner(&self) -> &Result<T, ApiError> {
        &self.inner
    }

    pub fn request_id(&self) -> &Option<String> {
        &self.request_id
    }

    /// Free-form message the server attached to a successful envelope.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    pub fn headers(&self) -> &http::HeaderMap {
        &self.headers
    }

    pub fn status_code(&self) -> http::StatusCode {
        self.status_code
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn is_err(&self) -> bool {
        self.inner.is_err()
    }

    pub fn is_ok(&self) -> bool {
        self.inner.is_ok()
    }
}

/// What a response body decoded into, before the transport metadata is
/// attached.
#[derive(Debug)]
pub(crate) struct DecodedBody<T> {
    pub inner: Result<T, ApiError>,
    pub message: Option<String>,
    pub total_pages: Option<u32>,
}

pub(crate) fn decode_body<T>(
    status_code: StatusCode,
    body: &str,
) -> Result<DecodedBody<T>, serde_json::Error>
where
    T: DeserializeOwned,
{
    if status_code.is_success() {
        let envelope: Envelope<Value> = serde_json::from_str(body)?;
        if !envelope.success {
            let message = envelope
                .message
                .unwrap_or_else(|| "request was not successful".to_owned());
            return Ok(DecodedBody {
                inner: Err(ApiError::new(status_code, message)),
                message: None,
                total_pages: None,
            });
        }
        // Mutation endpoints usually answer without `data`, which decodes
        // fine into `()`.
        let data = envelope.data.unwrap_or(Value::Null);
        return Ok(DecodedBody {
            inner: Ok(serde_json::from_value(data)?),
            message: envelope.message,
            total_pages: envelope.total_pages,
        });
    }

    // Attempt to parse the error as json
    let inner = match serde_json::from_str::<ApiErrorBody>(body) {
        | Ok(error_body) => Err(ApiError::new(status_code, error_body.message)),
        | Err(e) => {
            warn!(
                "Response error body is not json. Error: {}. Body: {}",
                e, body
            );
            Err(ApiError::new(status_code, body))
        }
    };
    Ok(DecodedBody {
        inner,
        message: None,
        total_pages: None,
    })
}

impl<T> Response<T>
where
    T: DeserializeOwned,
{
    pub(crate) async fn from_raw_response(
        raw: reqwest::Response,
    ) -> Result<Self, crate::Error> {
        let url = raw.url().clone();
        let status_code = raw.status();
        let headers = raw.headers().clone();
        let request_id = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned);

        let body = raw.text().await?;
        let decoded = decode_body(status_code, &body)?;

        Ok(Self {
            inner: decoded.inner,
            url,
            request_id,
            message: decoded.message,
            total_pages: decoded.total_pages,
            status_code,
            headers,
        })
    }
}
