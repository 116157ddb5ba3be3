use async_trait::async_trait;
use basecamp_client::{Client, RequestRunner, Response, Result};
use colored::Colorize;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::args::CommonOptions;

/// The API client as the CLI uses it: tags requests with a CLI user agent,
/// hints at a bad token on 401/403 and prints response meta on request.
pub struct WrappedClient {
    pub common_options: CommonOptions,
    pub inner: Client,
}

fn user_agent() -> String {
    format!(
        "basecamp-cli-{}-{}-{}",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH,
    )
}

#[async_trait]
impl RequestRunner for WrappedClient {
    fn make_url(&self, path: &str) -> Result<Url> {
        self.inner.make_url(path)
    }

    fn prepare_request(
        &self,
        method: http::Method,
        url: Url,
    ) -> Result<RequestBuilder> {
        let request = self.inner.prepare_request(method, url)?;
        let request = request.header(reqwest::header::USER_AGENT, user_agent());
        debug!(?request);
        Ok(request)
    }

    async fn process_response<T>(
        &self,
        response: reqwest::Response,
    ) -> Result<Response<T>>
    where
        T: DeserializeOwned + Send,
    {
        debug!(?response);
        let response = self.inner.process_response(response).await?;
        if matches!(
            response.status_code(),
            http::StatusCode::UNAUTHORIZED | http::StatusCode::FORBIDDEN
        ) {
            eprintln!();
            eprintln!(
                "The server rejected the request's credentials. Is \
                 BASECAMP_SECRET_TOKEN (or the session file) set to a valid \
                 admin token?"
            );
        };

        if self.common_options.show_meta() {
            print_meta(&response);
        }
        Ok(response)
    }
}

fn print_meta<T>(response: &Response<T>) {
    let rule = "-------------------------------------------------".green();
    eprintln!();
    eprintln!("{rule}");
    eprintln!("URL: {}", response.url());
    eprintln!("Status Code: {}", response.status_code());
    eprintln!(
        "Request Id: {}",
        response.request_id().clone().unwrap_or_default().green()
    );
    if let Some(total) = response.total_pages() {
        eprintln!("Total Pages: {total}");
    }
    if let Some(message) = response.message() {
        eprintln!("Message: {message}");
    }
    eprintln!("{rule}");
    eprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent() {
        let ua = user_agent();
        assert!(ua.starts_with("basecamp-cli-"));
        assert!(ua.contains(std::env::consts::OS));
    }
}
