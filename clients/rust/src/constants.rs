use once_cell::sync::Lazy;
use url::Url;

pub static BASE_URL_ENV: &str = "BASECAMP_BASE_URL";
pub static DEFAULT_BASE_URL: Lazy<Url> = Lazy::new(|| {
    // Builds default to the local development API unless
    // BASECAMP_DEFAULT_BASE_URL is set at compile time.
    let url_str = std::option_env!("BASECAMP_DEFAULT_BASE_URL")
        .unwrap_or("http://localhost:5000/api/");
    Url::parse(url_str).expect("DEFAULT_BASE_URL")
});

/// Quiet period applied to free-text search before a list fetch is issued.
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 1000;
