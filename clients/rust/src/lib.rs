mod api;
pub mod client;
mod constants;
mod error;
pub mod listing;
pub mod resources;
mod session;

pub use basecamp_api_model::*;

pub use self::api::{ApiError, Response, REQUEST_ID_HEADER};
pub use self::client::{Client, ClientBuilder, RequestRunner};
pub use self::constants::{
    BASE_URL_ENV,
    DEFAULT_BASE_URL,
    DEFAULT_SEARCH_DEBOUNCE_MS,
};
pub use self::error::{Error, Result};
pub use self::resources::{Attachment, FormBody};
pub use self::session::{AdminProfile, SessionFile, SessionStore};
