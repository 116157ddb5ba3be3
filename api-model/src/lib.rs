mod entity;
mod ids;
mod pagination;
mod query;
mod resource;
mod status;

pub use entity::*;
pub use ids::*;
pub use pagination::*;
pub use query::*;
pub use resource::*;
pub use status::*;
