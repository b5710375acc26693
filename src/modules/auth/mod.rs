pub mod controller;
pub mod crud;
pub mod error;
pub mod extractor;
pub mod model;
pub mod routes;
pub mod schema;

pub use extractor::{AuthUser, RequireAdmin};
pub use routes::auth_routes;
