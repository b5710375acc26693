pub mod controller;
pub mod crud;
pub mod error;
pub mod form;
pub mod import;
pub mod model;
pub mod routes;
pub mod schema;

pub use routes::product_routes;
