pub mod controller;
pub mod crud;
pub mod error;
pub mod model;
pub mod routes;
pub mod schema;

pub use routes::order_routes;
