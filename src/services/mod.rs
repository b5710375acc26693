pub mod email;
pub mod hashing;
pub mod images;
pub mod invoice;
pub mod jwt;
pub mod notifications;
pub mod rate_limit;
pub mod security;
