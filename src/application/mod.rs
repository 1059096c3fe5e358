pub mod auth;
pub mod error;
pub mod notifications;
pub mod posts;
pub mod repos;
pub mod users;
