pub mod auth;

pub use auth::{login, logout, validate};
