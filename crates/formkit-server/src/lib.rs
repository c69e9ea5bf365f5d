// formkit-server - hosts the profile form over HTTP

pub mod app;
pub mod config;
pub mod error;
pub mod pages;

pub use app::{router, AppState};
pub use config::Config;
pub use error::AppError;
