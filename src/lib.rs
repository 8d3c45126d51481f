pub mod api;
pub mod client;
pub mod config;
pub mod lifecycle;
pub mod session;

pub use self::{client::Client, config::Config};
