pub mod auth;
pub mod chatbot;
pub mod companies;
pub mod convert;
pub mod dashboard;
pub mod error;
pub mod extract;
pub mod follow;
pub mod intake;
pub mod manager;
pub mod middleware;
pub mod reports;
pub mod routes;
pub mod seed;
pub mod session;
pub mod settings;
pub mod users;
pub mod validate;

pub use auth::{AppState, AppStateInner};
pub use routes::router;
