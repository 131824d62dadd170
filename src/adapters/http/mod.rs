//! HTTP adapters: router, handlers, and shared state.

mod app_state;
mod handlers;
mod routes;

pub use app_state::AppState;
pub use handlers::SIGNATURE_HEADER;
pub use routes::router;
