pub mod docs;
pub mod encoding;
pub mod error;
pub mod extract;
pub mod replies;
pub mod requests;
pub mod routes;
pub mod state;
pub mod upload;
pub mod users;

pub use error::ApiError;
pub use routes::router;
pub use state::{AppState, AppStateInner};
