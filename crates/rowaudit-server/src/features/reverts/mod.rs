pub mod commands;
pub mod routes;

pub use commands::{RevertChangeCommand, RevertChangeError};
pub use routes::reverts_routes;
