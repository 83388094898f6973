pub mod revert;

pub use revert::{RevertChangeCommand, RevertChangeError};
