pub mod list;

pub use list::{ListTablesError, ListTablesQuery};
