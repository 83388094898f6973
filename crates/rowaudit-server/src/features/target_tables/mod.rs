pub mod queries;
pub mod routes;

pub use queries::{ListTablesError, ListTablesQuery};
pub use routes::target_tables_routes;
