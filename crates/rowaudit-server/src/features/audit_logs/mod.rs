pub mod queries;
pub mod routes;

pub use queries::{GetLogError, GetLogQuery, ListLogsError, ListLogsQuery};
pub use routes::audit_logs_routes;
