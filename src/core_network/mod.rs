pub mod addr;
pub mod data_conn;
pub mod network;
pub mod pasv;
pub mod port;
pub mod registry;

pub use network::{handle_connection, serve, SessionDeps};
pub use registry::DataConnectionRegistry;
