pub mod daemon_client;
pub mod dispatcher;
pub mod map;
pub mod queries;
