// Network adapter modules: transport connection, listener guards and the session loop.

pub mod connection;
pub mod session;
pub mod subscription;

pub use connection::{ConnectError, ConnectionHandle, ConnectionSettings, connect};
pub use session::{SessionReport, SessionSettings, run_session};
pub use subscription::Subscription;
