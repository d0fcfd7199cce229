// Use cases layer: cache reconciliation, pose publication and fire emission.

pub mod emitter;
pub mod publisher;
pub mod remote_cache;
pub mod throttle;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use emitter::ActionEventEmitter;
pub use publisher::{LocalPosePublisher, PublisherSettings};
pub use remote_cache::RemoteStateCache;
pub use types::{ConnectionState, PublishOutcome};
