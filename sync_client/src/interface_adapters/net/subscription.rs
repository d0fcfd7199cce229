use tokio::task::JoinHandle;
use tracing::debug;

/// Guard for a task registered against the transport (inbound listener, outbound writer).
///
/// Cancelling aborts the task. Dropping the guard cancels it, so every teardown path
/// of the owner releases the registration.
#[derive(Debug)]
pub struct Subscription {
    name: &'static str,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn new(name: &'static str, task: JoinHandle<()>) -> Self {
        Self {
            name,
            task: Some(task),
        }
    }

    /// Aborts the task. Idempotent.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!(subscription = self.name, "subscription cancelled");
        }
    }

    /// Lets the task run to completion on its own; the guard no longer owns it.
    pub fn detach(&mut self) {
        self.task.take();
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}
