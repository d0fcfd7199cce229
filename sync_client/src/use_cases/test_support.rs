use std::cell::{Cell, RefCell};

use crate::domain::{OutboundEvent, ParticipantId, PublishError, Session};

// In-memory session that records every publish for use-case tests.
#[derive(Default)]
pub(crate) struct RecordingSession {
    local_id: RefCell<Option<ParticipantId>>,
    sent: RefCell<Vec<OutboundEvent>>,
    failure: Cell<Option<PublishError>>,
}

impl RecordingSession {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn connected(id: &str) -> Self {
        let session = Self::new();
        session.set_local_id(id);
        session
    }

    // Simulates the identity handshake arriving.
    pub(crate) fn set_local_id(&self, id: &str) {
        *self.local_id.borrow_mut() = Some(ParticipantId::from(id));
    }

    pub(crate) fn fail_with(&self, failure: Option<PublishError>) {
        self.failure.set(failure);
    }

    pub(crate) fn sent(&self) -> Vec<OutboundEvent> {
        self.sent.borrow().clone()
    }
}

impl Session for RecordingSession {
    fn local_id(&self) -> Option<ParticipantId> {
        self.local_id.borrow().clone()
    }

    fn publish(&self, event: OutboundEvent) -> Result<(), PublishError> {
        if let Some(failure) = self.failure.get() {
            return Err(failure);
        }
        self.sent.borrow_mut().push(event);
        Ok(())
    }
}
