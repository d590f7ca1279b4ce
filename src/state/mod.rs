//! Lifecycle guard for host signals. All work is synchronous on the host's
//! single logical thread; the machine only exists to suppress
//! settings-changed handling until the host has signalled ready, so the
//! engine never reconciles against a not-yet-initialized store.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPhase {
    #[default]
    AwaitingReady,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncEvent {
    HostReady,
    SettingsChanged,
}

#[derive(Debug, Default)]
pub struct LifecycleMachine {
    phase: SyncPhase,
}

impl LifecycleMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase == SyncPhase::Ready
    }

    pub fn next_phase(&self, event: SyncEvent) -> Option<SyncPhase> {
        use SyncEvent::*;
        match (self.phase, event) {
            (SyncPhase::AwaitingReady, HostReady) => Some(SyncPhase::Ready),
            (SyncPhase::Ready, HostReady) => Some(SyncPhase::Ready),
            (SyncPhase::Ready, SettingsChanged) => Some(SyncPhase::Ready),
            (SyncPhase::AwaitingReady, SettingsChanged) => None,
        }
    }

    pub fn accepts(&self, event: SyncEvent) -> bool {
        self.next_phase(event).is_some()
    }

    /// Apply an event. Returns false when the event is suppressed by the
    /// current phase; suppression is expected behavior, not an error.
    pub fn apply(&mut self, event: SyncEvent) -> bool {
        match self.next_phase(event) {
            Some(next) => {
                self.phase = next;
                true
            }
            None => {
                tracing::debug!(phase = ?self.phase, event = ?event, "suppressing host event");
                false
            }
        }
    }
}
