//! Single-slot staging for binary frame metadata.

use crate::ws::protocol::BinaryDescriptor;

/// Holds at most one pending descriptor between a binary announce frame and
/// the raw frame it describes.
///
/// The cell is owned by the inbound dispatcher task, so both operations run
/// from one sequential flow and no lock is needed. If announce frames ever
/// gain a second producer this must become a mutex-guarded cell.
#[derive(Debug, Default)]
pub struct BinaryStaging {
    pending: Option<BinaryDescriptor>,
}

impl BinaryStaging {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages a descriptor for the next binary frame. Last write wins:
    /// multiple announcements are not queued.
    pub fn set_pending(&mut self, descriptor: BinaryDescriptor) {
        self.pending = Some(descriptor);
    }

    /// Returns and clears the staged descriptor.
    pub fn take_pending(&mut self) -> Option<BinaryDescriptor> {
        self.pending.take()
    }
}
