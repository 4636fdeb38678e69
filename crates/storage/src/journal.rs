//! Savepoint journal backing `begin`/`commit`/`rollback`
//!
//! `begin` pushes a full clone of the state; `commit` drops the newest
//! savepoint; `rollback` pops it and hands it back for restoring. Nested
//! transactions are nested savepoints.
//!
//! The journal belongs to one thread from the outermost `begin` until the
//! matching `commit`/`rollback`. Other threads wait for their turn (see
//! [`Journal::is_held_by_other`]), so a rollback never discards writes made
//! outside the transaction.
//!
//! # Performance
//!
//! Each `begin` is O(n) in the size of the store. Fine for a reference
//! backend used in tests and embedded use; a persistent backend would log
//! undo records instead.

use std::thread::{self, ThreadId};

use metakernel_core::{MetadataError, Result};

use crate::state::MemoryState;

#[derive(Debug, Default)]
pub(crate) struct Journal {
    savepoints: Vec<MemoryState>,
    owner: Option<ThreadId>,
}

impl Journal {
    pub fn begin(&mut self, state: &MemoryState) {
        self.owner = Some(thread::current().id());
        self.savepoints.push(state.clone());
    }

    pub fn commit(&mut self) -> Result<()> {
        self.check_owner()?;
        self.savepoints.pop().ok_or_else(no_transaction)?;
        self.release_if_done();
        Ok(())
    }

    pub fn rollback(&mut self) -> Result<MemoryState> {
        self.check_owner()?;
        let savepoint = self.savepoints.pop().ok_or_else(no_transaction)?;
        self.release_if_done();
        Ok(savepoint)
    }

    pub fn depth(&self) -> usize {
        self.savepoints.len()
    }

    /// Another thread has a transaction open
    pub fn is_held_by_other(&self) -> bool {
        self.owner
            .is_some_and(|owner| owner != thread::current().id())
    }

    fn check_owner(&self) -> Result<()> {
        if self.is_held_by_other() {
            return Err(MetadataError::storage(
                "transaction is owned by another thread",
            ));
        }
        Ok(())
    }

    fn release_if_done(&mut self) {
        if self.savepoints.is_empty() {
            self.owner = None;
        }
    }
}

fn no_transaction() -> MetadataError {
    MetadataError::storage("no active transaction")
}
