//! Registry of claimed semantic identifiers.

use std::collections::HashMap;

use log::trace;

use crate::{error::ModelError, identifier::Id};

/// Tracks which semantic identifiers are in use and by whom.
///
/// Creating an element claims its id; deleting it releases the id so it can
/// be reused. Undoing a delete claims it again.
#[derive(Debug, Clone, Default)]
pub struct IdRegistry {
    claimed: HashMap<Id, Id>,
    counters: HashMap<String, usize>,
}

impl IdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `id` for `owner`.
    ///
    /// Claiming an id again for the same owner is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::IdClaimed`] if another owner holds the id.
    pub fn claim(&mut self, id: Id, owner: Id) -> Result<(), ModelError> {
        match self.claimed.get(&id) {
            Some(current) if *current != owner => Err(ModelError::IdClaimed {
                id,
                owner: *current,
            }),
            _ => {
                trace!(id:%, owner:%; "Claiming id");
                self.claimed.insert(id, owner);
                Ok(())
            }
        }
    }

    /// Releases `id` if `owner` holds it. Returns whether anything was released.
    pub fn unclaim(&mut self, id: Id, owner: Id) -> bool {
        if self.claimed.get(&id) == Some(&owner) {
            trace!(id:%, owner:%; "Releasing id");
            self.claimed.remove(&id);
            true
        } else {
            false
        }
    }

    /// Returns the owner of `id`, if claimed
    pub fn assigned(&self, id: Id) -> Option<Id> {
        self.claimed.get(&id).copied()
    }

    /// Generates and claims a fresh `<prefix>_<n>` identifier.
    ///
    /// The generated id owns itself.
    ///
    /// ```
    /// # use easel_core::ids::IdRegistry;
    /// let mut ids = IdRegistry::new();
    /// assert_eq!(ids.next_prefixed("Task"), "Task_1");
    /// assert_eq!(ids.next_prefixed("Task"), "Task_2");
    /// assert_eq!(ids.next_prefixed("Flow"), "Flow_1");
    /// ```
    pub fn next_prefixed(&mut self, prefix: &str) -> Id {
        let counter = self.counters.entry(prefix.to_owned()).or_default();
        loop {
            *counter += 1;
            let candidate = Id::new(&format!("{prefix}_{counter}"));
            if !self.claimed.contains_key(&candidate) {
                self.claimed.insert(candidate, candidate);
                return candidate;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_and_unclaim() {
        let mut ids = IdRegistry::new();
        let id = Id::new("Task_9");

        ids.claim(id, id).expect("claimable");
        assert_eq!(ids.assigned(id), Some(id));

        assert!(!ids.unclaim(id, Id::new("someone_else")));
        assert_eq!(ids.assigned(id), Some(id));

        assert!(ids.unclaim(id, id));
        assert_eq!(ids.assigned(id), None);
        assert!(ids.is_empty());
    }

    #[test]
    fn test_claim_conflict() {
        let mut ids = IdRegistry::new();
        let id = Id::new("Shared_1");
        ids.claim(id, Id::new("a")).expect("claimable");
        ids.claim(id, Id::new("a")).expect("same owner reclaims");

        let err = ids.claim(id, Id::new("b")).unwrap_err();
        assert_eq!(
            err,
            ModelError::IdClaimed {
                id,
                owner: Id::new("a")
            }
        );
    }

    #[test]
    fn test_next_prefixed_skips_claimed() {
        let mut ids = IdRegistry::new();
        let taken = Id::new("Gateway_1");
        ids.claim(taken, taken).expect("claimable");

        assert_eq!(ids.next_prefixed("Gateway"), "Gateway_2");
        assert_eq!(ids.len(), 2);
    }
}
