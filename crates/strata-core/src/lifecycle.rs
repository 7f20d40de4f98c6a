// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! One-shot end-of-execution notifications.
use crate::ident::EntityId;

/// Entities waiting for the end-of-execution notification of one run.
///
/// Each entry fires at most once: [`EndOfExecution::drain`] empties the list.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EndOfExecution {
    pending: Vec<EntityId>,
}

impl EndOfExecution {
    /// Registers `entity`; duplicates are ignored.
    pub fn subscribe(&mut self, entity: EntityId) {
        if !self.pending.contains(&entity) {
            self.pending.push(entity);
        }
    }

    /// Drops `entity` without notifying it.
    pub fn unsubscribe(&mut self, entity: EntityId) {
        self.pending.retain(|e| *e != entity);
    }

    /// Entities still waiting, in subscription order.
    pub fn pending(&self) -> &[EntityId] {
        &self.pending
    }

    /// Removes and returns every subscriber in subscription order.
    pub fn drain(&mut self) -> Vec<EntityId> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_fires_once_in_order() {
        let mut list = EndOfExecution::default();
        list.subscribe(EntityId(3));
        list.subscribe(EntityId(1));
        list.subscribe(EntityId(3));
        list.subscribe(EntityId(7));
        list.unsubscribe(EntityId(1));
        assert_eq!(list.drain(), vec![EntityId(3), EntityId(7)]);
        assert!(list.drain().is_empty());
    }
}
