use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{KycAction, KycError, KycEvent, KycItemState, KycStateMachine};
use crate::ids::ItemId;

/// KYC state keyed by item. Items never share state; an entry is created
/// the first time an item's flow is touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KycRegistry {
    items: BTreeMap<ItemId, KycItemState>,
}

impl KycRegistry {
    pub fn get(&self, item_id: &ItemId) -> Option<&KycItemState> {
        self.items.get(item_id)
    }

    /// Current state for `item_id`, or a fresh one if none was recorded.
    pub fn snapshot(&self, item_id: &ItemId) -> KycItemState {
        self.items
            .get(item_id)
            .cloned()
            .unwrap_or_else(|| KycItemState::for_item(item_id.clone()))
    }

    /// Runs `event` through the state machine and stores the result.
    /// On error the stored state is left untouched.
    pub fn apply(&mut self, item_id: &ItemId, event: KycEvent) -> Result<Vec<KycAction>, KycError> {
        let current = self.snapshot(item_id);
        let transition = KycStateMachine::transition(&current, event)?;
        self.items.insert(item_id.clone(), transition.state);
        Ok(transition.actions)
    }

    pub fn reset(&mut self, item_id: &ItemId) {
        self.items.remove(item_id);
    }

    pub fn reset_all(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kyc::KycStep;

    #[test]
    fn items_are_independent() {
        let mut registry = KycRegistry::default();
        let a = ItemId::from("a");
        let b = ItemId::from("b");

        registry
            .apply(&a, KycEvent::PanNumberEntered { pan: "ABCDE1234F".into() })
            .unwrap();

        assert_eq!(registry.snapshot(&a).pan_number, "ABCDE1234F");
        assert_eq!(registry.snapshot(&b).pan_number, "");
        assert!(registry.get(&b).is_none());
    }

    #[test]
    fn rejected_event_keeps_state() {
        let mut registry = KycRegistry::default();
        let a = ItemId::from("a");
        registry
            .apply(&a, KycEvent::PanNumberEntered { pan: "ABCDE".into() })
            .unwrap();
        let before = registry.snapshot(&a);

        assert!(registry.apply(&a, KycEvent::VerifyPan).is_err());
        assert_eq!(registry.snapshot(&a), before);
        assert_eq!(registry.snapshot(&a).current_step, KycStep::Pan);
    }

    #[test]
    fn serializes_as_map_keyed_by_item() {
        let mut registry = KycRegistry::default();
        registry
            .apply(&ItemId::from("12"), KycEvent::PanNumberEntered { pan: "A".into() })
            .unwrap();
        let value = serde_json::to_value(&registry).unwrap();
        assert!(value.get("12").is_some());

        let back: KycRegistry = serde_json::from_value(value).unwrap();
        assert_eq!(back, registry);
    }
}
