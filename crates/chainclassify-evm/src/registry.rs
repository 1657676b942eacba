//! The interface registry: functions indexed by selector, events by topic hash.
//!
//! Built once per run from the JSON interface description, immutable
//! afterwards. Share it between workers behind an `Arc`; no locking needed.

use alloy_primitives::B256;
use chainclassify_core::{
    error::{DecodeError, RegistryError},
    hash::Selector,
};
use std::collections::HashMap;
use tracing::debug;

use crate::interface::{EntryKind, InterfaceEntry, RawEntry};

#[derive(Debug, Clone, Default)]
pub struct InterfaceRegistry {
    /// Selector → function entry
    functions: HashMap<Selector, InterfaceEntry>,
    /// Topic hash → event entry (anonymous events are not indexed)
    events: HashMap<B256, InterfaceEntry>,
}

impl InterfaceRegistry {
    /// Build a registry from raw interface entries.
    ///
    /// Overloads (same name, different parameter types) get distinct selectors
    /// and are stored separately. Two entries hashing to the same selector or
    /// topic are rejected with `DuplicateInterfaceEntry`.
    pub fn build(entries: &[RawEntry]) -> Result<Self, RegistryError> {
        let mut registry = Self::default();
        for raw in entries {
            let Some(entry) = InterfaceEntry::from_raw(raw)? else {
                continue;
            };
            match entry.kind {
                EntryKind::Function => {
                    let sel = entry.selector();
                    if let Some(existing) = registry.functions.get(&sel) {
                        return Err(RegistryError::DuplicateInterfaceEntry {
                            signature: duplicate_label(existing, &entry),
                        });
                    }
                    registry.functions.insert(sel, entry);
                }
                EntryKind::Event => {
                    if entry.anonymous {
                        debug!(event = %entry.name, "skipping anonymous event");
                        continue;
                    }
                    let topic = entry.topic_hash();
                    if let Some(existing) = registry.events.get(&topic) {
                        return Err(RegistryError::DuplicateInterfaceEntry {
                            signature: duplicate_label(existing, &entry),
                        });
                    }
                    registry.events.insert(topic, entry);
                }
            }
        }
        debug!(
            functions = registry.functions.len(),
            events = registry.events.len(),
            "interface registry built"
        );
        Ok(registry)
    }

    /// Parse a JSON interface description and build the registry.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let entries: Vec<RawEntry> = serde_json::from_str(json)?;
        Self::build(&entries)
    }

    /// Look up a function by selector.
    pub fn function(&self, selector: &Selector) -> Result<&InterfaceEntry, DecodeError> {
        self.functions
            .get(selector)
            .ok_or_else(|| DecodeError::UnknownSelector {
                selector: hex::encode(selector),
            })
    }

    /// Look up an event by topic hash.
    pub fn event(&self, topic: &B256) -> Result<&InterfaceEntry, DecodeError> {
        self.events.get(topic).ok_or_else(|| DecodeError::UnknownTopic {
            topic: format!("0x{}", hex::encode(topic.as_slice())),
        })
    }

    /// Find a function by its canonical signature, e.g. `"transfer(address,uint256)"`.
    pub fn function_by_signature(&self, signature: &str) -> Option<&InterfaceEntry> {
        self.functions
            .get(&chainclassify_core::hash::selector(signature))
            .filter(|e| e.signature() == signature)
    }

    /// All functions with the given name (every overload).
    pub fn functions_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a InterfaceEntry> {
        self.functions.values().filter(move |e| e.name == name)
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.events.is_empty()
    }
}

fn duplicate_label(existing: &InterfaceEntry, new: &InterfaceEntry) -> String {
    let (a, b) = (existing.signature(), new.signature());
    if a == b {
        a
    } else {
        format!("{b} (hash collides with {a})")
    }
}
