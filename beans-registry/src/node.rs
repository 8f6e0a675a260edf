//! Registry nodes and the override chain.
//!
//! The chain is a stack of [`RegistryNode`]s. Position 0 is the root; each
//! later node is the child of the one before it, and the last node is the
//! leaf that receives registrations. Lookups walk from the leaf back to the
//! root, so the innermost binding always wins.

use std::collections::HashMap;

use tracing::{debug, trace, warn};

use crate::binding::Binding;
use crate::key::CapabilityId;

/// Identifies one node for the lifetime of its registry.
pub(crate) type LayerId = u64;

const ROOT_LAYER: LayerId = 0;

/// One layer of bindings.
///
/// Bindings are kept per capability in insertion order and are never
/// removed individually.
#[derive(Debug)]
pub(crate) struct RegistryNode {
    id: LayerId,
    bindings: HashMap<CapabilityId, Vec<Binding>>,
}

impl RegistryNode {
    fn new(id: LayerId) -> Self {
        Self {
            id,
            bindings: HashMap::new(),
        }
    }

    /// Appends a binding. Later bindings shadow earlier ones.
    pub fn register(&mut self, binding: Binding) {
        self.bindings
            .entry(binding.capability)
            .or_default()
            .push(binding);
    }

    /// Searches this node only.
    ///
    /// An untagged request matches only untagged bindings. A tagged request
    /// prefers the exact tag, then an untagged binding, then any binding;
    /// with `strict_tags` only the exact tag matches. Within each step the
    /// most recent binding wins.
    pub fn local_lookup(
        &self,
        capability: &CapabilityId,
        tag: &str,
        strict_tags: bool,
    ) -> Option<&Binding> {
        let list = self.bindings.get(capability)?;

        if tag.is_empty() {
            return list.iter().rev().find(|b| b.is_untagged());
        }

        let exact = list.iter().rev().find(|b| b.tag == tag);
        if exact.is_some() || strict_tags {
            return exact;
        }

        list.iter()
            .rev()
            .find(|b| b.is_untagged())
            .or_else(|| list.last())
    }

    /// Number of bindings across all capabilities.
    pub fn len(&self) -> usize {
        self.bindings.values().map(Vec::len).sum()
    }

    pub fn capabilities(&self) -> impl Iterator<Item = &CapabilityId> {
        self.bindings.keys()
    }
}

/// Outcome of detaching an override node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Detached {
    /// The node was the leaf, as expected.
    Leaf,
    /// The node had open children; they were dropped with it.
    OutOfOrder { discarded: usize },
    /// The node was already gone.
    Missing,
}

/// The root node plus the stack of open override nodes.
#[derive(Debug)]
pub(crate) struct Chain {
    layers: Vec<RegistryNode>,
    next_id: LayerId,
    strict_tags: bool,
}

impl Chain {
    /// Creates a chain holding only an empty root.
    pub fn new(strict_tags: bool) -> Self {
        Self {
            layers: vec![RegistryNode::new(ROOT_LAYER)],
            next_id: ROOT_LAYER + 1,
            strict_tags,
        }
    }

    /// The node registrations go to.
    pub fn leaf_mut(&mut self) -> &mut RegistryNode {
        // The root is never removed, so the stack is never empty.
        let last = self.layers.len() - 1;
        &mut self.layers[last]
    }

    /// Number of open override nodes above the root.
    pub fn depth(&self) -> usize {
        self.layers.len() - 1
    }

    /// Attaches a new empty node as the leaf's child and makes it the leaf.
    pub fn push_layer(&mut self) -> LayerId {
        let id = self.next_id;
        self.next_id += 1;
        self.layers.push(RegistryNode::new(id));
        debug!(layer = id, depth = self.depth(), "Override layer attached");
        id
    }

    /// Detaches the node `id` from its parent, restoring the parent as leaf.
    ///
    /// Anything still attached below `id` goes with it. The removed nodes
    /// are returned and must be dropped after the chain borrow ends, since
    /// dropping a factory's captures may re-enter the registry.
    #[must_use = "detached layers must be dropped outside the chain borrow"]
    pub fn detach(&mut self, id: LayerId) -> (Detached, Vec<RegistryNode>) {
        let Some(position) = self
            .layers
            .iter()
            .position(|layer| layer.id == id && layer.id != ROOT_LAYER)
        else {
            trace!(layer = id, "Override layer already detached");
            return (Detached::Missing, Vec::new());
        };

        let removed = self.layers.split_off(position);
        let discarded = removed.len() - 1;
        debug!(layer = id, depth = self.depth(), "Override layer detached");

        let outcome = if discarded == 0 {
            Detached::Leaf
        } else {
            warn!(
                layer = id,
                discarded,
                "Override session closed out of order, inner layers dropped"
            );
            Detached::OutOfOrder { discarded }
        };
        (outcome, removed)
    }

    /// Finds the innermost binding for `capability`, leaf first.
    pub fn deep_lookup(&self, capability: &CapabilityId, tag: &str) -> Option<&Binding> {
        for (depth, layer) in self.layers.iter().enumerate().rev() {
            trace!(capability = %capability, tag, depth, "Searching layer");
            if let Some(binding) = layer.local_lookup(capability, tag, self.strict_tags) {
                return Some(binding);
            }
        }
        None
    }

    /// Human-readable layer names, innermost first.
    pub fn layer_labels(&self) -> Vec<String> {
        (0..self.layers.len())
            .rev()
            .map(|depth| match depth {
                0 => "root".to_string(),
                n => format!("override #{n}"),
            })
            .collect()
    }

    /// Every capability with at least one binding somewhere in the chain.
    pub fn bound_capabilities(&self) -> Vec<CapabilityId> {
        let mut seen: Vec<CapabilityId> = Vec::new();
        for capability in self.layers.iter().flat_map(RegistryNode::capabilities) {
            if !seen.contains(capability) {
                seen.push(*capability);
            }
        }
        seen
    }

    /// Total bindings across the chain.
    pub fn binding_count(&self) -> usize {
        self.layers.iter().map(RegistryNode::len).sum()
    }
}
