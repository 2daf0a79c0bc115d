/*++

Licensed under the Apache-2.0 license.

File Name:

    clock_tree.rs

Abstract:

    File contains the clock dependency graph of a clock management unit.
    Consumers request clocks through gates; demand flows towards the
    oscillators through the selected mux inputs, and enablement flows back
    down.

--*/

use log::{debug, error};
use std::cell::RefCell;

/// Index of a node in a [`ClockTree`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    /// Oscillator or external clock input.
    Source {
        always_on: bool,
        forced: bool,
        frequency: u64,
    },

    /// Selector with encodings mapping to an input, or to nothing when the
    /// encoding picks a clock that is not modeled.
    Mux {
        inputs: Vec<(u32, Option<NodeId>)>,
        selected: Option<NodeId>,
    },

    /// Fixed or programmable prescaler.
    Divider { parent: NodeId, divisor: u32 },

    /// Per-consumer clock enable.
    Gate { parent: NodeId, requested: bool },
}

#[derive(Debug, Clone)]
struct Node {
    name: &'static str,
    kind: NodeKind,
}

impl Node {
    fn parent(&self) -> Option<NodeId> {
        match &self.kind {
            NodeKind::Source { .. } => None,
            NodeKind::Mux { selected, .. } => *selected,
            NodeKind::Divider { parent, .. } | NodeKind::Gate { parent, .. } => Some(*parent),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
struct Snapshot {
    requested: Vec<bool>,
    enabled: Vec<bool>,
    frequency: Vec<u64>,
}

/// Acyclic clock graph. Every parent is created before its children, so node
/// indices are a topological order.
#[derive(Default)]
pub struct ClockTree {
    nodes: Vec<Node>,
    snapshot: RefCell<Option<Snapshot>>,
}

impl ClockTree {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, name: &'static str, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        let node = Node { name, kind };
        if let Some(parent) = node.parent() {
            assert!(
                parent.0 < id.0,
                "clock {name} refers to a node that does not exist yet"
            );
        }
        if let NodeKind::Mux { inputs, .. } = &node.kind {
            for input in inputs.iter().filter_map(|(_, input)| *input) {
                assert!(input.0 < id.0, "mux {name} input does not exist yet");
            }
        }
        assert!(
            self.node_by_name(name).is_none(),
            "clock {name} declared twice"
        );
        self.nodes.push(node);
        self.invalidate();
        id
    }

    pub fn add_source(&mut self, name: &'static str, frequency: u64) -> NodeId {
        self.push(
            name,
            NodeKind::Source {
                always_on: false,
                forced: false,
                frequency,
            },
        )
    }

    /// Adds a source that runs whether or not anything requests it.
    pub fn add_always_on_source(&mut self, name: &'static str, frequency: u64) -> NodeId {
        self.push(
            name,
            NodeKind::Source {
                always_on: true,
                forced: false,
                frequency,
            },
        )
    }

    /// Adds a mux. `initial` is the encoding selected at reset.
    pub fn add_mux(
        &mut self,
        name: &'static str,
        inputs: &[(u32, Option<NodeId>)],
        initial: u32,
    ) -> NodeId {
        let selected = lookup(inputs, initial);
        self.push(
            name,
            NodeKind::Mux {
                inputs: inputs.to_vec(),
                selected,
            },
        )
    }

    pub fn add_divider(&mut self, name: &'static str, parent: NodeId, divisor: u32) -> NodeId {
        assert!(divisor != 0, "divider {name} has a zero divisor");
        self.push(name, NodeKind::Divider { parent, divisor })
    }

    pub fn add_gate(&mut self, name: &'static str, parent: NodeId, requested: bool) -> NodeId {
        self.push(name, NodeKind::Gate { parent, requested })
    }

    fn invalidate(&mut self) {
        *self.snapshot.get_mut() = None;
    }

    pub fn name(&self, node: NodeId) -> &'static str {
        self.nodes[node.0].name
    }

    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.name == name).map(NodeId)
    }

    /// Node currently feeding `node`, if any.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent()
    }

    /// Points a mux at `parent`, or at nothing.
    pub fn set_mux_selection(&mut self, mux: NodeId, parent: Option<NodeId>) {
        let name = self.nodes[mux.0].name;
        let NodeKind::Mux { inputs, .. } = &self.nodes[mux.0].kind else {
            error!("{name} is not a mux");
            return;
        };
        if let Some(p) = parent {
            if !inputs.iter().any(|(_, input)| *input == Some(p)) {
                error!("{} is not an input of mux {name}", self.nodes[p.0].name);
                return;
            }
        }
        if let NodeKind::Mux { selected, .. } = &mut self.nodes[mux.0].kind {
            if *selected != parent {
                *selected = parent;
                self.invalidate();
            }
        }
    }

    /// Selects the mux input for a register encoding. Encodings with no
    /// input leave the mux without a parent.
    pub fn select(&mut self, mux: NodeId, encoding: u32) {
        let parent = match &self.nodes[mux.0].kind {
            NodeKind::Mux { inputs, .. } => lookup(inputs, encoding),
            _ => {
                error!("{} is not a mux", self.name(mux));
                return;
            }
        };
        self.set_mux_selection(mux, parent);
    }

    pub fn set_gate_requested(&mut self, gate: NodeId, requested: bool) {
        let name = self.nodes[gate.0].name;
        match &mut self.nodes[gate.0].kind {
            NodeKind::Gate { requested: r, .. } => {
                if *r != requested {
                    *r = requested;
                    self.invalidate();
                }
            }
            _ => error!("{name} is not a gate"),
        }
    }

    /// Keeps a source running regardless of demand.
    pub fn set_force_enabled(&mut self, source: NodeId, force: bool) {
        let name = self.nodes[source.0].name;
        match &mut self.nodes[source.0].kind {
            NodeKind::Source { forced, .. } => {
                if *forced != force {
                    *forced = force;
                    self.invalidate();
                }
            }
            _ => error!("{name} is not a source"),
        }
    }

    pub fn set_source_frequency(&mut self, source: NodeId, hz: u64) {
        let name = self.nodes[source.0].name;
        match &mut self.nodes[source.0].kind {
            NodeKind::Source { frequency, .. } => {
                *frequency = hz;
                self.invalidate();
            }
            _ => error!("{name} is not a source"),
        }
    }

    pub fn set_divisor(&mut self, divider: NodeId, div: u32) {
        let name = self.nodes[divider.0].name;
        match &mut self.nodes[divider.0].kind {
            NodeKind::Divider { divisor, .. } if div != 0 => {
                if *divisor != div {
                    *divisor = div;
                    self.invalidate();
                }
            }
            NodeKind::Divider { .. } => error!("divider {name} cannot divide by zero"),
            _ => error!("{name} is not a divider"),
        }
    }

    /// Brings the derived requested/enabled state up to date.
    ///
    /// Queries do this on demand; calling it again without a mutation in
    /// between changes nothing.
    pub fn recompute(&self) {
        let mut snapshot = self.snapshot.borrow_mut();
        if snapshot.is_none() {
            *snapshot = Some(self.evaluate());
        }
    }

    fn evaluate(&self) -> Snapshot {
        let count = self.nodes.len();

        // Children have larger indices than their parents, so a reverse scan
        // sees all demand on a node before forwarding it.
        let mut requested = vec![false; count];
        for (i, node) in self.nodes.iter().enumerate().rev() {
            if let NodeKind::Gate { requested: r, .. } = node.kind {
                requested[i] = r;
            }
            if requested[i] {
                if let Some(parent) = node.parent() {
                    requested[parent.0] = true;
                }
            }
        }

        let mut enabled = vec![false; count];
        let mut frequency = vec![0u64; count];
        for (i, node) in self.nodes.iter().enumerate() {
            enabled[i] = match node.kind {
                NodeKind::Source {
                    always_on, forced, ..
                } => requested[i] || always_on || forced,
                _ => requested[i] && node.parent().map(|p| enabled[p.0]).unwrap_or(false),
            };
            if !enabled[i] {
                continue;
            }
            frequency[i] = match node.kind {
                NodeKind::Source { frequency: f, .. } => f,
                NodeKind::Divider { parent, divisor } => frequency[parent.0] / u64::from(divisor),
                _ => node.parent().map(|p| frequency[p.0]).unwrap_or(0),
            };
        }

        debug!(
            "clock tree recomputed: {} of {count} nodes enabled",
            enabled.iter().filter(|e| **e).count()
        );
        Snapshot {
            requested,
            enabled,
            frequency,
        }
    }

    fn with_snapshot<T>(&self, f: impl FnOnce(&Snapshot) -> T) -> T {
        self.recompute();
        let snapshot = self.snapshot.borrow();
        match snapshot.as_ref() {
            Some(snapshot) => f(snapshot),
            None => f(&self.evaluate()),
        }
    }

    /// True if some enabled consumer depends on `node`.
    pub fn is_requested(&self, node: NodeId) -> bool {
        self.with_snapshot(|s| s.requested[node.0])
    }

    pub fn is_enabled(&self, node: NodeId) -> bool {
        self.with_snapshot(|s| s.enabled[node.0])
    }

    /// Output frequency in Hz; zero while the node is disabled.
    pub fn frequency(&self, node: NodeId) -> u64 {
        self.with_snapshot(|s| s.frequency[node.0])
    }
}

fn lookup(inputs: &[(u32, Option<NodeId>)], encoding: u32) -> Option<NodeId> {
    inputs
        .iter()
        .find(|(value, _)| *value == encoding)
        .and_then(|(_, input)| *input)
}
