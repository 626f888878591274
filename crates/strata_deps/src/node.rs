//! Dependency graph vertices.

use serde::Serialize;
use std::fmt;
use strata_ir::{AssignId, InstanceId, WireId};

/// A clock phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Global clock forced to 0.
    Low,
    /// Global clock forced to 1.
    High,
}

impl Phase {
    /// Both phases, low first.
    pub const ALL: [Phase; 2] = [Phase::Low, Phase::High];

    /// The value the clock is patched to.
    pub fn clock_value(self) -> u64 {
        match self {
            Phase::Low => 0,
            Phase::High => 1,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Low => "low",
            Phase::High => "high",
        })
    }
}

/// A vertex of a dependency graph. Edges point from a signal to what it reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Node {
    /// All bits of a driver.
    Driver(AssignId),
    /// One bit of a split driver.
    DriverBit(AssignId, u32),
    /// All output bits of a port-instance.
    PortOut(InstanceId, WireId),
    /// One output bit of a split port-instance.
    PortOutBit(InstanceId, WireId, u32),
    /// An input bit of an export.
    Input(WireId, u32),
    /// Registered state.
    State,
}

impl Node {
    /// Whether the node has no dependencies of its own.
    pub fn is_leaf(self) -> bool {
        matches!(self, Node::Input(..) | Node::State)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Driver(d) => write!(f, "{d}"),
            Node::DriverBit(d, b) => write!(f, "{d}[{b}]"),
            Node::PortOut(i, p) => write!(f, "{i}.{p}"),
            Node::PortOutBit(i, p, b) => write!(f, "{i}.{p}[{b}]"),
            Node::Input(w, b) => write!(f, "{w}[{b}]"),
            Node::State => f.write_str("STATE"),
        }
    }
}

/// What a closure bottoms out in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Leaf {
    /// An input bit of an export.
    Input(WireId, u32),
    /// Registered state.
    State,
    /// A node re-entered while its own closure was being computed.
    Cycle(Node),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let d = AssignId::from_raw(2);
        assert_eq!(Node::DriverBit(d, 3).to_string(), "d2[3]");
        assert_eq!(
            Node::PortOut(InstanceId::from_raw(0), WireId::from_raw(1)).to_string(),
            "i0.w1"
        );
        assert_eq!(Node::State.to_string(), "STATE");
    }

    #[test]
    fn leaves() {
        assert!(Node::State.is_leaf());
        assert!(Node::Input(WireId::from_raw(0), 0).is_leaf());
        assert!(!Node::Driver(AssignId::from_raw(0)).is_leaf());
        assert_eq!(Phase::High.clock_value(), 1);
    }
}
