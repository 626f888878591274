//! Per-signal dependency reports.

use crate::node::{Leaf, Phase};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use strata_common::Mask;
use strata_ir::{AssignId, InstanceId, ModuleId, WireId};

/// What one signal combinationally depends on in one phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SignalDeps {
    /// Whether registered state is read.
    pub state: bool,
    /// Input bits read, per export wire.
    pub inputs: BTreeMap<WireId, Mask>,
}

impl SignalDeps {
    /// Collects the state flag and input bits among `leaves`; cycle leaves
    /// carry no information and are skipped.
    pub fn from_leaves<'a>(leaves: impl IntoIterator<Item = &'a Leaf>) -> SignalDeps {
        let mut deps = SignalDeps::default();
        for leaf in leaves {
            match *leaf {
                Leaf::State => deps.state = true,
                Leaf::Input(wire, bit) => deps.add_input(wire, &Mask::bit(bit)),
                Leaf::Cycle(_) => {}
            }
        }
        deps
    }

    fn add_input(&mut self, wire: WireId, mask: &Mask) {
        let entry = self.inputs.entry(wire).or_insert_with(Mask::none);
        *entry = &*entry | mask;
    }

    /// Merges `other` into this report.
    pub fn union_with(&mut self, other: &SignalDeps) {
        self.state |= other.state;
        for (&wire, mask) in &other.inputs {
            self.add_input(wire, mask);
        }
    }

    /// Whether nothing is read.
    pub fn is_empty(&self) -> bool {
        !self.state && self.inputs.is_empty()
    }
}

/// A value per clock phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Phased<T> {
    /// Clock low.
    pub low: T,
    /// Clock high.
    pub high: T,
}

impl<T> Phased<T> {
    /// The value for `phase`.
    pub fn get(&self, phase: Phase) -> &T {
        match phase {
            Phase::Low => &self.low,
            Phase::High => &self.high,
        }
    }

    /// The mutable value for `phase`.
    pub fn get_mut(&mut self, phase: Phase) -> &mut T {
        match phase {
            Phase::Low => &mut self.low,
            Phase::High => &mut self.high,
        }
    }
}

/// The dependency analysis result of one module.
#[derive(Debug, Clone)]
pub struct ModuleDeps {
    /// The analyzed module.
    pub module: ModuleId,
    /// Dependencies of every export output bit, keyed by wire and bit.
    pub outputs: BTreeMap<(WireId, u32), Phased<SignalDeps>>,
    /// Dependencies of every driver, over all its bits.
    pub drivers: BTreeMap<AssignId, Phased<SignalDeps>>,
    /// Drivers analyzed per bit.
    pub split_drivers: BTreeSet<AssignId>,
    /// Port-instances analyzed per bit.
    pub split_ports: BTreeSet<(InstanceId, WireId)>,
    /// Some export depends on state in some phase, here or below.
    pub has_phase_state: bool,
    /// Some export depends on state with the clock low, here or below.
    pub has_cycle_state: bool,
}

impl ModuleDeps {
    /// An empty result for `module`.
    pub fn new(module: ModuleId) -> ModuleDeps {
        ModuleDeps {
            module,
            outputs: BTreeMap::new(),
            drivers: BTreeMap::new(),
            split_drivers: BTreeSet::new(),
            split_ports: BTreeSet::new(),
            has_phase_state: false,
            has_cycle_state: false,
        }
    }

    /// Dependencies of all output bits of `wire` in `phase`.
    pub fn output_deps(&self, wire: WireId, phase: Phase) -> SignalDeps {
        let mut deps = SignalDeps::default();
        for (_, phased) in self.outputs.range((wire, 0)..=(wire, u32::MAX)) {
            deps.union_with(phased.get(phase));
        }
        deps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    #[test]
    fn leaves_to_report() {
        let a = WireId::from_raw(0);
        let leaves = [
            Leaf::Input(a, 0),
            Leaf::Input(a, 2),
            Leaf::Cycle(Node::State),
            Leaf::State,
        ];
        let deps = SignalDeps::from_leaves(&leaves);
        assert!(deps.state);
        assert_eq!(deps.inputs[&a], &Mask::bit(0) | &Mask::bit(2));
    }

    #[test]
    fn union_merges_masks() {
        let a = WireId::from_raw(0);
        let mut x = SignalDeps::from_leaves(&[Leaf::Input(a, 0)]);
        let y = SignalDeps::from_leaves(&[Leaf::Input(a, 1), Leaf::State]);
        x.union_with(&y);
        assert_eq!(x.inputs[&a], Mask::low(2));
        assert!(x.state);
        assert!(!x.is_empty());
        assert!(SignalDeps::default().is_empty());
    }

    #[test]
    fn output_deps_cover_all_bits() {
        let (a, y) = (WireId::from_raw(0), WireId::from_raw(1));
        let mut deps = ModuleDeps::new(ModuleId::from_raw(0));
        for bit in 0..2 {
            let mut p = Phased::<SignalDeps>::default();
            *p.get_mut(Phase::High) = SignalDeps::from_leaves(&[Leaf::Input(a, bit)]);
            deps.outputs.insert((y, bit), p);
        }
        assert_eq!(deps.output_deps(y, Phase::High).inputs[&a], Mask::low(2));
        assert!(deps.output_deps(y, Phase::Low).is_empty());
    }
}
