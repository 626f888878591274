//! Structural comparison of module bodies.

use strata_ir::Module;

/// Describes the first difference between two module bodies, or `None` when
/// they are structurally identical.
///
/// Module names are not compared. Assign right-hand sides are compared as
/// expression trees, so the two modules may use separate managers.
pub fn module_diff(a: &Module, b: &Module) -> Option<String> {
    if a.wires.len() != b.wires.len() {
        return Some(format!("{} wires, expected {}", a.wires.len(), b.wires.len()));
    }
    for ((id, wa), wb) in a.wires.iter().zip(b.wires.values()) {
        if wa != wb {
            return Some(format!("wire {id} differs"));
        }
    }
    if a.instances.len() != b.instances.len() {
        return Some(format!(
            "{} instances, expected {}",
            a.instances.len(),
            b.instances.len()
        ));
    }
    for ((id, ia), ib) in a.instances.iter().zip(b.instances.values()) {
        if ia != ib {
            return Some(format!("instance {id} differs"));
        }
    }
    if a.assigns.len() != b.assigns.len() {
        return Some(format!(
            "{} assigns, expected {}",
            a.assigns.len(),
            b.assigns.len()
        ));
    }
    for ((id, aa), ab) in a.assigns.iter().zip(b.assigns.values()) {
        if aa.lhs != ab.lhs {
            return Some(format!("assign {id} drives different bits"));
        }
        if aa.strength != ab.strength {
            return Some(format!("assign {id} has strength {}, expected {}", aa.strength, ab.strength));
        }
        if !a.exprs.structurally_equal(aa.rhs, &b.exprs, ab.rhs) {
            return Some(format!(
                "assign {id} computes {}, expected {}",
                a.exprs.render(aa.rhs),
                b.exprs.render(ab.rhs)
            ));
        }
    }
    if a.aliases != b.aliases {
        return Some("aliases differ".to_string());
    }
    None
}
