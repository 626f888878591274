//! Interned identifiers for cheap cloning and O(1) equality comparison.

use lasso::ThreadedRodeo;
use serde::{Deserialize, Serialize};

/// A unique identifier for any named entity in the design.
///
/// Identifiers are interned strings represented as a `u32` index into a
/// string interner. This provides O(1) equality comparison and O(1) cloning.
/// Serialized identifiers are only meaningful next to the name table they
/// were interned in (see [`Interner::names`]).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct Ident(u32);

impl Ident {
    /// Creates an `Ident` from a raw `u32` index.
    ///
    /// This is primarily intended for deserialization and testing.
    /// In normal use, identifiers should be created through [`Interner::get_or_intern`].
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw `u32` index of this identifier.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

// SAFETY: `Ident` wraps a `u32` which is always a valid `usize` on 32-bit and
// 64-bit platforms. `try_from_usize` rejects values that don't fit in `u32`.
unsafe impl lasso::Key for Ident {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn try_from_usize(int: usize) -> Option<Self> {
        u32::try_from(int).ok().map(Ident)
    }
}

/// Thread-safe string interner backed by [`lasso::ThreadedRodeo`].
///
/// Module names, wire names, and instance names are interned so that the
/// model tables can key on [`Ident`] instead of strings. Keys are handed out
/// densely in insertion order, which lets a name table be snapshotted with
/// [`names`](Self::names) and restored with [`from_names`](Self::from_names)
/// without renumbering.
#[derive(Debug)]
pub struct Interner {
    rodeo: ThreadedRodeo<Ident>,
}

impl Interner {
    /// Creates a new empty interner.
    pub fn new() -> Self {
        Self {
            rodeo: ThreadedRodeo::new(),
        }
    }

    /// Rebuilds an interner whose identifiers match the indices of `names`.
    ///
    /// Duplicate entries would break the index correspondence, so the first
    /// duplicate found is returned as an error.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, String> {
        let interner = Self::new();
        for (i, name) in names.iter().enumerate() {
            let id = interner.get_or_intern(name.as_ref());
            if id.as_raw() as usize != i {
                return Err(name.as_ref().to_string());
            }
        }
        Ok(interner)
    }

    /// Interns a string, returning its [`Ident`]. If the string was already
    /// interned, returns the existing identifier without allocating.
    pub fn get_or_intern(&self, s: &str) -> Ident {
        self.rodeo.get_or_intern(s)
    }

    /// Looks up a string without interning it.
    pub fn get(&self, s: &str) -> Option<Ident> {
        self.rodeo.get(s)
    }

    /// Resolves an [`Ident`] back to its string value.
    ///
    /// # Panics
    ///
    /// Panics if the `Ident` was not created by this interner.
    pub fn resolve(&self, ident: Ident) -> &str {
        self.rodeo.resolve(&ident)
    }

    /// Returns the number of interned strings.
    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    /// Returns `true` if nothing has been interned yet.
    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }

    /// Snapshots the name table in identifier order.
    pub fn names(&self) -> Vec<String> {
        (0..self.len())
            .map(|i| self.resolve(Ident(i as u32)).to_string())
            .collect()
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_resolve_roundtrip() {
        let interner = Interner::new();
        let id = interner.get_or_intern("clk");
        assert_eq!(interner.resolve(id), "clk");
    }

    #[test]
    fn same_string_same_ident() {
        let interner = Interner::new();
        let a = interner.get_or_intern("q");
        let b = interner.get_or_intern("q");
        assert_eq!(a, b);
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn get_does_not_intern() {
        let interner = Interner::new();
        assert!(interner.get("missing").is_none());
        assert!(interner.is_empty());
    }

    #[test]
    fn names_snapshot_restores_indices() {
        let interner = Interner::new();
        let a = interner.get_or_intern("top");
        let b = interner.get_or_intern("u0");
        let names = interner.names();
        assert_eq!(names, vec!["top".to_string(), "u0".to_string()]);

        let restored = Interner::from_names(&names).unwrap();
        assert_eq!(restored.resolve(a), "top");
        assert_eq!(restored.resolve(b), "u0");
    }

    #[test]
    fn from_names_rejects_duplicates() {
        let err = Interner::from_names(&["a", "b", "a"]).err();
        assert_eq!(err.as_deref(), Some("a"));
    }

    #[test]
    fn serde_roundtrip() {
        let id = Ident(42);
        let json = serde_json::to_string(&id).unwrap();
        let back: Ident = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
