//! The `base$key=value` name grammar.

use crate::template::{ParamSpec, Params};
use std::collections::BTreeMap;

/// Parses `name` against a template's base name and parameters.
///
/// Missing parameters take their defaults. A different base, a token without
/// `=`, an undeclared or repeated key, or a value of the wrong type is no
/// match.
pub fn parse_name(name: &str, base: &str, specs: &[ParamSpec]) -> Option<Params> {
    let mut tokens = name.split('$');
    if tokens.next()? != base {
        return None;
    }
    let mut given = BTreeMap::new();
    for token in tokens {
        let (key, text) = token.split_once('=')?;
        let spec = specs.iter().find(|s| s.name == key)?;
        let value = spec.default.parse_like(text)?;
        if given.insert(key.to_string(), value).is_some() {
            return None;
        }
    }
    for spec in specs {
        given
            .entry(spec.name.to_string())
            .or_insert_with(|| spec.default.clone());
    }
    Some(Params(given))
}
