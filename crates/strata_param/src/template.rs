//! The template trait and typed parameters.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use strata_common::Interner;
use strata_ir::Module;

/// A parsed parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// An unsigned integer.
    Int(u64),
    /// A string.
    Str(String),
}

impl ParamValue {
    /// Parses `text` with the same type as `self`.
    pub fn parse_like(&self, text: &str) -> Option<ParamValue> {
        match self {
            ParamValue::Int(_) => text.parse().ok().map(ParamValue::Int),
            ParamValue::Str(_) => (!text.is_empty()).then(|| ParamValue::Str(text.to_string())),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(n) => write!(f, "{n}"),
            ParamValue::Str(s) => f.write_str(s),
        }
    }
}

/// A declared parameter; the default fixes its type.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    /// Parameter key.
    pub name: &'static str,
    /// Value used when the name omits the parameter.
    pub default: ParamValue,
}

impl ParamSpec {
    /// An integer parameter.
    pub fn int(name: &'static str, default: u64) -> Self {
        Self {
            name,
            default: ParamValue::Int(default),
        }
    }

    /// A string parameter.
    pub fn str(name: &'static str, default: &str) -> Self {
        Self {
            name,
            default: ParamValue::Str(default.to_string()),
        }
    }
}

/// Parameter values keyed by name, every declared parameter present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Params(pub BTreeMap<String, ParamValue>);

impl Params {
    /// The integer parameter `key`.
    pub fn int(&self, key: &str) -> Option<u64> {
        match self.0.get(key)? {
            ParamValue::Int(n) => Some(*n),
            ParamValue::Str(_) => None,
        }
    }

    /// The string parameter `key`.
    pub fn str(&self, key: &str) -> Option<&str> {
        match self.0.get(key)? {
            ParamValue::Str(s) => Some(s),
            ParamValue::Int(_) => None,
        }
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (k, v) in &self.0 {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{k}={v}")?;
        }
        Ok(())
    }
}

/// A generator of parameterized modules.
pub trait Template: fmt::Debug + Send + Sync {
    /// The name prefix before the first `$`.
    fn base(&self) -> &str;

    /// The declared parameters.
    fn params(&self) -> &[ParamSpec];

    /// Builds the module body for `params`, named `name`.
    ///
    /// Returns `None` when the values are outside what the template can
    /// generate.
    fn generate(&self, name: &str, params: &Params, names: &Interner) -> Option<Module>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_parsing() {
        assert_eq!(ParamValue::Int(0).parse_like("12"), Some(ParamValue::Int(12)));
        assert_eq!(ParamValue::Int(0).parse_like("x"), None);
        assert_eq!(
            ParamValue::Str(String::new()).parse_like("and"),
            Some(ParamValue::Str("and".into()))
        );
        assert_eq!(ParamValue::Str(String::new()).parse_like(""), None);
    }

    #[test]
    fn accessors_check_type() {
        let p = Params(BTreeMap::from([
            ("width".to_string(), ParamValue::Int(4)),
            ("op".to_string(), ParamValue::Str("or".into())),
        ]));
        assert_eq!(p.int("width"), Some(4));
        assert_eq!(p.str("width"), None);
        assert_eq!(p.str("op"), Some("or"));
        assert_eq!(p.to_string(), "op=or, width=4");
        assert_eq!(serde_json::to_string(&p).unwrap(), r#"{"op":"or","width":4}"#);
    }
}
