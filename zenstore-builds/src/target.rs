//! Callable targets and their declared signatures.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{BuildsError, BuildsResult, Fields};

/// A callable that can be configured and instantiated by keyword.
pub trait Target: Send + Sync {
    /// Declared name; registrations without an explicit name use it.
    fn name(&self) -> &str;

    /// Fully qualified path recorded in rendered configs.
    fn path(&self) -> &str {
        self.name()
    }

    /// Parameters the target accepts.
    fn signature(&self) -> &Signature;

    /// Calls the target with a complete set of bound arguments.
    ///
    /// # Errors
    ///
    /// Implementations report argument conversion problems as
    /// [`BuildsError::InvalidArgument`] and their own failures as
    /// [`BuildsError::Execution`].
    fn call(&self, arguments: Fields) -> BuildsResult<Value>;
}

/// A named parameter, optionally with a default value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<Value>,
}

impl Parameter {
    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the default value, if any.
    #[must_use]
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Returns `true` when the parameter has no default.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// Ordered parameter list of a [`Target`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    parameters: Vec<Parameter>,
    #[serde(default)]
    var_keyword: bool,
}

impl Signature {
    /// Creates an empty signature.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a required parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.parameters.push(Parameter {
            name: name.into(),
            default: None,
        });
        self
    }

    /// Appends a parameter with a default value.
    #[must_use]
    pub fn param_with_default(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.parameters.push(Parameter {
            name: name.into(),
            default: Some(default.into()),
        });
        self
    }

    /// Accepts keyword arguments beyond the declared parameters.
    #[must_use]
    pub fn with_var_keyword(mut self) -> Self {
        self.var_keyword = true;
        self
    }

    /// Returns the declared parameters in order.
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Looks up a declared parameter.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Returns the names from `names` that this signature cannot bind, sorted.
    pub fn unexpected<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        if self.var_keyword {
            return Vec::new();
        }
        let mut unexpected: Vec<String> = names
            .into_iter()
            .filter(|name| self.parameter(name).is_none())
            .map(str::to_owned)
            .collect();
        unexpected.sort();
        unexpected.dedup();
        unexpected
    }

    /// Completes `arguments` with declared defaults.
    ///
    /// # Errors
    ///
    /// Returns [`BuildsError::UnknownArgument`] for names the signature cannot
    /// bind and [`BuildsError::MissingArgument`] for the first required
    /// parameter left unbound.
    pub fn bind(&self, target: &str, mut arguments: Fields) -> BuildsResult<Fields> {
        let unexpected = self.unexpected(arguments.keys());
        if !unexpected.is_empty() {
            return Err(BuildsError::UnknownArgument {
                target: target.to_owned(),
                names: unexpected,
            });
        }

        for parameter in &self.parameters {
            if arguments.contains_key(&parameter.name) {
                continue;
            }
            match &parameter.default {
                Some(default) => {
                    arguments.insert(parameter.name.clone(), default.clone());
                }
                None => {
                    return Err(BuildsError::MissingArgument {
                        target: target.to_owned(),
                        name: parameter.name.clone(),
                    });
                }
            }
        }

        Ok(arguments)
    }
}

type CallFn = dyn Fn(Fields) -> BuildsResult<Value> + Send + Sync;

/// A [`Target`] backed by a closure.
///
/// `#[target]` generates these for plain functions; they can also be built
/// by hand when the callable is not a free function.
pub struct FnTarget {
    name: String,
    path: String,
    signature: Signature,
    call: Box<CallFn>,
}

impl FnTarget {
    /// Creates a target named `name` that accepts `signature`.
    #[must_use]
    pub fn new<F>(name: impl Into<String>, signature: Signature, call: F) -> Self
    where
        F: Fn(Fields) -> BuildsResult<Value> + Send + Sync + 'static,
    {
        let name = name.into();
        Self {
            path: name.clone(),
            name,
            signature,
            call: Box::new(call),
        }
    }

    /// Sets the fully qualified path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }
}

impl Target for FnTarget {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn call(&self, arguments: Fields) -> BuildsResult<Value> {
        (self.call)(arguments)
    }
}

impl fmt::Debug for FnTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTarget")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{fields, target};

    #[target]
    fn scale(x: f64, factor: Option<f64>) -> f64 {
        x * factor.unwrap_or(2.0)
    }

    fn concat() -> FnTarget {
        FnTarget::new(
            "concat",
            Signature::new().param("head").param_with_default("tail", "!"),
            |arguments| {
                let head = arguments.get("head").and_then(Value::as_str).unwrap_or_default();
                let tail = arguments.get("tail").and_then(Value::as_str).unwrap_or_default();
                Ok(Value::String(format!("{head}{tail}")))
            },
        )
    }

    #[test]
    fn bind_fills_defaults() {
        let bound = concat()
            .signature()
            .bind("concat", fields! { head: "hi" })
            .expect("bind");
        assert_eq!(bound, fields! { head: "hi", tail: "!" });
    }

    #[test]
    fn bind_reports_missing_and_unknown() {
        let signature = concat().signature().clone();

        let err = signature.bind("concat", fields! {}).expect_err("missing head");
        assert!(matches!(err, BuildsError::MissingArgument { name, .. } if name == "head"));

        let err = signature
            .bind("concat", fields! { head: "a", zzz: 1, aaa: 2 })
            .expect_err("unknown args");
        assert!(
            matches!(err, BuildsError::UnknownArgument { names, .. } if names == ["aaa", "zzz"])
        );
    }

    #[test]
    fn var_keyword_accepts_anything() {
        let signature = Signature::new().param("a").with_var_keyword();
        assert!(signature.unexpected(["a", "b", "c"]).is_empty());
    }

    #[test]
    fn macro_derives_name_path_and_signature() {
        let target = scale_target();
        assert_eq!(target.name(), "scale");
        assert!(target.path().ends_with("::scale"));

        let params: Vec<_> = target.signature().parameters().iter().map(Parameter::name).collect();
        assert_eq!(params, ["x", "factor"]);
        assert!(target.signature().parameter("x").is_some_and(Parameter::is_required));
        assert_eq!(
            target.signature().parameter("factor").and_then(Parameter::default),
            Some(&Value::Null)
        );
    }

    #[test]
    fn macro_target_converts_arguments() {
        let target = scale_target();
        let bound = target
            .signature()
            .bind(target.path(), fields! { x: 1.5 })
            .expect("bind");
        assert_eq!(target.call(bound).expect("call"), json!(3.0));

        let err = target
            .call(fields! { x: "nope", factor: Value::Null })
            .expect_err("bad type");
        assert!(matches!(err, BuildsError::InvalidArgument { name, .. } if name == "x"));
    }
}
