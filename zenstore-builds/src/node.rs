//! Immutable config nodes and their instantiation.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::{BuildsError, BuildsResult, Fields, NodeId, Target};

const RESERVED_NAMES: &[&str] = &["_target_", "_partial_", "_args_", "_recursive_", "_convert_"];
const RESERVED_PREFIXES: &[&str] = &["hydra_", "zen_", "_zen_"];

/// Returns `true` for field names kept for config bookkeeping.
#[must_use]
pub fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.contains(&name) || RESERVED_PREFIXES.iter().any(|p| name.starts_with(p))
}

fn check_reserved<'a>(names: impl IntoIterator<Item = &'a str>) -> BuildsResult<()> {
    match names.into_iter().find(|name| is_reserved(name)) {
        Some(name) => Err(BuildsError::ReservedField {
            name: name.to_owned(),
        }),
        None => Ok(()),
    }
}

/// Options steering how [`builds`] shapes a node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BuildOptions {
    /// Instantiation yields a [`PartialCall`] instead of calling the target.
    pub partial: bool,
    /// Record every defaulted parameter, not only the overridden ones.
    pub populate_full_signature: bool,
    /// Fields stored on the node but never passed to the target.
    pub meta: Fields,
}

impl BuildOptions {
    /// Creates default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the node partial.
    #[must_use]
    pub fn partial(mut self, partial: bool) -> Self {
        self.partial = partial;
        self
    }

    /// Enables recording of defaulted parameters.
    #[must_use]
    pub fn populate_full_signature(mut self, enabled: bool) -> Self {
        self.populate_full_signature = enabled;
        self
    }

    /// Sets meta fields.
    #[must_use]
    pub fn meta(mut self, meta: Fields) -> Self {
        self.meta = meta;
        self
    }
}

/// A target paired with a fixed set of arguments.
///
/// Nodes are created by [`builds`] and never mutated afterwards.
#[derive(Clone)]
pub struct ConfigNode {
    id: NodeId,
    target: Arc<dyn Target>,
    arguments: Fields,
    meta: Fields,
    partial: bool,
    package: Option<String>,
}

impl ConfigNode {
    /// Returns the identifier assigned at construction.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the configured target.
    #[must_use]
    pub fn target(&self) -> &Arc<dyn Target> {
        &self.target
    }

    /// Returns the stored arguments.
    #[must_use]
    pub fn arguments(&self) -> &Fields {
        &self.arguments
    }

    /// Returns the meta fields.
    #[must_use]
    pub fn meta(&self) -> &Fields {
        &self.meta
    }

    /// Returns `true` when instantiation yields a partial.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        self.partial
    }

    /// Returns the package label.
    #[must_use]
    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    /// Attaches the package label.
    #[must_use]
    pub fn with_package(mut self, package: Option<String>) -> Self {
        self.package = package;
        self
    }

    /// Renders the node as a config document.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut document = Map::new();
        document.insert("_target_".into(), Value::String(self.target.path().to_owned()));
        if self.partial {
            document.insert("_partial_".into(), Value::Bool(true));
        }
        for (key, value) in self.arguments.iter().chain(self.meta.iter()) {
            document.insert(key.clone(), value.clone());
        }
        Value::Object(document)
    }

    /// Instantiates the node with `overrides` layered over its arguments.
    ///
    /// Later values win per key, meta fields are dropped, and declared
    /// defaults fill the rest. Partial nodes return the bound arguments as a
    /// [`PartialCall`] without calling the target.
    ///
    /// # Errors
    ///
    /// Returns [`BuildsError::ReservedField`] or
    /// [`BuildsError::UnknownArgument`] for invalid override keys,
    /// [`BuildsError::MissingArgument`] for unbound required parameters, and
    /// propagates failures from the target.
    pub fn instantiate(&self, overrides: &Fields) -> BuildsResult<Instance> {
        check_reserved(overrides.keys())?;
        let signature = self.target.signature();
        let unexpected: Vec<String> = signature
            .unexpected(overrides.keys())
            .into_iter()
            .filter(|name| !self.meta.contains_key(name))
            .collect();
        if !unexpected.is_empty() {
            return Err(BuildsError::UnknownArgument {
                target: self.target.path().to_owned(),
                names: unexpected,
            });
        }

        let mut arguments = self.arguments.clone().merged(overrides.clone());
        for key in self.meta.keys() {
            arguments.remove(key);
        }

        if self.partial {
            return Ok(Instance::Partial(PartialCall {
                target: Arc::clone(&self.target),
                bound: arguments,
                meta_keys: self.meta.keys().map(str::to_owned).collect(),
            }));
        }

        call_target(self.target.as_ref(), arguments).map(Instance::Value)
    }
}

impl fmt::Debug for ConfigNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigNode")
            .field("id", &self.id)
            .field("target", &self.target.path())
            .field("arguments", &self.arguments)
            .field("meta", &self.meta)
            .field("partial", &self.partial)
            .field("package", &self.package)
            .finish()
    }
}

fn call_target(target: &dyn Target, arguments: Fields) -> BuildsResult<Value> {
    let bound = target.signature().bind(target.path(), arguments)?;
    target.call(bound)
}

/// Result of instantiating a [`ConfigNode`].
#[derive(Debug)]
pub enum Instance {
    /// The target's return value.
    Value(Value),
    /// A target awaiting its remaining arguments.
    Partial(PartialCall),
}

impl Instance {
    /// Returns the value of a fully instantiated node.
    ///
    /// # Errors
    ///
    /// Returns [`BuildsError::PartialInstance`] for partial nodes.
    pub fn into_value(self) -> BuildsResult<Value> {
        match self {
            Self::Value(value) => Ok(value),
            Self::Partial(partial) => Err(BuildsError::PartialInstance {
                target: partial.target.path().to_owned(),
            }),
        }
    }

    /// Returns the partial produced by a partial node.
    ///
    /// # Errors
    ///
    /// Returns [`BuildsError::NotPartial`] when the node was instantiated
    /// to a value.
    pub fn into_partial(self) -> BuildsResult<PartialCall> {
        match self {
            Self::Partial(partial) => Ok(partial),
            Self::Value(_) => Err(BuildsError::NotPartial),
        }
    }
}

/// A target with some arguments already bound.
#[derive(Clone)]
pub struct PartialCall {
    target: Arc<dyn Target>,
    bound: Fields,
    meta_keys: Vec<String>,
}

impl PartialCall {
    /// Returns the arguments bound so far.
    #[must_use]
    pub fn bound(&self) -> &Fields {
        &self.bound
    }

    /// Calls the target with `arguments` layered over the bound ones.
    ///
    /// Meta field names are accepted and dropped, as in
    /// [`ConfigNode::instantiate`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`ConfigNode::instantiate`].
    pub fn call(&self, arguments: Fields) -> BuildsResult<Value> {
        check_reserved(arguments.keys())?;
        let mut merged = self.bound.clone().merged(arguments);
        for key in &self.meta_keys {
            merged.remove(key);
        }
        call_target(self.target.as_ref(), merged)
    }
}

impl fmt::Debug for PartialCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartialCall")
            .field("target", &self.target.path())
            .field("bound", &self.bound)
            .finish()
    }
}

/// Builds a node that calls `target` with `overrides`.
///
/// # Errors
///
/// Returns [`BuildsError::ReservedField`] when an override or meta name is
/// reserved, [`BuildsError::UnknownArgument`] when an override names no
/// parameter of the target, and [`BuildsError::MetaCollision`] when a meta
/// field shadows a parameter.
pub fn builds(
    target: Arc<dyn Target>,
    overrides: Fields,
    options: &BuildOptions,
) -> BuildsResult<ConfigNode> {
    check_reserved(overrides.keys().chain(options.meta.keys()))?;

    let signature = target.signature();
    let unexpected = signature.unexpected(overrides.keys());
    if !unexpected.is_empty() {
        return Err(BuildsError::UnknownArgument {
            target: target.path().to_owned(),
            names: unexpected,
        });
    }

    if let Some(name) = options.meta.keys().find(|name| signature.parameter(name).is_some()) {
        return Err(BuildsError::MetaCollision {
            target: target.path().to_owned(),
            name: name.to_owned(),
        });
    }

    let mut arguments = Fields::new();
    if options.populate_full_signature {
        for parameter in signature.parameters() {
            if let Some(default) = parameter.default() {
                arguments.insert(parameter.name(), default.clone());
            }
        }
    }
    arguments.merge(overrides);

    debug!(
        callable = target.path(),
        arguments = %arguments,
        partial = options.partial,
        "built config node"
    );

    Ok(ConfigNode {
        id: NodeId::random(),
        target,
        arguments,
        meta: options.meta.clone(),
        partial: options.partial,
        package: None,
    })
}
