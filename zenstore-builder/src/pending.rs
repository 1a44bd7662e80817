//! Accumulated builder state.

use serde_json::Value;
use zenstore_builds::{BuildOptions, Fields};
use zenstore_repository::StoreConfig;

use crate::{StoreError, StoreResult};

/// Keyword naming the entry.
pub const NAME: &str = "name";
/// Keyword naming the group path.
pub const GROUP: &str = "group";
/// Keyword naming the package label.
pub const PACKAGE: &str = "package";
/// Keyword making the node partial.
pub const ZEN_PARTIAL: &str = "zen_partial";
/// Keyword recording every defaulted parameter on the node.
pub const POPULATE_FULL_SIGNATURE: &str = "populate_full_signature";
/// Keyword carrying meta fields.
pub const ZEN_META: &str = "zen_meta";

/// Keyword state collected by a builder before finalization.
///
/// `null` is treated like an absent key, so it never clears a value
/// inherited from an earlier call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PendingRegistration {
    overrides: Fields,
    name: Option<String>,
    group: Option<String>,
    package: Option<String>,
    partial: Option<bool>,
    populate_full_signature: Option<bool>,
    meta: Option<Fields>,
}

impl PendingRegistration {
    /// Splits keyword fields into placement, build options and overrides.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidFieldType`] for the first reserved
    /// keyword whose value has the wrong type.
    pub fn from_fields(mut fields: Fields) -> StoreResult<Self> {
        let name = take_string(&mut fields, NAME)?;
        let group = take_string(&mut fields, GROUP)?;
        let package = take_string(&mut fields, PACKAGE)?;
        let partial = take_bool(&mut fields, ZEN_PARTIAL)?;
        let populate_full_signature = take_bool(&mut fields, POPULATE_FULL_SIGNATURE)?;
        let meta = take_object(&mut fields, ZEN_META)?;

        Ok(Self {
            overrides: fields,
            name,
            group,
            package,
            partial,
            populate_full_signature,
            meta,
        })
    }

    /// Combines two states; `newer` wins field by field and key by key.
    #[must_use]
    pub fn merge(self, newer: Self) -> Self {
        Self {
            overrides: self.overrides.merged(newer.overrides),
            name: newer.name.or(self.name),
            group: newer.group.or(self.group),
            package: newer.package.or(self.package),
            partial: newer.partial.or(self.partial),
            populate_full_signature: newer.populate_full_signature.or(self.populate_full_signature),
            meta: match (self.meta, newer.meta) {
                (Some(older), Some(newer)) => Some(older.merged(newer)),
                (older, newer) => newer.or(older),
            },
        }
    }

    /// Argument overrides for the target.
    #[must_use]
    pub fn overrides(&self) -> &Fields {
        &self.overrides
    }

    /// Explicit entry name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Explicit group path.
    #[must_use]
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Explicit package label.
    #[must_use]
    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    pub(crate) fn into_parts(self, config: &StoreConfig) -> (Placement, Fields, BuildOptions) {
        let options = BuildOptions::new()
            .partial(self.partial.unwrap_or(false))
            .populate_full_signature(
                self.populate_full_signature
                    .unwrap_or(config.populate_full_signature),
            )
            .meta(self.meta.unwrap_or_default());
        let placement = Placement {
            name: self.name,
            group: self.group,
            package: self.package,
        };
        (placement, self.overrides, options)
    }
}

pub(crate) struct Placement {
    pub(crate) name: Option<String>,
    pub(crate) group: Option<String>,
    pub(crate) package: Option<String>,
}

fn take_string(fields: &mut Fields, field: &'static str) -> StoreResult<Option<String>> {
    match fields.remove(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) if !value.is_empty() => Ok(Some(value)),
        Some(other) => Err(invalid(field, "a non-empty string", &other)),
    }
}

fn take_bool(fields: &mut Fields, field: &'static str) -> StoreResult<Option<bool>> {
    match fields.remove(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(value)) => Ok(Some(value)),
        Some(other) => Err(invalid(field, "a boolean", &other)),
    }
}

fn take_object(fields: &mut Fields, field: &'static str) -> StoreResult<Option<Fields>> {
    match fields.remove(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map.into_iter().collect())),
        Some(other) => Err(invalid(field, "an object", &other)),
    }
}

fn invalid(field: &'static str, expected: &'static str, found: &Value) -> StoreError {
    StoreError::InvalidFieldType {
        field,
        expected,
        found: found.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use zenstore_builds::fields;

    use super::*;

    #[test]
    fn splits_placement_from_overrides() {
        let pending =
            PendingRegistration::from_fields(fields! { name: "dunk", group: "g", a: 1 }).expect("parse");
        assert_eq!(pending.name(), Some("dunk"));
        assert_eq!(pending.group(), Some("g"));
        assert_eq!(pending.package(), None);
        assert_eq!(pending.overrides(), &fields! { a: 1 });
    }

    #[test]
    fn merge_is_last_wins_per_field() {
        let older = PendingRegistration::from_fields(fields! { name: "O1", package: "p", a: -22 })
            .expect("older");
        let newer = PendingRegistration::from_fields(fields! { name: "O2", a: 1, b: -22 })
            .expect("newer");

        let merged = older.merge(newer);
        assert_eq!(merged.name(), Some("O2"));
        assert_eq!(merged.package(), Some("p"));
        assert_eq!(merged.overrides(), &fields! { a: 1, b: -22 });
    }

    #[test]
    fn null_does_not_clear_inherited_values() {
        let older = PendingRegistration::from_fields(fields! { name: "kept" }).expect("older");
        let newer =
            PendingRegistration::from_fields(fields! { name: Value::Null }).expect("newer");
        assert_eq!(older.merge(newer).name(), Some("kept"));
    }

    #[test]
    fn meta_fields_merge_key_by_key() {
        let older = PendingRegistration::from_fields(fields! { zen_meta: json!({ "x": 1, "y": 1 }) })
            .expect("older");
        let newer =
            PendingRegistration::from_fields(fields! { zen_meta: json!({ "y": 2 }) }).expect("newer");

        let (_, _, options) = older.merge(newer).into_parts(&StoreConfig::new());
        assert_eq!(options.meta, fields! { x: 1, y: 2 });
    }

    #[test]
    fn build_options_fall_back_to_config() {
        let config = StoreConfig::new().with_populate_full_signature(true);

        let (_, _, options) = PendingRegistration::default().into_parts(&config);
        assert!(options.populate_full_signature);
        assert!(!options.partial);

        let explicit = PendingRegistration::from_fields(fields! { populate_full_signature: false })
            .expect("parse");
        let (_, _, options) = explicit.into_parts(&config);
        assert!(!options.populate_full_signature);
    }

    #[test]
    fn rejects_wrongly_typed_options() {
        for fields in [
            fields! { zen_partial: "yes" },
            fields! { populate_full_signature: 1 },
            fields! { zen_meta: [1, 2] },
            fields! { name: "" },
            fields! { group: "" },
            fields! { package: "" },
        ] {
            let err = PendingRegistration::from_fields(fields).expect_err("invalid");
            assert!(matches!(err, StoreError::InvalidFieldType { .. }));
        }
    }
}
