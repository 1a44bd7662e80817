//! The curried registration builder.

use std::sync::Arc;

use tracing::debug;
use zenstore_builds::{Fields, Target, builds};
use zenstore_repository::Repository;

use crate::{PendingRegistration, StoreResult};

/// Accumulates registration state for a repository.
///
/// Builders are values: [`StoreBuilder::with_overrides`] leaves `self`
/// untouched and returns a new builder, so one builder can serve as the
/// template for any number of registrations.
#[derive(Clone, Debug)]
pub struct StoreBuilder<'r> {
    repository: &'r Repository,
    pending: PendingRegistration,
}

/// Returns an empty builder publishing into `repository`.
#[must_use]
pub fn store(repository: &Repository) -> StoreBuilder<'_> {
    StoreBuilder::new(repository)
}

/// Registers `target` in one step.
///
/// Equivalent to `store(repository).finalize(target, fields)`.
///
/// # Errors
///
/// See [`StoreBuilder::finalize`].
pub fn store_target<T>(repository: &Repository, target: Arc<T>, fields: Fields) -> StoreResult<Arc<T>>
where
    T: Target + 'static,
{
    store(repository).finalize(target, fields)
}

impl<'r> StoreBuilder<'r> {
    /// Creates an empty builder.
    #[must_use]
    pub fn new(repository: &'r Repository) -> Self {
        Self {
            repository,
            pending: PendingRegistration::default(),
        }
    }

    /// Returns the state accumulated so far.
    #[must_use]
    pub fn pending(&self) -> &PendingRegistration {
        &self.pending
    }

    /// Returns a new builder with `fields` merged over the current state.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StoreError::InvalidFieldType`] when a placement field
    /// or build option in `fields` has the wrong type.
    pub fn with_overrides(&self, fields: Fields) -> StoreResult<Self> {
        let newer = PendingRegistration::from_fields(fields)?;
        let pending = self.pending.clone().merge(newer);
        debug!(
            overrides = %pending.overrides(),
            name = pending.name(),
            group = pending.group(),
            "curried store builder"
        );
        Ok(Self {
            repository: self.repository,
            pending,
        })
    }

    /// Registers `target` and returns it unchanged.
    ///
    /// `fields` are merged over the accumulated state first. Unset names
    /// default to the target's declared name and unset groups to the
    /// repository's default group.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StoreError::InvalidFieldType`] for mistyped fields,
    /// [`crate::StoreError::Builds`] when the target rejects the overrides,
    /// and [`crate::StoreError::Repository`] when the key is taken or
    /// malformed. Nothing is published on error.
    pub fn finalize<T>(&self, target: Arc<T>, fields: Fields) -> StoreResult<Arc<T>>
    where
        T: Target + 'static,
    {
        let pending = self
            .pending
            .clone()
            .merge(PendingRegistration::from_fields(fields)?);
        let (placement, overrides, options) = pending.into_parts(self.repository.config());

        let name = placement.name.unwrap_or_else(|| target.name().to_owned());
        let group = placement
            .group
            .unwrap_or_else(|| self.repository.default_group().to_owned());

        let erased: Arc<dyn Target> = target.clone();
        let node = builds(erased, overrides, &options)?.with_package(placement.package);
        self.repository.insert(&group, &name, node)?;

        Ok(target)
    }

    /// Registers `target` with the accumulated state alone.
    ///
    /// # Errors
    ///
    /// See [`StoreBuilder::finalize`].
    pub fn register<T>(&self, target: Arc<T>) -> StoreResult<Arc<T>>
    where
        T: Target + 'static,
    {
        self.finalize(target, Fields::new())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};
    use zenstore_builds::{BuildsError, FnTarget, Instance, fields, target};
    use zenstore_repository::{RepositoryError, StoreConfig};

    use super::*;
    use crate::StoreError;

    #[target]
    fn func(a: i64, b: i64) -> (i64, i64) {
        (a, b)
    }

    #[target]
    fn optimizer(lr: f64, momentum: Option<f64>) -> (f64, f64) {
        (lr, momentum.unwrap_or(0.9))
    }

    fn instantiate(repo: &Repository, group: Option<&str>, name: &str) -> Value {
        repo.get(group, name)
            .expect("registered")
            .node()
            .instantiate(&Fields::new())
            .and_then(Instance::into_value)
            .expect("instantiate")
    }

    #[test]
    fn builder_steps_do_not_mutate_their_source() {
        let repo = Repository::new();
        let base = store(&repo).with_overrides(fields! { a: 1 }).expect("base");
        let derived = base.with_overrides(fields! { a: 2, name: "x" }).expect("derived");

        assert_eq!(base.pending().overrides(), &fields! { a: 1 });
        assert_eq!(base.pending().name(), None);
        assert_eq!(derived.pending().overrides(), &fields! { a: 2 });
        assert_eq!(derived.pending().name(), Some("x"));
    }

    #[test]
    fn one_builder_seeds_independent_registrations() {
        let repo = Repository::new();
        let func = Arc::new(func_target());
        let base = store(&repo)
            .with_overrides(fields! { a: 1, group: "pairs" })
            .expect("base");

        base.finalize(Arc::clone(&func), fields! { name: "low", b: 2 })
            .expect("low");
        base.finalize(Arc::clone(&func), fields! { name: "high", b: 200 })
            .expect("high");

        assert_eq!(instantiate(&repo, Some("pairs"), "low"), json!([1, 2]));
        assert_eq!(instantiate(&repo, Some("pairs"), "high"), json!([1, 200]));
        assert!(base.pending().overrides().get("b").is_none());
    }

    #[test]
    fn finalize_attaches_package() {
        let repo = Repository::new();
        store_target(&repo, Arc::new(func_target()), fields! { package: "pkg", a: 1, b: 2 })
            .expect("store");
        assert_eq!(repo.get(None, "func").expect("get").package(), Some("pkg"));
    }

    #[test]
    fn register_uses_accumulated_state() {
        let repo = Repository::new();
        store(&repo)
            .with_overrides(fields! { a: 3, b: 4 })
            .and_then(|builder| builder.register(Arc::new(func_target())))
            .expect("register");
        assert_eq!(instantiate(&repo, None, "func"), json!([3, 4]));
    }

    #[test]
    fn invalid_placement_fails_before_finalize() {
        let repo = Repository::new();
        let err = store(&repo)
            .with_overrides(fields! { group: 7 })
            .expect_err("mistyped group");
        assert_eq!(err.to_string(), "`group` must be a non-empty string, got: 7");
        assert!(repo.is_empty());
    }

    #[test]
    fn root_is_reachable_only_through_an_empty_default_group() {
        let repo = Repository::with_config(StoreConfig::new().with_default_group("models"));
        let err = store_target(&repo, Arc::new(func_target()), fields! { group: "", a: 1, b: 2 })
            .expect_err("explicit root");
        assert!(matches!(err, StoreError::InvalidFieldType { field: "group", .. }));

        store_target(&repo, Arc::new(func_target()), fields! { a: 1, b: 2 }).expect("default group");
        assert!(repo.contains(Some("models"), "func"));
        assert!(!repo.contains(Some(""), "func"));

        let root = Repository::new();
        store_target(&root, Arc::new(func_target()), fields! { a: 1, b: 2 }).expect("root");
        assert_eq!(instantiate(&root, Some(""), "func"), json!([1, 2]));
    }

    #[test]
    fn unknown_override_surfaces_at_finalize() {
        let repo = Repository::new();
        let builder = store(&repo)
            .with_overrides(fields! { c: 3 })
            .expect("unknown keys are accepted while currying");

        let err = builder.register(Arc::new(func_target())).expect_err("unknown arg");
        assert!(matches!(
            err,
            StoreError::Builds(BuildsError::UnknownArgument { ref names, .. }) if names == &["c"]
        ));
        assert!(repo.is_empty());
    }

    #[test]
    fn collision_is_reported_and_first_entry_kept() {
        let repo = Repository::new();
        let builder = store(&repo)
            .with_overrides(fields! { group: "g", name: "x" })
            .expect("builder");
        builder
            .finalize(Arc::new(func_target()), fields! { a: 1, b: 2 })
            .expect("first");

        let other = Arc::new(FnTarget::new("other", Default::default(), |_| Ok(Value::Null)));
        let err = builder.register(other).expect_err("collision");
        assert!(matches!(
            err,
            StoreError::Repository(RepositoryError::KeyCollision { .. })
        ));
        assert_eq!(instantiate(&repo, Some("g"), "x"), json!([1, 2]));
    }

    #[test]
    fn build_options_flow_into_the_node() {
        let repo = Repository::with_config(StoreConfig::new().with_populate_full_signature(true));
        store_target(
            &repo,
            Arc::new(optimizer_target()),
            fields! { lr: 0.1, zen_partial: true, zen_meta: json!({ "note": "sgd" }) },
        )
        .expect("store");

        let entry = repo.get(None, "optimizer").expect("get");
        assert!(entry.node().is_partial());
        assert_eq!(entry.node().arguments(), &fields! { lr: 0.1, momentum: Value::Null });
        assert_eq!(entry.node().meta(), &fields! { note: "sgd" });

        let partial = entry
            .node()
            .instantiate(&Fields::new())
            .and_then(Instance::into_partial)
            .expect("partial");
        assert_eq!(partial.call(fields! { momentum: 0.5 }).expect("call"), json!([0.1, 0.5]));
    }
}
