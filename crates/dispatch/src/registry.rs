//! Mixin registry: free functions attached to a class or capability.

use crate::types::display_params;
use crate::{Error, ObjectRef, ParamType, Result, StaticType, TypeTable, Value};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Executable body shared by instance methods and mixins.
///
/// Receives the receiver and the arguments, already converted to the
/// declared parameter types.
pub type Body = Rc<dyn Fn(&ObjectRef, &[Value]) -> Result<Value>>;

/// Wrap a closure as a [`Body`].
pub fn body<F>(f: F) -> Body
where
    F: Fn(&ObjectRef, &[Value]) -> Result<Value> + 'static,
{
    Rc::new(f)
}

/// Identifies a registered mixin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MixinId(usize);

/// A free function attached to `target`.
#[derive(Clone)]
pub struct MixinFn {
    pub name: String,
    pub target: StaticType,
    pub params: Vec<ParamType>,
    pub body: Body,
}

impl MixinFn {
    pub fn new(
        name: impl Into<String>,
        target: StaticType,
        params: Vec<ParamType>,
        body: Body,
    ) -> Self {
        Self {
            name: name.into(),
            target,
            params,
            body,
        }
    }

    /// `Escalatable::escalated1()` style label for diagnostics.
    pub fn label(&self) -> String {
        format!(
            "mixin {}::{}{}",
            self.target.name(),
            self.name,
            display_params(&self.params)
        )
    }
}

impl fmt::Debug for MixinFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MixinFn")
            .field("name", &self.name)
            .field("target", &self.target)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// All registered mixins, grouped by name.
#[derive(Debug, Default)]
pub struct MixinRegistry {
    mixins: Vec<MixinFn>,
    by_name: HashMap<String, Vec<MixinId>>,
}

impl MixinRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a mixin. The same name, target and parameter list may only be
    /// registered once.
    pub fn register(&mut self, mixin: MixinFn) -> Result<MixinId> {
        let ids = self.by_name.entry(mixin.name.clone()).or_default();
        let duplicate = ids.iter().any(|id| {
            let existing = &self.mixins[id.0];
            existing.target == mixin.target && existing.params == mixin.params
        });
        if duplicate {
            return Err(Error::InvalidDeclaration(format!(
                "{} is already registered",
                mixin.label()
            )));
        }

        let id = MixinId(self.mixins.len());
        tracing::debug!(mixin = %mixin.label(), "registered mixin");
        ids.push(id);
        self.mixins.push(mixin);
        Ok(id)
    }

    pub fn get(&self, id: MixinId) -> Option<&MixinFn> {
        self.mixins.get(id.0)
    }

    /// Mixins named `name` that are visible from static type `ty`.
    ///
    /// A mixin is visible when its target is `ty`, a superclass of `ty`, or a
    /// capability `ty` statically declares. What the object behind the call
    /// site implements at runtime plays no part.
    pub fn candidates(&self, name: &str, ty: &StaticType, types: &TypeTable) -> Vec<(MixinId, &MixinFn)> {
        let Some(ids) = self.by_name.get(name) else {
            return Vec::new();
        };

        let capabilities = types.capabilities_of(ty);
        let visible = |target: &StaticType| match (target, ty) {
            (StaticType::Capability(cap), _) => capabilities.contains(cap),
            (StaticType::Class(target), StaticType::Class(class)) => {
                types.ancestors(class).any(|decl| &decl.name == target)
            }
            (StaticType::Class(_), StaticType::Capability(_)) => false,
        };

        ids.iter()
            .map(|&id| (id, &self.mixins[id.0]))
            .filter(|(_, mixin)| visible(&mixin.target))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.mixins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mixins.is_empty()
    }
}
