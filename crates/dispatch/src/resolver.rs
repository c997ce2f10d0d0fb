//! Call-site resolution: instance members first, then attached mixins.

use crate::conversion::{coerce, rank};
use crate::registry::{Body, MixinFn, MixinId, MixinRegistry};
use crate::types::display_params;
use crate::{Conversion, Error, ObjectRef, ParamType, Result, Signature, StaticType, TypeTable, Value};
use std::collections::HashMap;

/// Where the selected candidate comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// A member declared on the static type or one of its ancestors.
    /// Executed with virtual dispatch on the receiver's runtime class.
    Instance { owner: StaticType },
    /// An attached mixin.
    Mixin { id: MixinId, target: StaticType },
}

/// The outcome of resolving a call site, before execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub static_type: StaticType,
    pub name: String,
    pub origin: Origin,
    pub params: Vec<ParamType>,
    /// Conversion applied to each argument, in order.
    pub conversions: Vec<Conversion>,
}

impl Resolution {
    pub fn is_mixin(&self) -> bool {
        matches!(self.origin, Origin::Mixin { .. })
    }
}

struct Candidate {
    origin: Origin,
    params: Vec<ParamType>,
    label: String,
}

/// Resolves and executes calls against a type table, its instance method
/// bodies, and a mixin registry.
#[derive(Default)]
pub struct Resolver {
    types: TypeTable,
    mixins: MixinRegistry,
    methods: HashMap<(String, String, Vec<ParamType>), Body>,
}

impl Resolver {
    pub fn new(types: TypeTable) -> Self {
        Self {
            types,
            mixins: MixinRegistry::new(),
            methods: HashMap::new(),
        }
    }

    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    pub fn types_mut(&mut self) -> &mut TypeTable {
        &mut self.types
    }

    pub fn mixins(&self) -> &MixinRegistry {
        &self.mixins
    }

    /// Declare (if needed) and implement an instance method on `class`.
    pub fn define_method(
        &mut self,
        class: &str,
        name: impl Into<String>,
        params: Vec<ParamType>,
        body: Body,
    ) -> Result<()> {
        let signature = Signature::new(name, params);
        self.types.declare_method(class, signature.clone())?;
        self.methods
            .insert((class.to_string(), signature.name, signature.params), body);
        Ok(())
    }

    /// Attach a mixin to a declared class or capability.
    pub fn register(&mut self, mixin: MixinFn) -> Result<MixinId> {
        if !self.types.contains(&mixin.target) {
            return Err(Error::UnknownType(mixin.target.name().to_string()));
        }
        self.mixins.register(mixin)
    }

    /// Select the candidate a call to `name` with `args` binds to when the
    /// receiver is statically typed as `ty`.
    ///
    /// Instance members visible from `ty` shadow every mixin of the same
    /// name, however well the mixin would match.
    pub fn resolve(&self, ty: &StaticType, name: &str, args: &[Value]) -> Result<Resolution> {
        if !self.types.contains(ty) {
            return Err(Error::UnknownType(ty.name().to_string()));
        }

        let members = self.types.instance_members(ty, name);
        let candidates: Vec<Candidate> = if !members.is_empty() {
            tracing::debug!(%ty, name, count = members.len(), "instance members shadow mixins");
            members
                .into_iter()
                .map(|member| Candidate {
                    label: format!(
                        "{}.{}{}",
                        member.owner.name(),
                        name,
                        display_params(&member.signature.params)
                    ),
                    origin: Origin::Instance {
                        owner: member.owner,
                    },
                    params: member.signature.params,
                })
                .collect()
        } else {
            let mixins = self.mixins.candidates(name, ty, &self.types);
            tracing::debug!(%ty, name, count = mixins.len(), "collected mixin candidates");
            mixins
                .into_iter()
                .map(|(id, mixin)| Candidate {
                    label: mixin.label(),
                    origin: Origin::Mixin {
                        id,
                        target: mixin.target.clone(),
                    },
                    params: mixin.params.clone(),
                })
                .collect()
        };

        if candidates.is_empty() {
            return Err(Error::no_member(ty, name));
        }

        let (best, conversions) = self.select(ty, name, args, candidates)?;
        tracing::debug!(%ty, name, selected = %best.label, ?conversions, "resolved call");

        Ok(Resolution {
            static_type: ty.clone(),
            name: name.to_string(),
            origin: best.origin,
            params: best.params,
            conversions,
        })
    }

    /// Overload resolution: the lexicographically smallest conversion vector
    /// wins; a tie for smallest is an ambiguity.
    fn select(
        &self,
        ty: &StaticType,
        name: &str,
        args: &[Value],
        candidates: Vec<Candidate>,
    ) -> Result<(Candidate, Vec<Conversion>)> {
        let total = candidates.len();
        let mut applicable: Vec<(Candidate, Vec<Conversion>)> = candidates
            .into_iter()
            .filter_map(|c| rank(args, &c.params, &self.types).map(|r| (c, r)))
            .collect();

        let Some(best_rank) = applicable.iter().map(|(_, r)| r.clone()).min() else {
            let kinds: Vec<&str> = args.iter().map(Value::kind).collect();
            return Err(Error::NoMatchingMember {
                ty: ty.clone(),
                name: name.to_string(),
                detail: Some(format!(
                    "none of {total} candidate(s) accepts ({})",
                    kinds.join(", ")
                )),
            });
        };

        applicable.retain(|(_, r)| *r == best_rank);
        if applicable.len() > 1 {
            return Err(Error::AmbiguousMatch {
                ty: ty.clone(),
                name: name.to_string(),
                candidates: applicable.into_iter().map(|(c, _)| c.label).collect(),
            });
        }

        applicable
            .pop()
            .ok_or_else(|| Error::no_member(ty, name))
    }

    /// Run a resolved call on `receiver`.
    ///
    /// `args` must still be accepted by the resolved parameter list.
    pub fn execute(&self, resolution: &Resolution, receiver: &ObjectRef, args: &[Value]) -> Result<Value> {
        self.check_receiver(receiver, &resolution.static_type)?;
        self.run(resolution, receiver, args)
    }

    /// Resolve against `ty` and execute on `receiver` in one step.
    pub fn invoke(&self, receiver: &ObjectRef, ty: &StaticType, name: &str, args: &[Value]) -> Result<Value> {
        self.check_receiver(receiver, ty)?;
        let resolution = self.resolve(ty, name, args)?;
        self.run(&resolution, receiver, args)
    }

    fn run(&self, resolution: &Resolution, receiver: &ObjectRef, args: &[Value]) -> Result<Value> {
        if rank(args, &resolution.params, &self.types).is_none() {
            let kinds: Vec<&str> = args.iter().map(Value::kind).collect();
            return Err(Error::NoMatchingMember {
                ty: resolution.static_type.clone(),
                name: resolution.name.clone(),
                detail: Some(format!(
                    "resolved {} does not accept ({})",
                    display_params(&resolution.params),
                    kinds.join(", ")
                )),
            });
        }

        let args: Vec<Value> = args
            .iter()
            .zip(&resolution.params)
            .map(|(arg, param)| coerce(arg, param))
            .collect();

        let body = match &resolution.origin {
            Origin::Mixin { id, .. } => self
                .mixins
                .get(*id)
                .map(|mixin| &mixin.body)
                .ok_or_else(|| Error::no_member(&resolution.static_type, &resolution.name))?,
            Origin::Instance { .. } => self.implementation(receiver.class(), &resolution.name, &resolution.params)?,
        };
        body(receiver, &args)
    }

    /// Invoke with the receiver's own class as the static type.
    pub fn invoke_exact(&self, receiver: &ObjectRef, name: &str, args: &[Value]) -> Result<Value> {
        let ty = StaticType::class(receiver.class());
        self.invoke(receiver, &ty, name, args)
    }

    fn check_receiver(&self, receiver: &ObjectRef, ty: &StaticType) -> Result<()> {
        let class = receiver.class();
        if self.types.class(class).is_none() {
            return Err(Error::UnknownType(class.to_string()));
        }
        if !self.types.conforms(class, ty) {
            return Err(Error::InvalidReceiver {
                ty: ty.clone(),
                class: class.to_string(),
            });
        }
        Ok(())
    }

    /// Most derived body for `name(params)` starting at `class`.
    fn implementation(&self, class: &str, name: &str, params: &[ParamType]) -> Result<&Body> {
        self.types
            .ancestors(class)
            .find_map(|decl| {
                self.methods
                    .get(&(decl.name.clone(), name.to_string(), params.to_vec()))
            })
            .ok_or_else(|| Error::Unimplemented {
                class: class.to_string(),
                name: name.to_string(),
            })
    }
}
