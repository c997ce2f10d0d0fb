//! Declared classes and capabilities.

use crate::{Error, ParamType, Result, StaticType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// A method signature: name plus parameter types after the receiver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub name: String,

    #[serde(default)]
    pub params: Vec<ParamType>,
}

impl Signature {
    pub fn new(name: impl Into<String>, params: Vec<ParamType>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }
}

/// A class declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: String,

    /// Superclass, if any.
    #[serde(default)]
    pub parent: Option<String>,

    /// Capabilities this class statically declares.
    #[serde(default)]
    pub capabilities: Vec<String>,

    /// Instance methods declared directly on this class.
    #[serde(default, rename = "method")]
    pub methods: Vec<Signature>,
}

impl ClassDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            capabilities: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn implements(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.push(capability.into());
        self
    }

    pub fn method(mut self, name: impl Into<String>, params: Vec<ParamType>) -> Self {
        self.methods.push(Signature::new(name, params));
        self
    }
}

/// A capability (interface) declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityDecl {
    pub name: String,

    /// Capabilities this one extends.
    #[serde(default)]
    pub extends: Vec<String>,

    /// Members every conforming class provides.
    #[serde(default, rename = "member")]
    pub members: Vec<Signature>,
}

impl CapabilityDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extends: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn extends(mut self, capability: impl Into<String>) -> Self {
        self.extends.push(capability.into());
        self
    }

    pub fn member(mut self, name: impl Into<String>, params: Vec<ParamType>) -> Self {
        self.members.push(Signature::new(name, params));
        self
    }
}

/// Type table file layout.
///
/// Declarations are applied in file order, capabilities first, so a name
/// must be declared before anything refers to it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Declarations {
    #[serde(default, rename = "capability")]
    pub capabilities: Vec<CapabilityDecl>,

    #[serde(default, rename = "class")]
    pub classes: Vec<ClassDecl>,
}

/// An instance member visible from some static type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Class or capability that declares the member.
    pub owner: StaticType,
    pub signature: Signature,
}

/// The set of declared classes and capabilities.
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    classes: BTreeMap<String, ClassDecl>,
    capabilities: BTreeMap<String, CapabilityDecl>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a type table from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse a type table from a TOML string.
    pub fn parse(toml: &str) -> Result<Self> {
        let decls: Declarations = toml::from_str(toml).map_err(|e| Error::Parse(e.to_string()))?;
        Self::from_declarations(decls)
    }

    pub fn from_declarations(decls: Declarations) -> Result<Self> {
        let mut table = Self::new();
        for capability in decls.capabilities {
            table.declare_capability(capability)?;
        }
        for class in decls.classes {
            table.declare_class(class)?;
        }
        Ok(table)
    }

    /// Add a capability. Every capability it extends must already exist.
    pub fn declare_capability(&mut self, decl: CapabilityDecl) -> Result<()> {
        self.check_fresh(&decl.name)?;
        for parent in &decl.extends {
            if !self.capabilities.contains_key(parent) {
                return Err(Error::InvalidDeclaration(format!(
                    "capability {} extends undeclared capability {parent}",
                    decl.name
                )));
            }
        }
        tracing::trace!(capability = %decl.name, "declared capability");
        self.capabilities.insert(decl.name.clone(), decl);
        Ok(())
    }

    /// Add a class. Its parent and capabilities must already exist.
    pub fn declare_class(&mut self, decl: ClassDecl) -> Result<()> {
        self.check_fresh(&decl.name)?;
        if let Some(parent) = &decl.parent {
            if !self.classes.contains_key(parent) {
                return Err(Error::InvalidDeclaration(format!(
                    "class {} extends undeclared class {parent}",
                    decl.name
                )));
            }
        }
        for capability in &decl.capabilities {
            if !self.capabilities.contains_key(capability) {
                return Err(Error::InvalidDeclaration(format!(
                    "class {} declares undeclared capability {capability}",
                    decl.name
                )));
            }
        }
        tracing::trace!(class = %decl.name, parent = ?decl.parent, "declared class");
        self.classes.insert(decl.name.clone(), decl);
        Ok(())
    }

    /// Add an instance method to an already declared class.
    ///
    /// Re-declaring an identical signature is a no-op.
    pub fn declare_method(&mut self, class: &str, signature: Signature) -> Result<()> {
        let decl = self
            .classes
            .get_mut(class)
            .ok_or_else(|| Error::UnknownType(class.to_string()))?;
        if !decl.methods.contains(&signature) {
            decl.methods.push(signature);
        }
        Ok(())
    }

    fn check_fresh(&self, name: &str) -> Result<()> {
        if self.classes.contains_key(name) || self.capabilities.contains_key(name) {
            return Err(Error::InvalidDeclaration(format!(
                "type {name} is already declared"
            )));
        }
        Ok(())
    }

    pub fn class(&self, name: &str) -> Option<&ClassDecl> {
        self.classes.get(name)
    }

    pub fn capability(&self, name: &str) -> Option<&CapabilityDecl> {
        self.capabilities.get(name)
    }

    pub fn contains(&self, ty: &StaticType) -> bool {
        match ty {
            StaticType::Class(name) => self.classes.contains_key(name),
            StaticType::Capability(name) => self.capabilities.contains_key(name),
        }
    }

    /// The class itself followed by its superclasses, most derived first.
    pub fn ancestors<'a>(&'a self, class: &str) -> impl Iterator<Item = &'a ClassDecl> + 'a {
        std::iter::successors(self.classes.get(class), move |decl| {
            decl.parent.as_deref().and_then(|p| self.classes.get(p))
        })
    }

    /// Capabilities statically exposed by `ty`.
    ///
    /// For a class: everything it or a superclass declares, closed over
    /// capability extension. For a capability: itself and everything it
    /// extends.
    pub fn capabilities_of(&self, ty: &StaticType) -> BTreeSet<String> {
        let mut pending: Vec<String> = match ty {
            StaticType::Class(name) => self
                .ancestors(name)
                .flat_map(|decl| decl.capabilities.iter().cloned())
                .collect(),
            StaticType::Capability(name) => vec![name.clone()],
        };

        let mut seen = BTreeSet::new();
        while let Some(name) = pending.pop() {
            let Some(decl) = self.capabilities.get(&name) else {
                continue;
            };
            if seen.insert(name) {
                pending.extend(decl.extends.iter().cloned());
            }
        }
        seen
    }

    /// Whether an object of `class` may be viewed as `ty` (identity or upcast).
    pub fn conforms(&self, class: &str, ty: &StaticType) -> bool {
        match ty {
            StaticType::Class(target) => self.ancestors(class).any(|decl| &decl.name == target),
            StaticType::Capability(target) => self
                .capabilities_of(&StaticType::class(class))
                .contains(target),
        }
    }

    /// Instance members named `name` visible from `ty`, most derived first.
    ///
    /// A signature redeclared by a subclass hides the superclass one.
    pub fn instance_members(&self, ty: &StaticType, name: &str) -> Vec<Member> {
        let mut members: Vec<Member> = Vec::new();
        let mut push = |owner: StaticType, signature: &Signature| {
            if signature.name == name
                && !members.iter().any(|m| m.signature.params == signature.params)
            {
                members.push(Member {
                    owner,
                    signature: signature.clone(),
                });
            }
        };

        match ty {
            StaticType::Class(class) => {
                for decl in self.ancestors(class) {
                    for signature in &decl.methods {
                        push(StaticType::class(&decl.name), signature);
                    }
                }
            }
            StaticType::Capability(_) => {
                for capability in self.capabilities_of(ty) {
                    if let Some(decl) = self.capabilities.get(&capability) {
                        for signature in &decl.members {
                            push(StaticType::capability(&decl.name), signature);
                        }
                    }
                }
            }
        }
        members
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TypeTable {
        let toml = r#"
[[capability]]
name = "Texted"
member = [{ name = "text" }]

[[capability]]
name = "Escalatable"
extends = ["Texted"]

[[class]]
name = "Message"
method = [{ name = "sophisticated", params = ["int"] }]

[[class]]
name = "UnicodeMessage"
parent = "Message"

[[class]]
name = "EscalatableUnicodeMessage"
parent = "UnicodeMessage"
capabilities = ["Escalatable"]
"#;
        TypeTable::parse(toml).unwrap()
    }

    #[test]
    fn test_parse_toml() {
        let table = table();
        assert!(table.contains(&StaticType::class("Message")));
        assert!(table.contains(&StaticType::capability("Escalatable")));
        assert!(!table.contains(&StaticType::class("Escalatable")));
        assert_eq!(
            table.class("Message").unwrap().methods[0].params,
            vec![ParamType::Int]
        );
    }

    #[test]
    fn test_ancestors_most_derived_first() {
        let table = table();
        let names: Vec<_> = table
            .ancestors("EscalatableUnicodeMessage")
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(names, ["EscalatableUnicodeMessage", "UnicodeMessage", "Message"]);
        assert_eq!(table.ancestors("Nope").count(), 0);
    }

    #[test]
    fn test_capabilities_are_static() {
        let table = table();
        let caps = table.capabilities_of(&StaticType::class("EscalatableUnicodeMessage"));
        assert!(caps.contains("Escalatable"));
        assert!(caps.contains("Texted"));
        assert!(table.capabilities_of(&StaticType::class("UnicodeMessage")).is_empty());
    }

    #[test]
    fn test_conforms() {
        let table = table();
        let class = "EscalatableUnicodeMessage";
        assert!(table.conforms(class, &StaticType::class("Message")));
        assert!(table.conforms(class, &StaticType::capability("Texted")));
        assert!(!table.conforms("Message", &StaticType::class(class)));
        assert!(!table.conforms("Message", &StaticType::capability("Escalatable")));
    }

    #[test]
    fn test_instance_members_through_hierarchy() {
        let table = table();
        let members = table.instance_members(&StaticType::class("UnicodeMessage"), "sophisticated");
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].owner, StaticType::class("Message"));

        let members = table.instance_members(&StaticType::capability("Escalatable"), "text");
        assert_eq!(members[0].owner, StaticType::capability("Texted"));
    }

    #[test]
    fn test_subclass_signature_hides_parent() {
        let mut table = table();
        table
            .declare_method("UnicodeMessage", Signature::new("sophisticated", vec![ParamType::Int]))
            .unwrap();
        let members = table.instance_members(&StaticType::class("UnicodeMessage"), "sophisticated");
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].owner, StaticType::class("UnicodeMessage"));
    }

    #[test]
    fn test_rejects_forward_and_duplicate_references() {
        let mut table = table();
        let err = table
            .declare_class(ClassDecl::new("Orphan").extends("Missing"))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDeclaration(_)));

        let err = table.declare_class(ClassDecl::new("Message")).unwrap_err();
        assert!(matches!(err, Error::InvalidDeclaration(_)));

        let err = table
            .declare_capability(CapabilityDecl::new("Loud").extends("Quiet"))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDeclaration(_)));
    }

    #[test]
    fn test_parse_error() {
        let err = TypeTable::parse("[[class]]\nparent = 3").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("dispatch-no-such-type-table.toml");
        let err = TypeTable::load(&path).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("dispatch-types-{}.toml", std::process::id()));
        std::fs::write(&path, "[[class]]\nname = \"Message\"\n").unwrap();
        let table = TypeTable::load(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(table.unwrap().contains(&StaticType::class("Message")));
    }
}
