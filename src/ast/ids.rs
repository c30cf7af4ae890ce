use std::fmt::{self, Display, Formatter};

/// A module name as written in the source, e.g `foo::bar` or `::foo::bar`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ModuleId {
    pub from_root: bool,
    pub parts: Vec<String>,
}

impl ModuleId {
    pub fn new(from_root: bool, parts: Vec<String>) -> ModuleId {
        ModuleId { from_root, parts }
    }

    /// The root module, i.e a bare `::`.
    pub fn root() -> ModuleId {
        ModuleId {
            from_root: true,
            parts: vec![],
        }
    }
}

impl Display for ModuleId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.from_root {
            f.write_str("::")?;
        }

        f.write_str(&self.parts.join("::"))
    }
}

/// An identifier as produced by the parser, before the module it refers to
/// has been resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct UnqualifiedId {
    pub prefix: Option<ModuleId>,
    pub name: String,
}

impl UnqualifiedId {
    pub fn new(prefix: Option<ModuleId>, name: impl Into<String>) -> UnqualifiedId {
        UnqualifiedId {
            prefix,
            name: name.into(),
        }
    }

    /// An id with no module prefix at all, the common case.
    pub fn bare(name: impl Into<String>) -> UnqualifiedId {
        UnqualifiedId::new(None, name)
    }
}

impl Display for UnqualifiedId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => {
                write!(f, "{prefix}")?;

                if !prefix.parts.is_empty() {
                    f.write_str("::")?;
                }

                f.write_str(&self.name)
            }
            None => f.write_str(&self.name),
        }
    }
}

/// A fully-qualified identifier for a module-scope entity.
///
/// Both views (the canonical `::a::b::` module string and the name) point
/// into one backing buffer, so comparisons are a single string compare.
#[derive(Debug, Clone, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct FullyQualifiedId {
    full: String,
    split: usize,
}

impl FullyQualifiedId {
    /// Creates an id from a canonical module string (`::a::b::`, with the
    /// trailing `::`) and a name.
    pub fn new(module_string: impl AsRef<str>, name: impl AsRef<str>) -> FullyQualifiedId {
        let module_string = module_string.as_ref();
        let mut full = String::with_capacity(module_string.len() + name.as_ref().len());
        full.push_str(module_string);
        full.push_str(name.as_ref());

        FullyQualifiedId {
            full,
            split: module_string.len(),
        }
    }

    /// Creates an id for an entity in the root module.
    pub fn in_root(name: impl AsRef<str>) -> FullyQualifiedId {
        FullyQualifiedId::new("::", name)
    }

    /// The name of the entity.
    pub fn name(&self) -> &str {
        &self.full[self.split..]
    }

    /// The canonical module prefix, including the trailing `::`.
    pub fn module_string(&self) -> &str {
        &self.full[..self.split]
    }

    /// The whole id as one string, e.g `::core::mem::allocate`.
    pub fn as_string(&self) -> &str {
        &self.full
    }
}

impl PartialEq for FullyQualifiedId {
    fn eq(&self, other: &Self) -> bool {
        // equal full strings with equal splits means equal (module, name) pairs
        self.split == other.split && self.full == other.full
    }
}

impl Display for FullyQualifiedId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

#[cfg(test)]
mod tests {
    use super::{FullyQualifiedId, ModuleId, UnqualifiedId};

    #[test]
    fn test_module_display() {
        let id = ModuleId::new(true, vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(id.to_string(), "::a::b::c");

        let id = ModuleId::new(false, vec!["a".into(), "b".into()]);
        assert_eq!(id.to_string(), "a::b");

        assert_eq!(ModuleId::root().to_string(), "::");
    }

    #[test]
    fn test_unqualified_display() {
        assert_eq!(UnqualifiedId::bare("foo").to_string(), "foo");

        let id = UnqualifiedId::new(Some(ModuleId::new(true, vec!["core".into()])), "mem");
        assert_eq!(id.to_string(), "::core::mem");
    }

    #[test]
    fn test_fully_qualified_views() {
        let id = FullyQualifiedId::new("::core::mem::", "allocate");
        assert_eq!(id.module_string(), "::core::mem::");
        assert_eq!(id.name(), "allocate");
        assert_eq!(id.as_string(), "::core::mem::allocate");
    }

    #[test]
    fn test_fully_qualified_equality_is_structural() {
        let a = FullyQualifiedId::new("::a::", "b");
        let b = FullyQualifiedId::new("::a::", "b");
        let c = FullyQualifiedId::new("::a::b::", "");

        assert_eq!(a, b);
        assert_ne!(a, c); // same backing string, different split
    }
}
