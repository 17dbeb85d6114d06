use anyhow::{Result, anyhow};

use crate::util::fast_map::{FastHashMap, FastHashSet, fast_hash_map_new, fast_hash_set_new};

/// Categories of fixed names the language knows without any declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VocabKind {
    Function,
    Property,
    OutputAttribute,
    NavigationDirection,
    ReturnOption,
    KeywordLiteral,
}

impl VocabKind {
    pub const ALL: [VocabKind; 6] = [
        VocabKind::Function,
        VocabKind::Property,
        VocabKind::OutputAttribute,
        VocabKind::NavigationDirection,
        VocabKind::ReturnOption,
        VocabKind::KeywordLiteral,
    ];
}

#[derive(Debug, Default)]
struct NameList {
    ordered: Vec<String>,
    index: FastHashSet<String>,
}

impl NameList {
    fn insert(&mut self, name: &str) -> bool {
        if self.index.contains(name) {
            return false;
        }
        self.index.insert(name.to_string());
        self.ordered.push(name.to_string());
        true
    }
}

/// Registry of built-in names, filled by vocabulary modules.
///
/// Names are kept in registration order so completion output is stable.
#[derive(Debug)]
pub struct Vocabulary {
    lists: FastHashMap<VocabKind, NameList>,
    signatures: FastHashMap<String, String>,
    modules: Vec<String>,
}

impl Vocabulary {
    pub fn new() -> Self {
        let mut lists = fast_hash_map_new();
        for kind in VocabKind::ALL {
            lists.insert(kind, NameList::default());
        }
        Self {
            lists,
            signatures: fast_hash_map_new(),
            modules: Vec::new(),
        }
    }

    /// Register a module's names. A module name may only be registered once.
    pub fn register_module(&mut self, module: &dyn Module) -> Result<()> {
        if self.modules.iter().any(|m| m == module.name()) {
            return Err(anyhow!("Vocabulary module '{}' already registered", module.name()));
        }
        module.register(self);
        self.modules.push(module.name().to_string());
        tracing::debug!(module = module.name(), "registered vocabulary module");
        Ok(())
    }

    pub fn module_names(&self) -> &[String] {
        &self.modules
    }

    pub fn add(&mut self, kind: VocabKind, name: &str) {
        if let Some(list) = self.lists.get_mut(&kind) {
            list.insert(name);
        }
    }

    pub fn add_all(&mut self, kind: VocabKind, names: &[&str]) {
        for name in names {
            self.add(kind, name);
        }
    }

    /// Register a built-in function with a short signature summary,
    /// e.g. `sum(collection)`.
    pub fn add_function(&mut self, name: &str, signature: &str) {
        self.add(VocabKind::Function, name);
        self.signatures.insert(name.to_string(), signature.to_string());
    }

    pub fn contains(&self, kind: VocabKind, name: &str) -> bool {
        self.lists.get(&kind).is_some_and(|l| l.index.contains(name))
    }

    pub fn names(&self, kind: VocabKind) -> &[String] {
        self.lists.get(&kind).map(|l| l.ordered.as_slice()).unwrap_or(&[])
    }

    pub fn signature(&self, function: &str) -> Option<&str> {
        self.signatures.get(function).map(String::as_str)
    }

    pub fn is_function(&self, name: &str) -> bool {
        self.contains(VocabKind::Function, name)
    }

    pub fn is_property(&self, name: &str) -> bool {
        self.contains(VocabKind::Property, name)
    }

    pub fn is_output_attribute(&self, name: &str) -> bool {
        self.contains(VocabKind::OutputAttribute, name)
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}

/// A named group of built-in names.
pub trait Module: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn register(&self, vocab: &mut Vocabulary);
}
