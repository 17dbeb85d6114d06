use xule_core::vocab::{Module, VocabKind, Vocabulary};

const DIRECTIONS: &[&str] = &[
    "self",
    "descendants",
    "children",
    "ancestors",
    "parents",
    "siblings",
    "previous-siblings",
    "following-siblings",
];

const RETURN_OPTIONS: &[&str] = &[
    "source",
    "target",
    "source-name",
    "target-name",
    "order",
    "weight",
    "preferred-label",
    "relationship",
    "role",
    "role-uri",
    "role-description",
    "arcrole",
    "arcrole-uri",
    "arcrole-description",
    "arcrole-cycles-allowed",
    "link-name",
    "arc-name",
    "network",
    "cycle",
    "navigation-order",
    "navigation-depth",
    "result-order",
    "drs-role",
    "dimension-type",
    "dimension-sub-type",
    "usable",
    "target-usable",
];

/// Directions and `returns` components of the `navigate` expression.
#[derive(Debug, Default)]
pub struct NavigationModule;

impl NavigationModule {
    pub fn new() -> Self {
        Self
    }
}

impl Module for NavigationModule {
    fn name(&self) -> &str {
        "navigation"
    }

    fn register(&self, vocab: &mut Vocabulary) {
        vocab.add_all(VocabKind::NavigationDirection, DIRECTIONS);
        vocab.add_all(VocabKind::ReturnOption, RETURN_OPTIONS);
    }
}
