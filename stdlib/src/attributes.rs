use xule_core::vocab::{Module, VocabKind, Vocabulary};

const OUTPUT_ATTRIBUTES: &[&str] = &["message", "severity", "rule-suffix", "rule-focus"];

const KEYWORD_LITERALS: &[&str] = &["none", "skip"];

/// Output attributes every rule accepts, plus the literal keywords.
#[derive(Debug, Default)]
pub struct AttributesModule;

impl AttributesModule {
    pub fn new() -> Self {
        Self
    }
}

impl Module for AttributesModule {
    fn name(&self) -> &str {
        "attributes"
    }

    fn register(&self, vocab: &mut Vocabulary) {
        vocab.add_all(VocabKind::OutputAttribute, OUTPUT_ATTRIBUTES);
        vocab.add_all(VocabKind::KeywordLiteral, KEYWORD_LITERALS);
    }
}
