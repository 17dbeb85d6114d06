use xule_core::vocab::{Module, VocabKind, Vocabulary};

/// Names accepted after `.` on any value.
const PROPERTIES: &[&str] = &[
    // facts
    "concept",
    "period",
    "unit",
    "entity",
    "decimals",
    "dimension",
    "dimensions",
    "dimensions-explicit",
    "dimensions-typed",
    "id",
    "inline-scale",
    "inline-format",
    "inline-display-value",
    "inline-hidden",
    "inline-negated",
    "is-nil",
    "is-fact",
    "footnotes",
    // concepts
    "balance",
    "base-type",
    "data-type",
    "enumerations",
    "has-enumerations",
    "is-abstract",
    "is-monetary",
    "is-numeric",
    "is-type",
    "label",
    "labels",
    "name",
    "local-name",
    "namespace-uri",
    "clark",
    "period-type",
    "references",
    "substitution",
    "attribute",
    // periods
    "start",
    "end",
    "days",
    "is-forever",
    // relationships and networks
    "source",
    "target",
    "source-name",
    "target-name",
    "weight",
    "order",
    "preferred-label",
    "arcrole",
    "arcrole-uri",
    "arcrole-description",
    "role",
    "role-uri",
    "role-description",
    "link-name",
    "arc-name",
    "relationships",
    "roots",
    "concepts",
    "cycles-allowed",
    "networks",
    "effective-weight",
    "effective-weight-network",
    // strings
    "length",
    "lower-case",
    "upper-case",
    "index-of",
    "last-index-of",
    "substring",
    "split",
    "trim",
    "contains",
    "starts-with",
    "ends-with",
    "to-qname",
    "plain-string",
    "string",
    "number",
    // numbers
    "abs",
    "int",
    "decimal",
    "round",
    "signum",
    "log10",
    "mod",
    "power",
    "sqrt",
    "trunc",
    // collections
    "count",
    "sum",
    "avg",
    "max",
    "min",
    "prod",
    "stdev",
    "first",
    "last",
    "sort",
    "join",
    "keys",
    "values",
    "has-key",
    "index",
    "union",
    "intersect",
    "difference",
    "symmetric-difference",
    "to-list",
    "to-set",
    "to-dict",
    "to-json",
    "to-spreadsheet",
    "agg-to-dict",
    "all",
    "any",
    "is-subset",
    "is-superset",
    // misc
    "document-location",
    "entry-point",
    "entry-point-namespace",
    "regex-match",
    "regex-match-all",
    "regex-match-string",
    "regex-match-string-all",
    "scheme",
    "numerator",
    "denominator",
    "size",
    "year",
    "month",
    "day",
];

#[derive(Debug, Default)]
pub struct PropertiesModule;

impl PropertiesModule {
    pub fn new() -> Self {
        Self
    }
}

impl Module for PropertiesModule {
    fn name(&self) -> &str {
        "properties"
    }

    fn register(&self, vocab: &mut Vocabulary) {
        vocab.add_all(VocabKind::Property, PROPERTIES);
    }
}
