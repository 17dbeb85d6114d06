use xule_core::vocab::{Module, Vocabulary};

/// Built-in functions with their argument summaries.
const FUNCTIONS: &[(&str, &str)] = &[
    // aggregates
    ("all", "all(collection)"),
    ("any", "any(collection)"),
    ("avg", "avg(collection)"),
    ("count", "count(collection)"),
    ("first-value", "first-value(value, ...)"),
    ("max", "max(collection)"),
    ("min", "min(collection)"),
    ("prod", "prod(collection)"),
    ("stdev", "stdev(collection)"),
    ("sum", "sum(collection)"),
    // collections
    ("dict", "dict(list(key, value), ...)"),
    ("list", "list(value, ...)"),
    ("set", "set(value, ...)"),
    ("range", "range(start, stop, step)"),
    ("json-data", "json-data(url)"),
    // values
    ("exists", "exists(value)"),
    ("missing", "missing(value)"),
    ("number", "number(value)"),
    ("string", "string(value)"),
    ("qname", "qname(namespace-uri, local-name)"),
    ("uri", "uri(string)"),
    ("version", "version()"),
    ("is-base", "is-base(concept)"),
    ("schema-type", "schema-type(qname)"),
    ("taxonomy", "taxonomy(entry-point-url)"),
    ("unit", "unit(numerator, denominator)"),
    ("entity", "entity(scheme, identifier)"),
    // dates
    ("date", "date(string)"),
    ("duration", "duration(start, end)"),
    ("forever", "forever()"),
    ("time-span", "time-span(string)"),
    ("day", "day(date)"),
    ("month", "month(date)"),
    ("year", "year(date)"),
    // numbers
    ("abs", "abs(number)"),
    ("exp", "exp(number)"),
    ("log10", "log10(number)"),
    ("mod", "mod(number, divisor)"),
    ("power", "power(number, exponent)"),
    ("round", "round(number, places)"),
    ("signum", "signum(number)"),
    ("sqrt", "sqrt(number)"),
    ("trunc", "trunc(number, places)"),
];

#[derive(Debug, Default)]
pub struct FunctionsModule;

impl FunctionsModule {
    pub fn new() -> Self {
        Self
    }
}

impl Module for FunctionsModule {
    fn name(&self) -> &str {
        "functions"
    }

    fn description(&self) -> &str {
        "Built-in functions callable by bare name"
    }

    fn register(&self, vocab: &mut Vocabulary) {
        for (name, signature) in FUNCTIONS {
            vocab.add_function(name, signature);
        }
    }
}
