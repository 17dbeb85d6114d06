use serde::Serialize;

/// Grammar rules that produce tree nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Rule {
    XuleFile,
    // Declarations
    AssertDeclaration,
    OutputDeclaration,
    AssertionName,
    FunctionDeclaration,
    FunctionArguments,
    FunctionArgument,
    ConstantDeclaration,
    NamespaceDeclaration,
    OutputAttributeDeclaration,
    RuleNamePrefix,
    RuleNameSeparator,
    OutputAttribute,
    OutputAttributeName,
    // Blocks and expressions
    ExpressionBlock,
    Assignment,
    AssignedVariable,
    BinaryExpression,
    UnaryExpression,
    PropertyAccess,
    PropertyRef,
    CallExpression,
    FunctionRef,
    ArgumentList,
    ParenthesizedExpression,
    IfExpression,
    ForExpression,
    ForVariable,
    VariableRead,
    QualifiedName,
    NumberLiteral,
    StringLiteral,
    BooleanLiteral,
    KeywordLiteral,
    // Queries
    Factset,
    FactsetOption,
    AspectFilter,
    AspectValue,
    BindAs,
    WhereClause,
    Navigation,
    NavigationArcrole,
    NavigationDirection,
    NavigationClause,
    ReturnsClause,
    ReturnOption,
    FilterExpression,
    FilterReturns,
    /// Tokens skipped during error recovery.
    Error,
}

impl Rule {
    pub fn name(self) -> &'static str {
        match self {
            Rule::XuleFile => "xuleFile",
            Rule::AssertDeclaration => "assertDeclaration",
            Rule::OutputDeclaration => "outputDeclaration",
            Rule::AssertionName => "assertionName",
            Rule::FunctionDeclaration => "functionDeclaration",
            Rule::FunctionArguments => "functionArguments",
            Rule::FunctionArgument => "functionArgument",
            Rule::ConstantDeclaration => "constantDeclaration",
            Rule::NamespaceDeclaration => "namespaceDeclaration",
            Rule::OutputAttributeDeclaration => "outputAttributeDeclaration",
            Rule::RuleNamePrefix => "ruleNamePrefix",
            Rule::RuleNameSeparator => "ruleNameSeparator",
            Rule::OutputAttribute => "outputAttribute",
            Rule::OutputAttributeName => "outputAttributeName",
            Rule::ExpressionBlock => "expressionBlock",
            Rule::Assignment => "assignment",
            Rule::AssignedVariable => "assignedVariable",
            Rule::BinaryExpression => "binaryExpression",
            Rule::UnaryExpression => "unaryExpression",
            Rule::PropertyAccess => "propertyAccess",
            Rule::PropertyRef => "propertyRef",
            Rule::CallExpression => "callExpression",
            Rule::FunctionRef => "functionRef",
            Rule::ArgumentList => "argumentList",
            Rule::ParenthesizedExpression => "parenthesizedExpression",
            Rule::IfExpression => "ifExpression",
            Rule::ForExpression => "forExpression",
            Rule::ForVariable => "forVariable",
            Rule::VariableRead => "variableRead",
            Rule::QualifiedName => "qualifiedName",
            Rule::NumberLiteral => "numberLiteral",
            Rule::StringLiteral => "stringLiteral",
            Rule::BooleanLiteral => "booleanLiteral",
            Rule::KeywordLiteral => "keywordLiteral",
            Rule::Factset => "factset",
            Rule::FactsetOption => "factsetOption",
            Rule::AspectFilter => "aspectFilter",
            Rule::AspectValue => "aspectValue",
            Rule::BindAs => "bindAs",
            Rule::WhereClause => "whereClause",
            Rule::Navigation => "navigation",
            Rule::NavigationArcrole => "navigationArcrole",
            Rule::NavigationDirection => "navigationDirection",
            Rule::NavigationClause => "navigationClause",
            Rule::ReturnsClause => "returnsClause",
            Rule::ReturnOption => "returnOption",
            Rule::FilterExpression => "filterExpression",
            Rule::FilterReturns => "filterReturns",
            Rule::Error => "error",
        }
    }
}
