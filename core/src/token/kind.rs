use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum TokenKind {
    LParen,      // (
    RParen,      // )
    LBracket,    // [
    RBracket,    // ]
    LBrace,      // {
    RBrace,      // }
    Comma,       // ,
    Semicolon,   // ;
    Colon,       // :
    Dot,         // .
    At,          // @
    Assign,      // =
    Eq,          // ==
    Ne,          // !=
    Lt,          // <
    Gt,          // >
    Le,          // <=
    Ge,          // >=
    Add,         // +
    Sub,         // -
    Mul,         // *
    Div,         // /
    AddBoth,     // <+>
    AddLeft,     // <+
    AddRight,    // +>
    SubBoth,     // <->
    SubLeft,     // <-
    SubRight,    // ->
    // Top-level declaration keywords
    Assert,             // assert
    Output,             // output
    Function,           // function
    Constant,           // constant
    Namespace,          // namespace
    OutputAttribute,    // output-attribute
    RuleNamePrefix,     // rule-name-prefix
    RuleNameSeparator,  // rule-name-separator
    Satisfied,          // satisfied
    Unsatisfied,        // unsatisfied
    // Expression keywords
    If,   // if
    Else, // else
    For,  // for
    In,   // in
    Not,  // not
    And,  // and
    Or,   // or
    True,  // true
    False, // false
    NoneValue, // none
    Skip,  // skip
    // Query keywords
    Navigate,    // navigate
    Include,     // include
    Start,       // start
    From,        // from
    To,          // to
    Stop,        // stop
    When,        // when
    Returns,     // returns
    Where,       // where
    Covered,     // covered
    CoveredDims, // covered-dims
    Nils,        // nils
    Nonils,      // nonils
    As,          // as
    Filter,      // filter
    Dimensions,  // dimensions
    // Literals and names
    Identifier,
    Variable, // $name
    Number,
    Url,
    StringOpen,    // " or '
    StringContent, // text between quotes / interpolations
    StringClose,   // matching quote
    // Off-channel
    Whitespace,
    Comment,
    Eof,
}

const KEYWORDS: &[(&str, TokenKind)] = &[
    ("assert", TokenKind::Assert),
    ("output", TokenKind::Output),
    ("function", TokenKind::Function),
    ("constant", TokenKind::Constant),
    ("namespace", TokenKind::Namespace),
    ("output-attribute", TokenKind::OutputAttribute),
    ("rule-name-prefix", TokenKind::RuleNamePrefix),
    ("rule-name-separator", TokenKind::RuleNameSeparator),
    ("satisfied", TokenKind::Satisfied),
    ("unsatisfied", TokenKind::Unsatisfied),
    ("if", TokenKind::If),
    ("else", TokenKind::Else),
    ("for", TokenKind::For),
    ("in", TokenKind::In),
    ("not", TokenKind::Not),
    ("and", TokenKind::And),
    ("or", TokenKind::Or),
    ("true", TokenKind::True),
    ("false", TokenKind::False),
    ("none", TokenKind::NoneValue),
    ("skip", TokenKind::Skip),
    ("navigate", TokenKind::Navigate),
    ("include", TokenKind::Include),
    ("start", TokenKind::Start),
    ("from", TokenKind::From),
    ("to", TokenKind::To),
    ("stop", TokenKind::Stop),
    ("when", TokenKind::When),
    ("returns", TokenKind::Returns),
    ("where", TokenKind::Where),
    ("covered", TokenKind::Covered),
    ("covered-dims", TokenKind::CoveredDims),
    ("nils", TokenKind::Nils),
    ("nonils", TokenKind::Nonils),
    ("as", TokenKind::As),
    ("filter", TokenKind::Filter),
    ("dimensions", TokenKind::Dimensions),
];

impl TokenKind {
    pub fn keyword(text: &str) -> Option<TokenKind> {
        KEYWORDS.iter().find(|(kw, _)| *kw == text).map(|(_, kind)| *kind)
    }

    /// Source spelling of a reserved word.
    pub fn keyword_text(self) -> Option<&'static str> {
        KEYWORDS.iter().find(|(_, kind)| *kind == self).map(|(kw, _)| *kw)
    }

    pub fn is_keyword(self) -> bool {
        self.keyword_text().is_some()
    }

    /// Punctuation, operators and EOF never make sense as completion labels.
    pub fn is_punctuation(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            LParen
                | RParen
                | LBracket
                | RBracket
                | LBrace
                | RBrace
                | Comma
                | Semicolon
                | Colon
                | Dot
                | At
                | Assign
                | Eq
                | Ne
                | Lt
                | Gt
                | Le
                | Ge
                | Add
                | Sub
                | Mul
                | Div
                | AddBoth
                | AddLeft
                | AddRight
                | SubBoth
                | SubLeft
                | SubRight
                | StringOpen
                | StringClose
                | Eof
        )
    }

    /// Tokens whose text is a user-chosen name rather than fixed syntax.
    pub fn is_identifier_like(self) -> bool {
        matches!(self, TokenKind::Identifier | TokenKind::Variable) || self.is_keyword()
    }

    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }

    pub fn describe(self) -> String {
        match self {
            TokenKind::Identifier => "identifier".to_string(),
            TokenKind::Variable => "variable".to_string(),
            TokenKind::Number => "number".to_string(),
            TokenKind::Url => "URL".to_string(),
            TokenKind::StringOpen | TokenKind::StringClose => "quote".to_string(),
            TokenKind::StringContent => "string".to_string(),
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::Whitespace => "whitespace".to_string(),
            TokenKind::Comment => "comment".to_string(),
            other => match other.keyword_text() {
                Some(kw) => format!("'{}'", kw),
                None => format!("'{}'", punctuation_text(other)),
            },
        }
    }
}

fn punctuation_text(kind: TokenKind) -> &'static str {
    use TokenKind::*;
    match kind {
        LParen => "(",
        RParen => ")",
        LBracket => "[",
        RBracket => "]",
        LBrace => "{",
        RBrace => "}",
        Comma => ",",
        Semicolon => ";",
        Colon => ":",
        Dot => ".",
        At => "@",
        Assign => "=",
        Eq => "==",
        Ne => "!=",
        Lt => "<",
        Gt => ">",
        Le => "<=",
        Ge => ">=",
        Add => "+",
        Sub => "-",
        Mul => "*",
        Div => "/",
        AddBoth => "<+>",
        AddLeft => "<+",
        AddRight => "+>",
        SubBoth => "<->",
        SubLeft => "<-",
        SubRight => "->",
        _ => "?",
    }
}

/// Which stream a token lives on. Only `Default` tokens reach the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Channel {
    Default,
    Hidden,
    /// Zero-width boundary tokens between adjacent content tokens.
    Marker,
}
