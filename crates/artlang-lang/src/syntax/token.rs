#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Number(f64),
    Bool(bool),
    Ident(String),
    StringLit(String),
    Nil,

    // Keywords
    Function,
    End,
    If,
    Then,
    Else,
    ElseIf,
    For,
    While,
    Do,
    Return,
    Var,
    And, // and, &&
    Or,  // or, ||
    Not, // not, !

    // Operators
    Plus,     // +
    Minus,    // -
    Star,     // *
    Slash,    // /
    Percent,  // %
    PlusEq,   // +=
    MinusEq,  // -=
    StarEq,   // *=
    SlashEq,  // /=
    Eq,       // =
    EqEq,     // ==
    BangEq,   // != or ~=
    Lt,       // <
    LtEq,     // <=
    Gt,       // >
    GtEq,     // >=

    // Punctuation
    Colon,     // :
    Comma,     // ,
    Semicolon, // ;
    Dot,       // .
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    LBracket,  // [
    RBracket,  // ]

    Eof,
}

impl TokenKind {
    /// Tokens that close a keyword-delimited block.
    pub fn ends_block(&self) -> bool {
        matches!(self, Self::End | Self::Else | Self::ElseIf | Self::Eof)
    }
}

/// Maps an identifier string to its keyword token, or returns `Ident`.
pub fn keyword_or_ident(s: String) -> TokenKind {
    match s.as_str() {
        "function" => TokenKind::Function,
        "end"      => TokenKind::End,
        "if"       => TokenKind::If,
        "then"     => TokenKind::Then,
        "else"     => TokenKind::Else,
        "elseif"   => TokenKind::ElseIf,
        "for"      => TokenKind::For,
        "while"    => TokenKind::While,
        "do"       => TokenKind::Do,
        "return"   => TokenKind::Return,
        "var"      => TokenKind::Var,
        "let"      => TokenKind::Var,
        "and"      => TokenKind::And,
        "or"       => TokenKind::Or,
        "not"      => TokenKind::Not,
        "true"     => TokenKind::Bool(true),
        "false"    => TokenKind::Bool(false),
        "nil"      => TokenKind::Nil,
        "null"     => TokenKind::Nil,
        _          => TokenKind::Ident(s),
    }
}

// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize, column: usize) -> Self {
        Self { kind, line, column }
    }
}
