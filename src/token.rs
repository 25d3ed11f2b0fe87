use std::fmt;

#[derive(Clone)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct Token {
    pub kind: TokenKind,
    pub pos: Pos,
}

impl Token {
    pub fn new(kind: TokenKind, pos: Pos) -> Token {
        Token { kind, pos }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({:?}, {})", self.kind, self.pos)
    }
}

/// One-based line and column of a token's first character.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Pos {
    pub line: u32,
    pub col: u32,
}

impl Pos {
    pub fn new(line: u32, col: u32) -> Pos {
        Pos { line, col }
    }
}

impl fmt::Debug for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({self})")
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Fn,
    Return,
    Type,
    If,
    Unless,
    Then,
    Else,
    Let,

    True,
    False,

    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Less,
    LessEq,
    EqEq,
    NotEq,
    GreaterEq,
    Greater,
    AndAnd,
    OrOr,
    Bang,
    /// `&`, marks a mutably borrowed parameter.
    Amp,
    /// `:=`
    Assign,
    Eq,
    Colon,
    Semicolon,
    Comma,
    Dot,
    Arrow,
    LParen,
    RParen,
    LBrace,
    RBrace,

    Identifier(String),
    /// `#`-prefixed identifier naming a metafunction, e.g. `#cpp`.
    MetaIdentifier(String),
    /// Integer literal; digits are kept as written.
    Int(String),
    /// Fixed-point literal such as `1.25`, lowered to a rational.
    Decimal(String),
    /// Float literal, marked by an `f` suffix. The suffix is stripped.
    Float(String),
    /// String literal with escape sequences already resolved.
    Str(String),

    Eof,
}

impl TokenKind {
    /// The source spelling of an operator token, used both in error
    /// messages and as the name of the operator function it calls.
    pub fn operator_name(&self) -> Option<&'static str> {
        let name = match self {
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Caret => "^",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Less => "<",
            TokenKind::LessEq => "<=",
            TokenKind::Greater => ">",
            TokenKind::GreaterEq => ">=",
            _ => return None,
        };
        Some(name)
    }
}

pub static KEYWORDS: phf::Map<&'static str, TokenKind> = phf::phf_map! {
    "fn" => TokenKind::Fn,
    "return" => TokenKind::Return,
    "type" => TokenKind::Type,
    "if" => TokenKind::If,
    "unless" => TokenKind::Unless,
    "then" => TokenKind::Then,
    "else" => TokenKind::Else,
    "let" => TokenKind::Let,
    "True" => TokenKind::True,
    "False" => TokenKind::False,
};
