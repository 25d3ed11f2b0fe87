use thiserror::Error;

use crate::token::Pos;

/// Any error the compiler can report. All of them are fatal; the first
/// one encountered aborts the compilation and no output is produced.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Bind(#[from] BindError),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("{pos}: unexpected character `{ch}`")]
    UnexpectedChar { ch: char, pos: Pos },
    #[error("{pos}: unterminated string literal")]
    UnterminatedString { pos: Pos },
    #[error("{pos}: unterminated block comment")]
    UnterminatedComment { pos: Pos },
    #[error("{pos}: unrecognized escape sequence `\\{ch}`")]
    BadEscape { ch: char, pos: Pos },
    #[error("{pos}: expected a digit after the decimal point")]
    MalformedNumber { pos: Pos },
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("{pos}: expected {expected}, but got {found}")]
    Unexpected {
        expected: &'static str,
        found: String,
        pos: Pos,
    },
    #[error("{pos}: positional argument after a named argument")]
    PositionalAfterNamed { pos: Pos },
    #[error("{pos}: only calls and member accesses may stand as statements")]
    InvalidExpressionStatement { pos: Pos },
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("{pos}: unresolved variable `{name}`")]
    UnresolvedVariable { name: String, pos: Pos },
    #[error("{pos}: unresolved type `{name}`")]
    UnresolvedType { name: String, pos: Pos },
    #[error("{pos}: no matching function `{name}`")]
    NoMatchingFunction { name: String, pos: Pos },
    #[error("{pos}: `{name}` is already declared in this scope")]
    AmbiguousDeclaration { name: String, pos: Pos },
    #[error("{pos}: named argument `{name}` targets an already filled parameter")]
    NamedArgumentConflict { name: String, pos: Pos },
    #[error("{pos}: cannot mutably borrow the immutable variable `{name}`")]
    MutableBorrowOfImmutable { name: String, pos: Pos },
    #[error("{pos}: cannot mutably borrow a non-variable expression")]
    MutableBorrowOfExpression { pos: Pos },
    #[error("{pos}: cannot return the borrowed variable `{name}`")]
    ReturnOfBorrowed { name: String, pos: Pos },
    #[error("{pos}: return type mismatch: expected `{expected}`, found `{found}`")]
    ReturnTypeMismatch {
        expected: String,
        found: String,
        pos: Pos,
    },
    #[error("{pos}: this function must return a value")]
    MissingReturnValue { pos: Pos },
    #[error("{pos}: this function does not return a value")]
    UnexpectedReturnValue { pos: Pos },
    #[error("{pos}: `return` outside of a function body")]
    ReturnOutsideFunction { pos: Pos },
    #[error("{pos}: type mismatch: expected `{expected}`, found `{found}`")]
    TypeMismatch {
        expected: String,
        found: String,
        pos: Pos,
    },
    #[error("{pos}: expression does not produce a value")]
    ValuelessExpression { pos: Pos },
    #[error("{pos}: cannot reassign the immutable variable `{name}`")]
    ReassignImmutable { name: String, pos: Pos },
    #[error("{pos}: statements are not allowed in the global scope")]
    StatementInGlobalScope { pos: Pos },
    #[error("{pos}: only `let` and metafunction statements are allowed in a type body")]
    StatementInTypeBody { pos: Pos },
    #[error("{pos}: `{name}` only takes string literals")]
    MetafunctionArgument { name: String, pos: Pos },
    #[error("{pos}: unknown metafunction `{name}`")]
    UnknownMetafunction { name: String, pos: Pos },
    #[error("no zero-argument function `Main` in the global scope")]
    MissingMain,
}
