/// The lexer takes the source input, mapping it into a sequence of tokens.
pub mod lexer;

/// The parser takes a sequence of tokens, building scopes, declarations
/// and statements in the program arena.
pub mod parser;

/// Name, type and overload resolution over the bound tree, including the
/// borrow rules for call arguments.
pub mod resolve;

/// The emitter renders the bound program as a C++ translation unit,
/// running the deferred checks as it goes.
pub mod emit;

/// The whole pipeline behind one function: source in, C++ out.
pub mod compiler;

pub mod ast;
pub mod error;
pub mod prelude;
pub mod token;
