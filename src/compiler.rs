use crate::{ast::Program, emit, error::Error, parser, prelude};

/// Compiles a ZRM source file into a C++ translation unit.
///
/// The builtin prelude is loaded into the global scope first, then the
/// user program on top of it. The output is built fully in memory, so a
/// failing compilation produces nothing at all.
pub fn compile(source: &str) -> Result<String, Error> {
    let mut program = Program::new();
    parser::parse_into(&mut program, Program::GLOBAL, prelude::PRELUDE)?;
    parser::parse_into(&mut program, Program::GLOBAL, source)?;
    emit_to_string(&program).map_err(Error::from)
}

fn emit_to_string(program: &Program) -> Result<String, crate::error::BindError> {
    let mut buffer = Vec::with_capacity(16 * 1024);
    emit::emit(program, &mut buffer)?;
    Ok(String::from_utf8(buffer).expect("emitted C++ is UTF-8"))
}
