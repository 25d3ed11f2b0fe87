use std::{fmt, io};

use crate::{
    ast::{ExprId, ExprKind, FnId, PassMode, Program, ScopeId, StmtId, StmtKind, TypeId, VarId},
    error::BindError,
    resolve::{self, well_known, Resolution},
    token::Pos,
};

/// Prefix prepended to every name in the generated C++, keeping the
/// output clear of collisions with C++ keywords and the preamble.
pub const PREFIX: &str = "zrm_";

/// Placeholder that metafunction arguments may use to splice in [`PREFIX`].
const PREFIX_PLACEHOLDER: &str = "#__";

const META_CPP: &str = "#cpp";
const META_CPP_FORWARD: &str = "#cpp_forward";

/// Emits the bound program as a C++ translation unit.
///
/// All name binding and checking that was deferred during parsing runs
/// here; the first violation aborts the emission. Callers are expected to
/// buffer the output and discard it on error.
pub fn emit<W: io::Write>(program: &Program, sink: W) -> Result<(), BindError> {
    Emitter {
        program,
        sink,
        indent: 0,
    }
    .run()
}

/// How a function definition is rendered, depending on where it lives.
#[derive(Copy, Clone, PartialEq, Eq)]
enum FnStyle {
    /// Global scope: an ordinary free function.
    Free,
    /// Type body: a member function.
    Method,
    /// Function body: a lambda assigned to a predeclared `std::function`.
    Local,
}

struct Emitter<'p, W> {
    program: &'p Program,
    sink: W,
    indent: usize,
}

impl<W: io::Write> Emitter<'_, W> {
    fn run(mut self) -> Result<(), BindError> {
        let global = self.program.scope(Program::GLOBAL);
        if let Some(&stmt) = global.stmts.first() {
            return Err(BindError::StatementInGlobalScope {
                pos: self.program.stmt(stmt).pos,
            });
        }
        let main = self.find_main()?;

        self.out("#include <cstdio>");
        self.out("#include <cstdlib>");
        self.out("#include <functional>");
        self.out("#include <string>");
        self.blank();

        // Declaration pass: type names first, then function prototypes,
        // so that definition order never matters in the source language.
        for &ty in &global.types {
            self.out(format_args!(
                "struct {};",
                mangle_type(&self.program.ty(ty).name)
            ));
        }
        for &func in &global.fns {
            let signature = self.fn_signature(func)?;
            self.out(format_args!("{signature};"));
        }
        self.blank();

        for &ty in &global.types {
            self.emit_type(ty)?;
            self.blank();
        }
        for &func in &global.fns {
            self.emit_fn(func, FnStyle::Free)?;
            self.blank();
        }

        let entry = self.mangle_fn(main)?;
        self.out("int main() {");
        self.indent += 1;
        self.out(format_args!("{entry}();"));
        self.out("return 0;");
        self.indent -= 1;
        self.out("}");
        Ok(())
    }

    /// The program entry: a zero-argument global function named `Main`.
    fn find_main(&self) -> Result<FnId, BindError> {
        self.program
            .scope(Program::GLOBAL)
            .fns
            .iter()
            .copied()
            .find(|&id| {
                let func = self.program.func(id);
                func.name == well_known::MAIN && func.params.is_empty()
            })
            .ok_or(BindError::MissingMain)
    }

    fn emit_type(&mut self, ty: TypeId) -> Result<(), BindError> {
        let decl = self.program.ty(ty);
        let scope = decl.scope;
        self.out(format_args!("struct {} {{", mangle_type(&decl.name)));
        self.indent += 1;

        // Raw C++ member declarations first. Anything else a type body
        // may contain is a `let` field, emitted after the members below.
        for &stmt in &self.program.scope(scope).stmts {
            let node = self.program.stmt(stmt);
            match &node.kind {
                StmtKind::Expr(expr) if self.program.expr(*expr).is_metafunction() => {
                    self.emit_metafunction(*expr, true)?;
                }
                StmtKind::Let { .. } => {}
                _ => return Err(BindError::StatementInTypeBody { pos: node.pos }),
            }
        }
        for &nested in &self.program.scope(scope).types {
            self.emit_type(nested)?;
        }
        for &func in &self.program.scope(scope).fns {
            self.emit_fn(func, FnStyle::Method)?;
        }
        for &stmt in &self.program.scope(scope).stmts {
            if let StmtKind::Let { var, value } = &self.program.stmt(stmt).kind {
                self.emit_field(*var, *value)?;
            }
        }

        self.indent -= 1;
        self.out("};");
        Ok(())
    }

    fn emit_field(&mut self, var: VarId, value: ExprId) -> Result<(), BindError> {
        let decl = self.program.var(var);
        let ty = resolve::type_of_var(self.program, var)?;
        let text = self.emit_expr(decl.scope, value)?;
        self.out(format_args!(
            "{} {PREFIX}{} = {text};",
            mangle_type(&self.program.ty(ty).name),
            decl.internal
        ));
        Ok(())
    }

    fn emit_fn(&mut self, func: FnId, style: FnStyle) -> Result<(), BindError> {
        let decl = self.program.func(func);
        match style {
            FnStyle::Free => {
                let signature = self.fn_signature(func)?;
                self.out(format_args!("{signature} {{"));
            }
            FnStyle::Method => {
                let signature = self.fn_signature(func)?;
                // Constructors of nested types must stay callable without
                // an instance of the enclosing type.
                if decl.ctor_of.is_some() {
                    self.out(format_args!("static {signature} {{"));
                } else {
                    self.out(format_args!("{signature} {{"));
                }
            }
            FnStyle::Local => {
                let name = self.mangle_fn(func)?;
                let params = self.fn_params(func)?;
                let ret = self.ret_text(func)?;
                self.out(format_args!("{name} = [&]({params}) -> {ret} {{"));
            }
        }

        self.indent += 1;
        if let Some(ty) = decl.ctor_of {
            self.out(format_args!(
                "return {}();",
                mangle_type(&self.program.ty(ty).name)
            ));
        } else {
            self.emit_scope_body(decl.body)?;
        }
        self.indent -= 1;

        if style == FnStyle::Local {
            self.out("};");
        } else {
            self.out("}");
        }
        Ok(())
    }

    /// Emits the contents of a function body or block scope, two-phase
    /// like the global scope: local types, then every local function
    /// declared up front, then their bodies, then the statements. The
    /// up-front declarations let sibling functions call each other (and
    /// themselves) regardless of source order.
    fn emit_scope_body(&mut self, scope: ScopeId) -> Result<(), BindError> {
        for &ty in &self.program.scope(scope).types {
            self.emit_type(ty)?;
        }
        for &func in &self.program.scope(scope).fns {
            let name = self.mangle_fn(func)?;
            let fn_type = self.fn_type(func)?;
            self.out(format_args!("std::function<{fn_type}> {name};"));
        }
        for &func in &self.program.scope(scope).fns {
            self.emit_fn(func, FnStyle::Local)?;
        }
        for &stmt in &self.program.scope(scope).stmts {
            self.emit_stmt(scope, stmt)?;
        }
        Ok(())
    }

    fn emit_stmt(&mut self, scope: ScopeId, stmt: StmtId) -> Result<(), BindError> {
        let node = self.program.stmt(stmt);
        match &node.kind {
            StmtKind::Expr(expr) => {
                if self.program.expr(*expr).is_metafunction() {
                    self.emit_metafunction(*expr, false)?;
                } else {
                    let text = self.emit_expr(scope, *expr)?;
                    self.out(format_args!("{text};"));
                }
            }
            StmtKind::Let { var, value } => {
                let decl = self.program.var(*var);
                let ty = resolve::type_of_var(self.program, *var)?;
                let text = self.emit_expr(scope, *value)?;
                let qualifier = if decl.access.is_mutable() { "" } else { "const " };
                self.out(format_args!(
                    "{qualifier}{} {PREFIX}{} = {text};",
                    mangle_type(&self.program.ty(ty).name),
                    decl.internal
                ));
            }
            StmtKind::Reassign { target, value } => {
                let var = self
                    .program
                    .lookup_var_at(scope, target, *value)
                    .ok_or_else(|| BindError::UnresolvedVariable {
                        name: target.clone(),
                        pos: node.pos,
                    })?;
                let decl = self.program.var(var);
                if !decl.access.is_mutable() {
                    return Err(BindError::ReassignImmutable {
                        name: target.clone(),
                        pos: node.pos,
                    });
                }
                let expected = resolve::type_of_var(self.program, var)?;
                let found = resolve::require_type(self.program, scope, *value)?;
                if expected != found {
                    return Err(BindError::TypeMismatch {
                        expected: self.program.ty(expected).name.clone(),
                        found: self.program.ty(found).name.clone(),
                        pos: self.program.expr(*value).pos,
                    });
                }
                let text = self.emit_expr(scope, *value)?;
                self.out(format_args!("{PREFIX}{} = {text};", decl.internal));
            }
            StmtKind::Return(value) => self.emit_return(scope, node.pos, *value)?,
            StmtKind::If {
                cond,
                then_scope,
                else_scope,
            } => self.emit_conditional(scope, *cond, *then_scope, *else_scope, false)?,
            StmtKind::Unless {
                cond,
                then_scope,
                else_scope,
            } => self.emit_conditional(scope, *cond, *then_scope, *else_scope, true)?,
            StmtKind::Block(inner) => {
                self.out("{");
                self.indent += 1;
                self.emit_scope_body(*inner)?;
                self.indent -= 1;
                self.out("}");
            }
        }
        Ok(())
    }

    fn emit_return(
        &mut self,
        scope: ScopeId,
        pos: Pos,
        value: Option<ExprId>,
    ) -> Result<(), BindError> {
        let Some(func) = self.program.enclosing_fn(scope) else {
            return Err(BindError::ReturnOutsideFunction { pos });
        };
        let expected = resolve::ret_type(self.program, func)?;
        match (expected, value) {
            (None, None) => self.out("return;"),
            (None, Some(value)) => {
                return Err(BindError::UnexpectedReturnValue {
                    pos: self.program.expr(value).pos,
                })
            }
            (Some(_), None) => return Err(BindError::MissingReturnValue { pos }),
            (Some(expected), Some(value)) => {
                let found = resolve::require_type(self.program, scope, value)?;
                if found != expected {
                    return Err(BindError::ReturnTypeMismatch {
                        expected: self.program.ty(expected).name.clone(),
                        found: self.program.ty(found).name.clone(),
                        pos: self.program.expr(value).pos,
                    });
                }
                // Borrowed variables must not escape through `return`.
                if let ExprKind::Var(name) = &self.program.expr(value).kind {
                    let var = self
                        .program
                        .lookup_var_at(scope, name, value)
                        .ok_or_else(|| BindError::UnresolvedVariable {
                            name: name.clone(),
                            pos,
                        })?;
                    if !self.program.var(var).access.is_returnable() {
                        return Err(BindError::ReturnOfBorrowed {
                            name: name.clone(),
                            pos,
                        });
                    }
                }
                let text = self.emit_expr(scope, value)?;
                self.out(format_args!("return {text};"));
            }
        }
        Ok(())
    }

    fn emit_conditional(
        &mut self,
        scope: ScopeId,
        cond: ExprId,
        then_scope: ScopeId,
        else_scope: Option<ScopeId>,
        invert: bool,
    ) -> Result<(), BindError> {
        resolve::expect_bool(self.program, scope, cond)?;
        let cond_text = self.emit_expr(scope, cond)?;
        let test = if invert {
            format!("!(({cond_text}).v)")
        } else {
            format!("({cond_text}).v")
        };
        self.out(format_args!("if ({test}) {{"));
        self.indent += 1;
        self.emit_scope_body(then_scope)?;
        self.indent -= 1;
        if let Some(other) = else_scope {
            self.out("} else {");
            self.indent += 1;
            self.emit_scope_body(other)?;
            self.indent -= 1;
        }
        self.out("}");
        Ok(())
    }

    /// Expands a `#cpp` or `#cpp_forward` call. Each string argument is
    /// copied verbatim (with [`PREFIX_PLACEHOLDER`] substituted) onto its
    /// own line. `#cpp_forward` only contributes inside type bodies, where
    /// `forward` is set; elsewhere it expands to nothing.
    fn emit_metafunction(&mut self, expr: ExprId, forward: bool) -> Result<(), BindError> {
        let node = self.program.expr(expr);
        let ExprKind::Call { callee, args } = &node.kind else {
            unreachable!("metafunctions are always calls");
        };
        if callee != META_CPP && callee != META_CPP_FORWARD {
            return Err(BindError::UnknownMetafunction {
                name: callee.clone(),
                pos: node.pos,
            });
        }
        for &arg in args {
            let ExprKind::Str(text) = &self.program.expr(arg).kind else {
                return Err(BindError::MetafunctionArgument {
                    name: callee.clone(),
                    pos: self.program.expr(arg).pos,
                });
            };
            if callee == META_CPP || forward {
                self.out(text.replace(PREFIX_PLACEHOLDER, PREFIX));
            }
        }
        Ok(())
    }

    fn emit_expr(&self, scope: ScopeId, expr: ExprId) -> Result<String, BindError> {
        let node = self.program.expr(expr);
        let text = match &node.kind {
            ExprKind::Int(text) => {
                format!("{}(\"{text}\", 10)", mangle_type(well_known::INT))
            }
            // `1.25` lowers to the rational 125/100.
            ExprKind::Decimal(text) => {
                let (num, den) = decimal_parts(text);
                let int = mangle_type(well_known::INT);
                format!(
                    "{}({int}(\"{num}\", 10), {int}(\"{den}\", 10))",
                    mangle_type(well_known::RAT)
                )
            }
            ExprKind::Float(text) => {
                let normalized = if text.contains('.') {
                    text.clone()
                } else {
                    format!("{text}.0")
                };
                format!("{}({normalized}f)", mangle_type(well_known::FLT))
            }
            ExprKind::Str(text) => {
                format!("{}(\"{}\")", mangle_type(well_known::STR), escape_cpp(text))
            }
            ExprKind::Bool(value) => format!("{}({value})", mangle_type(well_known::BOOL)),
            ExprKind::Var(name) => {
                let var = self.program.lookup_var_at(scope, name, expr).ok_or_else(|| {
                    BindError::UnresolvedVariable {
                        name: name.clone(),
                        pos: node.pos,
                    }
                })?;
                format!("{PREFIX}{}", self.program.var(var).internal)
            }
            ExprKind::Not(operand) => {
                resolve::expect_bool(self.program, scope, *operand)?;
                let inner = self.emit_expr(scope, *operand)?;
                format!("{}(!({inner}).v)", mangle_type(well_known::BOOL))
            }
            ExprKind::And(lhs, rhs) | ExprKind::Or(lhs, rhs) => {
                resolve::expect_bool(self.program, scope, *lhs)?;
                resolve::expect_bool(self.program, scope, *rhs)?;
                let connective = if matches!(node.kind, ExprKind::And(..)) {
                    "&&"
                } else {
                    "||"
                };
                let lhs = self.emit_expr(scope, *lhs)?;
                let rhs = self.emit_expr(scope, *rhs)?;
                format!(
                    "{}(({lhs}).v {connective} ({rhs}).v)",
                    mangle_type(well_known::BOOL)
                )
            }
            ExprKind::Call { callee, args } => {
                if node.is_metafunction() {
                    return Err(BindError::ValuelessExpression { pos: node.pos });
                }
                let resolution =
                    resolve::resolve_call(self.program, scope, None, callee, args, node.pos)?;
                self.call_text(scope, &resolution)?
            }
            ExprKind::Member { lhs, rhs } => {
                let lhs_ty = resolve::require_type(self.program, scope, *lhs)?;
                let members = self.program.ty(lhs_ty).scope;
                let lhs_text = self.emit_expr(scope, *lhs)?;
                let selector = self.program.expr(*rhs);
                match &selector.kind {
                    ExprKind::Var(name) => {
                        let Some(&var) = self
                            .program
                            .scope(members)
                            .vars
                            .get(name)
                            .and_then(|stack| stack.last())
                        else {
                            return Err(BindError::UnresolvedVariable {
                                name: name.clone(),
                                pos: selector.pos,
                            });
                        };
                        format!("({lhs_text}).{PREFIX}{}", self.program.var(var).internal)
                    }
                    ExprKind::Call { callee, args } => {
                        let resolution = resolve::resolve_call(
                            self.program,
                            scope,
                            Some(members),
                            callee,
                            args,
                            selector.pos,
                        )?;
                        let name = self.mangle_fn(resolution.target)?;
                        let args = self.args_text(scope, &resolution)?;
                        format!("({lhs_text}).{name}({args})")
                    }
                    _ => unreachable!("member access selects a field or a method"),
                }
            }
        };
        Ok(text)
    }

    fn call_text(&self, scope: ScopeId, resolution: &Resolution) -> Result<String, BindError> {
        let name = self.mangle_fn(resolution.target)?;
        let args = self.args_text(scope, resolution)?;
        Ok(format!("{name}({args})"))
    }

    fn args_text(&self, scope: ScopeId, resolution: &Resolution) -> Result<String, BindError> {
        let args = resolution
            .args
            .iter()
            .map(|&arg| self.emit_expr(scope, arg))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(args.join(", "))
    }

    /// `RET NAME(PARAMS)` of a function, with everything mangled.
    fn fn_signature(&self, func: FnId) -> Result<String, BindError> {
        let ret = self.ret_text(func)?;
        let name = self.mangle_fn(func)?;
        let params = self.fn_params(func)?;
        Ok(format!("{ret} {name}({params})"))
    }

    fn fn_params(&self, func: FnId) -> Result<String, BindError> {
        let decl = self.program.func(func);
        let params = decl
            .params
            .iter()
            .map(|param| {
                let ty =
                    resolve::resolve_type(self.program, decl.body, &param.ty.name, param.ty.pos)?;
                let ty = mangle_type(&self.program.ty(ty).name);
                let var = self.program.var(param.var);
                let text = match param.mode {
                    PassMode::ImmutableBorrow => format!("const {ty}& {PREFIX}{}", var.internal),
                    PassMode::MutableBorrow => format!("{ty}& {PREFIX}{}", var.internal),
                    PassMode::Take => format!("{ty} {PREFIX}{}", var.internal),
                };
                Ok(text)
            })
            .collect::<Result<Vec<_>, BindError>>()?;
        Ok(params.join(", "))
    }

    /// `RET(PARAM_TYPES)` of a local function, as it appears inside its
    /// `std::function` declaration.
    fn fn_type(&self, func: FnId) -> Result<String, BindError> {
        let decl = self.program.func(func);
        let params = decl
            .params
            .iter()
            .map(|param| {
                let ty =
                    resolve::resolve_type(self.program, decl.body, &param.ty.name, param.ty.pos)?;
                let ty = mangle_type(&self.program.ty(ty).name);
                let text = match param.mode {
                    PassMode::ImmutableBorrow => format!("const {ty}&"),
                    PassMode::MutableBorrow => format!("{ty}&"),
                    PassMode::Take => ty,
                };
                Ok(text)
            })
            .collect::<Result<Vec<_>, BindError>>()?;
        let ret = self.ret_text(func)?;
        Ok(format!("{ret}({})", params.join(", ")))
    }

    fn ret_text(&self, func: FnId) -> Result<String, BindError> {
        Ok(match resolve::ret_type(self.program, func)? {
            Some(ty) => mangle_type(&self.program.ty(ty).name),
            None => "void".to_string(),
        })
    }

    /// The output name of a function: the prefix, the encoded source name
    /// and the mangled return type. The return type takes part because two
    /// overloads may differ in it alone, which C++ cannot express.
    fn mangle_fn(&self, func: FnId) -> Result<String, BindError> {
        let ret = self.ret_text(func)?;
        Ok(format!(
            "{PREFIX}{}__{ret}",
            encode_name(&self.program.func(func).name)
        ))
    }

    fn out(&mut self, line: impl fmt::Display) {
        if self.indent > 0 {
            write!(self.sink, "{:width$}", "", width = self.indent * 4)
                .expect("Failed to write to sink");
        }
        writeln!(self.sink, "{line}").expect("Failed to write to sink");
    }

    fn blank(&mut self) {
        writeln!(self.sink).expect("Failed to write to sink");
    }
}

pub fn mangle_type(name: &str) -> String {
    format!("{PREFIX}{name}")
}

/// Spells operator characters out so the name survives as a C++ identifier.
fn encode_name(name: &str) -> String {
    let mut encoded = String::with_capacity(name.len());
    for ch in name.chars() {
        match ch {
            '+' => encoded.push_str("ad"),
            '-' => encoded.push_str("sb"),
            '*' => encoded.push_str("ml"),
            '/' => encoded.push_str("dv"),
            '^' => encoded.push_str("pw"),
            '=' => encoded.push_str("eq"),
            '!' => encoded.push_str("nt"),
            '<' => encoded.push_str("ls"),
            '>' => encoded.push_str("gr"),
            other => encoded.push(other),
        }
    }
    encoded
}

/// Numerator and denominator of a fixed-point literal: `1.25` is 125/100.
fn decimal_parts(text: &str) -> (String, String) {
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text, ""));
    let num = format!("{int_part}{frac_part}");
    let mut den = String::from("1");
    den.extend(std::iter::repeat('0').take(frac_part.len()));
    (num, den)
}

fn escape_cpp(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use crate::parser;

    use super::*;

    fn transpile(source: &str) -> Result<String, BindError> {
        let mut program = Program::new();
        parser::parse_into(&mut program, Program::GLOBAL, source)
            .expect("parsing should succeed");
        let mut buffer = Vec::new();
        emit(&program, &mut buffer)?;
        Ok(String::from_utf8(buffer).expect("output is UTF-8"))
    }

    #[test]
    fn emits_a_minimal_translation_unit() {
        let output = transpile(indoc! {r#"
            type Int {
                #cpp_forward("long long v = 0;");
            }
            fn Main() {
                let x = 1;
            }
        "#})
        .expect("should transpile");
        assert_eq!(
            output,
            indoc! {r#"
                #include <cstdio>
                #include <cstdlib>
                #include <functional>
                #include <string>

                struct zrm_Int;
                zrm_Int zrm_Int__zrm_Int();
                void zrm_Main__void();

                struct zrm_Int {
                    long long v = 0;
                };

                zrm_Int zrm_Int__zrm_Int() {
                    return zrm_Int();
                }

                void zrm_Main__void() {
                    const zrm_Int zrm_x = zrm_Int("1", 10);
                }

                int main() {
                    zrm_Main__void();
                    return 0;
                }
            "#}
        );
    }

    #[test]
    fn mangles_operator_functions_with_their_return_type() {
        let output = transpile(
            "type Int { }
             fn +(Int a, Int b) -> Int { }
             fn Main() { }",
        )
        .expect("should transpile");
        assert!(output.contains("zrm_Int zrm_ad__zrm_Int(const zrm_Int& zrm_a, const zrm_Int& zrm_b);"));
    }

    #[test]
    fn mutably_borrowed_parameters_are_plain_references() {
        let output = transpile(
            "type Int { }
             fn Bump(Int& n) { }
             fn Main() { }",
        )
        .expect("should transpile");
        assert!(output.contains("void zrm_Bump__void(zrm_Int& zrm_n);"));
    }

    #[test]
    fn literals_lower_to_runtime_constructors() {
        let output = transpile(
            "type Int { } type Rat { } type Flt { } type Str { } type Bool { }
             fn Main() {
                 let a = 42;
                 let b = 1.25;
                 let c = 3f;
                 let d = \"hi\\n\";
                 let e = True;
             }",
        )
        .expect("should transpile");
        assert!(output.contains("const zrm_Int zrm_a = zrm_Int(\"42\", 10);"));
        assert!(output.contains("const zrm_Rat zrm_b = zrm_Rat(zrm_Int(\"125\", 10), zrm_Int(\"100\", 10));"));
        assert!(output.contains("const zrm_Flt zrm_c = zrm_Flt(3.0f);"));
        assert!(output.contains("const zrm_Str zrm_d = zrm_Str(\"hi\\n\");"));
        assert!(output.contains("const zrm_Bool zrm_e = zrm_Bool(true);"));
    }

    #[test]
    fn conditions_read_the_raw_bool_field() {
        let output = transpile(
            "type Bool { }
             fn Main() {
                 if True && !False then return;
                 unless False { return; }
             }",
        )
        .expect("should transpile");
        assert!(output.contains("if ((zrm_Bool((zrm_Bool(true)).v && (zrm_Bool(!(zrm_Bool(false)).v)).v)).v) {"));
        assert!(output.contains("if (!((zrm_Bool(false)).v)) {"));
    }

    #[test]
    fn missing_main_is_an_error() {
        assert_eq!(
            transpile("type Int { }"),
            Err(BindError::MissingMain)
        );
        // A `Main` with parameters does not count.
        assert_eq!(
            transpile("type Int { } fn Main(Int a) { }"),
            Err(BindError::MissingMain)
        );
        // A declared return type does; the entry discards the value.
        let output = transpile("type Int { } fn Main() -> Int { let x = 1; return x; }")
            .expect("should transpile");
        assert!(output.contains("    zrm_Main__zrm_Int();"));
    }

    #[test]
    fn rejects_statements_in_the_global_scope() {
        assert!(matches!(
            transpile("type Int { } let x = 1; fn Main() { }"),
            Err(BindError::StatementInGlobalScope { .. })
        ));
    }

    #[test]
    fn rejects_plain_statements_in_type_bodies() {
        assert!(matches!(
            transpile("fn F() { } type T { F(); } fn Main() { }"),
            Err(BindError::StatementInTypeBody { .. })
        ));
    }

    #[test]
    fn borrowed_parameters_cannot_be_returned() {
        assert!(matches!(
            transpile(
                "type Int { }
                 fn Pass(Int a) -> Int { return a; }
                 fn Main() { }"
            ),
            Err(BindError::ReturnOfBorrowed { name, .. }) if name == "a"
        ));
        // Locals are fine.
        transpile(
            "type Int { }
             fn Make() -> Int { let a = 1; return a; }
             fn Main() { }",
        )
        .expect("should transpile");
    }

    #[test]
    fn checks_return_values_against_the_signature() {
        assert!(matches!(
            transpile("type Int { } fn F() -> Int { return; } fn Main() { }"),
            Err(BindError::MissingReturnValue { .. })
        ));
        assert!(matches!(
            transpile("type Int { } fn F() { return 1; } fn Main() { }"),
            Err(BindError::UnexpectedReturnValue { .. })
        ));
        assert!(matches!(
            transpile(
                "type Int { } type Str { }
                 fn F() -> Int { return \"s\"; }
                 fn Main() { }"
            ),
            Err(BindError::ReturnTypeMismatch { expected, found, .. })
                if expected == "Int" && found == "Str"
        ));
    }

    #[test]
    fn reassignment_respects_mutability_and_types() {
        assert!(matches!(
            transpile("type Int { } fn Main() { let x = 1; x := 2; }"),
            Err(BindError::ReassignImmutable { name, .. }) if name == "x"
        ));
        assert!(matches!(
            transpile(
                "type Int { } type Str { }
                 fn Main() { let x := 1; x := \"s\"; }"
            ),
            Err(BindError::TypeMismatch { expected, found, .. })
                if expected == "Int" && found == "Str"
        ));
        let output = transpile("type Int { } fn Main() { let x := 1; x := 2; }")
            .expect("should transpile");
        assert!(output.contains("zrm_Int zrm_x = zrm_Int(\"1\", 10);"));
        assert!(output.contains("zrm_x = zrm_Int(\"2\", 10);"));
    }

    #[test]
    fn metafunctions_take_string_literals_only() {
        assert!(matches!(
            transpile("type Int { } fn Main() { #cpp(1); }"),
            Err(BindError::MetafunctionArgument { name, .. }) if name == "#cpp"
        ));
        assert!(matches!(
            transpile("fn Main() { #boom(\"x\"); }"),
            Err(BindError::UnknownMetafunction { name, .. }) if name == "#boom"
        ));
    }

    #[test]
    fn metafunction_placeholder_expands_to_the_prefix() {
        let output = transpile(
            "type Int {
                 #cpp_forward(\"#__Int() = default;\");
             }
             fn Main() { #cpp(\"#__Int x;\"); }",
        )
        .expect("should transpile");
        assert!(output.contains("    zrm_Int() = default;"));
        assert!(output.contains("    zrm_Int x;"));
    }

    #[test]
    fn cpp_forward_is_silent_outside_type_bodies() {
        let output = transpile("fn Main() { #cpp_forward(\"int x;\"); }")
            .expect("should transpile");
        assert!(!output.contains("int x;"));
    }

    #[test]
    fn shadowed_locals_keep_distinct_output_names() {
        let output = transpile(
            "type Int { }
             fn Main() { let x = 1; { let x = x; } }",
        )
        .expect("should transpile");
        assert!(output.contains("const zrm_Int zrm_x = zrm_Int(\"1\", 10);"));
        assert!(output.contains("const zrm_Int zrm_x_ = zrm_x;"));
    }

    #[test]
    fn local_functions_become_lambdas() {
        let output = transpile(
            "type Int { }
             fn Main() {
                 fn Make() -> Int { let a = 1; return a; }
                 let x = Make();
             }",
        )
        .expect("should transpile");
        assert!(output.contains("std::function<zrm_Int()> zrm_Make__zrm_Int;"));
        assert!(output.contains("zrm_Make__zrm_Int = [&]() -> zrm_Int {"));
        assert!(output.contains("const zrm_Int zrm_x = zrm_Make__zrm_Int();"));
    }

    #[test]
    fn local_functions_may_call_later_siblings() {
        let output = transpile(
            "type Int { }
             fn Main() {
                 fn A() -> Int { let r = B(); return r; }
                 fn B() -> Int { let v = 1; return v; }
                 let x = A();
             }",
        )
        .expect("should transpile");
        let declared = output
            .find("std::function<zrm_Int()> zrm_B__zrm_Int;")
            .expect("B should be declared up front");
        let called = output
            .find("zrm_B__zrm_Int()")
            .expect("A should call B");
        assert!(declared < called);
    }

    #[test]
    fn member_accesses_go_through_the_object() {
        let output = transpile(
            "type Int { }
             type Point {
                 let x = 1;
                 fn Get() -> Int { let v = 2; return v; }
             }
             fn Main() {
                 let p = Point();
                 let a = p.x;
                 let b = p.Get();
             }",
        )
        .expect("should transpile");
        assert!(output.contains("const zrm_Int zrm_a = (zrm_p).zrm_x;"));
        assert!(output.contains("const zrm_Int zrm_b = (zrm_p).zrm_Get__zrm_Int();"));
    }

    #[test]
    fn named_arguments_are_reordered_into_parameter_order() {
        let output = transpile(
            "type Int { } type Str { }
             fn F(Int a, Str b) { }
             fn Main() { F(b: \"s\", a: 1); }",
        )
        .expect("should transpile");
        assert!(output.contains("zrm_F__void(zrm_Int(\"1\", 10), zrm_Str(\"s\"));"));
    }
}
