use crate::{
    ast::{ExprId, ExprKind, FnId, PassMode, Program, ScopeId, TypeId, TypeRef, VarId},
    error::BindError,
    token::Pos,
};

/// Type names the compiler itself needs to know about. They are ordinary
/// types declared by the builtin prelude; literals resolve against them.
pub mod well_known {
    pub const INT: &str = "Int";
    pub const RAT: &str = "Rat";
    pub const FLT: &str = "Flt";
    pub const STR: &str = "Str";
    pub const BOOL: &str = "Bool";
    pub const MAIN: &str = "Main";
}

/// A successfully resolved call.
pub struct Resolution {
    pub target: FnId,
    /// The call arguments, reordered into parameter order.
    pub args: Vec<ExprId>,
}

pub fn resolve_type(
    program: &Program,
    scope: ScopeId,
    name: &str,
    pos: Pos,
) -> Result<TypeId, BindError> {
    program
        .lookup_type(scope, name)
        .ok_or_else(|| BindError::UnresolvedType {
            name: name.to_string(),
            pos,
        })
}

/// The type of a variable. Parameters carry an explicit type name; locals
/// take the type of their initializer.
pub fn type_of_var(program: &Program, var: VarId) -> Result<TypeId, BindError> {
    let decl = program.var(var);
    match &decl.ty {
        TypeRef::Named(name) => resolve_type(program, decl.scope, &name.name, name.pos),
        TypeRef::OfExpr(expr) => require_type(program, decl.scope, *expr),
    }
}

/// The type an expression evaluates to, or `None` for expressions that
/// produce no value (calls of void functions and metafunctions).
pub fn type_of_expr(
    program: &Program,
    scope: ScopeId,
    expr: ExprId,
) -> Result<Option<TypeId>, BindError> {
    let node = program.expr(expr);
    match &node.kind {
        ExprKind::Int(_) => resolve_type(program, scope, well_known::INT, node.pos).map(Some),
        ExprKind::Decimal(_) => resolve_type(program, scope, well_known::RAT, node.pos).map(Some),
        ExprKind::Float(_) => resolve_type(program, scope, well_known::FLT, node.pos).map(Some),
        ExprKind::Str(_) => resolve_type(program, scope, well_known::STR, node.pos).map(Some),
        ExprKind::Bool(_) => resolve_type(program, scope, well_known::BOOL, node.pos).map(Some),
        ExprKind::Var(name) => {
            let var = program.lookup_var_at(scope, name, expr).ok_or_else(|| {
                BindError::UnresolvedVariable {
                    name: name.clone(),
                    pos: node.pos,
                }
            })?;
            type_of_var(program, var).map(Some)
        }
        ExprKind::Not(operand) => {
            expect_bool(program, scope, *operand)?;
            resolve_type(program, scope, well_known::BOOL, node.pos).map(Some)
        }
        ExprKind::And(lhs, rhs) | ExprKind::Or(lhs, rhs) => {
            expect_bool(program, scope, *lhs)?;
            expect_bool(program, scope, *rhs)?;
            resolve_type(program, scope, well_known::BOOL, node.pos).map(Some)
        }
        ExprKind::Call { callee, args } => {
            if node.is_metafunction() {
                return Ok(None);
            }
            let resolution = resolve_call(program, scope, None, callee, args, node.pos)?;
            ret_type(program, resolution.target)
        }
        ExprKind::Member { lhs, rhs } => {
            let lhs_ty = require_type(program, scope, *lhs)?;
            let members = program.ty(lhs_ty).scope;
            let selector = program.expr(*rhs);
            match &selector.kind {
                // Members resolve in the type's own scope only; lookup
                // never leaks outwards into the enclosing scopes.
                ExprKind::Var(name) => {
                    let Some(&var) = program
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
                    type_of_var(program, var).map(Some)
                }
                ExprKind::Call { callee, args } => {
                    let resolution =
                        resolve_call(program, scope, Some(members), callee, args, selector.pos)?;
                    ret_type(program, resolution.target)
                }
                _ => unreachable!("member access selects a field or a method"),
            }
        }
    }
}

/// Like [`type_of_expr`], but valueless expressions are an error.
pub fn require_type(program: &Program, scope: ScopeId, expr: ExprId) -> Result<TypeId, BindError> {
    type_of_expr(program, scope, expr)?.ok_or_else(|| BindError::ValuelessExpression {
        pos: program.expr(expr).pos,
    })
}

pub fn expect_bool(program: &Program, scope: ScopeId, expr: ExprId) -> Result<(), BindError> {
    let pos = program.expr(expr).pos;
    let actual = require_type(program, scope, expr)?;
    let bool_ty = resolve_type(program, scope, well_known::BOOL, pos)?;
    if actual != bool_ty {
        return Err(BindError::TypeMismatch {
            expected: well_known::BOOL.to_string(),
            found: program.ty(actual).name.clone(),
            pos,
        });
    }
    Ok(())
}

/// The declared return type of a function, resolved from its body scope.
pub fn ret_type(program: &Program, target: FnId) -> Result<Option<TypeId>, BindError> {
    let func = program.func(target);
    match &func.ret {
        Some(name) => resolve_type(program, func.body, &name.name, name.pos).map(Some),
        None => Ok(None),
    }
}

/// Resolves a call to a concrete function.
///
/// Candidates are searched scope by scope, walking outwards from `scope`
/// (or within `restrict` only, for member calls). A candidate matches when
/// its arity and parameter types line up with the arguments, after named
/// arguments have been assigned to their parameters. The first match wins;
/// per-argument borrow rules are then enforced against it.
pub fn resolve_call(
    program: &Program,
    scope: ScopeId,
    restrict: Option<ScopeId>,
    callee: &str,
    args: &[ExprId],
    pos: Pos,
) -> Result<Resolution, BindError> {
    let mut arg_types = Vec::with_capacity(args.len());
    for &arg in args {
        arg_types.push(require_type(program, scope, arg)?);
    }

    let mut current = Some(restrict.unwrap_or(scope));
    while let Some(scope_id) = current {
        for &target in &program.scope(scope_id).fns {
            if program.func(target).name != callee {
                continue;
            }
            if let Some(ordered) = match_candidate(program, target, args, &arg_types)? {
                check_borrows(program, scope, target, &ordered)?;
                return Ok(Resolution {
                    target,
                    args: ordered,
                });
            }
        }
        current = if restrict.is_some() {
            None
        } else {
            program.scope(scope_id).parent
        };
    }
    Err(BindError::NoMatchingFunction {
        name: callee.to_string(),
        pos,
    })
}

/// Checks one candidate against the call site. Returns the arguments in
/// parameter order on a match and `None` on an ordinary mismatch. A named
/// argument that targets an already filled parameter is a hard error, not
/// a mismatch, so it is reported even if another overload would fit.
fn match_candidate(
    program: &Program,
    target: FnId,
    args: &[ExprId],
    arg_types: &[TypeId],
) -> Result<Option<Vec<ExprId>>, BindError> {
    let func = program.func(target);
    if func.params.len() != args.len() {
        return Ok(None);
    }

    let mut slots: Vec<Option<ExprId>> = vec![None; args.len()];
    let mut next_positional = 0;
    for (&arg, &arg_ty) in args.iter().zip(arg_types) {
        let slot = match &program.expr(arg).arg_name {
            Some((name, name_pos)) => {
                let Some(index) = func.params.iter().position(|param| &param.name == name) else {
                    return Ok(None);
                };
                if slots[index].is_some() {
                    return Err(BindError::NamedArgumentConflict {
                        name: name.clone(),
                        pos: *name_pos,
                    });
                }
                index
            }
            None => {
                let index = next_positional;
                next_positional += 1;
                index
            }
        };
        slots[slot] = Some(arg);

        let param_ty = &func.params[slot].ty;
        if resolve_type(program, func.body, &param_ty.name, param_ty.pos)? != arg_ty {
            return Ok(None);
        }
    }
    Ok(slots.into_iter().collect())
}

/// Enforces the borrow rules of the matched function: a mutably borrowed
/// parameter only accepts a plain variable, and that variable must itself
/// be mutable.
fn check_borrows(
    program: &Program,
    scope: ScopeId,
    target: FnId,
    ordered: &[ExprId],
) -> Result<(), BindError> {
    for (param, &arg) in program.func(target).params.iter().zip(ordered) {
        if param.mode != PassMode::MutableBorrow {
            continue;
        }
        let node = program.expr(arg);
        match &node.kind {
            ExprKind::Var(name) => {
                let var = program.lookup_var_at(scope, name, arg).ok_or_else(|| {
                    BindError::UnresolvedVariable {
                        name: name.clone(),
                        pos: node.pos,
                    }
                })?;
                if !program.var(var).access.is_mutable() {
                    return Err(BindError::MutableBorrowOfImmutable {
                        name: name.clone(),
                        pos: node.pos,
                    });
                }
            }
            _ => return Err(BindError::MutableBorrowOfExpression { pos: node.pos }),
        }
    }
    Ok(())
}
