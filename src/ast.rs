// program ::= (type | fn | stmt)*
// type ::= 'type' ID '{' (type | fn | stmt)* '}'
// fn ::= 'fn' (ID | OP) '(' [param (',' param)*] ')' ['->' ID] '{' (type | fn | stmt)* '}'
// param ::= ID ['&'] ID
// stmt ::= 'let' ID ('=' | ':=') expr ';'
//        | ID ':=' expr ';'
//        | 'return' [expr] ';'
//        | ('if' | 'unless') expr ('then' stmt | '{' stmt* '}') ['else' (stmt | '{' stmt* '}')]
//        | '{' stmt* '}'
//        | expr ';'                      (calls and member accesses only)
// expr ::= expr OP expr | expr '&&' expr | expr '||' expr
//        | '-' expr | '!' expr
//        | expr '.' ID | expr '.' ID '(' args ')'
//        | (ID | META_ID) '(' args ')'
//        | '(' expr ')'
//        | ID | integer | decimal | float | string | 'True' | 'False'
// args ::= [arg (',' arg)*] where arg ::= [ID ':'] expr

use std::collections::HashMap;

use crate::error::BindError;
use crate::token::Pos;

macro_rules! arena_id {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
            pub struct $name(u32);

            impl $name {
                fn index(self) -> usize {
                    self.0 as usize
                }
            }
        )*
    };
}

arena_id! {
    /// Index of a scope in [`Program::scopes`].
    ScopeId,
    TypeId,
    FnId,
    VarId,
    ExprId,
    StmtId,
}

/// The whole bound tree of a compilation.
///
/// Every node lives in one of the arenas below and refers to other nodes
/// through plain indices, so the tree never needs reference counting and
/// parent links are cheap.
#[derive(Debug, Default)]
pub struct Program {
    scopes: Vec<Scope>,
    types: Vec<TypeDecl>,
    fns: Vec<FnDecl>,
    vars: Vec<VarDecl>,
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,
}

impl Program {
    pub const GLOBAL: ScopeId = ScopeId(0);

    pub fn new() -> Program {
        Program {
            scopes: vec![Scope::new(None, None)],
            ..Program::default()
        }
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    pub fn ty(&self, id: TypeId) -> &TypeDecl {
        &self.types[id.index()]
    }

    pub fn func(&self, id: FnId) -> &FnDecl {
        &self.fns[id.index()]
    }

    pub fn var(&self, id: VarId) -> &VarDecl {
        &self.vars[id.index()]
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    pub fn alloc_scope(&mut self, parent: ScopeId, owner: Option<Owner>) -> ScopeId {
        let id = ScopeId(u32::try_from(self.scopes.len()).unwrap());
        self.scopes.push(Scope::new(Some(parent), owner));
        id
    }

    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId(u32::try_from(self.exprs.len()).unwrap());
        self.exprs.push(expr);
        id
    }

    pub fn alloc_stmt(&mut self, stmt: Stmt) -> StmtId {
        let id = StmtId(u32::try_from(self.stmts.len()).unwrap());
        self.stmts.push(stmt);
        id
    }

    /// The id the next allocated expression will get. Declarations record
    /// this as a watermark so that expressions parsed before a variable
    /// existed never resolve to it.
    pub fn next_expr_id(&self) -> ExprId {
        ExprId(u32::try_from(self.exprs.len()).unwrap())
    }

    /// The id the next registered type will get. Used to link a member
    /// scope to its owning type before the type itself exists.
    pub fn next_type_id(&self) -> TypeId {
        TypeId(u32::try_from(self.types.len()).unwrap())
    }

    /// The id the next registered function will get.
    pub fn next_fn_id(&self) -> FnId {
        FnId(u32::try_from(self.fns.len()).unwrap())
    }

    pub fn push_stmt(&mut self, scope: ScopeId, stmt: StmtId) {
        self.scopes[scope.index()].stmts.push(stmt);
    }

    pub fn set_arg_name(&mut self, expr: ExprId, name: String, pos: Pos) {
        self.exprs[expr.index()].arg_name = Some((name, pos));
    }

    pub fn set_member_of(&mut self, expr: ExprId, member: ExprId) {
        self.exprs[expr.index()].member_of = Some(member);
    }

    /// Registers a type into `scope` and synthesizes its zero-argument
    /// constructor function right away. The constructor is a regular
    /// function named after the type, returning the type.
    ///
    /// The caller allocates the member scope beforehand, owned by
    /// [`Program::next_type_id`].
    pub fn register_type(&mut self, scope: ScopeId, decl: TypeDecl) -> Result<TypeId, BindError> {
        let duplicate = self.scopes[scope.index()]
            .types
            .iter()
            .any(|&id| self.types[id.index()].name == decl.name);
        if duplicate {
            return Err(BindError::AmbiguousDeclaration {
                name: decl.name,
                pos: decl.pos,
            });
        }

        let id = self.next_type_id();
        let name = decl.name.clone();
        let pos = decl.pos;
        self.types.push(decl);
        self.scopes[scope.index()].types.push(id);

        let ctor = self.next_fn_id();
        let body = self.alloc_scope(scope, Some(Owner::Fn(ctor)));
        self.register_fn(
            scope,
            FnDecl {
                name: name.clone(),
                pos,
                params: Vec::new(),
                ret: Some(TypeName { name, pos }),
                body,
                ctor_of: Some(id),
            },
        )?;
        Ok(id)
    }

    /// Registers a function into `scope`. Two functions clash when their
    /// name, parameter type list and return type all match; overloading
    /// on the return type alone is legal.
    pub fn register_fn(&mut self, scope: ScopeId, decl: FnDecl) -> Result<FnId, BindError> {
        fn ret_name(ret: &Option<TypeName>) -> Option<&str> {
            ret.as_ref().map(|ty| ty.name.as_str())
        }
        let clashes = self.scopes[scope.index()].fns.iter().any(|&id| {
            let other = &self.fns[id.index()];
            other.name == decl.name
                && ret_name(&other.ret) == ret_name(&decl.ret)
                && other.params.len() == decl.params.len()
                && other
                    .params
                    .iter()
                    .zip(&decl.params)
                    .all(|(a, b)| a.ty.name == b.ty.name)
        });
        if clashes {
            return Err(BindError::AmbiguousDeclaration {
                name: decl.name,
                pos: decl.pos,
            });
        }

        let id = self.next_fn_id();
        self.fns.push(decl);
        self.scopes[scope.index()].fns.push(id);
        Ok(id)
    }

    /// Declares a variable in `scope`, computing a program-unique internal
    /// name: each declaration shadowing an earlier `x` becomes `x_`, then
    /// `x__`, and so on, so shadowed variables keep distinct output names.
    pub fn declare_var(
        &mut self,
        scope: ScopeId,
        name: String,
        access: AccessKind,
        ty: TypeRef,
        pos: Pos,
    ) -> VarId {
        let internal = match self.lookup_var(scope, &name) {
            Some(shadowed) => format!("{}_", self.vars[shadowed.index()].internal),
            None => name.clone(),
        };
        let id = VarId(u32::try_from(self.vars.len()).unwrap());
        self.vars.push(VarDecl {
            name: name.clone(),
            internal,
            scope,
            access,
            ty,
            visible_from: self.next_expr_id(),
            pos,
        });
        self.scopes[scope.index()]
            .vars
            .entry(name)
            .or_default()
            .push(id);
        id
    }

    /// Resolves a variable name by walking the scope chain outwards,
    /// newest shadowing declaration first.
    pub fn lookup_var(&self, scope: ScopeId, name: &str) -> Option<VarId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = &self.scopes[id.index()];
            if let Some(&var) = scope.vars.get(name).and_then(|stack| stack.last()) {
                return Some(var);
            }
            current = scope.parent;
        }
        None
    }

    /// Like [`Program::lookup_var`], but as seen from the expression `at`:
    /// variables declared after the expression was built are skipped, so a
    /// shadowing initializer still sees the declaration it shadows.
    pub fn lookup_var_at(&self, scope: ScopeId, name: &str, at: ExprId) -> Option<VarId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = &self.scopes[id.index()];
            if let Some(stack) = scope.vars.get(name) {
                if let Some(&var) = stack
                    .iter()
                    .rev()
                    .find(|&&var| self.vars[var.index()].visible_from <= at)
                {
                    return Some(var);
                }
            }
            current = scope.parent;
        }
        None
    }

    /// Resolves a type name by walking the scope chain outwards.
    pub fn lookup_type(&self, scope: ScopeId, name: &str) -> Option<TypeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = &self.scopes[id.index()];
            if let Some(&ty) = scope
                .types
                .iter()
                .find(|&&id| self.types[id.index()].name == name)
            {
                return Some(ty);
            }
            current = scope.parent;
        }
        None
    }

    /// The function whose body (directly or through nested blocks)
    /// contains `scope`, if any.
    pub fn enclosing_fn(&self, scope: ScopeId) -> Option<FnId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = &self.scopes[id.index()];
            match scope.owner {
                Some(Owner::Fn(id)) => return Some(id),
                Some(Owner::Type(_)) => return None,
                None => current = scope.parent,
            }
        }
        None
    }
}

/// The declaration owning a scope, when the scope is not a plain block.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Owner {
    Type(TypeId),
    Fn(FnId),
}

#[derive(Debug)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub owner: Option<Owner>,
    pub types: Vec<TypeId>,
    pub fns: Vec<FnId>,
    pub stmts: Vec<StmtId>,
    /// Declarations per name, in declaration order; the last one shadows
    /// the earlier ones.
    pub vars: HashMap<String, Vec<VarId>>,
}

impl Scope {
    fn new(parent: Option<ScopeId>, owner: Option<Owner>) -> Scope {
        Scope {
            parent,
            owner,
            types: Vec::new(),
            fns: Vec::new(),
            stmts: Vec::new(),
            vars: HashMap::new(),
        }
    }
}

/// A type name as written in the source, before resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeName {
    pub name: String,
    pub pos: Pos,
}

#[derive(Debug)]
pub struct TypeDecl {
    pub name: String,
    pub pos: Pos,
    /// Scope holding the member fields, functions and nested types.
    pub scope: ScopeId,
}

#[derive(Debug)]
pub struct FnDecl {
    /// Either an identifier or an operator spelling such as `+` or `==`.
    pub name: String,
    pub pos: Pos,
    pub params: Vec<Param>,
    pub ret: Option<TypeName>,
    pub body: ScopeId,
    /// Set on the synthesized constructor of a type.
    pub ctor_of: Option<TypeId>,
}

#[derive(Debug)]
pub struct Param {
    pub ty: TypeName,
    pub mode: PassMode,
    pub name: String,
    /// The variable this parameter declares in the function body scope.
    pub var: VarId,
    pub pos: Pos,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PassMode {
    /// The default: arguments are passed by immutable reference.
    ImmutableBorrow,
    /// `&`: the parameter aliases the caller's variable and may mutate it.
    MutableBorrow,
    /// Pass by value, transferring ownership to the callee.
    Take,
}

/// How a variable may be used, derived from its declaration form.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AccessKind {
    /// `let x = ...;`
    ImmutableLocal,
    /// `let x := ...;`
    MutableLocal,
    /// `x := ...;` without a prior declaration.
    DynamicLocal,
    /// Parameter without `&`.
    ImmutableBorrow,
    /// Parameter with `&`.
    MutableBorrow,
    /// Parameter taken by value.
    DynamicTake,
}

impl AccessKind {
    pub fn of_mode(mode: PassMode) -> AccessKind {
        match mode {
            PassMode::ImmutableBorrow => AccessKind::ImmutableBorrow,
            PassMode::MutableBorrow => AccessKind::MutableBorrow,
            PassMode::Take => AccessKind::DynamicTake,
        }
    }

    pub fn is_mutable(self) -> bool {
        matches!(
            self,
            AccessKind::MutableLocal
                | AccessKind::DynamicLocal
                | AccessKind::MutableBorrow
                | AccessKind::DynamicTake
        )
    }

    /// Whether a variable with this access may be returned by value.
    /// Borrowed variables may not escape through `return`.
    pub fn is_returnable(self) -> bool {
        matches!(
            self,
            AccessKind::ImmutableLocal
                | AccessKind::MutableLocal
                | AccessKind::DynamicLocal
                | AccessKind::DynamicTake
        )
    }
}

#[derive(Debug)]
pub struct VarDecl {
    pub name: String,
    /// Program-unique output name, see [`Program::declare_var`].
    pub internal: String,
    pub scope: ScopeId,
    pub access: AccessKind,
    pub ty: TypeRef,
    /// Expressions allocated before this id do not see the variable.
    pub visible_from: ExprId,
    pub pos: Pos,
}

/// A variable's type: spelled out for parameters, inferred from the
/// initializer for locals.
#[derive(Debug)]
pub enum TypeRef {
    Named(TypeName),
    OfExpr(ExprId),
}

#[derive(Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub pos: Pos,
    /// `name:` label when this expression is a named call argument.
    pub arg_name: Option<(String, Pos)>,
    /// Back link to the member access this expression is the object of.
    pub member_of: Option<ExprId>,
}

impl Expr {
    pub fn new(kind: ExprKind, pos: Pos) -> Expr {
        Expr {
            kind,
            pos,
            arg_name: None,
            member_of: None,
        }
    }

    pub fn is_metafunction(&self) -> bool {
        matches!(&self.kind, ExprKind::Call { callee, .. } if callee.starts_with('#'))
    }

    /// Whether this call came from desugaring an operator expression.
    /// Operator functions carry their source spelling as a name, which
    /// never starts like an identifier.
    pub fn is_operator_call(&self) -> bool {
        matches!(
            &self.kind,
            ExprKind::Call { callee, .. }
                if !callee.starts_with(|ch: char| ch.is_ascii_alphabetic() || ch == '#')
        )
    }
}

#[derive(Debug)]
pub enum ExprKind {
    /// A call by name; operators desugar to calls on their spelling.
    Call { callee: String, args: Vec<ExprId> },
    Int(String),
    Decimal(String),
    Float(String),
    Str(String),
    Bool(bool),
    Var(String),
    /// `lhs.rhs` where `rhs` is a variable read or a call.
    Member { lhs: ExprId, rhs: ExprId },
    // Logical connectives are built in rather than operator functions.
    And(ExprId, ExprId),
    Or(ExprId, ExprId),
    Not(ExprId),
}

#[derive(Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub pos: Pos,
}

impl Stmt {
    pub fn new(kind: StmtKind, pos: Pos) -> Stmt {
        Stmt { kind, pos }
    }
}

#[derive(Debug)]
pub enum StmtKind {
    Expr(ExprId),
    Let {
        var: VarId,
        value: ExprId,
    },
    Reassign {
        target: String,
        value: ExprId,
    },
    Return(Option<ExprId>),
    If {
        cond: ExprId,
        then_scope: ScopeId,
        else_scope: Option<ScopeId>,
    },
    Unless {
        cond: ExprId,
        then_scope: ScopeId,
        else_scope: Option<ScopeId>,
    },
    Block(ScopeId),
}
