/// Source location attached to every node for error reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

// ─── Top level ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Program {
    pub items: Vec<Item>,
}

impl Program {
    pub fn functions(&self) -> impl Iterator<Item = &FnDef> {
        self.items.iter().filter_map(|i| match i {
            Item::FnDef(f) => Some(f),
            Item::Stmt(_) => None,
        })
    }

    pub fn function(&self, name: &str) -> Option<&FnDef> {
        self.functions().find(|f| f.name == name)
    }

    /// The per-frame entry point: `loop` wins over `draw` when both exist.
    pub fn frame_function(&self) -> Option<&FnDef> {
        self.function("loop").or_else(|| self.function("draw"))
    }
}

/// A top-level item is either a function definition or a statement.
#[derive(Debug, Clone)]
pub enum Item {
    FnDef(FnDef),
    Stmt(Stmt),
}

// ─── Functions ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct FnDef {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub span: Span,
}

// ─── Statements ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum Stmt {
    /// `var x = 1` or `var x`
    VarDecl(VarDecl),
    /// `x = 1`, `xs[i] = 1`, `p.x += 1`
    Assign(Assign),
    If(IfStmt),
    /// `for i = 1, 10, 2 do ... end`
    For(ForStmt),
    /// `for (i = 0; i < 10; i += 1) { ... }`
    CFor(CForStmt),
    While(WhileStmt),
    Return(Option<Expr>, Span),
    Expr(Expr),
}

impl Stmt {
    pub fn span(&self) -> &Span {
        match self {
            Stmt::VarDecl(d)   => &d.span,
            Stmt::Assign(a)    => &a.span,
            Stmt::If(s)        => &s.span,
            Stmt::For(s)       => &s.span,
            Stmt::CFor(s)      => &s.span,
            Stmt::While(s)     => &s.span,
            Stmt::Return(_, s) => s,
            Stmt::Expr(e)      => e.span(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VarDecl {
    pub name: String,
    pub initializer: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum AssignTarget {
    Name(String),
    Index { object: Expr, index: Expr },
    Field { object: Expr, field: String },
}

#[derive(Debug, Clone)]
pub struct Assign {
    pub target: AssignTarget,
    /// `Some(op)` for compound assignment (`+=` etc).
    pub op: Option<BinOp>,
    pub value: Expr,
    pub span: Span,
}

/// `if a { } elseif b { } else { }`; `branches` is never empty.
#[derive(Debug, Clone)]
pub struct IfStmt {
    pub branches: Vec<(Expr, Vec<Stmt>)>,
    pub else_block: Option<Vec<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ForStmt {
    pub var: String,
    pub start: Expr,
    pub stop: Expr,
    pub step: Option<Expr>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CForStmt {
    pub init: Option<Box<Stmt>>,
    pub condition: Option<Expr>,
    pub step: Option<Box<Stmt>>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Vec<Stmt>,
    pub span: Span,
}

// ─── Expressions ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum Expr {
    Number(f64, Span),
    Bool(bool, Span),
    StringLit(String, Span),
    Nil(Span),
    Ident(String, Span),
    BinOp {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
        span: Span,
    },
    UnOp {
        op: UnOp,
        operand: Box<Expr>,
        span: Span,
    },
    /// `name(args)`
    Call {
        callee: String,
        args: Vec<Expr>,
        span: Span,
    },
    /// `expr.name(args)`
    MethodCall {
        object: Box<Expr>,
        method: String,
        args: Vec<Expr>,
        span: Span,
    },
    /// `expr.name`
    Field {
        object: Box<Expr>,
        field: String,
        span: Span,
    },
    /// `expr[index]`
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
        span: Span,
    },
    List(Vec<Expr>, Span),
    /// `{ key: value, "other key": value }`
    Map(Vec<(String, Expr)>, Span),
}

impl Expr {
    pub fn span(&self) -> &Span {
        match self {
            Expr::Number(_, s)          => s,
            Expr::Bool(_, s)            => s,
            Expr::StringLit(_, s)       => s,
            Expr::Nil(s)                => s,
            Expr::Ident(_, s)           => s,
            Expr::BinOp { span, .. }    => span,
            Expr::UnOp { span, .. }     => span,
            Expr::Call { span, .. }     => span,
            Expr::MethodCall { span, .. } => span,
            Expr::Field { span, .. }    => span,
            Expr::Index { span, .. }    => span,
            Expr::List(_, s)            => s,
            Expr::Map(_, s)             => s,
        }
    }
}

// ─── Operators ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add, Sub, Mul, Div, Mod,
    Eq, NotEq,
    Lt, LtEq, Gt, GtEq,
    And, Or,
}

impl BinOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add   => "+",  BinOp::Sub  => "-",
            BinOp::Mul   => "*",  BinOp::Div  => "/",  BinOp::Mod => "%",
            BinOp::Eq    => "==", BinOp::NotEq => "!=",
            BinOp::Lt    => "<",  BinOp::LtEq => "<=",
            BinOp::Gt    => ">",  BinOp::GtEq => ">=",
            BinOp::And   => "and", BinOp::Or  => "or",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnOp {
    Neg,
    Not,
}
