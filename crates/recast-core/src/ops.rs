//! Abstract code operations emitted by the synthesizer.
//!
//! The engine never produces source text directly; it produces this IR
//! (declarations, assignments, conditionals, loops, calls) plus a final
//! result handle, and a separate emitter renders it. The IR is fully
//! serializable so runs can be snapshotted and diffed.
//!
//! Types inside the IR are carried as canonical identity strings (see
//! `recast_types::identity`), which is all an emitter needs.

use serde::Serialize;

/// A literal constant.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

/// Comparison operators used in guards and loop conditions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum BinOp {
    Eq,
    Ne,
    Lt,
}

/// An expression -- a value handle the synthesizer threads through rules.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Expr {
    /// A local variable or parameter reference.
    Var(String),
    Lit(Literal),
    /// The null/absent pointer value.
    Nil,
    /// The zero value of the named type.
    Zero(String),
    /// Field access: `base.name`.
    Field(Box<Expr>, String),
    /// Index access: `base[idx]`.
    Index(Box<Expr>, Box<Expr>),
    /// Address-of: `&expr`.
    AddrOf(Box<Expr>),
    /// Pointer dereference: `*expr`.
    Deref(Box<Expr>),
    /// Length of a list, map, or string.
    Len(Box<Expr>),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// A routine call. `on_self` calls through the converter receiver.
    Call {
        callee: String,
        on_self: bool,
        args: Vec<Expr>,
    },
    /// An explicit conversion to the named type.
    Cast {
        to: String,
        expr: Box<Expr>,
    },
    /// Container allocation, optionally sized.
    Make {
        ty: String,
        len: Option<Box<Expr>>,
    },
}

/// A statement in a routine body.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Stmt {
    /// `var name ty` or `var name ty = init`. A declaration without an
    /// initializer holds the type's zero value.
    VarDecl {
        name: String,
        ty: String,
        init: Option<Expr>,
    },
    Assign {
        lhs: Expr,
        rhs: Expr,
    },
    If {
        cond: Expr,
        then: Vec<Stmt>,
        els: Vec<Stmt>,
    },
    /// `for idx := 0; idx < limit; idx++ { body }`
    ForIndex {
        idx: String,
        limit: Expr,
        body: Vec<Stmt>,
    },
    /// `for key, value := range over { body }`
    ForMap {
        key: String,
        value: String,
        over: Expr,
        body: Vec<Stmt>,
    },
    /// A call to a routine that may fail: bind its value result, and on
    /// failure run `on_err` (always an early return in emitted code).
    CheckedCall {
        result: String,
        call: Expr,
        on_err: Vec<Stmt>,
    },
    Return(Vec<Expr>),
}

// ── Helper constructors ─────────────────────────────────────────────

pub fn var(name: impl Into<String>) -> Expr {
    Expr::Var(name.into())
}

pub fn field(base: Expr, name: impl Into<String>) -> Expr {
    Expr::Field(Box::new(base), name.into())
}

pub fn index(base: Expr, idx: Expr) -> Expr {
    Expr::Index(Box::new(base), Box::new(idx))
}

pub fn addr_of(e: Expr) -> Expr {
    Expr::AddrOf(Box::new(e))
}

pub fn deref(e: Expr) -> Expr {
    Expr::Deref(Box::new(e))
}

pub fn len_of(e: Expr) -> Expr {
    Expr::Len(Box::new(e))
}

pub fn zero(ty: impl Into<String>) -> Expr {
    Expr::Zero(ty.into())
}

pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }
}

/// `expr != nil`
pub fn not_nil(e: Expr) -> Expr {
    binary(BinOp::Ne, e, Expr::Nil)
}

pub fn cast(to: impl Into<String>, e: Expr) -> Expr {
    Expr::Cast { to: to.into(), expr: Box::new(e) }
}

pub fn int_lit(v: i64) -> Expr {
    Expr::Lit(Literal::Int(v))
}

// ── Debug rendering ─────────────────────────────────────────────────
//
// A readable rendering of op sequences for tests and snapshots. This is
// not the production emitter; it exists so failures and snapshots are
// legible.

/// Render a statement block with two-space indentation per level.
pub fn render_block(stmts: &[Stmt], indent: usize) -> String {
    let mut out = String::new();
    for stmt in stmts {
        render_stmt(stmt, indent, &mut out);
    }
    out
}

fn pad(indent: usize, out: &mut String) {
    for _ in 0..indent {
        out.push_str("  ");
    }
}

fn render_stmt(stmt: &Stmt, indent: usize, out: &mut String) {
    pad(indent, out);
    match stmt {
        Stmt::VarDecl { name, ty, init } => {
            match init {
                Some(e) => out.push_str(&format!("var {} {} = {}\n", name, ty, render_expr(e))),
                None => out.push_str(&format!("var {} {}\n", name, ty)),
            };
        }
        Stmt::Assign { lhs, rhs } => {
            out.push_str(&format!("{} = {}\n", render_expr(lhs), render_expr(rhs)));
        }
        Stmt::If { cond, then, els } => {
            out.push_str(&format!("if {} {{\n", render_expr(cond)));
            out.push_str(&render_block(then, indent + 1));
            if !els.is_empty() {
                pad(indent, out);
                out.push_str("} else {\n");
                out.push_str(&render_block(els, indent + 1));
            }
            pad(indent, out);
            out.push_str("}\n");
        }
        Stmt::ForIndex { idx, limit, body } => {
            out.push_str(&format!(
                "for {idx} := 0; {idx} < {}; {idx}++ {{\n",
                render_expr(limit)
            ));
            out.push_str(&render_block(body, indent + 1));
            pad(indent, out);
            out.push_str("}\n");
        }
        Stmt::ForMap { key, value, over, body } => {
            out.push_str(&format!(
                "for {}, {} := range {} {{\n",
                key,
                value,
                render_expr(over)
            ));
            out.push_str(&render_block(body, indent + 1));
            pad(indent, out);
            out.push_str("}\n");
        }
        Stmt::CheckedCall { result, call, on_err } => {
            out.push_str(&format!("{}, err := {}\n", result, render_expr(call)));
            pad(indent, out);
            out.push_str("if err != nil {\n");
            out.push_str(&render_block(on_err, indent + 1));
            pad(indent, out);
            out.push_str("}\n");
        }
        Stmt::Return(values) => {
            let parts: Vec<String> = values.iter().map(render_expr).collect();
            out.push_str(&format!("return {}\n", parts.join(", ")));
        }
    }
}

/// Render a single expression.
pub fn render_expr(expr: &Expr) -> String {
    match expr {
        Expr::Var(name) => name.clone(),
        Expr::Lit(Literal::Int(v)) => v.to_string(),
        Expr::Lit(Literal::Float(v)) => v.to_string(),
        Expr::Lit(Literal::Str(s)) => format!("{:?}", s),
        Expr::Lit(Literal::Bool(b)) => b.to_string(),
        Expr::Nil => "nil".to_string(),
        Expr::Zero(ty) => format!("zero({})", ty),
        Expr::Field(base, name) => format!("{}.{}", render_expr(base), name),
        Expr::Index(base, idx) => format!("{}[{}]", render_expr(base), render_expr(idx)),
        Expr::AddrOf(e) => format!("&{}", render_expr(e)),
        Expr::Deref(e) => format!("*{}", render_expr(e)),
        Expr::Len(e) => format!("len({})", render_expr(e)),
        Expr::Binary { op, lhs, rhs } => {
            let op = match op {
                BinOp::Eq => "==",
                BinOp::Ne => "!=",
                BinOp::Lt => "<",
            };
            format!("{} {} {}", render_expr(lhs), op, render_expr(rhs))
        }
        Expr::Call { callee, on_self, args } => {
            let parts: Vec<String> = args.iter().map(render_expr).collect();
            if *on_self {
                format!("c.{}({})", callee, parts.join(", "))
            } else {
                format!("{}({})", callee, parts.join(", "))
            }
        }
        Expr::Cast { to, expr } => format!("{}({})", to, render_expr(expr)),
        Expr::Make { ty, len } => match len {
            Some(n) => format!("make({}, {})", ty, render_expr(n)),
            None => format!("make({})", ty),
        },
    }
}
