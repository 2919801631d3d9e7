//! Tree produced by the parser.
//!
//! Nodes are built once and never mutated. Every parent owns its children
//! outright; the only other edge is the non‑owning [`SymbolEntry`] back
//! reference from an enclosing [`Scope`] to a [`FuncDef`].
//!
//! [`SymbolEntry`]: crate::scope::SymbolEntry
//! [`Scope`]: crate::scope::Scope

use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use crate::scope::ScopeRef;
use crate::token::Token;

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Positive,
    Negative,
    Not,
}

impl UnaryOp {
    pub fn from_token(token: Token) -> Option<Self> {
        match token {
            Token::ADD => Some(UnaryOp::Positive),
            Token::SUBTRACT => Some(UnaryOp::Negative),
            Token::NOT => Some(UnaryOp::Not),
            _ => None,
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            UnaryOp::Positive => Token::ADD,
            UnaryOp::Negative => Token::SUBTRACT,
            UnaryOp::Not => Token::NOT,
        };

        write!(f, "{}", op)
    }
}

/// Infix operators across all four grammar tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    Greater,
    GreaterEq,
    Less,
    LessEq,
    And,
    Or,
}

impl BinaryOp {
    pub fn from_token(token: Token) -> Option<Self> {
        let op = match token {
            Token::ADD => BinaryOp::Add,
            Token::SUBTRACT => BinaryOp::Subtract,
            Token::MULTIPLY => BinaryOp::Multiply,
            Token::DIVIDE => BinaryOp::Divide,
            Token::MODULO => BinaryOp::Modulo,
            Token::EQUAL => BinaryOp::Equal,
            Token::NOT_EQUAL => BinaryOp::NotEqual,
            Token::GREATER => BinaryOp::Greater,
            Token::GREATER_EQ => BinaryOp::GreaterEq,
            Token::LESS => BinaryOp::Less,
            Token::LESS_EQ => BinaryOp::LessEq,
            Token::AND => BinaryOp::And,
            Token::OR => BinaryOp::Or,
            _ => return None,
        };

        Some(op)
    }

    pub fn token(self) -> Token {
        match self {
            BinaryOp::Add => Token::ADD,
            BinaryOp::Subtract => Token::SUBTRACT,
            BinaryOp::Multiply => Token::MULTIPLY,
            BinaryOp::Divide => Token::DIVIDE,
            BinaryOp::Modulo => Token::MODULO,
            BinaryOp::Equal => Token::EQUAL,
            BinaryOp::NotEqual => Token::NOT_EQUAL,
            BinaryOp::Greater => Token::GREATER,
            BinaryOp::GreaterEq => Token::GREATER_EQ,
            BinaryOp::Less => Token::LESS,
            BinaryOp::LessEq => Token::LESS_EQ,
            BinaryOp::And => Token::AND,
            BinaryOp::Or => Token::OR,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// Expression nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    /// `true` / `false`, normalised at parse time.
    Bool(bool),

    /// Numeric literal. A numeral that is not a valid `f64` is kept as NaN.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    /// Reference to a name.
    Variable(String),

    Unary {
        op: UnaryOp,
        term: Box<Expr>,
    },

    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// `term : type`
    Cast {
        target: String,
        term: Box<Expr>,
    },

    Call(FuncCall),
}

/// `name(args…)`, usable both as an expression and as a statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuncCall {
    pub name: String,

    /// Possibly empty, never absent.
    pub args: Vec<Expr>,
}

/// Statement nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stmt {
    /// `name := expr ;`
    Assign { name: String, expr: Expr },

    /// `name(args…) ;`
    Call(FuncCall),

    If(IfStmt),

    While { cond: Expr, body: Vec<Stmt> },

    /// `return [expr] ;`
    Return(Option<Expr>),

    /// Shared with the enclosing scope's symbol entry, which holds a weak
    /// reference to it.
    FuncDef(Rc<FuncDef>),
}

/// `if cond { body } [else …]`
///
/// `else cond2 { … }` is stored as an `else_body` holding exactly one nested
/// [`Stmt::If`]; chains nest rather than flatten.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IfStmt {
    pub cond: Expr,
    pub body: Vec<Stmt>,
    pub else_body: Option<Vec<Stmt>>,
}

/// `func name params… { body }`
#[derive(Debug, Clone, Serialize)]
pub struct FuncDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,

    /// The function's local symbol table; its parent is the scope the
    /// definition appeared in.
    #[serde(skip)]
    pub scope: ScopeRef,
}

/// Structural equality; scope links are not compared.
impl PartialEq for FuncDef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.params == other.params && self.body == other.body
    }
}

/// Root of a parse.
#[derive(Debug, Clone, Serialize)]
pub struct Program {
    pub stmts: Vec<Stmt>,

    #[serde(skip)]
    pub scope: ScopeRef,
}

impl PartialEq for Program {
    fn eq(&self, other: &Self) -> bool {
        self.stmts == other.stmts
    }
}

impl Expr {
    pub fn unary(op: UnaryOp, term: Expr) -> Self {
        Expr::Unary {
            op,
            term: Box::new(term),
        }
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn cast<S: Into<String>>(target: S, term: Expr) -> Self {
        Expr::Cast {
            target: target.into(),
            term: Box::new(term),
        }
    }

    pub fn variable<S: Into<String>>(name: S) -> Self {
        Expr::Variable(name.into())
    }
}
