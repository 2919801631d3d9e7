/*!
Recursive‑descent parser for Kiwi
=================================

The parser pulls `(Token, lexeme)` pairs one at a time from a [`TokenSource`],
keeps exactly one token of lookahead, and builds the tree top‑down. Comment
tokens are dropped in [`Parser::advance`] and never reach a grammar rule.

Time is Θ(n) in the number of tokens: every token is consumed once and no rule
re‑scans. Call‑stack depth grows with syntactic nesting.

### Logging Policy

| Location                      | Level   | Purpose                                    |
|-------------------------------|---------|--------------------------------------------|
| `Parser::new`, `parse`        | `info`  | Lifecycle milestones.                      |
| statement rules, scopes       | `debug` | Descent into statement branches.           |
| comment skipping              | `debug` | Tokens the grammar never sees.             |
| error construction            | `info`  | Emitted by [`KiwiError`] helpers.          |

--------------------------------------------------------------------------------
Grammar
-------

```text
program         → stmt* EOF ;
stmt            → if_stmt | while_stmt | func_def | return_stmt | assign_or_call ;
if_stmt         → "if" expr brace_stmt_list else_clause? ;
else_clause     → "else" ( brace_stmt_list | expr brace_stmt_list else_clause? ) ;
while_stmt      → "while" expr brace_stmt_list ;
func_def        → "func" IDENT IDENT* brace_stmt_list ;
return_stmt     → "return" expr? ";" ;
assign_or_call  → IDENT ( ":=" expr | "(" expr_list? ")" ) ";" ;
brace_stmt_list → "{" stmt* "}" ;
expr_list       → expr ( "," expr )* ;
expr            → cmp_expr ( ( "&&" | "||" ) expr )? ;
cmp_expr        → add_expr ( cmp_op cmp_expr )? ;
add_expr        → mul_expr ( add_op add_expr )? ;
mul_expr        → cast_expr ( mul_op mul_expr )? ;
cast_expr       → term ( ":" IDENT )? ;
term            → "(" expr ")"
                | ( "+" | "-" | "~" ) term
                | BOOL | NUMBER | STRING
                | IDENT ( "(" expr_list? ")" )? ;
```

Each binary tier recurses into *itself* for its right operand, so every tier
is right‑associative: `a - b - c` is `a - (b - c)`.

Every recursive step (a right operand, a parenthesised or prefixed term, a
brace list, an else‑if) counts one level of nesting. Past [`MAX_DEPTH`] levels
the parse fails with [`KiwiError::TooDeep`] instead of exhausting the stack.
*/

use std::mem;
use std::rc::{Rc, Weak};

use crate::ast::{BinaryOp, Expr, FuncCall, FuncDef, IfStmt, Program, Stmt, UnaryOp};
use crate::error::{KiwiError, Result};
use crate::scope::{Scope, ScopeRef, ScopeStack, SymbolEntry};
use crate::token::Token;

use log::{debug, info};

/// Deepest nesting the parser descends into before giving up.
pub const MAX_DEPTH: usize = 256;

/// Pull‑based supplier of tokens.
///
/// `next_token` returns the next pair on every call and keeps returning
/// [`Token::EOF`] once input is exhausted. Comment tokens may appear anywhere.
pub trait TokenSource {
    fn next_token(&mut self) -> (Token, String);

    /// 1‑based line of the most recently scanned token, if tracked.
    fn line(&self) -> Option<usize> {
        None
    }
}

/// Pre‑tokenized input.
impl TokenSource for std::vec::IntoIter<(Token, String)> {
    fn next_token(&mut self) -> (Token, String) {
        self.next().unwrap_or((Token::EOF, String::new()))
    }
}

/// Recursive‑descent parser over a single token source.
pub struct Parser<S: TokenSource> {
    source: S,
    token: Token,
    lexeme: String,
    scopes: ScopeStack,
    depth: usize,
    failed: bool,
}

impl<S: TokenSource> Parser<S> {
    /// Construct a parser and prime the lookahead.
    pub fn new(source: S) -> Self {
        let mut parser = Self {
            source,
            token: Token::EOF,
            lexeme: String::new(),
            scopes: ScopeStack::new(Scope::root()),
            depth: 0,
            failed: false,
        };
        parser.advance();

        info!("Parser created, first token {}", parser.token);

        parser
    }

    // ───────────────────────── public API ─────────────────────────

    /// Parse the whole input. Any syntax error aborts the parse and nothing
    /// of the tree is returned.
    pub fn parse(&mut self) -> Result<Program> {
        info!("Beginning parse phase");

        let mut stmts: Vec<Stmt> = Vec::new();

        while self.token != Token::EOF {
            match self.parse_stmt() {
                Ok(stmt) => stmts.push(stmt),
                Err(e) => {
                    self.failed = true;
                    return Err(e);
                }
            }
        }

        info!("Parsed {} top-level statement(s)", stmts.len());

        Ok(Program {
            stmts,
            scope: self.scopes.root(),
        })
    }

    /// Parse one top‑level statement. `Ok(None)` signals end of input.
    pub fn parse_unit(&mut self) -> Result<Option<Stmt>> {
        if self.token == Token::EOF {
            return Ok(None);
        }

        self.parse_stmt().map(Some)
    }

    /// Scope that top‑level function definitions register in.
    pub fn root_scope(&self) -> ScopeRef {
        self.scopes.root()
    }

    /// Current lookahead token.
    pub fn token(&self) -> Token {
        self.token
    }

    /// Source text of the current lookahead token.
    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    // ───────────────────────── statement rules ────────────────────

    pub fn parse_stmt(&mut self) -> Result<Stmt> {
        debug!("Entering stmt at {}", self.token);

        match self.token {
            Token::IF => self.parse_if_stmt(),
            Token::WHILE => self.parse_while_stmt(),
            Token::FUNC => self.parse_func_def(),
            Token::RETURN => self.parse_return_stmt(),
            Token::IDENTIFIER => self.parse_assign_or_call(),
            _ => Err(self.no_rule("if, while, func, return, or an identifier")),
        }
    }

    /// `"{" stmt* "}"`; repetition stops at the first token that cannot begin
    /// a statement.
    pub fn parse_brace_stmt_list(&mut self) -> Result<Vec<Stmt>> {
        self.consume(Token::LBRACE)?;

        let mut stmts: Vec<Stmt> = Vec::new();

        while self.token.is_stmt_keyword() || self.token == Token::IDENTIFIER {
            stmts.push(self.nested(Self::parse_stmt)?);
        }

        self.consume(Token::RBRACE)?;

        Ok(stmts)
    }

    fn parse_if_stmt(&mut self) -> Result<Stmt> {
        self.consume(Token::IF)?;

        Ok(Stmt::If(self.parse_if_tail()?))
    }

    /// Condition, body and optional else clause of an `if`. An `else` followed
    /// by an expression re‑enters here and nests the result.
    fn parse_if_tail(&mut self) -> Result<IfStmt> {
        let cond: Expr = self.parse_expr()?;
        let body: Vec<Stmt> = self.parse_brace_stmt_list()?;

        let else_body: Option<Vec<Stmt>> = if self.token == Token::ELSE {
            self.advance();

            if self.token == Token::LBRACE {
                Some(self.parse_brace_stmt_list()?)
            } else {
                debug!("Parsing else-if branch");

                Some(vec![Stmt::If(self.nested(Self::parse_if_tail)?)])
            }
        } else {
            None
        };

        Ok(IfStmt {
            cond,
            body,
            else_body,
        })
    }

    fn parse_while_stmt(&mut self) -> Result<Stmt> {
        self.consume(Token::WHILE)?;

        let cond: Expr = self.parse_expr()?;
        let body: Vec<Stmt> = self.parse_brace_stmt_list()?;

        Ok(Stmt::While { cond, body })
    }

    /// Registers the function in the current scope before its body is parsed,
    /// then parses the body in a fresh child scope.
    fn parse_func_def(&mut self) -> Result<Stmt> {
        self.consume(Token::FUNC)?;

        let name: String = self.identifier()?;
        let mut params: Vec<String> = Vec::new();

        while self.token == Token::IDENTIFIER {
            params.push(self.identifier()?);
        }

        debug!("Parsing func {} with {} param(s)", name, params.len());

        let enclosing: ScopeRef = self.scopes.current();
        let mut outcome: Result<()> = Ok(());

        let node: Rc<FuncDef> = Rc::new_cyclic(|me: &Weak<FuncDef>| {
            enclosing
                .borrow_mut()
                .set(&name, SymbolEntry::function(me.clone()));

            let scope: ScopeRef = self.scopes.enter();
            let body: Vec<Stmt> = match self.parse_brace_stmt_list() {
                Ok(body) => body,
                Err(e) => {
                    outcome = Err(e);
                    Vec::new()
                }
            };
            self.scopes.leave();

            FuncDef {
                name,
                params,
                body,
                scope,
            }
        });

        outcome?;

        Ok(Stmt::FuncDef(node))
    }

    fn parse_return_stmt(&mut self) -> Result<Stmt> {
        self.consume(Token::RETURN)?;

        let value: Option<Expr> = if self.token != Token::SEMICOLON {
            Some(self.parse_expr()?)
        } else {
            None
        };

        self.consume(Token::SEMICOLON)?;

        Ok(Stmt::Return(value))
    }

    fn parse_assign_or_call(&mut self) -> Result<Stmt> {
        let name: String = self.identifier()?;

        let stmt: Stmt = match self.token {
            Token::ASSIGN => {
                self.advance();

                Stmt::Assign {
                    name,
                    expr: self.parse_expr()?,
                }
            }
            Token::LPAREN => Stmt::Call(self.finish_call(name)?),
            _ => return Err(self.unexpected(format!("{} or {}", Token::ASSIGN, Token::LPAREN))),
        };

        self.consume(Token::SEMICOLON)?;

        Ok(stmt)
    }

    // ─────────────────────── expression rules ─────────────────────

    /// Logical tier: `&&`, `||`.
    pub fn parse_expr(&mut self) -> Result<Expr> {
        let left: Expr = self.parse_cmp_expr()?;

        if !(self.token.is_log_op() && self.token.is_bin_op()) {
            return Ok(left);
        }

        let op: BinaryOp = self.binary_op()?;
        let right: Expr = self.nested(Self::parse_expr)?;

        Ok(Expr::binary(op, left, right))
    }

    /// Comparison tier.
    pub fn parse_cmp_expr(&mut self) -> Result<Expr> {
        let left: Expr = self.parse_add_expr()?;

        if !self.token.is_cmp_op() {
            return Ok(left);
        }

        let op: BinaryOp = self.binary_op()?;
        let right: Expr = self.nested(Self::parse_cmp_expr)?;

        Ok(Expr::binary(op, left, right))
    }

    /// Additive tier.
    pub fn parse_add_expr(&mut self) -> Result<Expr> {
        let left: Expr = self.parse_mul_expr()?;

        if !self.token.is_add_op() {
            return Ok(left);
        }

        let op: BinaryOp = self.binary_op()?;
        let right: Expr = self.nested(Self::parse_add_expr)?;

        Ok(Expr::binary(op, left, right))
    }

    /// Multiplicative tier.
    pub fn parse_mul_expr(&mut self) -> Result<Expr> {
        let left: Expr = self.parse_cast_expr()?;

        if !self.token.is_mul_op() {
            return Ok(left);
        }

        let op: BinaryOp = self.binary_op()?;
        let right: Expr = self.nested(Self::parse_mul_expr)?;

        Ok(Expr::binary(op, left, right))
    }

    /// `term ( ":" IDENT )?`
    pub fn parse_cast_expr(&mut self) -> Result<Expr> {
        let term: Expr = self.parse_term()?;

        if self.token != Token::COLON {
            return Ok(term);
        }

        self.advance();

        let target: String = self.identifier()?;

        Ok(Expr::cast(target, term))
    }

    pub fn parse_term(&mut self) -> Result<Expr> {
        match self.token {
            Token::LPAREN => {
                self.advance();

                let expr: Expr = self.nested(Self::parse_expr)?;

                self.consume(Token::RPAREN)?;

                Ok(expr)
            }
            t if t.is_unary_op() => {
                let op: UnaryOp = UnaryOp::from_token(t).ok_or_else(|| self.no_rule("~, + or -"))?;
                self.advance();

                let term: Expr = self.nested(Self::parse_term)?;

                Ok(Expr::unary(op, term))
            }
            t if t.is_literal() => self.parse_literal(),
            _ => Err(self.no_rule("a value or identifier")),
        }
    }

    fn parse_literal(&mut self) -> Result<Expr> {
        match self.token {
            Token::BOOL => {
                let value: bool = self.lexeme.eq_ignore_ascii_case("true");
                self.advance();

                Ok(Expr::Bool(value))
            }
            Token::NUMBER => {
                let value: f64 = self.lexeme.parse::<f64>().unwrap_or_else(|_| {
                    debug!("Numeral {:?} is not a valid f64, keeping NaN", self.lexeme);

                    f64::NAN
                });
                self.advance();

                Ok(Expr::Number(value))
            }
            Token::STRING => {
                let value: String = mem::take(&mut self.lexeme);
                self.advance();

                Ok(Expr::Str(value))
            }
            Token::IDENTIFIER => {
                let name: String = self.identifier()?;

                if self.token == Token::LPAREN {
                    Ok(Expr::Call(self.finish_call(name)?))
                } else {
                    Ok(Expr::Variable(name))
                }
            }
            _ => Err(self.no_rule("a value or identifier")),
        }
    }

    /// `"(" expr_list? ")"` after a callee name.
    fn finish_call(&mut self, name: String) -> Result<FuncCall> {
        self.consume(Token::LPAREN)?;

        let args: Vec<Expr> = if self.token == Token::RPAREN {
            Vec::new()
        } else {
            self.parse_expr_list()?
        };

        self.consume(Token::RPAREN)?;

        Ok(FuncCall { name, args })
    }

    fn parse_expr_list(&mut self) -> Result<Vec<Expr>> {
        let mut list: Vec<Expr> = vec![self.parse_expr()?];

        while self.token == Token::COMMA {
            self.advance();
            list.push(self.parse_expr()?);
        }

        Ok(list)
    }

    // ────────────────────── utility helpers ───────────────────────

    /// Run `rule` one nesting level deeper.
    fn nested<T>(&mut self, rule: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_DEPTH {
            return Err(KiwiError::too_deep(
                MAX_DEPTH,
                self.token,
                &self.lexeme,
                self.source.line(),
            ));
        }

        self.depth += 1;
        let result: Result<T> = rule(self);
        self.depth -= 1;

        result
    }

    /// Pull the next significant token, skipping comments.
    fn advance(&mut self) {
        loop {
            let (token, lexeme) = self.source.next_token();

            if token == Token::COMMENT {
                debug!("Skipping comment {:?}", lexeme);

                continue;
            }

            self.token = token;
            self.lexeme = lexeme;

            return;
        }
    }

    fn consume(&mut self, expected: Token) -> Result<()> {
        if self.token != expected {
            return Err(self.unexpected(expected.to_string()));
        }

        self.advance();

        Ok(())
    }

    /// Consume an identifier and return its spelling.
    fn identifier(&mut self) -> Result<String> {
        if self.token != Token::IDENTIFIER {
            return Err(self.unexpected(Token::IDENTIFIER.to_string()));
        }

        let name: String = mem::take(&mut self.lexeme);
        self.advance();

        Ok(name)
    }

    /// Consume the current binary operator.
    fn binary_op(&mut self) -> Result<BinaryOp> {
        let op: BinaryOp =
            BinaryOp::from_token(self.token).ok_or_else(|| self.no_rule("a binary operator"))?;
        self.advance();

        Ok(op)
    }

    fn unexpected(&self, expected: String) -> KiwiError {
        KiwiError::unexpected(expected, self.token, &self.lexeme, self.source.line())
    }

    fn no_rule(&self, expected: &str) -> KiwiError {
        KiwiError::no_rule(expected, self.token, &self.lexeme, self.source.line())
    }
}

/// Yields one top‑level statement per call. The first error ends iteration.
impl<S: TokenSource> Iterator for Parser<S> {
    type Item = Result<Stmt>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        match self.parse_unit() {
            Ok(Some(stmt)) => Some(Ok(stmt)),
            Ok(None) => None,
            Err(e) => {
                self.failed = true;

                Some(Err(e))
            }
        }
    }
}
