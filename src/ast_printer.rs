use crate::ast::{Expr, FuncCall, FuncDef, IfStmt, Program, Stmt};
use crate::token::Token;

/// Renders a tree as indented text, one node kind per line followed by its
/// labelled fields:
///
/// ```text
/// BinaryOp
/// ├ Op: +
/// ├ Left: Variable
/// │       ╰ Name: foo
/// ╰ Right: Variable
///          ╰ Name: bar
/// ```
pub struct AstPrinter;

const NONE: &str = "(none)";

/// An `else { }` that is present but has no statements.
const EMPTY: &str = "(empty)";

impl AstPrinter {
    pub fn print(program: &Program) -> String {
        let mut out = vec!["Program".to_string()];
        branch(&mut out, "Stmts", stmt_list(&program.stmts), true);

        join(out)
    }

    pub fn print_stmt(stmt: &Stmt) -> String {
        join(stmt_lines(stmt))
    }

    pub fn print_expr(expr: &Expr) -> String {
        join(expr_lines(expr))
    }
}

fn join(lines: Vec<String>) -> String {
    let mut s = lines.join("\n");
    s.push('\n');
    s
}

/// Appends `label: child` to `out`. The child's first line follows the label;
/// the rest are indented under it, with a `│` rail unless this is the last field.
fn branch(out: &mut Vec<String>, label: &str, child: Vec<String>, last: bool) {
    let head = format!("{} {}: ", if last { "╰" } else { "├" }, label);
    let width = head.chars().count();
    let rail = if last {
        " ".repeat(width)
    } else {
        format!("│{}", " ".repeat(width - 1))
    };

    if child.is_empty() {
        out.push(format!("{}{}", head, NONE));
        return;
    }

    for (i, line) in child.into_iter().enumerate() {
        if i == 0 {
            out.push(format!("{}{}", head, line));
        } else {
            out.push(format!("{}{}", rail, line));
        }
    }
}

fn leaf(out: &mut Vec<String>, label: &str, value: String, last: bool) {
    branch(out, label, vec![value], last);
}

fn stmt_list(stmts: &[Stmt]) -> Vec<String> {
    stmts.iter().flat_map(stmt_lines).collect()
}

fn format_number(n: f64) -> String {
    // 3.0 → "3"; integral values beyond i64's exact range keep Display form
    if n.fract() == 0.0 && n.abs() < 1e15 {
        let mut buf = itoa::Buffer::new();
        buf.format(n as i64).to_owned()
    } else {
        n.to_string()
    }
}

fn value(out_value: String, kind: Token) -> Vec<String> {
    let mut out = vec!["Value".to_string()];
    leaf(&mut out, "Value", out_value, false);
    leaf(&mut out, "Type", kind.to_string(), true);
    out
}

fn expr_lines(expr: &Expr) -> Vec<String> {
    match expr {
        // ── literals ────────────────────────────────────────────────
        Expr::Bool(b) => value(b.to_string(), Token::BOOL),

        Expr::Number(n) => value(format_number(*n), Token::NUMBER),

        Expr::Str(s) => value(format!("{:?}", s), Token::STRING),

        Expr::Variable(name) => {
            let mut out = vec!["Variable".to_string()];
            leaf(&mut out, "Name", name.clone(), true);
            out
        }

        // ── operators ───────────────────────────────────────────────
        Expr::Unary { op, term } => {
            let mut out = vec!["UnaryOp".to_string()];
            leaf(&mut out, "Op", op.to_string(), false);
            branch(&mut out, "Term", expr_lines(term), true);
            out
        }

        Expr::Binary { op, left, right } => {
            let mut out = vec!["BinaryOp".to_string()];
            leaf(&mut out, "Op", op.to_string(), false);
            branch(&mut out, "Left", expr_lines(left), false);
            branch(&mut out, "Right", expr_lines(right), true);
            out
        }

        Expr::Cast { target, term } => {
            let mut out = vec!["Cast".to_string()];
            leaf(&mut out, "Cast", target.clone(), false);
            branch(&mut out, "Term", expr_lines(term), true);
            out
        }

        Expr::Call(call) => call_lines(call),
    }
}

fn call_lines(call: &FuncCall) -> Vec<String> {
    let mut out = vec!["FuncCall".to_string()];
    leaf(&mut out, "Name", call.name.clone(), false);
    branch(
        &mut out,
        "Args",
        call.args.iter().flat_map(expr_lines).collect(),
        true,
    );
    out
}

fn if_lines(stmt: &IfStmt) -> Vec<String> {
    let mut out = vec!["If".to_string()];
    branch(&mut out, "Cond", expr_lines(&stmt.cond), false);
    branch(&mut out, "Body", stmt_list(&stmt.body), false);
    let else_lines: Vec<String> = match stmt.else_body.as_deref() {
        None => Vec::new(),
        Some([]) => vec![EMPTY.to_string()],
        Some(body) => stmt_list(body),
    };
    branch(&mut out, "Else", else_lines, true);
    out
}

fn func_def_lines(def: &FuncDef) -> Vec<String> {
    let mut out = vec!["FuncDef".to_string()];
    leaf(&mut out, "Name", def.name.clone(), false);
    branch(&mut out, "Params", def.params.clone(), false);
    branch(&mut out, "Body", stmt_list(&def.body), true);
    out
}

fn stmt_lines(stmt: &Stmt) -> Vec<String> {
    match stmt {
        Stmt::Assign { name, expr } => {
            let mut out = vec!["Assign".to_string()];
            leaf(&mut out, "Name", name.clone(), false);
            branch(&mut out, "Expr", expr_lines(expr), true);
            out
        }

        Stmt::Call(call) => call_lines(call),

        Stmt::If(stmt) => if_lines(stmt),

        Stmt::While { cond, body } => {
            let mut out = vec!["While".to_string()];
            branch(&mut out, "Cond", expr_lines(cond), false);
            branch(&mut out, "Body", stmt_list(body), true);
            out
        }

        Stmt::Return(expr) => {
            let mut out = vec!["Return".to_string()];
            branch(
                &mut out,
                "Expr",
                expr.as_ref().map(expr_lines).unwrap_or_default(),
                true,
            );
            out
        }

        Stmt::FuncDef(def) => func_def_lines(def),
    }
}
