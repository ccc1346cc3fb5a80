use std::{fmt, mem};

use crate::{ast::CmpOp, value::Value};

/// Abstract Syntax Tree node representing a parsed query.
///
/// Paths are left-nested pipes of single steps: `.users[].email` is
/// `Pipe(Pipe(Field("users"), Iterate), Field("email"))`. A tree is never
/// mutated after parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// The no-op query (`.`)
    Identity,

    /// Object member access
    ///
    /// # Examples
    /// ```text
    /// .name
    /// ."first name"
    /// .["first name"]
    /// ```
    Field(String),

    /// Fan out over array elements or object values (`[]`)
    Iterate,

    /// Array element access, negative counts from the end
    ///
    /// # Examples
    /// ```text
    /// .[0]
    /// .items[-1]
    /// ```
    Index(i64),

    /// Sub-array between two optional bounds
    ///
    /// # Examples
    /// ```text
    /// .[1:3]
    /// .[:-1]
    /// .[2:]
    /// ```
    Slice {
        start: Option<i64>,
        end: Option<i64>,
    },

    /// Every value nested in the input, input first (`..`)
    RecursiveDescent,

    /// Feed every output of `left` into `right`
    Pipe(Box<Expr>, Box<Expr>),

    /// All outputs of `left`, then all outputs of `right`, on the same input
    Comma(Box<Expr>, Box<Expr>),

    /// Suppress errors raised by the wrapped term (`?`)
    Optional(Box<Expr>),

    /// Constant value
    ///
    /// # Examples
    /// ```text
    /// "active"
    /// 42
    /// -1.5
    /// true
    /// null
    /// ```
    Literal(Value),

    /// Comparison of every left output with every right output
    Compare {
        op: CmpOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Logical AND (`and`)
    And(Box<Expr>, Box<Expr>),

    /// Logical OR (`or`)
    Or(Box<Expr>, Box<Expr>),

    /// Negated truthiness of the input (`not`)
    Not,

    /// Pass the input through once per truthy condition output
    ///
    /// # Example
    /// ```text
    /// .users[] | select(.active == true)
    /// ```
    Select(Box<Expr>),
}

impl Expr {
    pub fn pipe(left: Expr, right: Expr) -> Expr {
        Expr::Pipe(Box::new(left), Box::new(right))
    }

    pub fn comma(left: Expr, right: Expr) -> Expr {
        Expr::Comma(Box::new(left), Box::new(right))
    }

    pub fn field(name: impl Into<String>) -> Expr {
        Expr::Field(name.into())
    }

    /// Binding strength when printed; higher binds tighter.
    fn precedence(&self) -> u8 {
        match self {
            Expr::Pipe(left, right) if is_chain(left) && is_step(right) => 5,
            Expr::Pipe(..) => 0,
            Expr::Comma(..) => 1,
            Expr::Or(..) => 2,
            Expr::And(..) => 3,
            Expr::Compare { .. } => 4,
            _ => 5,
        }
    }

    fn fmt_at(&self, f: &mut fmt::Formatter<'_>, min: u8) -> fmt::Result {
        if self.precedence() < min {
            write!(f, "(")?;
            self.fmt_bare(f)?;
            write!(f, ")")
        } else {
            self.fmt_bare(f)
        }
    }

    fn fmt_bare(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Identity => write!(f, "."),
            Expr::Field(_) | Expr::Iterate | Expr::Index(_) | Expr::Slice { .. } => {
                if !matches!(self, Expr::Field(_)) {
                    write!(f, ".")?;
                }
                self.fmt_step(f)
            }
            Expr::RecursiveDescent => write!(f, ".."),
            Expr::Pipe(left, right) => {
                if is_chain(left) && is_step(right) {
                    // Walk the left spine so long paths print without recursing
                    let mut steps: Vec<&Expr> = vec![&**right];
                    let mut head: &Expr = left;
                    while let Expr::Pipe(left, right) = head {
                        steps.push(&**right);
                        head = &**left;
                    }
                    head.fmt_bare(f)?;
                    for step in steps.into_iter().rev() {
                        step.fmt_step(f)?;
                    }
                    Ok(())
                } else {
                    left.fmt_at(f, 0)?;
                    write!(f, " | ")?;
                    right.fmt_at(f, 1)
                }
            }
            Expr::Comma(left, right) => {
                left.fmt_at(f, 1)?;
                write!(f, ", ")?;
                right.fmt_at(f, 2)
            }
            Expr::Optional(inner) => {
                inner.fmt_at(f, 5)?;
                write!(f, "?")
            }
            Expr::Literal(value) => fmt_literal(value, f),
            Expr::Compare { op, left, right } => {
                left.fmt_at(f, 5)?;
                write!(f, " {} ", op)?;
                right.fmt_at(f, 5)
            }
            Expr::And(left, right) => {
                left.fmt_at(f, 3)?;
                write!(f, " and ")?;
                right.fmt_at(f, 4)
            }
            Expr::Or(left, right) => {
                left.fmt_at(f, 2)?;
                write!(f, " or ")?;
                right.fmt_at(f, 3)
            }
            Expr::Not => write!(f, "not"),
            Expr::Select(cond) => {
                write!(f, "select(")?;
                cond.fmt_at(f, 0)?;
                write!(f, ")")
            }
        }
    }

    /// Suffix form of a path step, as written after another term.
    fn fmt_step(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Field(name) if is_identifier(name) => write!(f, ".{}", name),
            Expr::Field(name) => write!(f, ".{}", quote(name)),
            Expr::Iterate => write!(f, "[]"),
            Expr::Index(i) => write!(f, "[{}]", i),
            Expr::Slice { start, end } => {
                write!(f, "[")?;
                if let Some(start) = start {
                    write!(f, "{}", start)?;
                }
                write!(f, ":")?;
                if let Some(end) = end {
                    write!(f, "{}", end)?;
                }
                write!(f, "]")
            }
            other => other.fmt_bare(f),
        }
    }
}

fn is_step(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Field(_) | Expr::Iterate | Expr::Index(_) | Expr::Slice { .. }
    )
}

/// Terms a step suffix can be glued onto without changing the parse.
fn is_chain(mut expr: &Expr) -> bool {
    loop {
        match expr {
            Expr::Pipe(left, right) if is_step(right) => expr = &**left,
            Expr::Pipe(..) => return false,
            Expr::Optional(_) | Expr::Select(_) => return true,
            other => return is_step(other),
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let head_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    head_ok
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !matches!(name, "and" | "or" | "true" | "false" | "null")
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn fmt_literal(value: &Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value {
        Value::Null => write!(f, "null"),
        Value::Boolean(b) => write!(f, "{}", b),
        Value::Integer(n) => write!(f, "{}", n),
        Value::Float(n) => write!(f, "{:?}", n),
        Value::String(s) => f.write_str(&quote(s)),
        // Only scalars are produced by the parser
        Value::Array(_) | Value::Object(_) => {
            let json = serde_json::Value::from(value.clone());
            write!(f, "{}", json)
        }
    }
}

/// Moves the direct children of `expr` into `out`, leaving leaves behind.
fn detach_children(expr: &mut Expr, out: &mut Vec<Expr>) {
    match expr {
        Expr::Pipe(left, right)
        | Expr::Comma(left, right)
        | Expr::And(left, right)
        | Expr::Or(left, right)
        | Expr::Compare { left, right, .. } => {
            out.push(mem::replace(&mut **left, Expr::Identity));
            out.push(mem::replace(&mut **right, Expr::Identity));
        }
        Expr::Optional(inner) | Expr::Select(inner) => {
            out.push(mem::replace(&mut **inner, Expr::Identity));
        }
        _ => {}
    }
}

/// Paths nest as deep as they are long, so trees are torn down from a heap
/// worklist instead of recursively.
impl Drop for Expr {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach_children(self, &mut pending);
        while let Some(mut expr) = pending.pop() {
            detach_children(&mut expr, &mut pending);
        }
    }
}

/// Prints query text that parses back to an equal tree.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_at(f, 0)
    }
}
