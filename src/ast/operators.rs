use std::{cmp::Ordering, fmt};

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    /// Equal (`==`)
    Equal,
    /// Not equal (`!=`)
    NotEqual,
    /// Less than (`<`)
    LessThan,
    /// Greater than (`>`)
    GreaterThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than or equal (`>=`)
    GreaterEqual,
}

impl CmpOp {
    /// Whether an ordering between left and right operands satisfies the operator
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            CmpOp::Equal => ordering == Ordering::Equal,
            CmpOp::NotEqual => ordering != Ordering::Equal,
            CmpOp::LessThan => ordering == Ordering::Less,
            CmpOp::GreaterThan => ordering == Ordering::Greater,
            CmpOp::LessEqual => ordering != Ordering::Greater,
            CmpOp::GreaterEqual => ordering != Ordering::Less,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Equal => "==",
            CmpOp::NotEqual => "!=",
            CmpOp::LessThan => "<",
            CmpOp::GreaterThan => ">",
            CmpOp::LessEqual => "<=",
            CmpOp::GreaterEqual => ">=",
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
