use super::Operand;
use crate::stmt::BinaryOp;

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub op: ComparisonOp,
    pub lhs: Operand,
    pub rhs: Operand,

    /// When `false`, both sides are lower-cased before comparing
    pub match_case: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl From<ComparisonOp> for BinaryOp {
    fn from(op: ComparisonOp) -> BinaryOp {
        match op {
            ComparisonOp::Eq => BinaryOp::Eq,
            ComparisonOp::Ne => BinaryOp::Ne,
            ComparisonOp::Lt => BinaryOp::Lt,
            ComparisonOp::Le => BinaryOp::Le,
            ComparisonOp::Gt => BinaryOp::Gt,
            ComparisonOp::Ge => BinaryOp::Ge,
        }
    }
}
