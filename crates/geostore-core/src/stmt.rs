//! Expression and statement AST.
//!
//! Expressions are shared between the mapping model (a column mapping is an
//! expression parsed from configuration text) and the query plans built by
//! the engine. Statements are the backend-neutral form of the SQL the
//! serializer renders.

mod delete;
pub use delete::Delete;

mod expr;
pub use expr::Expr;

mod expr_and;
pub use expr_and::ExprAnd;

mod expr_between;
pub use expr_between::ExprBetween;

mod expr_binary_op;
pub use expr_binary_op::ExprBinaryOp;

mod expr_column;
pub use expr_column::ExprColumn;

mod expr_count;
pub use expr_count::ExprCount;

mod expr_func;
pub use expr_func::ExprFunc;

mod expr_in_list;
pub use expr_in_list::ExprInList;

mod expr_in_subquery;
pub use expr_in_subquery::ExprInSubquery;

mod expr_is_null;
pub use expr_is_null::ExprIsNull;

mod expr_like;
pub use expr_like::ExprLike;

mod expr_not;
pub use expr_not::ExprNot;

mod expr_or;
pub use expr_or::ExprOr;

mod insert;
pub use insert::Insert;

mod join;
pub use join::Join;

mod op_binary;
pub use op_binary::BinaryOp;

mod order_by;
pub use order_by::{Direction, OrderByExpr};

mod parse;
pub use parse::parse_mapping_expr;

mod select;
pub use select::{Limit, Select};

mod statement;
pub use statement::Statement;

mod table_ref;
pub use table_ref::{TableRef, TableWithJoins};

mod ty;
pub use ty::Type;

mod update;
pub use update::{Assignment, Update};

mod value;
pub use value::Value;
