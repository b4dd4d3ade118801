use super::Expr;

use std::fmt;

/// A named function call.
///
/// Regular calls are rendered through the function provider registry and
/// fail translation when no provider supports the dialect. A `passthrough`
/// call is a backend snippet carried verbatim: `name` holds the original
/// text, `args` is empty, and it renders unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprFunc {
    pub name: String,
    pub args: Vec<Expr>,
    pub passthrough: bool,
}

impl ExprFunc {
    pub fn new(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self {
            name: name.into(),
            args,
            passthrough: false,
        }
    }

    pub fn passthrough(text: impl Into<String>) -> Self {
        Self {
            name: text.into(),
            args: vec![],
            passthrough: true,
        }
    }
}

impl Expr {
    pub fn func(name: impl Into<String>, args: Vec<Expr>) -> Self {
        ExprFunc::new(name, args).into()
    }

    pub fn passthrough(text: impl Into<String>) -> Self {
        ExprFunc::passthrough(text).into()
    }

    pub fn is_passthrough(&self) -> bool {
        matches!(self, Self::Func(func) if func.passthrough)
    }
}

impl From<ExprFunc> for Expr {
    fn from(value: ExprFunc) -> Self {
        Self::Func(value)
    }
}

impl fmt::Display for ExprFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.passthrough {
            return f.write_str(&self.name);
        }

        write!(f, "{}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            fmt::Display::fmt(arg, f)?;
        }
        f.write_str(")")
    }
}
