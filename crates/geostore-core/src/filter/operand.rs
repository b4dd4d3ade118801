use crate::{schema::PropertyPath, stmt::Value};

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Property(PropertyPath),
    Literal(Value),
    Function { name: String, args: Vec<Operand> },
}

impl Operand {
    pub fn property(path: &str) -> Operand {
        Operand::Property(PropertyPath::parse(path))
    }

    pub fn function(name: impl Into<String>, args: Vec<Operand>) -> Operand {
        Operand::Function {
            name: name.into(),
            args,
        }
    }

    pub fn as_property(&self) -> Option<&PropertyPath> {
        match self {
            Operand::Property(path) => Some(path),
            _ => None,
        }
    }

    pub(crate) fn for_each_path(&self, f: &mut impl FnMut(&PropertyPath)) {
        match self {
            Operand::Property(path) => f(path),
            Operand::Literal(_) => {}
            Operand::Function { args, .. } => args.iter().for_each(|arg| arg.for_each_path(f)),
        }
    }
}

impl From<PropertyPath> for Operand {
    fn from(path: PropertyPath) -> Self {
        Operand::Property(path)
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Operand::Literal(value)
    }
}

impl From<&str> for Operand {
    fn from(value: &str) -> Self {
        Operand::Literal(value.into())
    }
}

impl From<String> for Operand {
    fn from(value: String) -> Self {
        Operand::Literal(value.into())
    }
}

impl From<i64> for Operand {
    fn from(value: i64) -> Self {
        Operand::Literal(value.into())
    }
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Operand::Literal(value.into())
    }
}

impl From<bool> for Operand {
    fn from(value: bool) -> Self {
        Operand::Literal(value.into())
    }
}
