use std::fmt;

/// A join from one table to another.
///
/// `from_columns[i]` joins to `to_columns[i]`. When `order_columns` is
/// non-empty, rows of the target table are ordered by those columns;
/// `numbered_order` means the single order column holds a dense numeric
/// index.
///
/// `key_columns` identify a row of the target table. Elements of an
/// unordered join are told apart by them, or by the backend's row identity
/// when there are none.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableJoin {
    pub from_table: String,
    pub to_table: String,
    pub from_columns: Vec<String>,
    pub to_columns: Vec<String>,
    pub order_columns: Vec<OrderColumn>,
    pub numbered_order: bool,
    pub key_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrderColumn {
    pub name: String,
    pub descending: bool,
}

impl OrderColumn {
    pub fn asc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            descending: false,
        }
    }

    /// Parses a mapped order column. A trailing `-` sorts descending, a
    /// trailing `+` ascending.
    pub fn parse(src: &str) -> Self {
        let src = src.trim();

        if let Some(name) = src.strip_suffix('-') {
            Self {
                name: name.trim_end().to_string(),
                descending: true,
            }
        } else {
            Self::asc(src.strip_suffix('+').unwrap_or(src).trim_end())
        }
    }
}

impl fmt::Display for OrderColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if self.descending {
            f.write_str("-")?;
        }
        Ok(())
    }
}

impl TableJoin {
    pub fn is_ordered(&self) -> bool {
        !self.order_columns.is_empty()
    }

    /// Identity used to coalesce joins; order columns do not take part.
    pub fn condition_key(&self) -> (&str, &str, &[String], &[String]) {
        (
            &self.from_table,
            &self.to_table,
            &self.from_columns,
            &self.to_columns,
        )
    }
}

impl fmt::Display for TableJoin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} on (", self.from_table, self.to_table)?;
        for (i, (from, to)) in self.from_columns.iter().zip(&self.to_columns).enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{from} = {to}")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_column_direction_suffix() {
        assert_eq!(OrderColumn::parse("seq"), OrderColumn::asc("seq"));
        assert_eq!(OrderColumn::parse("seq+"), OrderColumn::asc("seq"));

        let desc = OrderColumn::parse("created -");
        assert_eq!(desc.name, "created");
        assert!(desc.descending);
        assert_eq!(desc.to_string(), "created-");
    }
}
