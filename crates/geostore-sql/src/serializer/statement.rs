use super::{Comma, Formatter, Params, ToSql};

use geostore_core::{
    stmt::{self, Direction},
    Result,
};

impl ToSql for &stmt::Statement {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        match self {
            stmt::Statement::Select(stmt) => stmt.to_sql(f),
            stmt::Statement::Insert(stmt) => stmt.to_sql(f),
            stmt::Statement::Update(stmt) => stmt.to_sql(f),
            stmt::Statement::Delete(stmt) => stmt.to_sql(f),
        }
    }
}

impl ToSql for &stmt::Select {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        let distinct = if self.distinct { "DISTINCT " } else { "" };

        fmt!(f, "SELECT " distinct Comma(&self.returning) " FROM " self.source);

        if let Some(filter) = &self.filter {
            fmt!(f, " WHERE " filter);
        }

        if !self.order_by.is_empty() {
            fmt!(f, " ORDER BY " Comma(&self.order_by));
        }

        if let Some(limit) = &self.limit {
            fmt!(f, limit);
        }

        Ok(())
    }
}

impl ToSql for &stmt::TableWithJoins {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        fmt!(f, &self.table);

        for join in &self.joins {
            fmt!(f, " LEFT OUTER JOIN " join.table " ON " join.on);
        }

        Ok(())
    }
}

impl ToSql for &stmt::TableRef {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        fmt!(f, &self.name);

        if let Some(alias) = &self.alias {
            fmt!(f, " " alias);
        }

        Ok(())
    }
}

impl ToSql for &stmt::OrderByExpr {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        match self.order {
            Direction::Asc => fmt!(f, &self.expr),
            Direction::Desc => fmt!(f, &self.expr " DESC"),
        }
        Ok(())
    }
}

impl ToSql for &stmt::Limit {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        match (self.limit, self.offset) {
            (Some(limit), offset) => {
                fmt!(f, " LIMIT " limit);
                if let Some(offset) = offset {
                    fmt!(f, " OFFSET " offset);
                }
            }
            // SQLite and MySQL only accept OFFSET after a LIMIT
            (None, Some(offset)) if f.serializer.is_sqlite() => {
                fmt!(f, " LIMIT -1 OFFSET " offset);
            }
            (None, Some(offset)) if f.serializer.is_mysql() => {
                fmt!(f, " LIMIT 18446744073709551615 OFFSET " offset);
            }
            (None, Some(offset)) => fmt!(f, " OFFSET " offset),
            (None, None) => {}
        }
        Ok(())
    }
}

impl ToSql for &stmt::Insert {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        fmt!(
            f, "INSERT INTO " self.table.name " (" Comma(&self.columns) ") VALUES (" Comma(&self.values) ")"
        );

        if let Some(returning) = &self.returning {
            fmt!(f, " RETURNING " returning);
        }

        Ok(())
    }
}

impl ToSql for &stmt::Update {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        fmt!(f, "UPDATE " self.table.name " SET " Comma(&self.assignments));

        if let Some(filter) = &self.filter {
            fmt!(f, " WHERE " filter);
        }

        Ok(())
    }
}

impl ToSql for &stmt::Assignment {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        fmt!(f, &self.column " = " self.value);
        Ok(())
    }
}

impl ToSql for &stmt::Delete {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        fmt!(f, "DELETE FROM " self.from.name);

        if let Some(filter) = &self.filter {
            fmt!(f, " WHERE " filter);
        }

        Ok(())
    }
}
