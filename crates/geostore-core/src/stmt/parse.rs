use super::{Expr, ExprColumn, ExprFunc, Value};

/// Parses a mapping expression from configuration text.
///
/// Accepted forms are column references with up to two qualifiers
/// (`schema.table.column`), single-quoted string literals (`''` escapes a
/// quote) and function calls over those (`func(a, 'b', g(c))`). Any other
/// input becomes a passthrough function node holding the original text, so
/// backend snippets such as `CASE WHEN ... END` remain usable. Parsing never
/// fails.
pub fn parse_mapping_expr(text: &str) -> Expr {
    let mut parser = Parser {
        src: text,
        pos: 0,
    };

    match parser.parse_complete() {
        Some(expr) => expr,
        None => {
            tracing::warn!(
                expr = text,
                "mapping expression not understood, passing it through verbatim"
            );
            Expr::passthrough(text)
        }
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn parse_complete(&mut self) -> Option<Expr> {
        let expr = self.parse_expr()?;
        self.skip_ws();
        if self.pos == self.src.len() {
            Some(expr)
        } else {
            None
        }
    }

    fn parse_expr(&mut self) -> Option<Expr> {
        self.skip_ws();

        if self.peek()? == '\'' {
            return self.parse_string().map(Expr::Value);
        }

        let mut parts = vec![self.parse_ident()?];
        while self.peek() == Some('.') {
            self.pos += 1;
            parts.push(self.parse_ident()?);
        }

        self.skip_ws();
        if self.peek() == Some('(') {
            self.pos += 1;
            let args = self.parse_args()?;
            return Some(ExprFunc::new(parts.join("."), args).into());
        }

        if parts.iter().any(|part| is_reserved(part)) {
            return None;
        }

        let column = parts.pop()?;
        let table = parts.pop();
        let schema = parts.pop();
        if !parts.is_empty() {
            return None;
        }

        Some(
            ExprColumn {
                schema,
                table,
                column,
            }
            .into(),
        )
    }

    fn parse_args(&mut self) -> Option<Vec<Expr>> {
        let mut args = vec![];

        self.skip_ws();
        if self.peek()? == ')' {
            self.pos += 1;
            return Some(args);
        }

        loop {
            args.push(self.parse_expr()?);
            self.skip_ws();
            match self.peek()? {
                ',' => self.pos += 1,
                ')' => {
                    self.pos += 1;
                    return Some(args);
                }
                _ => return None,
            }
        }
    }

    fn parse_string(&mut self) -> Option<Value> {
        // opening quote
        self.pos += 1;
        let mut out = String::new();

        loop {
            let c = self.peek()?;
            self.pos += c.len_utf8();
            if c == '\'' {
                if self.peek() == Some('\'') {
                    self.pos += 1;
                    out.push('\'');
                } else {
                    return Some(Value::String(out));
                }
            } else {
                out.push(c);
            }
        }
    }

    fn parse_ident(&mut self) -> Option<String> {
        let rest = &self.src[self.pos..];
        let mut chars = rest.char_indices();

        match chars.next() {
            Some((_, c)) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return None,
        }

        let end = chars
            .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());

        self.pos += end;
        Some(rest[..end].to_string())
    }

    fn skip_ws(&mut self) {
        let rest = &self.src[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }
}

fn is_reserved(ident: &str) -> bool {
    ["null", "true", "false", "case", "select", "not"]
        .iter()
        .any(|kw| ident.eq_ignore_ascii_case(kw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn qualified_column() {
        assert_eq!(
            parse_mapping_expr("gis.roads.geom"),
            Expr::Column(ExprColumn {
                schema: Some("gis".into()),
                table: Some("roads".into()),
                column: "geom".into(),
            })
        );
        assert_eq!(
            parse_mapping_expr(" name "),
            Expr::Column(ExprColumn::new("name"))
        );
    }

    #[test]
    fn string_literal_with_escaped_quote() {
        assert_eq!(
            parse_mapping_expr("'it''s'"),
            Expr::Value(Value::from("it's"))
        );
        assert_eq!(parse_mapping_expr("'it''s'").to_string(), "'it''s'");
    }

    #[test]
    fn nested_call() {
        let expr = parse_mapping_expr("concat(first, ' ', upper(t.last))");
        assert_eq!(
            expr,
            Expr::func(
                "concat",
                vec![
                    Expr::column("first"),
                    Expr::from(" "),
                    Expr::func("upper", vec![Expr::qualified_column("t", "last")]),
                ]
            )
        );
        assert!(!expr.is_passthrough());
        assert_eq!(expr.to_string(), "concat(first, ' ', upper(t.last))");
    }

    #[test]
    fn fallback_is_lossless() {
        let inputs = [
            "CASE WHEN a > 0 THEN 'x' ELSE 'y' END",
            "a.b.c.d",
            "f(a",
            "'unterminated",
            "42",
            "a || b",
            "",
            "  coalesce(a, b) + 1 ",
            "null",
        ];

        for input in inputs {
            let expr = parse_mapping_expr(input);
            assert!(expr.is_passthrough(), "{input:?} should pass through");
            assert_eq!(expr.to_string(), input);
        }
    }

    #[test]
    fn parsing_is_deterministic() {
        let input = "ST_Union(a.geom, 'x')";
        assert_eq!(parse_mapping_expr(input), parse_mapping_expr(input));
    }
}
