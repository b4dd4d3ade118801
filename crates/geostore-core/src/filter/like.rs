/// A like pattern in the client's syntax.
///
/// Clients choose their own wildcard, single-character and escape
/// characters; [`LikePattern::to_sql`] rewrites the pattern into SQL `LIKE`
/// syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikePattern {
    pub pattern: String,
    pub wildcard: char,
    pub single_char: char,
    pub escape: char,
}

impl LikePattern {
    /// A pattern using `*`, `.` and `!`.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            wildcard: '*',
            single_char: '.',
            escape: '!',
        }
    }

    pub fn with_chars(mut self, wildcard: char, single_char: char, escape: char) -> Self {
        self.wildcard = wildcard;
        self.single_char = single_char;
        self.escape = escape;
        self
    }

    /// Rewrites the pattern into SQL `LIKE` syntax using `sql_escape` as the
    /// escape character. Literal `%`, `_` and `sql_escape` characters are
    /// escaped.
    pub fn to_sql(&self, sql_escape: char) -> String {
        let mut out = String::with_capacity(self.pattern.len());
        let mut chars = self.pattern.chars();

        while let Some(c) = chars.next() {
            if c == self.escape {
                match chars.next() {
                    Some(next) => push_literal(&mut out, next, sql_escape),
                    None => push_literal(&mut out, c, sql_escape),
                }
            } else if c == self.wildcard {
                out.push('%');
            } else if c == self.single_char {
                out.push('_');
            } else {
                push_literal(&mut out, c, sql_escape);
            }
        }

        out
    }
}

fn push_literal(out: &mut String, c: char, sql_escape: char) {
    if c == '%' || c == '_' || c == sql_escape {
        out.push(sql_escape);
    }
    out.push(c);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_client_syntax() {
        assert_eq!(LikePattern::new("Ro*d.").to_sql('\\'), "Ro%d_");
        assert_eq!(LikePattern::new("50!*_off").to_sql('\\'), "50*\\_off");
        assert_eq!(
            LikePattern::new("a#%b?").with_chars('%', '?', '#').to_sql('\\'),
            "a\\%b_"
        );
    }
}
