use std::borrow::Cow;

/// A piece of a rendered function call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Sql(Cow<'static, str>),

    /// The argument at this index
    Arg(usize),

    /// All arguments, comma separated
    Args,
}

/// A function call template such as `ST_DWithin({0}, {1}, {2})`.
///
/// `{n}` is replaced by the `n`th argument and `{*}` by all arguments. An
/// argument may appear more than once; its parameters are bound again each
/// time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub fragments: Vec<Fragment>,
}

impl Template {
    pub fn parse(src: &'static str) -> Template {
        let mut fragments = vec![];
        let mut rest = src;

        while let Some(start) = rest.find('{') {
            let Some(len) = rest[start..].find('}') else {
                break;
            };
            let hole = &rest[start + 1..start + len];

            let fragment = if hole == "*" {
                Fragment::Args
            } else if let Ok(index) = hole.parse() {
                Fragment::Arg(index)
            } else {
                // not a hole, keep the braces as text
                fragments.push(Fragment::Sql(Cow::Borrowed(&rest[..start + len + 1])));
                rest = &rest[start + len + 1..];
                continue;
            };

            if start > 0 {
                fragments.push(Fragment::Sql(Cow::Borrowed(&rest[..start])));
            }
            fragments.push(fragment);
            rest = &rest[start + len + 1..];
        }

        if !rest.is_empty() {
            fragments.push(Fragment::Sql(Cow::Borrowed(rest)));
        }

        Template { fragments }
    }

    /// `name(arg0, arg1, ...)`
    pub fn call(name: impl Into<String>) -> Template {
        Template {
            fragments: vec![
                Fragment::Sql(Cow::Owned(format!("{}(", name.into()))),
                Fragment::Args,
                Fragment::Sql(Cow::Borrowed(")")),
            ],
        }
    }

    /// Highest argument index referenced, if any.
    pub fn max_arg(&self) -> Option<usize> {
        self.fragments
            .iter()
            .filter_map(|fragment| match fragment {
                Fragment::Arg(i) => Some(*i),
                _ => None,
            })
            .max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_holes() {
        let template = Template::parse("{0} && {1} AND ST_Intersects({0}, {1})");
        assert_eq!(
            template.fragments,
            vec![
                Fragment::Arg(0),
                Fragment::Sql(" && ".into()),
                Fragment::Arg(1),
                Fragment::Sql(" AND ST_Intersects(".into()),
                Fragment::Arg(0),
                Fragment::Sql(", ".into()),
                Fragment::Arg(1),
                Fragment::Sql(")".into()),
            ]
        );
        assert_eq!(template.max_arg(), Some(1));
    }

    #[test]
    fn non_holes_are_text() {
        let template = Template::parse("f({x}, {*})");
        assert_eq!(
            template.fragments,
            vec![
                Fragment::Sql("f({x}".into()),
                Fragment::Sql(", ".into()),
                Fragment::Args,
                Fragment::Sql(")".into()),
            ]
        );
    }
}
