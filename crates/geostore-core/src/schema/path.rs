use super::QName;

use std::fmt;

/// A `/`-separated property path such as `app:lanes/app:width`.
///
/// Steps may carry a positional or attribute predicate (`app:lanes[2]`);
/// predicates are ignored when matching against the mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    pub steps: Vec<QName>,
}

impl PropertyPath {
    pub fn parse(src: &str) -> Self {
        let steps = src
            .split('/')
            .map(str::trim)
            .filter(|step| !step.is_empty() && *step != ".")
            .map(|step| {
                let step = match step.find('[') {
                    Some(pos) => &step[..pos],
                    None => step,
                };
                QName::parse(step)
            })
            .collect();

        Self { steps }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl From<&str> for PropertyPath {
    fn from(src: &str) -> Self {
        PropertyPath::parse(src)
    }
}

impl From<QName> for PropertyPath {
    fn from(step: QName) -> Self {
        Self { steps: vec![step] }
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            fmt::Display::fmt(step, f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_strips_predicates() {
        let path = PropertyPath::parse("app:lanes[2]/app:width");
        assert_eq!(path.steps.len(), 2);
        assert_eq!(path.steps[0].local, "lanes");
        assert_eq!(path.to_string(), "app:lanes/app:width");
    }
}
