//! Dependency descriptor parsing.
//!
//! Dependency strings come in two shapes: `name` optionally followed by a
//! version constraint (`zlib>=1.3`), and optional dependencies of the form
//! `name: reason it is useful`. Both parsers are total; anything that does
//! not match the grammar degenerates to a bare name.

use std::fmt;

use serde::Serialize;

/// Version comparator in a dependency constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Comparator {
    Less,
    LessEqual,
    Equal,
    GreaterEqual,
    Greater,
}

impl Comparator {
    /// Map a run of comparator characters to a comparator.
    fn from_run(run: &str) -> Option<Comparator> {
        match run {
            "<" => Some(Comparator::Less),
            "<=" => Some(Comparator::LessEqual),
            "=" => Some(Comparator::Equal),
            ">=" => Some(Comparator::GreaterEqual),
            ">" => Some(Comparator::Greater),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Comparator::Less => "<",
            Comparator::LessEqual => "<=",
            Comparator::Equal => "=",
            Comparator::GreaterEqual => ">=",
            Comparator::Greater => ">",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dependency on another package, with an optional version constraint.
///
/// The constraint is kept for display; it is never used to reject an
/// otherwise-matching candidate during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyConstraint {
    /// Package name
    pub name: String,

    /// Comparator, when a constraint is present
    pub comparator: Option<Comparator>,

    /// Version the comparator applies to
    pub version: Option<String>,
}

impl DependencyConstraint {
    /// A constraint-free dependency on `name`.
    pub fn bare(name: impl Into<String>) -> Self {
        DependencyConstraint {
            name: name.into(),
            comparator: None,
            version: None,
        }
    }
}

impl fmt::Display for DependencyConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let (Some(cmp), Some(version)) = (&self.comparator, &self.version) {
            write!(f, "{}{}", cmp, version)?;
        }
        Ok(())
    }
}

/// An optional dependency with its human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionalDependency {
    /// Package name
    pub name: String,

    /// Why the dependency is worth installing
    pub description: Option<String>,
}

/// Parse a dependency string into a constraint.
///
/// The longest leading run of non-comparator characters is the name; if a
/// recognized comparator follows immediately, the remainder is the version.
pub fn parse_constraint(s: &str) -> DependencyConstraint {
    if let Some(idx) = s.find(|c| matches!(c, '<' | '>' | '=')) {
        if idx > 0 {
            let rest = &s[idx..];
            let run_len = rest
                .chars()
                .take_while(|c| matches!(c, '<' | '>' | '='))
                .count();
            if let Some(comparator) = Comparator::from_run(&rest[..run_len]) {
                return DependencyConstraint {
                    name: s[..idx].to_string(),
                    comparator: Some(comparator),
                    version: Some(rest[run_len..].to_string()),
                };
            }
        }
    }

    DependencyConstraint::bare(s)
}

/// Parse an optional-dependency string.
///
/// Splits on the first `:`; both halves are trimmed. Without a `:` the
/// whole string is the name.
pub fn parse_optdep(s: &str) -> OptionalDependency {
    match s.split_once(':') {
        Some((name, description)) => OptionalDependency {
            name: name.trim().to_string(),
            description: Some(description.trim().to_string()),
        },
        None => OptionalDependency {
            name: s.to_string(),
            description: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_name() {
        let dep = parse_constraint("foo");
        assert_eq!(dep.name, "foo");
        assert_eq!(dep.comparator, None);
        assert_eq!(dep.version, None);
    }

    #[test]
    fn test_parse_doubled_comparator() {
        let dep = parse_constraint("foo>=1.2");
        assert_eq!(dep.name, "foo");
        assert_eq!(dep.comparator, Some(Comparator::GreaterEqual));
        assert_eq!(dep.version, Some("1.2".to_string()));
    }

    #[test]
    fn test_parse_single_comparators() {
        assert_eq!(parse_constraint("a<2").comparator, Some(Comparator::Less));
        assert_eq!(parse_constraint("a=2").comparator, Some(Comparator::Equal));
        assert_eq!(
            parse_constraint("a>2").comparator,
            Some(Comparator::Greater)
        );
        assert_eq!(
            parse_constraint("a<=2").comparator,
            Some(Comparator::LessEqual)
        );
    }

    #[test]
    fn test_malformed_constraint_degenerates_to_bare_name() {
        // Leading comparator means there is no name to split off
        let dep = parse_constraint(">=1.2");
        assert_eq!(dep.name, ">=1.2");
        assert_eq!(dep.comparator, None);

        // Unrecognized comparator run
        let dep = parse_constraint("foo=<1.2");
        assert_eq!(dep.name, "foo=<1.2");
        assert_eq!(dep.comparator, None);
    }

    #[test]
    fn test_constraint_display() {
        assert_eq!(parse_constraint("foo>=1.2").to_string(), "foo>=1.2");
        assert_eq!(parse_constraint("foo").to_string(), "foo");
    }

    #[test]
    fn test_parse_optdep_with_description() {
        let dep = parse_optdep("foo: bar baz");
        assert_eq!(dep.name, "foo");
        assert_eq!(dep.description, Some("bar baz".to_string()));
    }

    #[test]
    fn test_parse_optdep_bare() {
        let dep = parse_optdep("foo");
        assert_eq!(dep.name, "foo");
        assert_eq!(dep.description, None);
    }

    #[test]
    fn test_parse_optdep_splits_on_first_colon() {
        let dep = parse_optdep("foo: needed for bar: baz support");
        assert_eq!(dep.name, "foo");
        assert_eq!(
            dep.description,
            Some("needed for bar: baz support".to_string())
        );
    }
}
