//! Version requirements and matching.
//!
//! Three spellings are accepted: Maven interval sets (`[1.0,2.0)`,
//! `(,1.0],[1.2,)`), comparator lists (`>=1.0.0, <2.0.0`), and bare soft
//! requirements (`1.0`). All comparisons use Maven ordering.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;

use crate::errors::{ResolveError, ResolveResult};
use crate::semver::comparator::MavenVersion;

static COMPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(>=|<=|!=|==|>|<|=)\s*([^\s,<>=!]+)").unwrap());

#[derive(Clone, Debug)]
struct Bound {
    version: MavenVersion,
    inclusive: bool,
}

/// One interval; `None` bounds are open-ended.
#[derive(Clone, Debug)]
struct Interval {
    lower: Option<Bound>,
    upper: Option<Bound>,
}

impl Interval {
    fn contains(&self, version: &MavenVersion) -> bool {
        let above = match &self.lower {
            Some(bound) => match version.cmp(&bound.version) {
                Ordering::Greater => true,
                Ordering::Equal => bound.inclusive,
                Ordering::Less => false,
            },
            None => true,
        };
        let below = match &self.upper {
            Some(bound) => match version.cmp(&bound.version) {
                Ordering::Less => true,
                Ordering::Equal => bound.inclusive,
                Ordering::Greater => false,
            },
            None => true,
        };
        above && below
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Op {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Ne,
}

#[derive(Clone, Debug)]
enum Kind {
    Any,
    Soft(MavenVersion),
    Intervals(Vec<Interval>),
    Comparators(Vec<(Op, MavenVersion)>),
}

/// A parsed version requirement.
#[derive(Clone, Debug)]
pub struct VersionRequirement {
    raw: String,
    kind: Kind,
}

impl VersionRequirement {
    pub fn parse(requirement: &str) -> ResolveResult<Self> {
        let trimmed = requirement.trim();
        let kind = match trimmed.chars().next() {
            None | Some('*') if trimmed.len() <= 1 => Kind::Any,
            Some('[') | Some('(') => Kind::Intervals(parse_intervals(requirement, trimmed)?),
            Some('>') | Some('<') | Some('=') | Some('!') => {
                Kind::Comparators(parse_comparators(requirement, trimmed)?)
            }
            _ => Kind::Soft(MavenVersion::parse(trimmed)),
        };
        Ok(Self {
            raw: requirement.to_string(),
            kind,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Soft requirements name a preferred version rather than a range.
    pub fn is_soft(&self) -> bool {
        matches!(self.kind, Kind::Soft(_))
    }

    pub fn matches(&self, version: &str) -> bool {
        let version = MavenVersion::parse(version);
        match &self.kind {
            Kind::Any => true,
            Kind::Soft(soft) => *soft == version,
            Kind::Intervals(intervals) => intervals.iter().any(|i| i.contains(&version)),
            Kind::Comparators(comparators) => comparators.iter().all(|(op, bound)| {
                let ordering = version.cmp(bound);
                match op {
                    Op::Gt => ordering == Ordering::Greater,
                    Op::Ge => ordering != Ordering::Less,
                    Op::Lt => ordering == Ordering::Less,
                    Op::Le => ordering != Ordering::Greater,
                    Op::Eq => ordering == Ordering::Equal,
                    Op::Ne => ordering != Ordering::Equal,
                }
            }),
        }
    }
}

fn invalid(requirement: &str, reason: &str) -> ResolveError {
    ResolveError::InvalidRequirement {
        requirement: requirement.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_bound(text: &str, inclusive: bool) -> Option<Bound> {
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(Bound {
            version: MavenVersion::parse(text),
            inclusive,
        })
    }
}

fn parse_intervals(requirement: &str, trimmed: &str) -> ResolveResult<Vec<Interval>> {
    let mut intervals = Vec::new();
    let mut rest = trimmed;

    while !rest.is_empty() {
        let lower_inclusive = match rest.chars().next() {
            Some('[') => true,
            Some('(') => false,
            _ => return Err(invalid(requirement, "expected '[' or '('")),
        };
        let close = rest
            .find([']', ')'])
            .ok_or_else(|| invalid(requirement, "unterminated range"))?;
        let upper_inclusive = rest[close..].starts_with(']');
        let inner = &rest[1..close];

        let interval = match inner.split_once(',') {
            Some((lower, upper)) => {
                if upper.contains(',') {
                    return Err(invalid(requirement, "too many bounds"));
                }
                Interval {
                    lower: parse_bound(lower, lower_inclusive),
                    upper: parse_bound(upper, upper_inclusive),
                }
            }
            None => {
                if !lower_inclusive || !upper_inclusive || inner.trim().is_empty() {
                    return Err(invalid(requirement, "single version must be [x]"));
                }
                Interval {
                    lower: parse_bound(inner, true),
                    upper: parse_bound(inner, true),
                }
            }
        };

        if let (Some(lower), Some(upper)) = (&interval.lower, &interval.upper) {
            if lower.version > upper.version {
                return Err(invalid(requirement, "lower bound exceeds upper bound"));
            }
        }
        intervals.push(interval);

        rest = rest[close + 1..].trim_start();
        if let Some(stripped) = rest.strip_prefix(',') {
            rest = stripped.trim_start();
            if rest.is_empty() {
                return Err(invalid(requirement, "trailing ','"));
            }
        }
    }

    Ok(intervals)
}

fn parse_comparators(requirement: &str, trimmed: &str) -> ResolveResult<Vec<(Op, MavenVersion)>> {
    let mut comparators = Vec::new();
    let mut leftover = String::new();
    let mut last = 0;

    for capture in COMPARATOR_RE.captures_iter(trimmed) {
        let (Some(whole), Some(op), Some(version)) = (capture.get(0), capture.get(1), capture.get(2))
        else {
            continue;
        };
        leftover.push_str(&trimmed[last..whole.start()]);
        last = whole.end();

        let op = match op.as_str() {
            ">" => Op::Gt,
            ">=" => Op::Ge,
            "<" => Op::Lt,
            "<=" => Op::Le,
            "!=" => Op::Ne,
            _ => Op::Eq,
        };
        comparators.push((op, MavenVersion::parse(version.as_str())));
    }
    leftover.push_str(&trimmed[last..]);

    if comparators.is_empty() || leftover.chars().any(|c| !c.is_whitespace() && c != ',') {
        return Err(invalid(requirement, "unrecognised comparator expression"));
    }
    Ok(comparators)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matching<'a>(requirement: &str, versions: &[&'a str]) -> Vec<&'a str> {
        let requirement = VersionRequirement::parse(requirement).unwrap();
        versions
            .iter()
            .copied()
            .filter(|v| requirement.matches(v))
            .collect()
    }

    #[test]
    fn test_comparator_range() {
        let available = ["0.9.0", "1.0.0", "1.5.0", "2.0.0"];
        assert_eq!(matching(">=1.0.0, <2.0.0", &available), vec!["1.0.0", "1.5.0"]);
        assert_eq!(matching(">1.0.0 <=2.0.0", &available), vec!["1.5.0", "2.0.0"]);
        assert_eq!(matching("!=1.5", &available), vec!["0.9.0", "1.0.0", "2.0.0"]);
    }

    #[test]
    fn test_maven_ranges() {
        let available = ["0.9", "1.0", "1.1", "1.2", "2.0"];
        assert_eq!(matching("[1.0,2.0)", &available), vec!["1.0", "1.1", "1.2"]);
        assert_eq!(matching("(,1.0]", &available), vec!["0.9", "1.0"]);
        assert_eq!(matching("[1.2,)", &available), vec!["1.2", "2.0"]);
        assert_eq!(matching("[1.1]", &available), vec!["1.1"]);
        assert_eq!(matching("(,1.0],[1.2,)", &available), vec!["0.9", "1.0", "1.2", "2.0"]);
    }

    #[test]
    fn test_soft_requirement_matches_equal_version_only() {
        let available = ["1.0", "1.0.0", "1.1"];
        let requirement = VersionRequirement::parse("1.0").unwrap();
        assert!(requirement.is_soft());
        assert_eq!(matching("1.0", &available), vec!["1.0", "1.0.0"]);
    }

    #[test]
    fn test_any() {
        assert_eq!(matching("", &["1", "2"]), vec!["1", "2"]);
        assert_eq!(matching("*", &["1", "2"]), vec!["1", "2"]);
    }

    #[test]
    fn test_invalid_requirements() {
        for bad in ["[1.0", "(1.0)", "[2.0,1.0]", "[1,2],", ">=", ">=1.0 junk", "[1,2,3]"] {
            let err = VersionRequirement::parse(bad).unwrap_err();
            assert!(
                matches!(err, ResolveError::InvalidRequirement { .. }),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_raw_string_is_kept() {
        let requirement = VersionRequirement::parse(">=1.0.0, <2.0.0").unwrap();
        assert_eq!(requirement.as_str(), ">=1.0.0, <2.0.0");
    }
}
