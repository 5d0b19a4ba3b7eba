//! Maven version ordering.
//!
//! Follows the `ComparableVersion` rules used by Maven itself: a version is
//! split into a tree of numeric, qualifier and list items, trailing "null"
//! items are dropped, and the trees are compared item by item. The result is
//! a total order, so it is safe to sort with.

use std::cmp::Ordering;
use std::fmt;

/// Well-known qualifiers, lowest first. The empty string is a release.
const QUALIFIERS: &[&str] = &["alpha", "beta", "milestone", "rc", "snapshot", "", "sp"];

/// Position of the release qualifier in [`QUALIFIERS`].
const RELEASE_INDEX: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Item {
    /// Decimal digits with leading zeros stripped; `""` is zero.
    Int(String),
    Str(String),
    List(Vec<Item>),
}

impl Item {
    fn int(digits: &str) -> Item {
        Item::Int(digits.trim_start_matches('0').to_string())
    }

    fn string(value: &str, followed_by_digit: bool) -> Item {
        let value = match value {
            "a" if followed_by_digit => "alpha",
            "b" if followed_by_digit => "beta",
            "m" if followed_by_digit => "milestone",
            "ga" | "final" | "release" => "",
            "cr" => "rc",
            other => other,
        };
        Item::Str(value.to_string())
    }

    fn parse(is_digit: bool, buf: &str) -> Item {
        if is_digit {
            Item::int(buf)
        } else {
            Item::string(buf, false)
        }
    }

    fn is_null(&self) -> bool {
        match self {
            Item::Int(digits) => digits.is_empty(),
            Item::Str(value) => value.is_empty(),
            Item::List(items) => items.is_empty(),
        }
    }

    /// Compare against another item, `None` standing for a missing item
    /// (the shorter version ran out).
    fn compare(&self, other: Option<&Item>) -> Ordering {
        match (self, other) {
            (Item::Int(digits), None) => {
                if digits.is_empty() {
                    Ordering::Equal
                } else {
                    Ordering::Greater
                }
            }
            (Item::Int(a), Some(Item::Int(b))) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
            (Item::Int(_), Some(_)) => Ordering::Greater,

            (Item::Str(value), None) => {
                comparable_qualifier(value).cmp(&RELEASE_INDEX.to_string())
            }
            (Item::Str(_), Some(Item::Int(_))) => Ordering::Less,
            (Item::Str(a), Some(Item::Str(b))) => {
                comparable_qualifier(a).cmp(&comparable_qualifier(b))
            }
            (Item::Str(_), Some(Item::List(_))) => Ordering::Less,

            (Item::List(items), None) => match items.first() {
                Some(first) => first.compare(None),
                None => Ordering::Equal,
            },
            (Item::List(_), Some(Item::Int(_))) => Ordering::Less,
            (Item::List(_), Some(Item::Str(_))) => Ordering::Greater,
            (Item::List(left), Some(Item::List(right))) => {
                let mut left = left.iter();
                let mut right = right.iter();
                loop {
                    let result = match (left.next(), right.next()) {
                        (None, None) => return Ordering::Equal,
                        (None, Some(r)) => r.compare(None).reverse(),
                        (Some(l), r) => l.compare(r),
                    };
                    if result != Ordering::Equal {
                        return result;
                    }
                }
            }
        }
    }
}

/// Known qualifiers map to their index; unknown ones sort after all of them,
/// lexically among themselves.
fn comparable_qualifier(value: &str) -> String {
    match QUALIFIERS.iter().position(|q| *q == value) {
        Some(index) => index.to_string(),
        None => format!("{}-{}", QUALIFIERS.len(), value),
    }
}

fn normalize(items: &mut Vec<Item>) {
    let mut i = items.len();
    while i > 0 {
        i -= 1;
        if items[i].is_null() {
            items.remove(i);
        } else if !matches!(items[i], Item::List(_)) {
            break;
        }
    }
}

/// A parsed Maven version.
#[derive(Clone, Debug)]
pub struct MavenVersion {
    raw: String,
    items: Item,
}

impl MavenVersion {
    pub fn parse(version: &str) -> Self {
        let raw = version.to_string();
        let lowered = version.to_lowercase();
        let chars: Vec<(usize, char)> = lowered.char_indices().collect();

        // Each open list is a Vec on the stack; closing one pushes it into
        // its parent as an `Item::List`.
        let mut stack: Vec<Vec<Item>> = vec![Vec::new()];
        let mut is_digit = false;
        let mut start = 0usize;

        fn open_list(stack: &mut Vec<Vec<Item>>) {
            stack.push(Vec::new());
        }

        for &(i, c) in &chars {
            let Some(list) = stack.last_mut() else {
                break;
            };
            if c == '.' {
                if i == start {
                    list.push(Item::int("0"));
                } else {
                    list.push(Item::parse(is_digit, &lowered[start..i]));
                }
                start = i + 1;
            } else if c == '-' {
                if i == start {
                    list.push(Item::int("0"));
                } else {
                    list.push(Item::parse(is_digit, &lowered[start..i]));
                }
                start = i + 1;
                open_list(&mut stack);
            } else if c.is_ascii_digit() {
                if !is_digit && i > start {
                    list.push(Item::string(&lowered[start..i], true));
                    start = i;
                    open_list(&mut stack);
                }
                is_digit = true;
            } else {
                if is_digit && i > start {
                    list.push(Item::parse(true, &lowered[start..i]));
                    start = i;
                    open_list(&mut stack);
                }
                is_digit = false;
            }
        }

        if lowered.len() > start {
            if let Some(list) = stack.last_mut() {
                list.push(Item::parse(is_digit, &lowered[start..]));
            }
        }

        let mut root = Vec::new();
        while let Some(mut list) = stack.pop() {
            normalize(&mut list);
            match stack.last_mut() {
                Some(parent) => parent.push(Item::List(list)),
                None => root = list,
            }
        }

        Self {
            raw,
            items: Item::List(root),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Normalized spelling; equal versions share one canonical form.
    pub fn canonical(&self) -> String {
        let mut out = String::new();
        if let Item::List(items) = &self.items {
            write_list(&mut out, items);
        }
        out
    }
}

fn write_list(out: &mut String, items: &[Item]) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(if matches!(item, Item::List(_)) { '-' } else { '.' });
        }
        match item {
            Item::Int(digits) if digits.is_empty() => out.push('0'),
            Item::Int(digits) => out.push_str(digits),
            Item::Str(value) => out.push_str(value),
            Item::List(nested) => write_list(out, nested),
        }
    }
}

impl PartialEq for MavenVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MavenVersion {}

impl PartialOrd for MavenVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MavenVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.items.compare(Some(&other.items))
    }
}

impl fmt::Display for MavenVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Compare two version strings under Maven ordering.
pub fn compare(a: &str, b: &str) -> Ordering {
    MavenVersion::parse(a).cmp(&MavenVersion::parse(b))
}

/// Canonical form of a version string.
pub fn canonical(version: &str) -> String {
    MavenVersion::parse(version).canonical()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_order(ascending: &[&str]) {
        for (i, lower) in ascending.iter().enumerate() {
            for higher in &ascending[i + 1..] {
                assert_eq!(compare(lower, higher), Ordering::Less, "{lower} < {higher}");
                assert_eq!(compare(higher, lower), Ordering::Greater, "{higher} > {lower}");
            }
        }
    }

    #[test]
    fn test_numeric_segments() {
        assert_order(&["1", "1.1", "1.2", "1.9", "1.10", "2", "10"]);
    }

    #[test]
    fn test_qualifier_order() {
        assert_order(&[
            "1-alpha-1",
            "1-alpha-2",
            "1-beta-1",
            "1-milestone-1",
            "1-rc-1",
            "1-snapshot",
            "1",
            "1-sp",
            "1-abc",
            "1-xyz",
            "1-1",
            "1.1",
        ]);
    }

    #[test]
    fn test_equal_spellings() {
        for (a, b) in [
            ("1", "1.0"),
            ("1", "1.0.0"),
            ("1.0", "1-ga"),
            ("1.0", "1.0.0.final"),
            ("1.0", "1.0-RELEASE"),
            ("1-cr1", "1-rc1"),
            ("1a1", "1-alpha-1"),
            ("1.0.0-SNAPSHOT", "1-snapshot"),
            ("01.002", "1.2"),
        ] {
            assert_eq!(compare(a, b), Ordering::Equal, "{a} == {b}");
            assert_eq!(canonical(a), canonical(b), "canonical {a} / {b}");
        }
    }

    #[test]
    fn test_large_numbers() {
        assert_order(&["20030203.000550", "20030203.000551", "99999999999999999999"]);
    }

    #[test]
    fn test_sort_is_stable_and_total() {
        let mut versions = vec!["1.2.0", "1.0.0", "1.1.0", "1.0.0-rc1", "1.10", "1.0.0-SNAPSHOT"];
        versions.sort_by(|a, b| compare(a, b));
        assert_eq!(
            versions,
            vec!["1.0.0-rc1", "1.0.0-SNAPSHOT", "1.0.0", "1.1.0", "1.2.0", "1.10"]
        );
    }

    #[test]
    fn test_canonical_form() {
        assert_eq!(canonical("1.0.0"), "1");
        assert_eq!(canonical("1.2-SNAPSHOT"), "1.2-snapshot");
        assert_eq!(canonical("1a1"), "1-alpha-1");
    }
}
