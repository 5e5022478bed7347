use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use version_compare::Cmp;

const ZERO: &str = "0";

/// Opaque identifier of a migration.
///
/// Two versions are equal when their identifiers are equal. There is no
/// intrinsic ordering: versions are always ordered through a [`Comparator`].
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Version(Arc<str>);

impl Version {
    pub fn new<S: AsRef<str>>(version: S) -> Self {
        Self(Arc::from(version.as_ref()))
    }

    /// The "no version" sentinel: the state of a database where nothing has
    /// been executed yet.
    pub fn zero() -> Self {
        Self::new(ZERO)
    }

    pub fn is_zero(&self) -> bool {
        self.0.as_ref() == ZERO
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Version {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Version {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Version {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl PartialEq<&str> for Version {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// Ordering strategy between versions.
pub trait Comparator: Send + Sync {
    fn compare(&self, a: &Version, b: &Version) -> Ordering;
}

/// Plain byte-wise comparison of the identifiers.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlphabeticalComparator;

impl Comparator for AlphabeticalComparator {
    fn compare(&self, a: &Version, b: &Version) -> Ordering {
        a.as_str().cmp(b.as_str())
    }
}

/// Compares numeric parts as numbers ("9" < "10", "1.2.9" < "1.2.10").
///
/// Identifiers the version parser considers equal but which differ as strings
/// ("1.0" and "1") fall back to byte-wise order, so distinct versions never
/// compare as equal.
#[derive(Clone, Copy, Debug, Default)]
pub struct NumericAwareComparator;

impl Comparator for NumericAwareComparator {
    fn compare(&self, a: &Version, b: &Version) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }

        match version_compare::compare(a.as_str(), b.as_str()) {
            Ok(Cmp::Lt) => Ordering::Less,
            Ok(Cmp::Gt) => Ordering::Greater,
            _ => a.as_str().cmp(b.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_with_same_identifier_are_equal() {
        assert_eq!(Version::from("20240110204830"), Version::new("20240110204830"));
        assert_ne!(Version::from("1.0"), Version::from("1"));
        assert!(Version::zero().is_zero());
        assert!(!Version::from("00").is_zero());
    }

    #[test]
    fn numeric_aware_comparator_orders_numbers_naturally() {
        let comparator = NumericAwareComparator;
        let cmp = |a: &str, b: &str| comparator.compare(&a.into(), &b.into());

        assert_eq!(cmp("9", "10"), Ordering::Less);
        assert_eq!(cmp("1.2.10", "1.2.9"), Ordering::Greater);
        assert_eq!(cmp("20240110204830", "20240115002100"), Ordering::Less);
        assert_eq!(cmp("20240110204830", "20240110204830"), Ordering::Equal);
        assert_ne!(cmp("1.0", "1"), Ordering::Equal);
        assert_eq!(cmp("1.0", "1"), cmp("1", "1.0").reverse());
    }

    #[test]
    fn alphabetical_comparator_compares_bytes() {
        let comparator = AlphabeticalComparator;
        assert_eq!(
            comparator.compare(&"9".into(), &"10".into()),
            Ordering::Greater
        );
        assert_eq!(
            comparator.compare(&"a".into(), &"b".into()),
            Ordering::Less
        );
    }
}
