use crate::migrate::{Direction, Version};
use itertools::Itertools;

/// Apply (or revert) one version.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PlanItem {
    pub version: Version,
    pub direction: Direction,
}

/// Ordered list of versions to execute, all in the same direction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExecutionPlan {
    items: Vec<PlanItem>,
    direction: Direction,
}

impl ExecutionPlan {
    /// Builds a plan keeping the given order. Repeated versions are only
    /// planned once, at their first position.
    pub fn new<I>(versions: I, direction: Direction) -> Self
    where
        I: IntoIterator<Item = Version>,
    {
        let items = versions
            .into_iter()
            .unique()
            .map(|version| PlanItem { version, direction })
            .collect();

        Self { items, direction }
    }

    pub fn empty(direction: Direction) -> Self {
        Self {
            items: vec![],
            direction,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn versions(&self) -> Vec<Version> {
        self.items.iter().map(|i| i.version.clone()).collect()
    }

    pub fn first(&self) -> Option<&PlanItem> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&PlanItem> {
        self.items.last()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlanItem> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a ExecutionPlan {
    type Item = &'a PlanItem;
    type IntoIter = std::slice::Iter<'a, PlanItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plans_each_version_once() {
        let plan = ExecutionPlan::new(
            ["2", "1", "2"].into_iter().map(Version::from),
            Direction::Down,
        );

        assert_eq!(plan.len(), 2);
        assert_eq!(plan.versions(), vec![Version::from("2"), Version::from("1")]);
        assert!(plan.iter().all(|item| item.direction == Direction::Down));
    }
}
