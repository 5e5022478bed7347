use crate::Result;
use crate::error::Error;
use crate::migrate::metadata::ExecutedMigrationsList;
use crate::migrate::{MigrationPlanCalculator, Version};
use lazy_static::lazy_static;
use regex::Regex;
use std::cmp::Ordering;

const ALIAS_FIRST: &str = "first";
const ALIAS_CURRENT: &str = "current";
const ALIAS_PREV: &str = "prev";
const ALIAS_NEXT: &str = "next";
const ALIAS_LATEST: &str = "latest";

lazy_static! {
    static ref DELTA_ALIAS: Regex = Regex::new(r"^current([+-])(\d+)$").unwrap();
}

/// Translates symbolic versions (`first`, `current`, `prev`, `next`,
/// `latest`, `current+N`, `current-N`) into concrete versions.
pub struct AliasResolver<'c, 'a, S> {
    calculator: &'c MigrationPlanCalculator<'a, S>,
}

impl<'c, 'a, S> AliasResolver<'c, 'a, S> {
    pub fn new(calculator: &'c MigrationPlanCalculator<'a, S>) -> Self {
        Self { calculator }
    }

    /// Resolves `alias` against the catalog and the given history.
    ///
    /// `Ok(None)` means the alias is valid but points nowhere (e.g. `next`
    /// when already at the latest version, or a delta walking off the
    /// catalog). Unknown tokens fail with `UnknownMigrationVersion`.
    pub fn resolve_version_alias(
        &self,
        alias: &str,
        executed: &ExecutedMigrationsList,
    ) -> Result<Option<Version>> {
        let calculator = self.calculator;
        match alias {
            ALIAS_FIRST => Ok(Some(
                calculator
                    .get_migrations()?
                    .first()
                    .map(|m| m.version.clone())
                    .unwrap_or_else(Version::zero),
            )),
            ALIAS_CURRENT => Ok(Some(calculator.get_current_version(executed))),
            ALIAS_PREV => {
                let executed = calculator.get_executed_versions(executed);
                Ok(Some(match executed.len() {
                    0 | 1 => Version::zero(),
                    len => executed[len - 2].clone(),
                }))
            }
            ALIAS_NEXT => {
                let current = calculator.get_current_version(executed);
                Ok(calculator
                    .get_migrations()?
                    .iter()
                    .find(|m| calculator.compare(&m.version, &current) == Ordering::Greater)
                    .map(|m| m.version.clone()))
            }
            ALIAS_LATEST => Ok(Some(
                calculator
                    .get_migrations()?
                    .last()
                    .map(|m| m.version.clone())
                    .unwrap_or_else(Version::zero),
            )),
            _ => {
                let version = Version::from(alias);
                if version.is_zero() || calculator.get_migrations()?.has_migration(&version) {
                    return Ok(Some(version));
                }

                if let Some(captures) = DELTA_ALIAS.captures(alias) {
                    let Ok(steps) = captures[2].parse::<i64>() else {
                        return Ok(None);
                    };
                    let delta = if &captures[1] == "-" { -steps } else { steps };

                    return self.get_delta_version(delta, executed);
                }

                Err(Error::unknown_migration_version(alias))
            }
        }
    }

    /// Walks `delta` steps from the current version along the catalog.
    ///
    /// The zero version sits one step before the first migration.
    fn get_delta_version(
        &self,
        delta: i64,
        executed: &ExecutedMigrationsList,
    ) -> Result<Option<Version>> {
        let migrations = self.calculator.get_migrations()?.versions();
        let current = self.calculator.get_current_version(executed);

        let position = if current.is_zero() {
            -1
        } else {
            match migrations.iter().position(|v| v == &current) {
                Some(position) => position as i64,
                None => return Ok(None),
            }
        };

        let Some(target) = position.checked_add(delta) else {
            return Ok(None);
        };

        Ok(match target {
            -1 => Some(Version::zero()),
            t if t < -1 => None,
            t => migrations.get(t as usize).cloned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::migrate::metadata::ExecutedMigration;
    use crate::migrate::{InMemoryMigrationsRepository, NumericAwareComparator};
    use crate::tests::{TestSchema, repository};

    fn executed(versions: &[&str]) -> ExecutedMigrationsList {
        versions
            .iter()
            .map(|v| ExecutedMigration::new(Version::from(*v)))
            .collect()
    }

    fn resolve(
        calculator: &MigrationPlanCalculator<'_, TestSchema>,
        alias: &str,
        history: &[&str],
    ) -> Option<String> {
        AliasResolver::new(calculator)
            .resolve_version_alias(alias, &executed(history))
            .unwrap()
            .map(|v| v.to_string())
    }

    #[test]
    fn resolves_aliases_on_a_fresh_database() {
        let repository = repository(&["B", "C", "A"]);
        let calculator = MigrationPlanCalculator::new(&repository, &NumericAwareComparator);

        assert_eq!(resolve(&calculator, "first", &[]).as_deref(), Some("A"));
        assert_eq!(resolve(&calculator, "latest", &[]).as_deref(), Some("C"));
        assert_eq!(resolve(&calculator, "current", &[]).as_deref(), Some("0"));
        assert_eq!(resolve(&calculator, "prev", &[]).as_deref(), Some("0"));
        assert_eq!(resolve(&calculator, "next", &[]).as_deref(), Some("A"));
    }

    #[test]
    fn resolves_aliases_relative_to_the_current_version() {
        let repository = repository(&["1", "2", "3"]);
        let calculator = MigrationPlanCalculator::new(&repository, &NumericAwareComparator);
        let history = ["1", "2"];

        assert_eq!(resolve(&calculator, "current", &history).as_deref(), Some("2"));
        assert_eq!(resolve(&calculator, "prev", &history).as_deref(), Some("1"));
        assert_eq!(resolve(&calculator, "next", &history).as_deref(), Some("3"));
        assert_eq!(resolve(&calculator, "2", &history).as_deref(), Some("2"));
        assert_eq!(resolve(&calculator, "0", &history).as_deref(), Some("0"));
    }

    #[test]
    fn next_is_undefined_at_the_latest_version() {
        let repository = repository(&["1", "2"]);
        let calculator = MigrationPlanCalculator::new(&repository, &NumericAwareComparator);

        assert_eq!(resolve(&calculator, "next", &["1", "2"]), None);
        assert_eq!(resolve(&calculator, "prev", &["1"]).as_deref(), Some("0"));
    }

    #[test]
    fn resolves_delta_aliases() {
        let repository = repository(&["1", "2", "3", "4"]);
        let calculator = MigrationPlanCalculator::new(&repository, &NumericAwareComparator);
        let history = ["1", "2"];

        assert_eq!(resolve(&calculator, "current+1", &history).as_deref(), Some("3"));
        assert_eq!(resolve(&calculator, "current+2", &history).as_deref(), Some("4"));
        assert_eq!(resolve(&calculator, "current-1", &history).as_deref(), Some("1"));
        assert_eq!(resolve(&calculator, "current-2", &history).as_deref(), Some("0"));
        assert_eq!(resolve(&calculator, "current+0", &history).as_deref(), Some("2"));

        assert_eq!(resolve(&calculator, "current+3", &history), None);
        assert_eq!(resolve(&calculator, "current-3", &history), None);
        assert_eq!(resolve(&calculator, "current+99999999999999999999", &history), None);

        assert_eq!(resolve(&calculator, "current+1", &[]).as_deref(), Some("1"));
    }

    #[test]
    fn delta_from_an_unavailable_current_version_is_undefined() {
        let repository = repository(&["1", "2"]);
        let calculator = MigrationPlanCalculator::new(&repository, &NumericAwareComparator);

        assert_eq!(resolve(&calculator, "current-1", &["1", "7"]), None);
    }

    #[test]
    fn empty_catalog_resolves_to_zero() {
        let repository = InMemoryMigrationsRepository::<TestSchema>::new();
        let calculator = MigrationPlanCalculator::new(&repository, &NumericAwareComparator);

        assert_eq!(resolve(&calculator, "first", &[]).as_deref(), Some("0"));
        assert_eq!(resolve(&calculator, "latest", &[]).as_deref(), Some("0"));
        assert_eq!(resolve(&calculator, "next", &[]), None);
    }

    #[test]
    fn unknown_alias_fails() {
        let repository = repository(&["1"]);
        let calculator = MigrationPlanCalculator::new(&repository, &NumericAwareComparator);

        for alias in ["bogus-alias", "current+", "current*2", "2"] {
            let error = AliasResolver::new(&calculator)
                .resolve_version_alias(alias, &executed(&[]))
                .unwrap_err();
            assert_eq!(error.kind(), ErrorKind::UnknownMigrationVersion);
        }
    }
}
