use crate::migrate::{Comparator, NumericAwareComparator};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Names of the history table and its columns.
#[derive(Clone, Debug)]
pub struct TableMetadataStorageConfiguration {
    table_name: String,
    version_column_name: String,
    version_column_length: usize,
    executed_at_column_name: String,
    execution_time_column_name: String,
}

impl TableMetadataStorageConfiguration {
    pub fn new() -> Self {
        Self {
            table_name: "migration_versions".to_string(),
            version_column_name: "version".to_string(),
            version_column_length: 191,
            executed_at_column_name: "executed_at".to_string(),
            execution_time_column_name: "execution_time".to_string(),
        }
    }

    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    pub fn with_version_column_name(mut self, column_name: impl Into<String>) -> Self {
        self.version_column_name = column_name.into();
        self
    }

    pub fn with_version_column_length(mut self, length: usize) -> Self {
        self.version_column_length = length;
        self
    }

    pub fn with_executed_at_column_name(mut self, column_name: impl Into<String>) -> Self {
        self.executed_at_column_name = column_name.into();
        self
    }

    pub fn with_execution_time_column_name(mut self, column_name: impl Into<String>) -> Self {
        self.execution_time_column_name = column_name.into();
        self
    }

    pub fn get_table_name(&self) -> &str {
        &self.table_name
    }

    pub fn get_version_column_name(&self) -> &str {
        &self.version_column_name
    }

    pub fn get_version_column_length(&self) -> usize {
        self.version_column_length
    }

    pub fn get_executed_at_column_name(&self) -> &str {
        &self.executed_at_column_name
    }

    pub fn get_execution_time_column_name(&self) -> &str {
        &self.execution_time_column_name
    }
}

impl Default for TableMetadataStorageConfiguration {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Configuration {
    comparator: Arc<dyn Comparator>,
    all_or_nothing: bool,
    time_all_queries: bool,
    metadata_storage_configuration: TableMetadataStorageConfiguration,
}

impl Configuration {
    pub fn new() -> Self {
        Self {
            comparator: Arc::new(NumericAwareComparator),
            all_or_nothing: false,
            time_all_queries: false,
            metadata_storage_configuration: TableMetadataStorageConfiguration::default(),
        }
    }

    pub fn set_comparator(mut self, comparator: Arc<dyn Comparator>) -> Self {
        self.comparator = comparator;
        self
    }

    pub fn get_comparator(&self) -> &dyn Comparator {
        self.comparator.as_ref()
    }

    pub fn set_all_or_nothing(mut self, all_or_nothing: bool) -> Self {
        self.all_or_nothing = all_or_nothing;
        self
    }

    pub fn is_all_or_nothing(&self) -> bool {
        self.all_or_nothing
    }

    pub fn set_time_all_queries(mut self, time_all_queries: bool) -> Self {
        self.time_all_queries = time_all_queries;
        self
    }

    pub fn is_time_all_queries(&self) -> bool {
        self.time_all_queries
    }

    pub fn set_metadata_storage_configuration(
        mut self,
        configuration: TableMetadataStorageConfiguration,
    ) -> Self {
        self.metadata_storage_configuration = configuration;
        self
    }

    pub fn get_metadata_storage_configuration(&self) -> &TableMetadataStorageConfiguration {
        &self.metadata_storage_configuration
    }
}

impl Debug for Configuration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Configuration")
            .field("all_or_nothing", &self.all_or_nothing)
            .field("time_all_queries", &self.time_all_queries)
            .field(
                "metadata_storage_configuration",
                &self.metadata_storage_configuration,
            )
            .finish_non_exhaustive()
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration::new()
    }
}
