use crate::error::Error;
use crate::{Result, Value};

pub enum ColumnIndex {
    Name(String),
    Position(usize),
}

impl From<usize> for ColumnIndex {
    fn from(i: usize) -> Self {
        Self::Position(i)
    }
}

impl From<&str> for ColumnIndex {
    fn from(s: &str) -> Self {
        Self::Name(s.to_string())
    }
}

/// A single row fetched through [`crate::Connection::fetch_all`].
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Gets a column by name or position.
    ///
    /// Column names are matched case-insensitively, as drivers may fold
    /// identifiers. A missing column raises an OutOfBoundsError.
    pub fn get<C: Into<ColumnIndex>>(&self, i: C) -> Result<&Value> {
        let i = match i.into() {
            ColumnIndex::Name(name) => self
                .columns
                .iter()
                .position(|column_name| column_name.eq_ignore_ascii_case(&name))
                .ok_or_else(|| Error::out_of_bounds(&name))?,
            ColumnIndex::Position(index) => index,
        };

        self.values.get(i).ok_or_else(|| Error::out_of_bounds(i))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::Row;
    use crate::Value;
    use crate::error::ErrorKind;

    #[test]
    fn can_read_columns_by_name_and_position() {
        let row = Row::new(
            vec!["version".to_string(), "execution_time".to_string()],
            vec![Value::from("20240101000000"), Value::Int(12)],
        );

        assert_eq!(row.get("VERSION").unwrap(), &Value::from("20240101000000"));
        assert_eq!(row.get(1).unwrap(), &Value::Int(12));
        assert_eq!(
            row.get("executed_at").unwrap_err().kind(),
            ErrorKind::OutOfBoundsError
        );
        assert_eq!(row.get(4).unwrap_err().kind(), ErrorKind::OutOfBoundsError);
    }
}
