use crate::{Result, Row, Value};
use rusqlite::types::ValueRef;

pub(super) fn fetch_rows(
    statement: &mut rusqlite::Statement<'_>,
    params: &[Value],
) -> Result<Vec<Row>> {
    let columns: Vec<String> = statement
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();

    let mut rows = statement.query(rusqlite::params_from_iter(params.iter()))?;
    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        let mut data_vector = Vec::with_capacity(columns.len());
        for i in 0..columns.len() {
            data_vector.push(match row.get_ref(i)? {
                ValueRef::Null => Value::NULL,
                ValueRef::Integer(v) => Value::Int(v),
                ValueRef::Real(v) => Value::Float(v),
                ValueRef::Text(v) => Value::String(String::from_utf8(v.to_vec())?),
                ValueRef::Blob(v) => Value::Bytes(v.to_vec()),
            });
        }

        result.push(Row::new(columns.clone(), data_vector));
    }

    Ok(result)
}
