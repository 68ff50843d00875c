use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Jsonb;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::Write;

/// Open key/value document stored in a `JSONB` column (`metadata`, `config`).
///
/// Only JSON objects are accepted, both on the wire and when reading rows back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[serde(transparent)]
#[diesel(sql_type = Jsonb)]
pub struct JsonRecord(pub Map<String, Value>);

impl JsonRecord {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }
}

impl From<Map<String, Value>> for JsonRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromSql<Jsonb, Pg> for JsonRecord {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match <Value as FromSql<Jsonb, Pg>>::from_sql(bytes)? {
            Value::Object(map) => Ok(Self(map)),
            other => Err(format!("expected a JSON object, found {other}").into()),
        }
    }
}

impl ToSql<Jsonb, Pg> for JsonRecord {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        // jsonb binary format version
        out.write_all(&[1])?;
        serde_json::to_writer(out, &self.0)?;
        Ok(IsNull::No)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accepts_objects() {
        let record: JsonRecord =
            serde_json::from_str(r#"{"firmware": "1.2.0", "slots": [1, 2]}"#).unwrap();
        assert_eq!(record.get("firmware"), Some(&Value::from("1.2.0")));
        assert!(record.get("slots").unwrap().is_array());
    }

    #[test]
    fn test_record_rejects_non_objects() {
        assert!(serde_json::from_str::<JsonRecord>("[1, 2, 3]").is_err());
        assert!(serde_json::from_str::<JsonRecord>(r#""text""#).is_err());
        assert!(serde_json::from_str::<JsonRecord>("null").is_err());
    }

    #[test]
    fn test_record_serializes_as_plain_object() {
        let mut record = JsonRecord::default();
        record.insert("zone", Value::from("north"));
        assert_eq!(serde_json::to_string(&record).unwrap(), r#"{"zone":"north"}"#);
    }
}
