//! JSON 行格式（较新的备份）
//!
//! 正文是一个 JSON 数组，每个元素形如：
//!
//! ```text
//! { "table": "messages", "values": { "uuid": "..", "timeSent": 1700000000000, .. } }
//! ```
//!
//! 表名与列名会被直接拼入 INSERT 语句，无法参数化，
//! 因此必须先校验：
//! - 表名只能来自固定白名单
//! - 列名只能由 ASCII 字母与下划线组成
//!
//! 数组元素逐个读取并执行，任一行校验失败即终止整个导入。

use std::fmt;
use std::io::Read;
use std::str::FromStr;

use rusqlite::types::Value;
use serde::de::{self, SeqAccess, Visitor};
use serde_json::{Map, Value as JsonValue};

use crate::error::{Ceb2TxtError, Result};
use crate::format::stream::{Utf8Reader, content_error};
use crate::store::Sink;

/// 允许导入的表
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Accounts,
    Conversations,
    Messages,
    PreKeys,
    SignedPreKeys,
    Sessions,
    Identities,
}

impl Table {
    pub const ALL: [Table; 7] = [
        Table::Accounts,
        Table::Conversations,
        Table::Messages,
        Table::PreKeys,
        Table::SignedPreKeys,
        Table::Sessions,
        Table::Identities,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Table::Accounts => "accounts",
            Table::Conversations => "conversations",
            Table::Messages => "messages",
            Table::PreKeys => "prekeys",
            Table::SignedPreKeys => "signed_prekeys",
            Table::Sessions => "sessions",
            Table::Identities => "identities",
        }
    }
}

impl FromStr for Table {
    type Err = Ceb2TxtError;

    fn from_str(s: &str) -> Result<Self> {
        Table::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Ceb2TxtError::UnsupportedTable(s.to_string()))
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 列名只允许 `[A-Za-z_]+`
pub fn is_valid_column(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphabetic() || b == b'_')
}

/// 校验通过的一行数据
#[derive(Debug, Clone, PartialEq)]
pub struct RowInsert {
    pub table: Table,
    pub columns: Vec<(String, Value)>,
}

impl RowInsert {
    /// 从 `{"table": .., "values": {..}}` 对象解析，键的顺序固定
    pub fn from_json(object: Map<String, JsonValue>) -> Result<Self> {
        let mut entries = object.into_iter();

        let table = match entries.next() {
            Some((key, JsonValue::String(name))) if key == "table" => name.parse::<Table>()?,
            Some((key, _)) if key == "table" => {
                return Err(malformed("table name is not a string"));
            }
            _ => return Err(malformed("expected key 'table'")),
        };

        let values = match entries.next() {
            Some((key, JsonValue::Object(values))) if key == "values" => values,
            Some((key, _)) if key == "values" => {
                return Err(malformed("'values' is not an object"));
            }
            _ => return Err(malformed("expected key 'values'")),
        };

        if let Some((key, _)) = entries.next() {
            return Err(malformed(&format!("unexpected key '{key}'")));
        }

        let mut columns = Vec::with_capacity(values.len());
        for (name, value) in values {
            if !is_valid_column(&name) {
                return Err(Ceb2TxtError::UnsupportedColumn(name));
            }
            let value = column_value(&name, value)?;
            columns.push((name, value));
        }

        Ok(Self { table, columns })
    }

    /// 生成参数化 INSERT 语句，表名与列名均已校验
    pub fn to_sql(&self) -> String {
        if self.columns.is_empty() {
            return format!("INSERT INTO {} DEFAULT VALUES", self.table);
        }

        let names: Vec<&str> = self.columns.iter().map(|(name, _)| name.as_str()).collect();
        let placeholders: Vec<String> = (1..=self.columns.len()).map(|i| format!("?{i}")).collect();

        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            names.join(", "),
            placeholders.join(", ")
        )
    }

    pub fn params(&self) -> Vec<Value> {
        self.columns.iter().map(|(_, value)| value.clone()).collect()
    }
}

fn column_value(name: &str, value: JsonValue) -> Result<Value> {
    match value {
        JsonValue::Null => Ok(Value::Null),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(Value::Integer(i));
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                    Ok(Value::Integer(f as i64))
                }
                _ => Err(malformed(&format!("column {name} is not an integer: {n}"))),
            }
        }
        JsonValue::String(s) => Ok(Value::Text(s)),
        JsonValue::Bool(b) => Ok(Value::Text(b.to_string())),
        JsonValue::Array(_) | JsonValue::Object(_) => {
            Err(malformed(&format!("column {name} holds a nested value")))
        }
    }
}

fn malformed(reason: &str) -> Ceb2TxtError {
    Ceb2TxtError::MalformedRow(reason.to_string())
}

/// 解析并逐行写入，返回写入的行数
///
/// 数组元素按出现顺序逐个读取并执行，不会预先读入整个文档；
/// 出错时其后的内容不再读取。
pub fn import_rows<R: Read, S: Sink>(reader: R, sink: &mut S) -> Result<usize> {
    let mut rows = RowImporter {
        sink,
        imported: 0,
        failure: None,
    };

    let mut json = serde_json::Deserializer::from_reader(Utf8Reader::new(reader));
    let outcome =
        de::Deserializer::deserialize_seq(&mut json, &mut rows).and_then(|()| json.end());

    if let Some(err) = rows.failure {
        return Err(err);
    }
    outcome.map_err(json_error)?;
    Ok(rows.imported)
}

fn json_error(err: serde_json::Error) -> Ceb2TxtError {
    if err.is_io() {
        content_error(err.into())
    } else {
        Ceb2TxtError::MalformedRow(err.to_string())
    }
}

/// 顶层数组的访问者，每取出一个元素就立即写入 sink
struct RowImporter<'a, S> {
    sink: &'a mut S,
    imported: usize,
    failure: Option<Ceb2TxtError>,
}

impl<S: Sink> RowImporter<'_, S> {
    fn import(&mut self, element: JsonValue) -> Result<()> {
        let JsonValue::Object(object) = element else {
            return Err(malformed("array element is not an object"));
        };

        let row = RowInsert::from_json(object)?;
        self.sink.execute(&row.to_sql(), &row.params())?;
        self.imported += 1;
        Ok(())
    }
}

impl<'de, S: Sink> Visitor<'de> for &mut RowImporter<'_, S> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("backup to begin with an array of rows")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<(), A::Error> {
        while let Some(element) = seq.next_element::<JsonValue>()? {
            if let Err(err) = self.import(element) {
                self.failure = Some(err);
                return Err(de::Error::custom("row rejected"));
            }
        }
        Ok(())
    }
}
