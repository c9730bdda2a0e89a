//! JSON record list codec

use crate::codec::{Decoded, Layout, PayloadCodec};
use crate::error::{RedactError, Result};
use crate::kind::{Payload, PayloadKind};
use crate::table::{Cell, Column, TabularModel};
use ahash::AHashMap;
use bytes::Bytes;
use serde_json::{Deserializer, Map, Number, Value};

/// Outer shape of a record list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordContainer {
    /// `[ {...}, {...} ]`
    JsonArray,
    /// One object per line (a lone object is the one-line case)
    Ndjson,
}

/// Codec for flat JSON records
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordListCodec;

impl PayloadCodec for RecordListCodec {
    fn kind(&self) -> PayloadKind {
        PayloadKind::RecordList
    }

    fn decode(&self, payload: &Payload) -> Result<Decoded> {
        let Payload::RecordList { data } = payload else {
            return Err(RedactError::internal(format!(
                "record list codec handed a {} payload",
                payload.kind()
            )));
        };

        let (records, container) = parse_records(data)?;
        let model = records_to_model(&records)?;

        Ok(Decoded {
            model,
            layout: Layout::RecordList { container },
        })
    }

    fn encode(&self, model: &TabularModel, layout: &Layout) -> Result<Bytes> {
        let Layout::RecordList { container } = layout else {
            return Err(RedactError::internal(
                "record list codec handed a non-record layout",
            ));
        };

        let mut out = Vec::new();
        if *container == RecordContainer::JsonArray {
            out.push(b'[');
        }
        for row in 0..model.row_count() {
            let record = row_to_record(model, row);
            match container {
                RecordContainer::JsonArray => {
                    if row > 0 {
                        out.push(b',');
                    }
                    serde_json::to_writer(&mut out, &record).map_err(RedactError::internal)?;
                }
                RecordContainer::Ndjson => {
                    serde_json::to_writer(&mut out, &record).map_err(RedactError::internal)?;
                    out.push(b'\n');
                }
            }
        }
        if *container == RecordContainer::JsonArray {
            out.push(b']');
        }

        Ok(Bytes::from(out))
    }
}

fn malformed(reason: impl std::fmt::Display) -> RedactError {
    RedactError::malformed(PayloadKind::RecordList, reason)
}

/// Split the payload into objects and remember the container shape.
fn parse_records(data: &[u8]) -> Result<(Vec<Map<String, Value>>, RecordContainer)> {
    let values = Deserializer::from_slice(data)
        .into_iter::<Value>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(malformed)?;

    let mut values = values;
    let (items, container) = match values.as_slice() {
        [Value::Array(_)] => match values.pop() {
            Some(Value::Array(items)) => (items, RecordContainer::JsonArray),
            _ => (Vec::new(), RecordContainer::JsonArray),
        },
        _ => (values, RecordContainer::Ndjson),
    };

    let records = items
        .into_iter()
        .enumerate()
        .map(|(index, value)| match value {
            Value::Object(map) => Ok(map),
            other => Err(malformed(format!(
                "record {} is {}, expected an object",
                index,
                json_type_name(&other)
            ))),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok((records, container))
}

fn records_to_model(records: &[Map<String, Value>]) -> Result<TabularModel> {
    let row_count = records.len();
    let mut index_of: AHashMap<&str, usize> = AHashMap::new();
    let mut columns: Vec<(&str, Vec<Cell>)> = Vec::new();

    for (row, record) in records.iter().enumerate() {
        for (key, value) in record {
            let column = match index_of.get(key.as_str()) {
                Some(&i) => i,
                None => {
                    columns.push((key.as_str(), vec![Cell::Null; row_count]));
                    index_of.insert(key.as_str(), columns.len() - 1);
                    columns.len() - 1
                }
            };
            columns[column].1[row] = cell_from_json(key, row, value)?;
        }
    }

    let columns = columns
        .into_iter()
        .map(|(name, cells)| Column::new(name, cells))
        .collect();
    TabularModel::new(columns, row_count).map_err(malformed)
}

fn cell_from_json(key: &str, row: usize, value: &Value) -> Result<Cell> {
    Ok(match value {
        Value::Null => Cell::Null,
        Value::Bool(b) => Cell::Bool(*b),
        Value::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(i), _) => Cell::Int(i),
            (None, Some(u)) => Cell::UInt(u),
            (None, None) => Cell::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => Cell::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => {
            return Err(malformed(format!(
                "field '{}' in record {} holds a nested {}",
                key,
                row,
                json_type_name(value)
            )))
        }
    })
}

fn cell_to_json(cell: &Cell) -> Value {
    match cell {
        Cell::Null => Value::Null,
        Cell::Bool(b) => Value::Bool(*b),
        Cell::Int(i) => Value::Number((*i).into()),
        Cell::UInt(u) => Value::Number((*u).into()),
        Cell::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        Cell::Text(s) => Value::String(s.clone()),
    }
}

fn row_to_record(model: &TabularModel, row: usize) -> Map<String, Value> {
    model
        .columns()
        .iter()
        .map(|column| (column.name().to_string(), cell_to_json(&column.cells()[row])))
        .collect()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
