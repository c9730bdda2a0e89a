//! Delimited text codec

use crate::codec::{Decoded, Layout, PayloadCodec};
use crate::error::{RedactError, Result};
use crate::kind::{Payload, PayloadKind};
use crate::table::{Cell, Column, TabularModel};
use bytes::Bytes;
use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};

/// Codec for delimited text with a header line
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec;

impl PayloadCodec for TextCodec {
    fn kind(&self) -> PayloadKind {
        PayloadKind::Text
    }

    fn decode(&self, payload: &Payload) -> Result<Decoded> {
        let Payload::Text { data, delimiter } = payload else {
            return Err(RedactError::internal(format!(
                "text codec handed a {} payload",
                payload.kind()
            )));
        };
        let delimiter = *delimiter;

        if !data.contains(&delimiter) {
            return Err(RedactError::Delimiter {
                delimiter: delimiter as char,
            });
        }

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(false)
            .from_reader(data.as_ref());

        let headers = reader
            .headers()
            .map_err(|e| RedactError::malformed(PayloadKind::Text, e))?
            .clone();

        let mut columns: Vec<Vec<Cell>> = vec![Vec::new(); headers.len()];
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                RedactError::malformed(PayloadKind::Text, format!("row {}: {}", index + 1, e))
            })?;
            for (cells, field) in columns.iter_mut().zip(record.iter()) {
                cells.push(Cell::infer(field));
            }
        }

        let row_count = columns.first().map(Vec::len).unwrap_or(0);
        let columns = headers
            .iter()
            .zip(columns)
            .map(|(name, cells)| Column::new(name, cells))
            .collect();
        let model = TabularModel::new(columns, row_count)
            .map_err(|e| RedactError::malformed(PayloadKind::Text, e))?;

        Ok(Decoded {
            model,
            layout: Layout::Text { delimiter },
        })
    }

    fn encode(&self, model: &TabularModel, layout: &Layout) -> Result<Bytes> {
        let Layout::Text { delimiter } = layout else {
            return Err(RedactError::internal("text codec handed a non-text layout"));
        };

        let mut writer = WriterBuilder::new()
            .delimiter(*delimiter)
            .terminator(Terminator::Any(b'\n'))
            .quote_style(QuoteStyle::Necessary)
            .from_writer(Vec::new());

        writer
            .write_record(model.column_names())
            .map_err(RedactError::internal)?;

        let columns = model.columns();
        for row in 0..model.row_count() {
            writer
                .write_record(columns.iter().map(|c| c.cells()[row].render().into_owned()))
                .map_err(RedactError::internal)?;
        }

        let bytes = writer.into_inner().map_err(RedactError::internal)?;
        Ok(Bytes::from(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(text: &'static str) -> Result<TabularModel> {
        TextCodec.decode(&Payload::text(text)).map(|d| d.model)
    }

    #[test]
    fn test_decode_header_and_rows() {
        let model = decode(
            "student_id,name,course,cohort,graduation_date,email_address\n\
             1234,'John Smith','Software','August','2024-03-31','j.smith@email.com'",
        )
        .unwrap();

        assert_eq!(model.column_count(), 6);
        assert_eq!(model.row_count(), 1);
        assert_eq!(
            model.column("student_id").unwrap().cells(),
            &[Cell::Int(1234)]
        );
        assert_eq!(
            model.column("name").unwrap().cells(),
            &[Cell::Text("'John Smith'".into())]
        );
    }

    #[test]
    fn test_missing_delimiter() {
        match decode("name\nJohn") {
            Err(RedactError::Delimiter { delimiter }) => assert_eq!(delimiter, ','),
            other => panic!("expected Delimiter error, got {other:?}"),
        }
    }

    #[test]
    fn test_custom_delimiter() {
        let payload = Payload::text_with_delimiter("a;b\n1;x", b';');
        let decoded = TextCodec.decode(&payload).unwrap();
        assert_eq!(decoded.layout, Layout::Text { delimiter: b';' });
        assert_eq!(decoded.model.column("b").unwrap().cells(), &[Cell::Text("x".into())]);
    }

    #[test]
    fn test_ragged_rows_are_malformed() {
        assert!(matches!(
            decode("a,b\n1,2,3"),
            Err(RedactError::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_duplicate_header_is_malformed() {
        assert!(matches!(
            decode("a,a\n1,2"),
            Err(RedactError::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_blank_lines_skipped() {
        let model = decode("a,b\n\n1,2\n\n3,4\n").unwrap();
        assert_eq!(model.row_count(), 2);
    }

    #[test]
    fn test_encode_quotes_only_when_needed() {
        let model = decode("id,note\n1,\"hello, world\"\n2,plain\n3,\n").unwrap();
        let bytes = TextCodec
            .encode(&model, &Layout::Text { delimiter: b',' })
            .unwrap();
        assert_eq!(
            std::str::from_utf8(&bytes).unwrap(),
            "id,note\n1,\"hello, world\"\n2,plain\n3,\n"
        );
    }

    #[test]
    fn test_roundtrip_preserves_bytes_of_simple_input() {
        let input = "student_id,name,score,active\n1,John,1.5,true\n2,Joe,,false\n";
        let model = decode(input).unwrap();
        let bytes = TextCodec
            .encode(&model, &Layout::Text { delimiter: b',' })
            .unwrap();
        assert_eq!(std::str::from_utf8(&bytes).unwrap(), input);
    }
}
