//! Fixture conformance for every payload kind

use std::fs;
use std::path::PathBuf;
use tabmask_codec::{
    read, write, Cell, CellType, CodecSet, ColumnarCodec, ColumnarOptions, Compression, Layout,
    Payload, PayloadKind, RecordContainer, RedactError,
};

fn fixture(name: &str) -> Vec<u8> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../testdata")
        .join(name);
    fs::read(path).expect("read fixture")
}

#[test]
fn students_csv_decodes_with_quotes_kept_verbatim() {
    let model = read(&Payload::text(fixture("students.csv"))).expect("decode csv");

    assert_eq!(model.row_count(), 2);
    assert_eq!(
        model.column_names().collect::<Vec<_>>(),
        [
            "student_id",
            "name",
            "course",
            "cohort",
            "graduation_date",
            "email_address"
        ]
    );
    assert_eq!(
        model.column("student_id").unwrap().cells(),
        &[Cell::Int(1234), Cell::Int(1235)]
    );
    assert_eq!(
        model.column("name").unwrap().cells()[0],
        Cell::Text("'John Smith'".into())
    );
}

#[test]
fn students_csv_reencodes_byte_for_byte() {
    let raw = fixture("students.csv");
    let codecs = CodecSet::default();
    let decoded = codecs
        .codec_for(PayloadKind::Text)
        .unwrap()
        .decode(&Payload::text(raw.clone()))
        .unwrap();
    let out = codecs.write(&decoded.model, &decoded.layout).unwrap();
    assert_eq!(out.data().as_ref(), raw.as_slice());
}

#[test]
fn students_json_array_keeps_types_and_container() {
    let codecs = CodecSet::default();
    let decoded = codecs
        .codec_for(PayloadKind::RecordList)
        .unwrap()
        .decode(&Payload::record_list(fixture("students.json")))
        .unwrap();

    assert_eq!(
        decoded.layout,
        Layout::RecordList {
            container: RecordContainer::JsonArray
        }
    );
    let model = decoded.model;
    assert_eq!(model.column_count(), 7);
    assert_eq!(
        model.column("graduated").unwrap().declared_type(),
        Some(CellType::Bool)
    );
    assert_eq!(
        model.column("student_id").unwrap().declared_type(),
        Some(CellType::Int)
    );
}

#[test]
fn students_ndjson_keeps_nulls_and_floats() {
    let model = read(&Payload::record_list(fixture("students.ndjson"))).unwrap();
    assert_eq!(
        model.column("score").unwrap().cells(),
        &[Cell::Float(91.5), Cell::Float(78.25)]
    );
    assert_eq!(
        model.column("mentor").unwrap().cells(),
        &[Cell::Null, Cell::Text("Ada".into())]
    );
}

#[test]
fn conversion_through_every_kind_preserves_values() {
    let source = read(&Payload::record_list(fixture("students.ndjson"))).unwrap();

    for kind in PayloadKind::ALL {
        let payload = write(&source, kind).unwrap();
        let back = read(&payload).unwrap();
        assert_eq!(
            back.column_names().collect::<Vec<_>>(),
            source.column_names().collect::<Vec<_>>(),
            "column order through {kind}"
        );
        for column in source.columns() {
            assert_eq!(
                back.column(column.name()).unwrap().cells(),
                column.cells(),
                "column {} through {kind}",
                column.name()
            );
        }
    }
}

#[test]
fn fresh_columnar_layout_records_compression() {
    let model = read(&Payload::text(fixture("students.csv"))).unwrap();
    let codecs = CodecSet::standard(ColumnarOptions::default());

    let layout = Layout::fresh(PayloadKind::ColumnarBinary, b',', Compression::None);
    let payload = codecs.write(&model, &layout).unwrap();
    let info = ColumnarCodec::default().inspect(payload.data()).unwrap();
    assert_eq!(info.header.default_compressor, Compression::None.compressor_id());
    assert_eq!(read(&payload).unwrap(), model);
}

#[test]
fn error_classes_per_kind() {
    assert!(matches!(
        read(&Payload::text("")),
        Err(RedactError::EmptyInput(PayloadKind::Text))
    ));
    assert!(matches!(
        read(&Payload::text("student_id,name,course,cohort,graduation_date,email_address")),
        Err(RedactError::NoContent(PayloadKind::Text))
    ));
    assert!(matches!(
        read(&Payload::text_with_delimiter("a,b\n1,2", b';')),
        Err(RedactError::Delimiter { delimiter: ';' })
    ));
    assert!(matches!(
        read(&Payload::record_list("{\"a\":")),
        Err(RedactError::MalformedInput {
            kind: PayloadKind::RecordList,
            ..
        })
    ));
    assert!(matches!(
        read(&Payload::columnar(&b"not a container"[..])),
        Err(RedactError::MalformedInput {
            kind: PayloadKind::ColumnarBinary,
            ..
        })
    ));
}

#[test]
fn error_messages_match_log_text() {
    assert_eq!(
        RedactError::FieldNotFound("location".into()).to_string(),
        "pii field \"location\" not found in file"
    );
    assert_eq!(
        RedactError::EmptyInput(PayloadKind::Text).to_string(),
        "text payload is blank"
    );
    assert_eq!(
        RedactError::NoContent(PayloadKind::Text).to_string(),
        "text payload has no content"
    );
}
