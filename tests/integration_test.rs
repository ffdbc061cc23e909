//! Integration tests for flatstream

use std::io::Write;

use flatstream::types::FieldValue;
use flatstream::{CsvReader, Dialect, NdjsonReader};
use tempfile::NamedTempFile;

fn write_file(contents: &str) -> NamedTempFile {
    let mut temp = NamedTempFile::new().unwrap();
    temp.write_all(contents.as_bytes()).unwrap();
    temp.flush().unwrap();
    temp
}

#[test]
fn test_csv_file_roundtrip() {
    let temp = write_file("Name,Age,City\nAlice,30,NYC\nBob,25,SF\n");

    let mut reader = CsvReader::open(temp.path()).unwrap().has_header(true);
    let records: Vec<_> = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    assert_eq!(
        reader.headers(),
        Some(&["Name".to_string(), "Age".to_string(), "City".to_string()][..])
    );
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].to_strings(), vec!["Alice", "30", "NYC"]);
    assert_eq!(records[1].to_strings(), vec!["Bob", "25", "SF"]);
}

#[test]
fn test_csv_typed_columns() {
    let temp = write_file("Alice,30,1234.56,true\n");

    let mut reader = CsvReader::open(temp.path()).unwrap();
    let record = reader.read_record().unwrap().unwrap();

    assert_eq!(record.get_str(0).unwrap(), Some("Alice"));
    assert_eq!(record.get_i64(1).unwrap(), Some(30));
    assert_eq!(record.get_f64(2).unwrap(), Some(1234.56));
    assert_eq!(record.get_bool(3).unwrap(), Some(true));
}

#[test]
fn test_csv_full_dialect() {
    // Semicolon-delimited with backslash escapes, null sentinel, comment
    // lines, and array fields
    let temp = write_file(
        "# exported 2024-01-05\n\
         id;tags;note\n\
         1;[red|green|blue];fo\\;o\n\
         2;[];NULL\n",
    );

    let dialect = Dialect::builder()
        .delimiter(';')
        .escape('\\')
        .null_sequence("NULL")
        .comment('#')
        .array('[', '|', ']')
        .build()
        .unwrap();
    let mut reader = CsvReader::open(temp.path())
        .unwrap()
        .dialect(dialect)
        .has_header(true);

    let first = reader.read_record().unwrap().unwrap();
    assert_eq!(
        reader.headers(),
        Some(&["id".to_string(), "tags".to_string(), "note".to_string()][..])
    );
    assert_eq!(first.get_str(0).unwrap(), Some("1"));
    let tags = first.get(1).unwrap().as_array().unwrap();
    assert_eq!(tags.len(), 3);
    assert_eq!(tags[0], FieldValue::Text("red".to_string()));
    assert_eq!(first.get_str(2).unwrap(), Some("fo;o"));

    let second = reader.read_record().unwrap().unwrap();
    assert_eq!(second.get(1).unwrap(), &FieldValue::Array(Vec::new()));
    assert!(second.get(2).unwrap().is_null());

    assert!(reader.read_record().unwrap().is_none());
}

#[test]
fn test_csv_quoted_multiline_fields() {
    let temp = write_file("\"line one\nline two\",b\n\"he said \"\"hi\"\"\",d\n");

    let mut reader = CsvReader::open(temp.path()).unwrap();
    let first = reader.read_record().unwrap().unwrap();
    assert_eq!(first.get_str(0).unwrap(), Some("line one\nline two"));

    let second = reader.read_record().unwrap().unwrap();
    assert_eq!(second.get_str(0).unwrap(), Some("he said \"hi\""));
}

#[test]
fn test_csv_large_dataset_streaming() {
    let num_records = 1000;
    let mut contents = String::from("ID,Value\n");
    for i in 0..num_records {
        contents.push_str(&format!("{},{}\n", i, i * 2));
    }
    let temp = write_file(&contents);

    let mut reader = CsvReader::open(temp.path()).unwrap().has_header(true);
    let count = reader.records().count();

    assert_eq!(count, num_records);
    assert_eq!(reader.record_count(), num_records as u64);
}

#[test]
fn test_tsv_file() {
    let temp = write_file("a\tb\tc\nd\te\tf\n");

    let mut reader = CsvReader::open(temp.path()).unwrap().dialect(Dialect::tsv());
    let records: Vec<_> = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].to_strings(), vec!["a", "b", "c"]);
}

#[test]
fn test_ndjson_file_roundtrip() {
    let temp = write_file(
        "{\"name\":\"Alice\",\"age\":30}\n\
         {\"age\":25,\"name\":\"Bob\",\"city\":\"SF\"}\n\
         {\"name\":null}\n",
    );

    let mut reader = NdjsonReader::open(temp.path()).unwrap();

    assert!(reader.read_record().unwrap());
    assert_eq!(reader.field_count(), 2);
    assert_eq!(reader.get_by_name("name").unwrap(), "Alice");
    assert_eq!(reader.get_i64(reader.ordinal("age").unwrap()).unwrap(), Some(30));

    // Ordinals are per-record: "age" moves to position 0 here
    assert!(reader.read_record().unwrap());
    assert_eq!(reader.field_count(), 3);
    assert_eq!(reader.ordinal("age").unwrap(), 0);
    assert_eq!(reader.get_by_name("city").unwrap(), "SF");

    assert!(reader.read_record().unwrap());
    assert!(reader.is_null(0).unwrap());

    assert!(!reader.read_record().unwrap());
    assert_eq!(reader.record_count(), 3);
}

#[test]
fn test_ndjson_large_dataset_streaming() {
    let num_records = 1000;
    let mut contents = String::new();
    for i in 0..num_records {
        contents.push_str(&format!("{{\"id\":{},\"double\":{}}}\n", i, i * 2));
    }
    let temp = write_file(&contents);

    let mut reader = NdjsonReader::open(temp.path()).unwrap();
    let mut count = 0;
    while reader.read_record().unwrap() {
        assert_eq!(
            reader.get_i64(1).unwrap().unwrap(),
            reader.get_i64(0).unwrap().unwrap() * 2
        );
        count += 1;
    }
    assert_eq!(count, num_records);
}

#[test]
fn test_csv_error_does_not_poison_stream() {
    let temp = write_file("good,1\n\"bad\"x,2\nrecovered,3\n");

    let mut reader = CsvReader::open(temp.path()).unwrap();
    assert_eq!(
        reader.read_record().unwrap().unwrap().to_strings(),
        vec!["good", "1"]
    );
    assert!(reader.read_record().is_err());
    assert_eq!(
        reader.read_record().unwrap().unwrap().to_strings(),
        vec!["recovered", "3"]
    );
}

#[test]
fn test_empty_fields() {
    let temp = write_file("a,,c\n,,\n");

    let mut reader = CsvReader::open(temp.path()).unwrap();
    let first = reader.read_record().unwrap().unwrap();
    assert_eq!(first.to_strings(), vec!["a", "", "c"]);

    let second = reader.read_record().unwrap().unwrap();
    assert_eq!(second.to_strings(), vec!["", "", ""]);
}
