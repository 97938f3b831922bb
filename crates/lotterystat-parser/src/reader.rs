use std::io::Read;

use csv::{ByteRecord, ErrorKind, ReaderBuilder};

use crate::errors::{ExtractError, LineError};
use crate::model::RawRecord;

/// Pulls raw rows out of a CSV byte stream.
///
/// The first row is always consumed as the header and never yielded. Rows are
/// numbered from 2. Malformed rows are yielded with a [`LineError`] attached;
/// only a failure of the underlying reader ends iteration with an error.
pub struct RecordReader<R> {
    reader: csv::Reader<R>,
    record: ByteRecord,
    expected_fields: Option<usize>,
    line: u64,
    header_read: bool,
    finished: bool,
}

impl<R: Read> RecordReader<R> {
    pub fn new(source: R) -> Self {
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(source);
        Self {
            reader,
            record: ByteRecord::new(),
            expected_fields: None,
            line: 0,
            header_read: false,
            finished: false,
        }
    }

    /// Require every data row to have exactly `count` fields instead of
    /// however many the header has.
    pub fn expect_fields(mut self, count: usize) -> Self {
        self.expected_fields = Some(count);
        self
    }

    /// Line number of the most recently read row (1 is the header).
    pub fn line(&self) -> u64 {
        self.line
    }

    fn read_header(&mut self) -> Result<bool, ExtractError> {
        self.header_read = true;
        let found = self
            .reader
            .read_byte_record(&mut self.record)
            .map_err(|source| ExtractError::Header { source })?;
        if !found {
            return Ok(false);
        }
        self.line = 1;
        if self.expected_fields.is_none() {
            self.expected_fields = Some(self.record.len());
        }
        Ok(true)
    }

    fn to_raw_record(&self) -> RawRecord {
        let line = self.line;
        let mut fields = Vec::with_capacity(self.record.len());
        let mut error = None;

        for (idx, bytes) in self.record.iter().enumerate() {
            match std::str::from_utf8(bytes) {
                Ok(text) => fields.push(text.to_string()),
                Err(_) => {
                    fields.push(String::from_utf8_lossy(bytes).into_owned());
                    if error.is_none() {
                        error = Some(LineError::Encoding { line, field: idx });
                    }
                }
            }
        }

        if error.is_none() {
            if let Some(expected) = self.expected_fields {
                if fields.len() != expected {
                    error = Some(LineError::FieldCount {
                        line,
                        expected,
                        found: fields.len(),
                    });
                }
            }
        }

        RawRecord {
            fields,
            line,
            error,
        }
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<RawRecord, ExtractError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        if !self.header_read {
            match self.read_header() {
                Ok(true) => {}
                Ok(false) => {
                    self.finished = true;
                    return None;
                }
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err));
                }
            }
        }

        self.line += 1;
        match self.reader.read_byte_record(&mut self.record) {
            Ok(true) => Some(Ok(self.to_raw_record())),
            Ok(false) => {
                self.finished = true;
                None
            }
            Err(err) if matches!(err.kind(), ErrorKind::Io(_)) => {
                self.finished = true;
                Some(Err(ExtractError::Read {
                    line: self.line,
                    source: err,
                }))
            }
            Err(err) => Some(Ok(RawRecord {
                fields: Vec::new(),
                line: self.line,
                error: Some(LineError::Malformed {
                    line: self.line,
                    message: err.to_string(),
                }),
            })),
        }
    }
}

/// Reads every record of `source` eagerly. Stops at the first fatal error.
pub fn extract_all<R: Read>(source: R) -> Result<Vec<RawRecord>, ExtractError> {
    RecordReader::new(source).collect()
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor};

    use super::*;

    const HEADER: &str = "DrawDate,Ball 1,Ball 2,Ball 3,Ball 4,Ball 5,Ball 6,Bonus Ball,Ball Set,Machine,DrawNumber\n";

    #[test]
    fn skips_header_and_numbers_lines_from_two() {
        let input = format!(
            "{HEADER}18-Feb-2026,1,11,12,13,18,49,33,L10,Lotto4,3147\n14-Feb-2026,3,4,5,6,7,8,9,L9,Lotto3,3146\n"
        );
        let records = extract_all(Cursor::new(input)).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].line, 2);
        assert_eq!(records[1].line, 3);
        assert_eq!(records[0].fields[0], "18-Feb-2026");
        assert!(records.iter().all(|r| r.error.is_none()));
    }

    #[test]
    fn empty_stream_and_header_only_yield_nothing() {
        assert!(extract_all(Cursor::new("")).unwrap().is_empty());
        assert!(extract_all(Cursor::new(HEADER)).unwrap().is_empty());
    }

    #[test]
    fn short_row_is_tagged_and_extraction_continues() {
        let input = format!(
            "{HEADER}18-Feb-2026,1,11,12,13,18,49,33,L10,3147\n14-Feb-2026,3,4,5,6,7,8,9,L9,Lotto3,3146\n"
        );
        let records = extract_all(Cursor::new(input)).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].error,
            Some(LineError::FieldCount {
                line: 2,
                expected: 11,
                found: 10
            })
        );
        assert_eq!(records[0].fields.len(), 10);
        assert!(records[1].error.is_none());
    }

    #[test]
    fn explicit_field_count_overrides_header() {
        let input = "a,b,c\n1,2,3\n1,2,3,4\n";
        let records: Vec<_> = RecordReader::new(Cursor::new(input))
            .expect_fields(4)
            .collect::<Result<_, _>>()
            .unwrap();
        assert!(matches!(
            records[0].error,
            Some(LineError::FieldCount { expected: 4, found: 3, .. })
        ));
        assert!(records[1].error.is_none());
    }

    #[test]
    fn invalid_utf8_is_a_line_error() {
        let mut input = b"a,b\n".to_vec();
        input.extend_from_slice(b"ok,\xff\xfe\n");
        input.extend_from_slice(b"x,y\n");
        let records = extract_all(Cursor::new(input)).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].error,
            Some(LineError::Encoding { line: 2, field: 1 })
        );
        assert_eq!(records[0].fields[0], "ok");
        assert!(records[1].error.is_none());
    }

    struct FailingReader {
        served: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.served {
                return Err(io::Error::new(io::ErrorKind::Other, "disk gone"));
            }
            self.served = true;
            let chunk = b"a,b\n1,2\n";
            buf[..chunk.len()].copy_from_slice(chunk);
            Ok(chunk.len())
        }
    }

    #[test]
    fn reader_failure_is_fatal() {
        let mut reader = RecordReader::new(FailingReader { served: false });
        let first = reader.next().expect("first record").expect("not fatal");
        assert_eq!(first.fields, vec!["1", "2"]);
        assert!(matches!(reader.next(), Some(Err(ExtractError::Read { .. }))));
        assert!(reader.next().is_none());
    }
}
