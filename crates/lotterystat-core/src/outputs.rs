use std::io::Write;

use serde::Serialize;

use crate::error::Result;

/// Writes `rows` as CSV with a header derived from the row type.
pub fn write_csv<W, T>(writer: W, rows: &[T]) -> Result<()>
where
    W: Write,
    T: Serialize,
{
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_json<W, T>(writer: W, value: &T) -> Result<()>
where
    W: Write,
    T: Serialize + ?Sized,
{
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use lotterystat_parser::FrequencyEntry;

    use super::*;
    use crate::frequency::PairCount;

    #[test]
    fn frequency_csv_has_value_and_count_columns() {
        let entries = [
            FrequencyEntry { value: 1, count: 4 },
            FrequencyEntry { value: 2, count: 0 },
        ];
        let mut buffer = Vec::new();
        write_csv(&mut buffer, &entries).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "value,count\n1,4\n2,0\n");
    }

    #[test]
    fn pair_counts_serialize_to_json() {
        let pairs = [PairCount {
            pair: [3, 17],
            count: 2,
        }];
        let mut buffer = Vec::new();
        write_json(&mut buffer, &pairs[..]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value[0]["pair"][1], 17);
        assert_eq!(value[0]["count"], 2);
    }
}
