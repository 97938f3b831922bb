use std::io::{self, Cursor, Read};

use anyhow::Result;
use lotterystat_core::db;
use lotterystat_core::frequency::ball_frequency;
use lotterystat_core::ingestion::{import_draws, ImportOptions, RecordStatus};
use lotterystat_core::parser::{Game, LineError, RecordError};
use lotterystat_core::persistence::{count_draws, list_all_draws};
use lotterystat_core::{Config, PipelineError};
use tokio_util::sync::CancellationToken;

fn fixture(name: &str) -> String {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../lotterystat-parser/tests/data")
        .join(name);
    std::fs::read_to_string(path).expect("read fixture")
}

fn options(workers: usize) -> ImportOptions {
    ImportOptions {
        workers,
        channel_capacity: 8,
        ..ImportOptions::default()
    }
}

#[tokio::test]
async fn imports_every_game_fixture() -> Result<()> {
    let pool = db::connect_in_memory().await?;
    let cases = [
        (Game::Lotto, "lotto.csv", 4),
        (Game::EuroMillions, "euromillions.csv", 3),
        (Game::SetForLife, "set_for_life.csv", 3),
        (Game::Thunderball, "thunderball.csv", 3),
    ];

    for (game, file, rows) in cases {
        let content = Cursor::new(fixture(file).into_bytes());
        let report = import_draws(&pool, content, game, &options(3), CancellationToken::new()).await?;
        assert_eq!(report.total, rows, "{file}");
        assert_eq!(report.inserted, rows, "{file}");
        assert!(report.records.is_empty(), "{file}: {:?}", report.records);
        assert_eq!(count_draws(&pool, game).await?, rows as u64);
    }

    let lotto = list_all_draws(&pool, Game::Lotto).await?;
    let newest = lotto.last().expect("lotto rows stored");
    assert_eq!(newest.draw_no, 3147);
    assert_eq!(newest.balls, vec![1, 11, 12, 13, 18, 49]);
    assert_eq!(newest.secondary, vec![33]);
    Ok(())
}

#[tokio::test]
async fn reimport_counts_duplicates_without_changing_rows() -> Result<()> {
    let pool = db::connect_in_memory().await?;
    let content = fixture("thunderball.csv");

    import_draws(
        &pool,
        Cursor::new(content.clone().into_bytes()),
        Game::Thunderball,
        &options(2),
        CancellationToken::new(),
    )
    .await?;
    let before = list_all_draws(&pool, Game::Thunderball).await?;

    let report = import_draws(
        &pool,
        Cursor::new(content.into_bytes()),
        Game::Thunderball,
        &options(2),
        CancellationToken::new(),
    )
    .await?;
    assert_eq!(report.inserted, 0);
    assert_eq!(report.duplicates, 3);
    assert!(report
        .records
        .iter()
        .all(|record| record.status == RecordStatus::Duplicate));
    assert_eq!(list_all_draws(&pool, Game::Thunderball).await?, before);
    Ok(())
}

#[tokio::test]
async fn bad_rows_are_reported_and_skipped() -> Result<()> {
    let pool = db::connect_in_memory().await?;
    let content = "\
DrawDate,Ball 1,Ball 2,Ball 3,Ball 4,Ball 5,Ball 6,Bonus Ball,Ball Set,Machine,DrawNumber
18-Feb-2026,1,11,12,13,18,49,33,L10,Lotto4,3147
18-Feb-2026,1,11,12,13,18,60,33,L10,Lotto4,3148
18-Feb-2026,1,11,12,13,18,49,33,L10,3149
18-Foo-2026,1,11,12,13,18,49,33,L10,Lotto4,3150
14-Feb-2026,5,9,22,31,40,58,17,L9,Lotto3,3146
18-Feb-2026,2,3,4,5,6,7,8,L10,Lotto4,3147
";

    let report = import_draws(
        &pool,
        Cursor::new(content.as_bytes().to_vec()),
        Game::Lotto,
        &options(4),
        CancellationToken::new(),
    )
    .await?;

    assert_eq!(report.total, 6);
    assert_eq!(report.decoded, 3);
    assert_eq!(report.inserted, 2);
    assert_eq!(report.decode_failures, 3);
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.persist_failures, 0);

    let failed_lines: Vec<(u64, RecordStatus)> = report
        .records
        .iter()
        .map(|record| (record.line, record.status))
        .collect();
    assert_eq!(
        failed_lines,
        vec![
            (3, RecordStatus::DecodeFailed),
            (4, RecordStatus::DecodeFailed),
            (5, RecordStatus::DecodeFailed),
            (7, RecordStatus::Duplicate),
        ]
    );
    assert!(report.records[0].message.contains("ball 6"));

    // The first occurrence of draw 3147 wins.
    let stored = list_all_draws(&pool, Game::Lotto).await?;
    assert_eq!(stored[1].balls, vec![1, 11, 12, 13, 18, 49]);
    Ok(())
}

const THUNDERBALL_SHAPED: &str = "\
DrawDate,Ball 1,Ball 2,Ball 3,Ball 4,Ball 5,Thunderball,Ball Set,Machine,DrawNumber
20-Feb-2026,2,17,25,33,39,14,T4,Excalibur 7,3880
";

#[tokio::test]
async fn wrong_width_rows_are_line_errors() -> Result<()> {
    let pool = db::connect_in_memory().await?;
    let report = import_draws(
        &pool,
        Cursor::new(THUNDERBALL_SHAPED.as_bytes().to_vec()),
        Game::Lotto,
        &options(2),
        CancellationToken::new(),
    )
    .await?;

    assert_eq!(report.decode_failures, 1);
    let record = &report.records[0];
    assert_eq!(record.line, 2);
    assert_eq!(record.status, RecordStatus::DecodeFailed);
    assert!(matches!(
        record.error,
        Some(RecordError::Line(LineError::FieldCount {
            line: 2,
            expected: 11,
            found: 10
        }))
    ));
    Ok(())
}

#[tokio::test]
async fn header_columns_mode_leaves_width_to_the_adapter() -> Result<()> {
    let pool = db::connect_in_memory().await?;
    let report = import_draws(
        &pool,
        Cursor::new(THUNDERBALL_SHAPED.as_bytes().to_vec()),
        Game::Lotto,
        &ImportOptions {
            header_columns: true,
            ..options(2)
        },
        CancellationToken::new(),
    )
    .await?;

    assert_eq!(report.decode_failures, 1);
    assert!(matches!(report.records[0].error, Some(RecordError::Draw(_))));
    Ok(())
}

#[tokio::test]
async fn cancelled_import_stores_nothing() -> Result<()> {
    let pool = db::connect_in_memory().await?;
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = import_draws(
        &pool,
        Cursor::new(fixture("lotto.csv").into_bytes()),
        Game::Lotto,
        &options(2),
        cancel,
    )
    .await?;
    assert!(report.cancelled);
    assert_eq!(report.total, 0);
    assert_eq!(count_draws(&pool, Game::Lotto).await?, 0);
    Ok(())
}

struct TruncatedStream {
    inner: Cursor<Vec<u8>>,
}

impl Read for TruncatedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.inner.read(buf)?;
        if read == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stream truncated"));
        }
        Ok(read)
    }
}

#[tokio::test]
async fn read_failure_aborts_import() -> Result<()> {
    let pool = db::connect_in_memory().await?;
    let stream = TruncatedStream {
        inner: Cursor::new(fixture("lotto.csv").into_bytes()),
    };

    let err = import_draws(&pool, stream, Game::Lotto, &options(2), CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Extraction(_)));
    assert_eq!(count_draws(&pool, Game::Lotto).await?, 0);
    Ok(())
}

#[tokio::test]
async fn imported_history_feeds_frequency() -> Result<()> {
    let pool = db::connect_in_memory().await?;
    let config = Config::from_toml_str("workers = 2\nchannel_capacity = 1\n")?;

    import_draws(
        &pool,
        Cursor::new(fixture("lotto.csv").into_bytes()),
        Game::Lotto,
        &ImportOptions::from(&config),
        CancellationToken::new(),
    )
    .await?;

    let balls = ball_frequency(&pool, Game::Lotto).await?;
    assert_eq!(balls.len(), 59);
    assert_eq!(balls.iter().map(|e| e.count).sum::<u64>(), 4 * 6);
    // Ball 9 appears in draws 3146 and 3145.
    assert_eq!(balls[8].count, 2);
    Ok(())
}
