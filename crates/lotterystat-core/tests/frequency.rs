use anyhow::Result;
use chrono::{TimeZone, Utc};
use lotterystat_core::db::{self, DbPool};
use lotterystat_core::frequency::{ball_frequency, pair_frequency, secondary_frequency};
use lotterystat_core::parser::{DrawRecord, Game};
use lotterystat_core::persistence::{initialize, persist_draw};

fn thunderball(draw_no: u64, balls: [u8; 5], tball: u8) -> DrawRecord {
    DrawRecord {
        game: Game::Thunderball,
        draw_date: Utc.with_ymd_and_hms(2026, 2, 20, 0, 0, 0).unwrap(),
        balls: balls.to_vec(),
        secondary: vec![tball],
        markers: vec!["T4".into(), "Excalibur 7".into()],
        draw_no,
    }
}

async fn seeded_pool() -> Result<DbPool> {
    let pool = db::connect_in_memory().await?;
    initialize(&pool).await?;
    let draws = [
        thunderball(3878, [1, 4, 19, 30, 38], 11),
        thunderball(3879, [6, 9, 12, 28, 35], 3),
        thunderball(3880, [2, 17, 25, 33, 39], 14),
        thunderball(3881, [1, 4, 12, 33, 39], 3),
    ];
    for draw in &draws {
        persist_draw(&pool, draw).await?;
    }
    Ok(pool)
}

#[tokio::test]
async fn frequency_tables_are_dense_and_ascending() -> Result<()> {
    let pool = seeded_pool().await?;

    let balls = ball_frequency(&pool, Game::Thunderball).await?;
    assert_eq!(balls.len(), 39);
    assert!(balls
        .iter()
        .enumerate()
        .all(|(idx, entry)| usize::from(entry.value) == idx + 1));

    let tballs = secondary_frequency(&pool, Game::Thunderball).await?;
    assert_eq!(tballs.len(), 14);
    assert_eq!(tballs[2].count, 2);
    assert_eq!(tballs[0].count, 0);
    Ok(())
}

#[tokio::test]
async fn counts_sum_to_column_occurrences() -> Result<()> {
    let pool = seeded_pool().await?;

    let balls = ball_frequency(&pool, Game::Thunderball).await?;
    assert_eq!(balls.iter().map(|e| e.count).sum::<u64>(), 4 * 5);
    assert_eq!(balls[0].count, 2);
    assert_eq!(balls[3].count, 2);
    assert_eq!(balls[38].count, 2);
    assert_eq!(balls[7].count, 0);

    let tballs = secondary_frequency(&pool, Game::Thunderball).await?;
    assert_eq!(tballs.iter().map(|e| e.count).sum::<u64>(), 4);
    Ok(())
}

#[tokio::test]
async fn empty_table_yields_all_zero_counts() -> Result<()> {
    let pool = db::connect_in_memory().await?;
    initialize(&pool).await?;

    let stars = secondary_frequency(&pool, Game::EuroMillions).await?;
    assert_eq!(stars.len(), 12);
    assert!(stars.iter().all(|entry| entry.count == 0));

    let balls = ball_frequency(&pool, Game::Lotto).await?;
    assert_eq!(balls.len(), 59);
    Ok(())
}

#[tokio::test]
async fn pair_frequency_orders_by_count_then_pair() -> Result<()> {
    let pool = seeded_pool().await?;

    let pairs = pair_frequency(&pool, Game::Thunderball, 4).await?;
    assert_eq!(pairs.len(), 39 * 38 / 2);
    assert_eq!(pairs[0].pair, [1, 4]);
    assert_eq!(pairs[0].count, 2);
    assert_eq!(pairs[1].pair, [33, 39]);
    assert_eq!(pairs[1].count, 2);
    assert!(pairs[2..].iter().all(|pair| pair.count <= 1));
    // Each draw contributes C(5, 2) pairs.
    assert_eq!(pairs.iter().map(|p| p.count).sum::<u64>(), 4 * 10);

    let serial = pair_frequency(&pool, Game::Thunderball, 1).await?;
    assert_eq!(serial, pairs);
    Ok(())
}
