use chrono::TimeDelta;

use pedalstar_codes::domain::types::{CodeStatus, LIST_PAGE_SIZE};
use pedalstar_codes::error::CodeServiceError;
use pedalstar_codes::usecase::list::{ListCodesInput, ListCodesUseCase};

use crate::helpers::{ManualClock, MemoryCodeRepo, test_now, test_record, used};

/// One active, one used, one expired code at PS001 and one active at PS002.
fn mixed_repo() -> MemoryCodeRepo {
    MemoryCodeRepo::new(vec![
        test_record("PS001-AAAAAA", "PS001", TimeDelta::minutes(45)),
        used(test_record("PS001-BBBBBB", "PS001", TimeDelta::minutes(20))),
        test_record("PS001-CCCCCC", "PS001", TimeDelta::minutes(5)),
        test_record("PS002-DDDDDD", "PS002", TimeDelta::minutes(1)),
    ])
}

fn lister(repo: MemoryCodeRepo) -> ListCodesUseCase<MemoryCodeRepo, ManualClock> {
    ListCodesUseCase {
        codes: repo,
        clock: ManualClock::at(test_now()),
    }
}

fn codes(records: &[pedalstar_codes::domain::types::CodeRecord]) -> Vec<&str> {
    records.iter().map(|r| r.code.as_str()).collect()
}

#[tokio::test]
async fn should_list_everything_newest_first() {
    let rows = lister(mixed_repo())
        .execute(ListCodesInput::default())
        .await
        .unwrap();

    assert_eq!(
        codes(&rows),
        vec!["PS002-DDDDDD", "PS001-CCCCCC", "PS001-BBBBBB", "PS001-AAAAAA"]
    );
}

#[tokio::test]
async fn should_list_only_claimable_codes_as_active() {
    let rows = lister(mixed_repo())
        .execute(ListCodesInput {
            status: CodeStatus::Active,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(codes(&rows), vec!["PS002-DDDDDD", "PS001-CCCCCC"]);
    for row in &rows {
        assert!(row.used_at.is_none());
        assert!(row.expires_at > test_now());
    }
}

#[tokio::test]
async fn should_list_only_redeemed_codes_as_used() {
    let rows = lister(mixed_repo())
        .execute(ListCodesInput {
            status: CodeStatus::Used,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(codes(&rows), vec!["PS001-BBBBBB"]);
    assert!(rows.iter().all(|r| r.used_at.is_some()));
}

#[tokio::test]
async fn should_filter_by_normalized_venue() {
    let rows = lister(mixed_repo())
        .execute(ListCodesInput {
            venue_id: Some("2".to_owned()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(codes(&rows), vec!["PS002-DDDDDD"]);
}

#[tokio::test]
async fn should_filter_by_exact_code() {
    let rows = lister(mixed_repo())
        .execute(ListCodesInput {
            code: Some("ps001-bbbbbb".to_owned()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(codes(&rows), vec!["PS001-BBBBBB"]);
}

#[tokio::test]
async fn should_combine_filters() {
    let rows = lister(mixed_repo())
        .execute(ListCodesInput {
            status: CodeStatus::Active,
            venue_id: Some("PS001".to_owned()),
            code: None,
        })
        .await
        .unwrap();

    assert_eq!(codes(&rows), vec!["PS001-CCCCCC"]);
}

#[tokio::test]
async fn should_cap_results_at_page_size() {
    let records = (0..LIST_PAGE_SIZE + 50)
        .map(|i| {
            test_record(
                &format!("PS001-{i:06}"),
                "PS001",
                TimeDelta::seconds(i as i64),
            )
        })
        .collect();

    let rows = lister(MemoryCodeRepo::new(records))
        .execute(ListCodesInput::default())
        .await
        .unwrap();

    assert_eq!(rows.len() as u64, LIST_PAGE_SIZE);
    assert_eq!(rows[0].code, "PS001-000000", "youngest record comes first");
}

#[tokio::test]
async fn should_reject_malformed_venue_filter() {
    let result = lister(mixed_repo())
        .execute(ListCodesInput {
            venue_id: Some("venue-1".to_owned()),
            ..Default::default()
        })
        .await;

    assert!(
        matches!(result, Err(CodeServiceError::InvalidVenueId)),
        "expected InvalidVenueId, got {result:?}"
    );
}
