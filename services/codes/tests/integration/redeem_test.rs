use std::sync::Arc;

use chrono::TimeDelta;
use tokio::sync::Barrier;

use pedalstar_codes::error::CodeServiceError;
use pedalstar_codes::usecase::redeem::RedeemCodeUseCase;

use crate::helpers::{
    FailingCodeRepo, ManualClock, MemoryCodeRepo, test_now, test_record, used,
};

const CODE: &str = "PS001-ABC789";

fn active_repo() -> MemoryCodeRepo {
    MemoryCodeRepo::new(vec![test_record(CODE, "PS001", TimeDelta::minutes(5))])
}

#[tokio::test]
async fn should_mark_active_code_used() {
    let repo = active_repo();
    let uc = RedeemCodeUseCase {
        codes: repo.clone(),
        clock: ManualClock::at(test_now()),
    };

    let record = uc.execute(CODE).await.unwrap();

    assert_eq!(record.code, CODE);
    assert_eq!(record.used_at, Some(test_now()));
    assert_eq!(repo.get(CODE).unwrap().used_at, Some(test_now()));
}

#[tokio::test]
async fn should_normalize_code_input() {
    let repo = active_repo();
    let uc = RedeemCodeUseCase {
        codes: repo.clone(),
        clock: ManualClock::at(test_now()),
    };

    let record = uc.execute("  ps001-abc789\n").await.unwrap();

    assert_eq!(record.code, CODE);
    assert!(repo.get(CODE).unwrap().used_at.is_some());
}

#[tokio::test]
async fn should_reject_second_redemption_without_changing_state() {
    let repo = active_repo();
    let clock = ManualClock::at(test_now());
    let uc = RedeemCodeUseCase {
        codes: repo.clone(),
        clock: clock.clone(),
    };

    let first = uc.execute(CODE).await.unwrap();
    clock.advance(TimeDelta::minutes(1));
    let second = uc.execute(CODE).await;

    match second {
        Err(CodeServiceError::AlreadyUsed(record)) => {
            assert_eq!(record.used_at, first.used_at);
        }
        other => panic!("expected AlreadyUsed, got {other:?}"),
    }
    assert_eq!(
        repo.get(CODE).unwrap().used_at,
        first.used_at,
        "used_at must never move once set"
    );
}

#[tokio::test]
async fn should_reject_expired_code() {
    let repo = MemoryCodeRepo::new(vec![test_record(CODE, "PS001", TimeDelta::minutes(31))]);
    let uc = RedeemCodeUseCase {
        codes: repo.clone(),
        clock: ManualClock::at(test_now()),
    };

    let result = uc.execute(CODE).await;

    assert!(
        matches!(result, Err(CodeServiceError::CodeExpired(ref r)) if r.code == CODE),
        "expected CodeExpired, got {result:?}"
    );
    assert!(repo.get(CODE).unwrap().used_at.is_none());
}

#[tokio::test]
async fn should_treat_exact_expiry_instant_as_expired() {
    let repo = MemoryCodeRepo::new(vec![test_record(CODE, "PS001", TimeDelta::minutes(30))]);
    let uc = RedeemCodeUseCase {
        codes: repo.clone(),
        clock: ManualClock::at(test_now()),
    };

    let result = uc.execute(CODE).await;

    assert!(
        matches!(result, Err(CodeServiceError::CodeExpired(_))),
        "expected CodeExpired, got {result:?}"
    );
}

#[tokio::test]
async fn should_accept_last_instant_before_expiry() {
    let repo = MemoryCodeRepo::new(vec![test_record(CODE, "PS001", TimeDelta::minutes(30))]);
    let uc = RedeemCodeUseCase {
        codes: repo.clone(),
        clock: ManualClock::at(test_now() - TimeDelta::milliseconds(1)),
    };

    assert!(uc.execute(CODE).await.is_ok());
}

#[tokio::test]
async fn should_report_used_before_expired() {
    let repo = MemoryCodeRepo::new(vec![used(test_record(CODE, "PS001", TimeDelta::hours(2)))]);
    let uc = RedeemCodeUseCase {
        codes: repo,
        clock: ManualClock::at(test_now()),
    };

    let result = uc.execute(CODE).await;

    assert!(
        matches!(result, Err(CodeServiceError::AlreadyUsed(_))),
        "expected AlreadyUsed, got {result:?}"
    );
}

#[tokio::test]
async fn should_return_not_found_for_unknown_code() {
    let uc = RedeemCodeUseCase {
        codes: active_repo(),
        clock: ManualClock::at(test_now()),
    };

    let result = uc.execute("PS001-ZZZZZZ").await;

    assert!(
        matches!(result, Err(CodeServiceError::CodeNotFound)),
        "expected CodeNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn should_require_code() {
    let uc = RedeemCodeUseCase {
        codes: active_repo(),
        clock: ManualClock::at(test_now()),
    };

    for raw in ["", "   "] {
        let result = uc.execute(raw).await;
        assert!(
            matches!(result, Err(CodeServiceError::MissingCode)),
            "expected MissingCode for {raw:?}, got {result:?}"
        );
    }
}

#[tokio::test]
async fn should_surface_store_failure() {
    let uc = RedeemCodeUseCase {
        codes: FailingCodeRepo,
        clock: ManualClock::at(test_now()),
    };

    let result = uc.execute(CODE).await;

    assert!(
        matches!(result, Err(CodeServiceError::StoreFailure(_))),
        "expected StoreFailure, got {result:?}"
    );
}

#[tokio::test]
async fn should_let_only_one_of_two_interleaved_claims_win() {
    // Both callers read the unused record before either writes.
    let repo = active_repo().interleaving();
    let clock = ManualClock::at(test_now());
    let a = RedeemCodeUseCase {
        codes: repo.clone(),
        clock: clock.clone(),
    };
    let b = RedeemCodeUseCase {
        codes: repo.clone(),
        clock: clock.clone(),
    };

    let (ra, rb) = tokio::join!(a.execute(CODE), b.execute(CODE));

    let wins = [&ra, &rb].iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1, "exactly one claim may succeed: {ra:?} / {rb:?}");
    let loser = if ra.is_ok() { rb } else { ra };
    assert!(
        matches!(loser, Err(CodeServiceError::AlreadyUsed(ref r)) if r.used_at.is_some()),
        "loser must see AlreadyUsed with the winner's used_at, got {loser:?}"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_let_exactly_one_of_many_parallel_claims_win() {
    const CLAIMANTS: usize = 16;
    let repo = active_repo().interleaving();
    let clock = ManualClock::at(test_now());
    let barrier = Arc::new(Barrier::new(CLAIMANTS));

    let mut handles = Vec::with_capacity(CLAIMANTS);
    for _ in 0..CLAIMANTS {
        let uc = RedeemCodeUseCase {
            codes: repo.clone(),
            clock: clock.clone(),
        };
        let barrier = Arc::clone(&barrier);
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            uc.execute(CODE).await
        }));
    }

    let mut wins = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => wins += 1,
            Err(CodeServiceError::AlreadyUsed(_)) => {}
            Err(other) => panic!("unexpected error {other:?}"),
        }
    }
    assert_eq!(wins, 1);
    assert!(repo.get(CODE).unwrap().used_at.is_some());
}
