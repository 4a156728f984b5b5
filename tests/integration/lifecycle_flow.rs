//! Full debate lifecycle through the executor and scanner.

use std::sync::Arc;

use argue::chain::{ChainReader, TxAction, TxState};
use argue::types::ArgumentCounts;
use argue::engine::executor::Executor;
use argue::engine::scanner::DebateScanner;
use argue::market::{BetLimits, ClaimKind, DebateStatus};
use argue::types::{ArgueError, ParseError, Side};

use crate::mock_ledger::{MockLedger, AFTER_END, BEFORE_END, OPEN, STARTING_BALANCE};

const USER: &str = "0x00000000000000000000000000000000000000aa";

fn setup() -> (MockLedger, Executor, DebateScanner) {
    let ledger = MockLedger::new(USER);
    let executor = Executor::new(
        Arc::new(ledger.clone()),
        Arc::new(ledger.clone()),
        BetLimits::default(),
    );
    let scanner = DebateScanner::new(Arc::new(ledger.clone()), 2);
    (ledger, executor, scanner)
}

fn argue_err(err: &anyhow::Error) -> &ArgueError {
    err.downcast_ref::<ArgueError>().expect("expected ArgueError")
}

#[tokio::test]
async fn test_bet_resolve_claim() {
    let (ledger, executor, scanner) = setup();

    // No allowance yet.
    let err = executor
        .place_bet(OPEN, USER, Side::A, "1", "", BEFORE_END)
        .await
        .unwrap_err();
    assert!(matches!(
        argue_err(&err),
        ArgueError::ApprovalRequired { required: 1_000_000, allowance: 0 }
    ));
    assert!(ledger.receipts().is_empty());

    executor.approve("10").await.unwrap();
    let receipt = executor
        .place_bet(OPEN, USER, Side::A, "1", "Borrow checker", BEFORE_END)
        .await
        .unwrap();
    assert_eq!(receipt.action, TxAction::PlaceBet);
    assert_eq!(receipt.amount, 1_000_000);

    let debate = ledger.snapshot();
    assert_eq!(debate.total_side_a, 4_000_000);
    assert_eq!(debate.total_content_bytes, 14);

    let view = scanner.view(OPEN, Some(USER), BEFORE_END).await.unwrap();
    assert_eq!(view.status, DebateStatus::Active);
    assert_eq!((view.odds.pct_a, view.odds.pct_b), (36, 64));
    assert_eq!(view.position.unwrap().side_a, 1_000_000);
    assert!(view.actions.can_bet);

    // Deadline passes, judging pending.
    let view = scanner.view(OPEN, Some(USER), AFTER_END).await.unwrap();
    assert_eq!(view.status, DebateStatus::Resolving);
    assert!(view.actions.judging);
    assert!(!view.actions.can_claim());

    ledger.resolve(Some(Side::A));
    let view = scanner.view(OPEN, Some(USER), AFTER_END).await.unwrap();
    assert_eq!(view.status, DebateStatus::Resolved);
    let quote = view.claim.unwrap();
    assert_eq!(quote.kind, ClaimKind::Winnings);
    assert_eq!(quote.amount, 2_750_000);

    let receipt = executor.claim(OPEN, USER, AFTER_END).await.unwrap();
    assert_eq!(receipt.amount, 2_750_000);
    assert!(ledger.position_of(USER).has_claimed);
    assert_eq!(
        executor.tx_state(),
        TxState::Confirmed { tx_hash: receipt.tx_hash.clone() }
    );

    // Claimed once; no second claim offered.
    let err = executor.claim(OPEN, USER, AFTER_END).await.unwrap_err();
    assert!(matches!(argue_err(&err), ArgueError::ActionNotPermitted(_)));
    assert_eq!(ledger.receipts().len(), 3);
}

#[tokio::test]
async fn test_undetermined_refunds_both_sides() {
    let (ledger, executor, scanner) = setup();
    executor.approve("10").await.unwrap();
    executor.place_bet(OPEN, USER, Side::A, "1", "", BEFORE_END).await.unwrap();
    executor.place_bet(OPEN, USER, Side::B, "2.5", "", BEFORE_END).await.unwrap();

    ledger.resolve(None);
    let view = scanner.view(OPEN, Some(USER), AFTER_END).await.unwrap();
    assert_eq!(view.status, DebateStatus::Undetermined);
    assert_eq!(view.actions.claim, Some(ClaimKind::Refund));

    let receipt = executor.claim(OPEN, USER, AFTER_END).await.unwrap();
    assert_eq!(receipt.amount, 3_500_000);
}

#[tokio::test]
async fn test_losing_stake_claims_nothing() {
    let (ledger, executor, scanner) = setup();
    executor.approve("5").await.unwrap();
    executor.place_bet(OPEN, USER, Side::B, "5", "", BEFORE_END).await.unwrap();

    ledger.resolve(Some(Side::A));
    let view = scanner.view(OPEN, Some(USER), AFTER_END).await.unwrap();
    assert_eq!(view.claim.map(|q| q.amount), Some(0));
}

#[tokio::test]
async fn test_betting_closed_after_deadline() {
    let (ledger, executor, _) = setup();
    executor.approve("10").await.unwrap();

    let err = executor
        .place_bet(OPEN, USER, Side::A, "1", "", AFTER_END)
        .await
        .unwrap_err();
    assert!(matches!(argue_err(&err), ArgueError::ActionNotPermitted(_)));
    assert_eq!(ledger.snapshot().total_side_a, 3_000_000);
}

#[tokio::test]
async fn test_content_budget_enforced() {
    let (ledger, executor, _) = setup();
    executor.approve("10").await.unwrap();
    ledger.update_debate(|d| d.total_content_bytes = d.max_total_content_bytes - 3);

    let err = executor
        .place_bet(OPEN, USER, Side::A, "1", "😀", BEFORE_END)
        .await
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<ParseError>(),
        Some(&ParseError::ContentBudgetExceeded { bytes: 4, remaining: 3 })
    );

    // An argument-free bet still fits.
    executor.place_bet(OPEN, USER, Side::A, "1", "", BEFORE_END).await.unwrap();
}

#[tokio::test]
async fn test_ledger_outage_fails_closed() {
    let (ledger, executor, scanner) = setup();
    executor.approve("10").await.unwrap();
    ledger.set_error(Some("rpc unavailable"));

    assert!(scanner.scan_all(Some(USER), BEFORE_END).await.is_err());
    assert!(executor
        .place_bet(OPEN, USER, Side::A, "1", "", BEFORE_END)
        .await
        .is_err());
    assert_eq!(ledger.receipts().len(), 1);

    ledger.set_error(None);
    let views = scanner.scan_all(Some(USER), BEFORE_END).await.unwrap();
    assert_eq!(views.len(), 1);
}

#[tokio::test]
async fn test_bets_recorded_as_arguments_and_stats() {
    let (ledger, executor, scanner) = setup();
    executor.approve("10").await.unwrap();
    executor
        .place_bet(OPEN, USER, Side::A, "1", "Borrow checker", BEFORE_END)
        .await
        .unwrap();
    executor.place_bet(OPEN, USER, Side::A, "2", "", BEFORE_END).await.unwrap();

    let side_a = ledger.arguments(OPEN, Side::A).await.unwrap();
    assert_eq!(side_a.len(), 2);
    assert_eq!(side_a[0].author, USER);
    assert_eq!(side_a[0].content, "Borrow checker");
    assert!(!side_a[1].has_content());
    assert_eq!(ledger.balance(USER).await.unwrap(), STARTING_BALANCE - 3_000_000);

    let view = scanner.view(OPEN, Some(USER), BEFORE_END).await.unwrap();
    assert_eq!(view.arguments, Some(ArgumentCounts { side_a: 2, side_b: 0 }));

    // 3 of the 6 USDC on A against 7 on B: 3 + floor(3 * 7 / 6) = 6.5 USDC.
    ledger.resolve(Some(Side::A));
    let receipt = executor.claim(OPEN, USER, AFTER_END).await.unwrap();
    assert_eq!(receipt.amount, 6_500_000);

    let stats = ledger.user_stats(USER).await.unwrap();
    assert_eq!(stats.total_bets, 3_000_000);
    assert_eq!(stats.debates_participated, 1);
    assert_eq!(stats.debates_won, 1);
    assert_eq!(stats.total_winnings, 6_500_000);
    assert_eq!(stats.net_profit, 3_500_000);
    assert_eq!(stats.win_rate_display(), "100.0%");
    assert_eq!(ledger.balance(USER).await.unwrap(), STARTING_BALANCE + 3_500_000);
}
