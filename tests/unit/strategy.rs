//! Unit tests for the repeat strategy

use testsuite_operator::controller::{RepeatStrategy, RepeatUntilCount};
use testsuite_operator::crd::ExecutionPhase;

use crate::common::*;

#[test]
fn test_returns_first_eligible_in_stored_order() {
    let suite = TestSuiteBuilder::new("all")
        .with_count(1)
        .with_results(vec![
            test_result("seq", "default", true, vec![]),
            test_result("first", "default", false, vec![]),
            test_result("second", "default", false, vec![]),
        ])
        .build();

    let strategy = RepeatUntilCount;
    assert_eq!(
        strategy.test_to_run_concurrently(&suite).unwrap().name,
        "first"
    );
    assert_eq!(
        strategy.test_to_run_sequentially(&suite).unwrap().name,
        "seq"
    );
}

#[test]
fn test_skips_results_at_the_repeat_count() {
    let suite = TestSuiteBuilder::new("all")
        .with_count(1)
        .with_results(vec![
            test_result(
                "done",
                "default",
                false,
                vec![execution("all-done-0", ExecutionPhase::Succeeded)],
            ),
            test_result("next", "default", false, vec![]),
        ])
        .build();

    let strategy = RepeatUntilCount;
    assert_eq!(
        strategy.test_to_run_concurrently(&suite).unwrap().name,
        "next"
    );
}

#[test]
fn test_returns_none_when_every_result_is_full() {
    let suite = TestSuiteBuilder::new("all")
        .with_count(1)
        .with_results(vec![
            test_result(
                "a",
                "default",
                false,
                vec![execution("all-a-0", ExecutionPhase::Failed)],
            ),
            test_result(
                "b",
                "default",
                true,
                vec![execution("all-b-0", ExecutionPhase::Succeeded)],
            ),
        ])
        .build();

    let strategy = RepeatUntilCount;
    assert!(strategy.test_to_run_concurrently(&suite).is_none());
    assert!(strategy.test_to_run_sequentially(&suite).is_none());
}

#[test]
fn test_repeats_until_count_is_reached() {
    let suite = TestSuiteBuilder::new("all")
        .with_count(3)
        .with_results(vec![test_result(
            "a",
            "default",
            false,
            vec![
                execution("all-a-0", ExecutionPhase::Succeeded),
                execution("all-a-1", ExecutionPhase::Failed),
            ],
        )])
        .build();

    let strategy = RepeatUntilCount;
    assert_eq!(strategy.test_to_run_concurrently(&suite).unwrap().name, "a");
}

#[test]
fn test_overfull_result_is_treated_as_full() {
    // Malformed status with more executions than the count allows
    let suite = TestSuiteBuilder::new("all")
        .with_count(1)
        .with_results(vec![test_result(
            "a",
            "default",
            false,
            vec![
                execution("all-a-0", ExecutionPhase::Succeeded),
                execution("all-a-1", ExecutionPhase::Succeeded),
            ],
        )])
        .build();

    let strategy = RepeatUntilCount;
    assert!(strategy.test_to_run_concurrently(&suite).is_none());
}

#[test]
fn test_suite_without_status_yields_nothing() {
    let suite = create_test_suite("all", 1);
    let strategy = RepeatUntilCount;
    assert!(strategy.test_to_run_concurrently(&suite).is_none());
    assert!(strategy.test_to_run_sequentially(&suite).is_none());
}

#[test]
fn test_selection_ignores_inflight_state() {
    // The strategy only applies the count bound; in-flight gating is the
    // scheduler's concern
    let suite = TestSuiteBuilder::new("all")
        .with_count(2)
        .with_results(vec![test_result(
            "a",
            "default",
            true,
            vec![execution("all-a-0", ExecutionPhase::Running)],
        )])
        .build();

    let strategy = RepeatUntilCount;
    assert_eq!(strategy.test_to_run_sequentially(&suite).unwrap().name, "a");
}
