use super::{make_mission, make_remedy, TestResult};
use crate::{StorageError, Store};

pub(super) fn run_version_tests<S, F>(factory: &F) -> Vec<TestResult>
where
    S: Store,
    F: Fn() -> S,
{
    let mut results = Vec::new();

    // Correct version succeeds
    results.push(TestResult::from_result(
        "version",
        "update_with_correct_version_increments",
        update_with_correct_version_increments(factory),
    ));
    results.push(TestResult::from_result(
        "version",
        "rapid_sequential_updates",
        rapid_sequential_updates(factory),
    ));

    // Wrong version fails
    results.push(TestResult::from_result(
        "version",
        "stale_version_returns_conflict",
        stale_version_returns_conflict(factory),
    ));
    results.push(TestResult::from_result(
        "version",
        "future_version_returns_conflict",
        future_version_returns_conflict(factory),
    ));
    results.push(TestResult::from_result(
        "version",
        "update_missing_record_not_found",
        update_missing_record_not_found(factory),
    ));

    // Conflict does not mutate state
    results.push(TestResult::from_result(
        "version",
        "conflict_does_not_change_state",
        conflict_does_not_change_state(factory),
    ));

    // Race conditions (sequential simulation)
    results.push(TestResult::from_result(
        "version",
        "two_writers_race_one_wins",
        two_writers_race_one_wins(factory),
    ));
    results.push(TestResult::from_result(
        "version",
        "mission_versions_follow_same_rules",
        mission_versions_follow_same_rules(factory),
    ));

    results
}

fn update_with_correct_version_increments<S: Store, F: Fn() -> S>(
    factory: &F,
) -> Result<(), String> {
    let s = factory();
    s.put_remedy(&make_remedy("r-1", "a"), None)
        .map_err(|e| e.to_string())?;
    let v = s
        .put_remedy(&make_remedy("r-1", "b"), Some(0))
        .map_err(|e| e.to_string())?;
    if v != 1 {
        return Err(format!("expected version 1, got {}", v));
    }
    let got = s.get_remedy("r-1").map_err(|e| e.to_string())?;
    if got.version != 1 || got.current_step_id != "b" {
        return Err(format!(
            "expected step b at version 1, got {} at {}",
            got.current_step_id, got.version
        ));
    }
    Ok(())
}

fn rapid_sequential_updates<S: Store, F: Fn() -> S>(factory: &F) -> Result<(), String> {
    let s = factory();
    s.put_remedy(&make_remedy("r-1", "step-0"), None)
        .map_err(|e| e.to_string())?;
    for i in 0..10u64 {
        let step = format!("step-{}", i + 1);
        let v = s
            .put_remedy(&make_remedy("r-1", &step), Some(i))
            .map_err(|e| e.to_string())?;
        if v != i + 1 {
            return Err(format!("update {} returned version {}", i, v));
        }
    }
    let got = s.get_remedy("r-1").map_err(|e| e.to_string())?;
    if got.version != 10 || got.current_step_id != "step-10" {
        return Err(format!("final state wrong: {:?}", got));
    }
    Ok(())
}

fn stale_version_returns_conflict<S: Store, F: Fn() -> S>(factory: &F) -> Result<(), String> {
    let s = factory();
    s.put_remedy(&make_remedy("r-1", "a"), None)
        .map_err(|e| e.to_string())?;
    s.put_remedy(&make_remedy("r-1", "b"), Some(0))
        .map_err(|e| e.to_string())?;
    match s.put_remedy(&make_remedy("r-1", "c"), Some(0)) {
        Err(StorageError::ConcurrentConflict {
            instance_id,
            expected_version,
            actual_version,
            ..
        }) => {
            if instance_id != "r-1" || expected_version != 0 || actual_version != 1 {
                return Err(format!(
                    "conflict fields wrong: {} expected {} actual {}",
                    instance_id, expected_version, actual_version
                ));
            }
            Ok(())
        }
        other => Err(format!("expected ConcurrentConflict, got {:?}", other)),
    }
}

fn future_version_returns_conflict<S: Store, F: Fn() -> S>(factory: &F) -> Result<(), String> {
    let s = factory();
    s.put_remedy(&make_remedy("r-1", "a"), None)
        .map_err(|e| e.to_string())?;
    match s.put_remedy(&make_remedy("r-1", "b"), Some(5)) {
        Err(StorageError::ConcurrentConflict { .. }) => Ok(()),
        other => Err(format!("expected ConcurrentConflict, got {:?}", other)),
    }
}

fn update_missing_record_not_found<S: Store, F: Fn() -> S>(factory: &F) -> Result<(), String> {
    let s = factory();
    match s.put_remedy(&make_remedy("r-1", "a"), Some(0)) {
        Err(StorageError::NotFound { .. }) => {}
        other => return Err(format!("expected NotFound, got {:?}", other)),
    }
    if s.get_remedy("r-1").is_ok() {
        return Err("update of a missing record created it".to_string());
    }
    Ok(())
}

fn conflict_does_not_change_state<S: Store, F: Fn() -> S>(factory: &F) -> Result<(), String> {
    let s = factory();
    s.put_remedy(&make_remedy("r-1", "a"), None)
        .map_err(|e| e.to_string())?;
    s.put_remedy(&make_remedy("r-1", "b"), Some(0))
        .map_err(|e| e.to_string())?;
    let _ = s.put_remedy(&make_remedy("r-1", "c"), Some(0));

    let got = s.get_remedy("r-1").map_err(|e| e.to_string())?;
    if got.current_step_id != "b" || got.version != 1 {
        return Err(format!(
            "conflict mutated state: step {} version {}",
            got.current_step_id, got.version
        ));
    }
    Ok(())
}

/// Two writers read version 0; the first to write wins, the second conflicts.
fn two_writers_race_one_wins<S: Store, F: Fn() -> S>(factory: &F) -> Result<(), String> {
    let s = factory();
    s.put_remedy(&make_remedy("r-1", "a"), None)
        .map_err(|e| e.to_string())?;
    let read_a = s.get_remedy("r-1").map_err(|e| e.to_string())?;
    let read_b = s.get_remedy("r-1").map_err(|e| e.to_string())?;

    let mut user = read_a.clone();
    user.current_step_id = "user".to_string();
    let mut monitor = read_b.clone();
    monitor.current_step_id = "monitor".to_string();

    s.put_remedy(&user, Some(read_a.version))
        .map_err(|e| e.to_string())?;
    if s.put_remedy(&monitor, Some(read_b.version)).is_ok() {
        return Err("second writer with stale version succeeded".to_string());
    }
    let got = s.get_remedy("r-1").map_err(|e| e.to_string())?;
    if got.current_step_id != "user" {
        return Err(format!("expected winner 'user', got '{}'", got.current_step_id));
    }
    Ok(())
}

fn mission_versions_follow_same_rules<S: Store, F: Fn() -> S>(
    factory: &F,
) -> Result<(), String> {
    let s = factory();
    s.put_mission(&make_mission("m-1", 1), None)
        .map_err(|e| e.to_string())?;
    let v = s
        .put_mission(&make_mission("m-1", 2), Some(0))
        .map_err(|e| e.to_string())?;
    if v != 1 {
        return Err(format!("expected version 1, got {}", v));
    }
    match s.put_mission(&make_mission("m-1", 3), Some(0)) {
        Err(StorageError::ConcurrentConflict { .. }) => {}
        other => return Err(format!("expected ConcurrentConflict, got {:?}", other)),
    }
    let got = s.get_mission("m-1").map_err(|e| e.to_string())?;
    if got.current_step_order != 2 {
        return Err(format!("expected order 2, got {}", got.current_step_order));
    }
    Ok(())
}
