use super::{make_mission, make_remedy, TestResult};
use crate::{RecordKind, StorageError, Store};

pub(super) fn run_insert_tests<S, F>(factory: &F) -> Vec<TestResult>
where
    S: Store,
    F: Fn() -> S,
{
    vec![
        TestResult::from_result(
            "insert",
            "insert_starts_at_version_0",
            insert_starts_at_version_0(factory),
        ),
        TestResult::from_result(
            "insert",
            "insert_then_get_returns_record",
            insert_then_get_returns_record(factory),
        ),
        TestResult::from_result(
            "insert",
            "insert_ignores_caller_version",
            insert_ignores_caller_version(factory),
        ),
        TestResult::from_result(
            "insert",
            "duplicate_insert_rejected",
            duplicate_insert_rejected(factory),
        ),
        TestResult::from_result(
            "insert",
            "get_missing_remedy_not_found",
            get_missing_remedy_not_found(factory),
        ),
        TestResult::from_result(
            "insert",
            "get_missing_mission_not_found",
            get_missing_mission_not_found(factory),
        ),
        TestResult::from_result(
            "insert",
            "mission_insert_starts_at_version_0",
            mission_insert_starts_at_version_0(factory),
        ),
    ]
}

fn insert_starts_at_version_0<S: Store, F: Fn() -> S>(factory: &F) -> Result<(), String> {
    let s = factory();
    let v = s
        .put_remedy(&make_remedy("r-1", "a"), None)
        .map_err(|e| e.to_string())?;
    if v != 0 {
        return Err(format!("expected version 0, got {}", v));
    }
    Ok(())
}

fn insert_then_get_returns_record<S: Store, F: Fn() -> S>(factory: &F) -> Result<(), String> {
    let s = factory();
    let mut remedy = make_remedy("r-1", "a");
    remedy
        .variables
        .insert("agency".to_string(), "Department of Examples".to_string());
    s.put_remedy(&remedy, None).map_err(|e| e.to_string())?;

    let got = s.get_remedy("r-1").map_err(|e| e.to_string())?;
    if got != remedy {
        return Err(format!("stored record differs: {:?}", got));
    }
    Ok(())
}

fn insert_ignores_caller_version<S: Store, F: Fn() -> S>(factory: &F) -> Result<(), String> {
    let s = factory();
    let mut remedy = make_remedy("r-1", "a");
    remedy.version = 41;
    s.put_remedy(&remedy, None).map_err(|e| e.to_string())?;
    let got = s.get_remedy("r-1").map_err(|e| e.to_string())?;
    if got.version != 0 {
        return Err(format!("expected stored version 0, got {}", got.version));
    }
    Ok(())
}

fn duplicate_insert_rejected<S: Store, F: Fn() -> S>(factory: &F) -> Result<(), String> {
    let s = factory();
    s.put_remedy(&make_remedy("r-1", "a"), None)
        .map_err(|e| e.to_string())?;
    match s.put_remedy(&make_remedy("r-1", "b"), None) {
        Err(StorageError::AlreadyExists { kind, instance_id })
            if kind == RecordKind::Remedy && instance_id == "r-1" => {}
        other => return Err(format!("expected AlreadyExists, got {:?}", other)),
    }
    let got = s.get_remedy("r-1").map_err(|e| e.to_string())?;
    if got.current_step_id != "a" {
        return Err("duplicate insert overwrote the original".to_string());
    }
    Ok(())
}

fn get_missing_remedy_not_found<S: Store, F: Fn() -> S>(factory: &F) -> Result<(), String> {
    let s = factory();
    match s.get_remedy("nope") {
        Err(StorageError::NotFound { kind, .. }) if kind == RecordKind::Remedy => Ok(()),
        other => Err(format!("expected NotFound, got {:?}", other)),
    }
}

fn get_missing_mission_not_found<S: Store, F: Fn() -> S>(factory: &F) -> Result<(), String> {
    let s = factory();
    match s.get_mission("nope") {
        Err(StorageError::NotFound { kind, .. }) if kind == RecordKind::Mission => Ok(()),
        other => Err(format!("expected NotFound, got {:?}", other)),
    }
}

fn mission_insert_starts_at_version_0<S: Store, F: Fn() -> S>(factory: &F) -> Result<(), String> {
    let s = factory();
    let v = s
        .put_mission(&make_mission("m-1", 1), None)
        .map_err(|e| e.to_string())?;
    let got = s.get_mission("m-1").map_err(|e| e.to_string())?;
    if v != 0 || got.version != 0 {
        return Err(format!("expected version 0, got {} / {}", v, got.version));
    }
    Ok(())
}
