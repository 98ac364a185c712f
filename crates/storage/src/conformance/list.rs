use super::{make_mission, make_remedy, TestResult};
use crate::Store;

pub(super) fn run_list_tests<S, F>(factory: &F) -> Vec<TestResult>
where
    S: Store,
    F: Fn() -> S,
{
    vec![
        TestResult::from_result("list", "empty_store_lists_nothing", empty_store_lists_nothing(factory)),
        TestResult::from_result("list", "list_ordered_by_instance_id", list_ordered_by_instance_id(factory)),
        TestResult::from_result("list", "list_reflects_latest_write", list_reflects_latest_write(factory)),
        TestResult::from_result("list", "collections_are_independent", collections_are_independent(factory)),
    ]
}

fn empty_store_lists_nothing<S: Store, F: Fn() -> S>(factory: &F) -> Result<(), String> {
    let s = factory();
    let remedies = s.list_remedies().map_err(|e| e.to_string())?;
    let missions = s.list_missions().map_err(|e| e.to_string())?;
    if !remedies.is_empty() || !missions.is_empty() {
        return Err(format!(
            "expected empty store, got {} remedies and {} missions",
            remedies.len(),
            missions.len()
        ));
    }
    Ok(())
}

fn list_ordered_by_instance_id<S: Store, F: Fn() -> S>(factory: &F) -> Result<(), String> {
    let s = factory();
    for id in ["r-c", "r-a", "r-b"] {
        s.put_remedy(&make_remedy(id, "a"), None)
            .map_err(|e| e.to_string())?;
    }
    let ids: Vec<String> = s
        .list_remedies()
        .map_err(|e| e.to_string())?
        .into_iter()
        .map(|r| r.instance_id)
        .collect();
    if ids != ["r-a", "r-b", "r-c"] {
        return Err(format!("unexpected order: {:?}", ids));
    }
    Ok(())
}

fn list_reflects_latest_write<S: Store, F: Fn() -> S>(factory: &F) -> Result<(), String> {
    let s = factory();
    s.put_remedy(&make_remedy("r-1", "a"), None)
        .map_err(|e| e.to_string())?;
    s.put_remedy(&make_remedy("r-1", "b"), Some(0))
        .map_err(|e| e.to_string())?;
    let listed = s.list_remedies().map_err(|e| e.to_string())?;
    match listed.as_slice() {
        [only] if only.current_step_id == "b" && only.version == 1 => Ok(()),
        other => Err(format!("expected one record at step b v1, got {:?}", other)),
    }
}

fn collections_are_independent<S: Store, F: Fn() -> S>(factory: &F) -> Result<(), String> {
    let s = factory();
    s.put_remedy(&make_remedy("same-id", "a"), None)
        .map_err(|e| e.to_string())?;
    s.put_mission(&make_mission("same-id", 1), None)
        .map_err(|e| e.to_string())?;
    let remedies = s.list_remedies().map_err(|e| e.to_string())?;
    let missions = s.list_missions().map_err(|e| e.to_string())?;
    if remedies.len() != 1 || missions.len() != 1 {
        return Err(format!(
            "expected 1 remedy and 1 mission, got {} and {}",
            remedies.len(),
            missions.len()
        ));
    }
    Ok(())
}
