#![cfg(feature = "scheduler")]

mod common;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use common::{catalog, harness, START};
use remedy_core::RemedyStatus;
use remedy_engine::{scheduler, Engine, ManualClock};
use remedy_storage::{FileStore, Store};
use time::macros::datetime;

#[tokio::test(start_paused = true)]
async fn first_tick_runs_immediately() {
    let h = harness();
    let mission = h.engine.launch_mission("ONE", BTreeMap::new()).unwrap();
    let engine = Arc::new(h.engine);

    let handle = scheduler::spawn(Arc::clone(&engine), Duration::from_secs(60));
    let mut ticks = handle.ticks();
    ticks.changed().await.unwrap();

    let stored = engine.store().get_mission(&mission.instance_id).unwrap();
    assert!(stored.active_remedy_instance_id.is_some());
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn trigger_escalates_after_clock_moves() {
    let h = harness();
    let remedy = h.engine.initiate_remedy("D", BTreeMap::new()).unwrap();
    let clock = Arc::clone(&h.clock);
    let engine = Arc::new(h.engine);

    let handle = scheduler::spawn(Arc::clone(&engine), Duration::from_secs(3600));
    let mut ticks = handle.ticks();
    ticks.changed().await.unwrap();
    assert_eq!(
        engine.store().get_remedy(&remedy.instance_id).unwrap().status,
        RemedyStatus::AwaitingResponse
    );

    clock.set(datetime!(2025-04-05 00:00 UTC));
    handle.trigger();
    ticks.changed().await.unwrap();

    let stored = engine.store().get_remedy(&remedy.instance_id).unwrap();
    assert_eq!(stored.status, RemedyStatus::Escalated);
    assert_eq!(stored.current_step_id, "B");
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn interval_keeps_ticking() {
    let h = harness();
    let engine = Arc::new(h.engine);
    let handle = scheduler::spawn(engine, Duration::from_secs(60));
    let mut ticks = handle.ticks();

    for _ in 0..3 {
        ticks.changed().await.unwrap();
    }
    assert!(*ticks.borrow() >= 3);
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_the_loop() {
    let h = harness();
    let engine = Arc::new(h.engine);
    let handle = scheduler::spawn(Arc::clone(&engine), Duration::from_secs(60));
    let ticks = handle.ticks();
    handle.shutdown().await;

    let seen = *ticks.borrow();
    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(*ticks.borrow(), seen);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn ticks_against_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Engine::new(
        Arc::new(catalog()),
        FileStore::new(dir.path().join("state.json")),
    )
    .with_clock(Arc::new(ManualClock::new(START)));
    let mission = engine.launch_mission("ONE", BTreeMap::new()).unwrap();
    let engine = Arc::new(engine);

    let handle = scheduler::spawn(Arc::clone(&engine), Duration::from_secs(60));
    let mut ticks = handle.ticks();
    ticks.changed().await.unwrap();

    let stored = engine.store().get_mission(&mission.instance_id).unwrap();
    assert!(stored.active_remedy_instance_id.is_some());
    handle.shutdown().await;
}
