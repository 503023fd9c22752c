use std::time::Duration;

use super::*;

#[tokio::test]
async fn acquire_and_release_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let lock = GlobalLock::open(dir.path().join("global.lock"), Duration::from_secs(1)).unwrap();

    let guard = lock.acquire().await.unwrap();
    guard.release().unwrap();

    let guard = lock.acquire().await.unwrap();
    guard.release().unwrap();
}

#[tokio::test]
async fn independently_opened_locks_exclude_each_other() {
    // Two GlobalLock instances on one path model two front-end processes.
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("global.lock");

    let ours = GlobalLock::open(&path, Duration::from_secs(1)).unwrap();
    let theirs = GlobalLock::open(&path, Duration::from_millis(80)).unwrap();

    let guard = ours.acquire().await.unwrap();
    let err = theirs.acquire().await.unwrap_err();
    assert!(matches!(err, LockError::Timeout { .. }));

    guard.release().unwrap();
    let guard = theirs.acquire().await.unwrap();
    guard.release().unwrap();
}

#[tokio::test]
async fn waiting_acquire_proceeds_once_the_holder_releases() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("global.lock");

    let ours = GlobalLock::open(&path, Duration::from_secs(2)).unwrap();
    let theirs = GlobalLock::open(&path, Duration::from_secs(2)).unwrap();

    let guard = ours.acquire().await.unwrap();
    let waiter = tokio::spawn(async move {
        let guard = theirs.acquire().await.unwrap();
        guard.release().unwrap();
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    guard.release().unwrap();
    waiter.await.unwrap();
}

#[tokio::test]
async fn dropping_a_guard_frees_the_lock() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("global.lock");

    let ours = GlobalLock::open(&path, Duration::from_secs(1)).unwrap();
    let theirs = GlobalLock::open(&path, Duration::from_secs(1)).unwrap();

    drop(ours.acquire().await.unwrap());
    let guard = theirs.acquire().await.unwrap();
    guard.release().unwrap();
}
