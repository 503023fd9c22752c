use super::*;

#[test]
fn own_process_exists() {
    assert!(process_exists(std::process::id()));
}

#[test]
fn exited_and_reaped_process_does_not_exist() {
    let mut child = std::process::Command::new("true").spawn().unwrap();
    let pid = child.id();
    child.wait().unwrap();
    assert!(!process_exists(pid));
}

#[test]
fn force_kill_terminates_a_process() {
    use std::os::unix::process::ExitStatusExt;

    let mut child = std::process::Command::new("sleep").arg("30").spawn().unwrap();
    let pid = child.id();
    assert!(process_exists(pid));
    force_kill(pid).unwrap();
    let status = child.wait().unwrap();
    assert_eq!(status.signal(), Some(libc::SIGKILL));
}

#[test]
fn force_kill_of_a_missing_process_fails() {
    let mut child = std::process::Command::new("true").spawn().unwrap();
    let pid = child.id();
    child.wait().unwrap();
    assert!(force_kill(pid).is_err());
}
