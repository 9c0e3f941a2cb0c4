//! Explicit startup of the real interpreter
//!
//! One test per binary: the interpreter and its lifecycle are process-wide.

use pyhost_config::{Configuration, StaticProvider};
use pyhost_python::{EmbeddedStartup, ErrorKind, Interpreter, Lifecycle, Startup, StartupState};
use std::fs;
use std::thread;
use tempfile::TempDir;

#[test]
fn test_explicit_start_then_singleton() {
    let app_dir = TempDir::new().unwrap();
    fs::write(
        app_dir.path().join("pyhost_fixture.py"),
        "GREETING = 'hello from the search path'\n",
    )
    .unwrap();

    assert_eq!(pyhost_python::state(), StartupState::NotStarted);
    assert!(!pyhost_python::is_started());

    let provider = StaticProvider::from_entries([app_dir.path()]).unwrap();
    pyhost_python::start(&provider).unwrap();
    assert!(pyhost_python::is_started());

    // A second start fails regardless of the provider and leaves the state alone.
    let err = pyhost_python::start(&provider).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyStarted);
    assert!(err.is_lifecycle_misuse());
    assert_eq!(pyhost_python::state(), StartupState::Started);

    let python = pyhost_python::instance().unwrap();
    let sys_path = python.sys_path().unwrap();
    let entry = app_dir.path().to_string_lossy().into_owned();
    assert!(sys_path.contains(&entry), "{entry} missing from {sys_path:?}");

    let fixture = python.get_module("pyhost_fixture").unwrap();
    assert_eq!(
        fixture.get_attr("GREETING").unwrap().extract_string().unwrap(),
        "hello from the search path"
    );

    let expected = python as *const Interpreter as usize;
    let addresses: Vec<usize> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| pyhost_python::instance().unwrap() as *const Interpreter as usize)
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(addresses.iter().all(|&a| a == expected));

    assert!(python.version().unwrap().starts_with('3'));

    // The native routine cannot be reached again, directly or through another lifecycle.
    let other = Configuration::from_provider(&StaticProvider::new("/pyhost/direct")).unwrap();
    let err = EmbeddedStartup.start(&other).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyStarted);

    let second = Lifecycle::new(EmbeddedStartup);
    let err = second
        .start(&StaticProvider::new("/pyhost/second"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyStarted);
    assert!(!second.is_started());

    let sys_path = python.sys_path().unwrap();
    assert!(!sys_path.iter().any(|p| p.starts_with("/pyhost/")));
    assert_eq!(pyhost_python::state(), StartupState::Started);
}
