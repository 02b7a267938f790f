#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Lifecycle tests: lazy construction, reloads, error pass-through and
//! cancellation-driven run.

mod common;

use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use common::{PATH_PREFIX, args, controller_options, new_module};
use flow_logging::{LogOptions, Logger};
use flow_module::{ControllerOptions, ModuleError, ModuleState, Opaque};
use parking_lot::Mutex;
use serde_json::json;
use tokio_util::sync::CancellationToken;

#[test]
fn repeated_loads_reuse_one_engine() {
    let (module, factory, _) = new_module(controller_options());
    assert!(module.engine().is_none());
    assert_eq!(module.state(), ModuleState::Uninitialized);

    module.load_config(b"first", args(&[("a", json!(1))])).unwrap();
    let first = Arc::clone(module.engine().unwrap());
    assert_eq!(module.state(), ModuleState::Configured);

    module.load_config(b"second", args(&[("a", json!(2))])).unwrap();
    let second = Arc::clone(module.engine().unwrap());

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(factory.constructed.load(Ordering::SeqCst), 1);

    let loads = first.loads.lock();
    assert_eq!(loads.len(), 2);
    assert_eq!(loads[0].0, "first");
    assert_eq!(loads[1].0, "second");
    assert_eq!(loads[1].1["a"], 2);
}

#[test]
fn concurrent_first_loads_construct_once() {
    let (module, factory, _) = new_module(controller_options());
    let module = Arc::new(module);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let module = Arc::clone(&module);
            thread::spawn(move || {
                module
                    .load_config(format!("config {i}").as_bytes(), args(&[]))
                    .unwrap();
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(factory.constructed.load(Ordering::SeqCst), 1);
    assert_eq!(module.engine().unwrap().loads.lock().len(), 8);
}

#[test]
fn parse_error_is_returned_verbatim_and_engine_untouched() {
    let (module, factory, exports) = new_module(controller_options());

    let err = module.load_config(b"syntax error here", args(&[])).unwrap_err();
    assert!(matches!(err, ModuleError::Parse(_)));
    assert_eq!(err.to_string(), "outer:1:1: syntax error");

    // The engine exists but received nothing; the module is not configured.
    assert_eq!(factory.constructed.load(Ordering::SeqCst), 1);
    assert!(module.engine().unwrap().loads.lock().is_empty());
    assert!(exports.received().is_empty());
    assert_eq!(module.state(), ModuleState::Uninitialized);

    // A later good load reuses the same instance.
    module.load_config(b"good", args(&[])).unwrap();
    assert_eq!(factory.constructed.load(Ordering::SeqCst), 1);
    assert_eq!(module.state(), ModuleState::Configured);
}

#[test]
fn engine_load_error_is_returned_verbatim() {
    let (module, _, _) = new_module(controller_options());

    let err = module.load_config(b"reject", args(&[])).unwrap_err();
    assert!(matches!(err, ModuleError::Load(_)));
    assert_eq!(err.to_string(), "component \"reject\" does not exist");
    assert_eq!(module.state(), ModuleState::Uninitialized);
}

#[test]
fn engine_exports_reach_module_callback() {
    let (module, _, exports) = new_module(controller_options());

    module.load_config(b"one", args(&[])).unwrap();
    module.load_config(b"two", args(&[])).unwrap();

    let received = exports.received();
    assert_eq!(received.len(), 2);
    assert_eq!(received[0]["source"], "one");
    assert_eq!(received[1]["source"], "two");
}

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn controller_options_are_forwarded_to_engine() {
    let capture = Capture::default();
    let logger = Arc::new(Logger::new(capture.clone(), LogOptions::default()).unwrap());
    let clusterer: Opaque = Arc::new("cluster-handle".to_owned());

    let (module, _, _) = new_module(ControllerOptions {
        logger: Some(Arc::clone(&logger)),
        clusterer: Some(Arc::clone(&clusterer)),
        ..controller_options()
    });
    module.load_config(b"cfg", args(&[])).unwrap();

    let engine = module.engine().unwrap();
    let opts = &engine.options;
    assert_eq!(opts.controller_id, "outer");
    assert_eq!(opts.controller.http_path_prefix, PATH_PREFIX);
    assert_eq!(opts.controller.http_listen_addr, "127.0.0.1:12345");
    assert_eq!(opts.controller.data_path, std::path::PathBuf::from("/tmp/flow/outer"));
    assert!(Arc::ptr_eq(opts.controller.logger.as_ref().unwrap(), &logger));
    assert!(Arc::ptr_eq(opts.controller.clusterer.as_ref().unwrap(), &clusterer));
    assert!(opts.controller.tracer_provider.is_none());

    let written = String::from_utf8(capture.0.lock().clone()).unwrap();
    assert!(written.contains("msg=\"config loaded\""), "{written}");
}

#[tokio::test]
async fn run_before_config_is_rejected() {
    let (module, _, _) = new_module(controller_options());
    let err = module.run(CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, ModuleError::NotConfigured));
    assert_eq!(module.state(), ModuleState::Uninitialized);
}

#[tokio::test]
async fn run_blocks_until_cancelled() {
    let (module, _, _) = new_module(controller_options());
    module.load_config(b"cfg", args(&[])).unwrap();
    let module = Arc::new(module);

    let cancel = CancellationToken::new();
    let handle = tokio::spawn({
        let module = Arc::clone(&module);
        let cancel = cancel.clone();
        async move { module.run(cancel).await }
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!handle.is_finished(), "run returned before cancellation");
    assert_eq!(module.state(), ModuleState::Running);
    assert_eq!(module.engine().unwrap().runs.load(Ordering::SeqCst), 1);

    // Hot reload while running keeps the module running.
    module.load_config(b"reloaded", args(&[])).unwrap();
    assert_eq!(module.state(), ModuleState::Running);

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("run returns promptly after cancellation")
        .unwrap()
        .unwrap();
    assert_eq!(module.state(), ModuleState::Stopped);

    let err = module.run(CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, ModuleError::AlreadyStarted));
}
