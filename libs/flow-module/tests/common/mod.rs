#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

//! Test doubles for the nested engine and the config parser.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::http::Uri;
use axum::routing::get;
use flow_module::{
    Args, ConfigParser, ControllerOptions, Engine, EngineFactory, EngineOptions, Exports,
    ExportFn, Module, ModuleOptions,
};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

pub const PATH_PREFIX: &str = "/api/v0/component/outer/";

/// Engine double that records every call made by the controller.
pub struct RecordingEngine {
    pub options: EngineOptions,
    pub loads: Mutex<Vec<(String, Args)>>,
    pub runs: AtomicUsize,
}

#[async_trait]
impl Engine for RecordingEngine {
    type Source = String;

    fn load_file(&self, source: String, args: Args) -> anyhow::Result<()> {
        if source.contains("reject") {
            anyhow::bail!("component \"reject\" does not exist");
        }

        if let Some(logger) = &self.options.controller.logger {
            logger.log(&[("msg", json!("config loaded"))])?;
        }

        let mut exports = Exports::new();
        exports.insert("source".to_owned(), Value::String(source.clone()));
        self.loads.lock().push((source, args));
        (self.options.on_exports_change)(&exports);
        Ok(())
    }

    async fn run(&self, cancel: CancellationToken) {
        self.runs.fetch_add(1, Ordering::SeqCst);
        cancel.cancelled().await;
    }

    fn component_handler(&self) -> Router {
        Router::new().fallback(|uri: Uri| async move { format!("component:{uri}") })
    }

    fn api_router(&self) -> Router {
        let id = self.options.controller_id.clone();
        Router::new().route(
            "/components",
            get(move || {
                let id = id.clone();
                async move { format!("components of {id}") }
            }),
        )
    }
}

/// Factory double counting constructions.
#[derive(Default, Clone)]
pub struct CountingFactory {
    pub constructed: Arc<AtomicUsize>,
}

impl EngineFactory for CountingFactory {
    type Engine = RecordingEngine;

    fn construct(&self, options: EngineOptions) -> RecordingEngine {
        self.constructed.fetch_add(1, Ordering::SeqCst);
        RecordingEngine {
            options,
            loads: Mutex::new(Vec::new()),
            runs: AtomicUsize::new(0),
        }
    }
}

/// Parser double: any UTF-8 text parses unless it contains "syntax error".
pub struct TextParser;

impl ConfigParser for TextParser {
    type Source = String;

    fn parse(&self, id: &str, raw: &[u8]) -> anyhow::Result<String> {
        let text = std::str::from_utf8(raw)?;
        if text.contains("syntax error") {
            anyhow::bail!("{id}:1:1: syntax error");
        }
        Ok(text.to_owned())
    }
}

pub type TestModule = Module<CountingFactory, TextParser>;

/// Captures exports delivered to the module's callback.
#[derive(Default, Clone)]
pub struct ExportSink(pub Arc<Mutex<Vec<Exports>>>);

impl ExportSink {
    pub fn callback(&self) -> ExportFn {
        let sink = Arc::clone(&self.0);
        Arc::new(move |exports: &Exports| sink.lock().push(exports.clone()))
    }

    pub fn received(&self) -> Vec<Exports> {
        self.0.lock().clone()
    }
}

pub fn controller_options() -> ControllerOptions {
    ControllerOptions {
        data_path: "/tmp/flow/outer".into(),
        http_listen_addr: "127.0.0.1:12345".to_owned(),
        http_path_prefix: PATH_PREFIX.to_owned(),
        ..ControllerOptions::default()
    }
}

pub fn new_module(controller: ControllerOptions) -> (TestModule, CountingFactory, ExportSink) {
    let factory = CountingFactory::default();
    let exports = ExportSink::default();
    let module = Module::new(
        ModuleOptions::new("outer", exports.callback(), controller),
        factory.clone(),
        TextParser,
    );
    (module, factory, exports)
}

pub fn args(pairs: &[(&str, Value)]) -> Args {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), v.clone()))
        .collect()
}
