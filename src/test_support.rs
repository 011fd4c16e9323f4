//! Fakes shared by unit tests

use crate::errors::{FanCtrlError, Result};
use crate::runner::CommandRunner;
use crate::session::Notifier;
use futures_util::future::LocalBoxFuture;
use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;
use tokio::sync::Notify;
use tokio::task::LocalSet;

#[derive(Clone)]
enum Response {
    Output(String),
    Missing,
    Broken,
}

/// Scripted stand-in for the fan tools.
///
/// Unscripted commands behave like a missing executable.
#[derive(Default)]
pub struct FakeRunner {
    responses: RefCell<HashMap<Vec<String>, Response>>,
    gates: RefCell<HashMap<Vec<String>, Rc<Notify>>>,
    calls: RefCell<Vec<Vec<String>>>,
}

impl FakeRunner {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn respond(&self, argv: &[String], output: &str) {
        self.script(argv, Response::Output(output.to_string()));
    }

    /// Fail with a spawn error
    pub fn missing(&self, argv: &[String]) {
        self.script(argv, Response::Missing);
    }

    /// Fail with a communication error
    pub fn broken(&self, argv: &[String]) {
        self.script(argv, Response::Broken);
    }

    /// Hold every call of `argv` until the returned gate is notified
    pub fn gate(&self, argv: &[String]) -> Rc<Notify> {
        let gate = Rc::new(Notify::new());
        self.gates.borrow_mut().insert(argv.to_vec(), Rc::clone(&gate));
        gate
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self, argv: &[String]) -> usize {
        self.calls.borrow().iter().filter(|call| call.as_slice() == argv).count()
    }

    fn script(&self, argv: &[String], response: Response) {
        self.responses.borrow_mut().insert(argv.to_vec(), response);
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, argv: &[String], _input: Option<String>) -> LocalBoxFuture<'static, Result<String>> {
        self.calls.borrow_mut().push(argv.to_vec());
        let response = self
            .responses
            .borrow()
            .get(argv)
            .cloned()
            .unwrap_or(Response::Missing);
        let gate = self.gates.borrow().get(argv).cloned();
        let program = argv.first().cloned().unwrap_or_default();

        Box::pin(async move {
            if let Some(gate) = gate {
                gate.notified().await;
            }
            match response {
                Response::Output(output) => Ok(output),
                Response::Missing => Err(FanCtrlError::Spawn {
                    program,
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                }),
                Response::Broken => Err(FanCtrlError::Communication(std::io::Error::from(
                    std::io::ErrorKind::BrokenPipe,
                ))),
            }
        })
    }
}

/// Notifier that remembers what it was asked to show
#[derive(Default)]
pub struct RecordingNotifier {
    sent: RefCell<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, body: &str) {
        self.sent
            .borrow_mut()
            .push((title.to_string(), body.to_string()));
    }
}

/// Drive `future` inside a fresh `LocalSet` so it can `spawn_local`
pub async fn local<F: Future>(future: F) -> F::Output {
    LocalSet::new().run_until(future).await
}
