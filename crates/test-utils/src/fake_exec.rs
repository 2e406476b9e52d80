use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use assetforge::errors::Result;
use assetforge::exec::ExecBackend;

/// A fake exec backend that:
/// - records every command line it is asked to run
/// - reports a canned exit code without spawning anything.
pub struct FakeExecBackend {
    executed: Arc<Mutex<Vec<String>>>,
    exit_code: i32,
}

impl FakeExecBackend {
    /// Backend where every command "succeeds".
    pub fn new() -> Self {
        Self {
            executed: Arc::new(Mutex::new(Vec::new())),
            exit_code: 0,
        }
    }

    /// Backend where every command exits with `code`.
    pub fn failing(code: i32) -> Self {
        Self {
            executed: Arc::new(Mutex::new(Vec::new())),
            exit_code: code,
        }
    }

    /// Snapshot of the command lines run so far.
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

impl Default for FakeExecBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecBackend for FakeExecBackend {
    fn run<'a>(
        &'a self,
        command_line: &'a str,
        _use_shell: bool,
    ) -> Pin<Box<dyn Future<Output = Result<i32>> + Send + 'a>> {
        let executed = Arc::clone(&self.executed);
        let line = command_line.to_string();
        let code = self.exit_code;

        Box::pin(async move {
            executed.lock().unwrap().push(line);
            Ok(code)
        })
    }
}
