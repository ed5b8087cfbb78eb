use std::sync::{Arc, Mutex, PoisonError};

/// Where the inspection output of a flow goes.
pub trait Console: Send + Sync + 'static {
    /// Writes `line` followed by a newline.
    fn println(&self, line: &str);
}

/// Writes to the process's standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stdout;

impl Console for Stdout {
    fn println(&self, line: &str) {
        println!("{line}");
    }
}

/// Collects the output in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    inner: Arc<Mutex<String>>,
}

impl Buffer {
    /// Everything written so far.
    pub fn contents(&self) -> String {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Console for Buffer {
    fn println(&self, line: &str) {
        let mut buffer = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        buffer.push_str(line);
        buffer.push('\n');
    }
}
