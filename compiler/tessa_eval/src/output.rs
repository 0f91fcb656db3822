//! Output handler for statement results and error reports.
//!
//! Results go either to the process streams or into a buffer that tests
//! read back. Enum dispatch keeps the common path free of vtables.

#![expect(
    clippy::disallowed_types,
    reason = "Arc shares one handler between the config and its callers"
)]

use std::sync::Arc;

use parking_lot::Mutex;

/// Where results and error reports are written.
pub enum OutputHandler {
    /// Results to stdout, error reports to stderr.
    Stdout,
    /// Everything captured, in order, into one buffer.
    Buffer(Mutex<String>),
}

impl OutputHandler {
    /// Write a result block. Echo forms carry their own line endings.
    pub fn print(&self, text: &str) {
        match self {
            Self::Stdout => print!("{text}"),
            Self::Buffer(buf) => buf.lock().push_str(text),
        }
    }

    /// Write one error report line.
    pub fn report_error(&self, message: &str) {
        match self {
            Self::Stdout => eprintln!("error: {message}"),
            Self::Buffer(buf) => {
                let mut buf = buf.lock();
                buf.push_str("error: ");
                buf.push_str(message);
                buf.push('\n');
            }
        }
    }

    /// Captured text. Always empty for [`OutputHandler::Stdout`].
    pub fn captured(&self) -> String {
        match self {
            Self::Stdout => String::new(),
            Self::Buffer(buf) => buf.lock().clone(),
        }
    }

    /// Drop captured text.
    pub fn clear(&self) {
        if let Self::Buffer(buf) = self {
            buf.lock().clear();
        }
    }
}

/// Handler shared between an [`EvalConfig`](crate::EvalConfig) and its
/// owner.
pub type SharedOutput = Arc<OutputHandler>;

pub fn stdout_output() -> SharedOutput {
    Arc::new(OutputHandler::Stdout)
}

pub fn buffer_output() -> SharedOutput {
    Arc::new(OutputHandler::Buffer(Mutex::new(String::new())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_keeps_results_and_errors_in_order() {
        let out = buffer_output();
        out.print("x = 1\n");
        out.report_error("'y' undefined");
        out.print("z = 2\n");
        assert_eq!(out.captured(), "x = 1\nerror: 'y' undefined\nz = 2\n");
        out.clear();
        assert_eq!(out.captured(), "");
    }

    #[test]
    fn stdout_captures_nothing() {
        let out = stdout_output();
        assert_eq!(out.captured(), "");
    }
}
