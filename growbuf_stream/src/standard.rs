use std::sync::{Mutex, PoisonError};

use embedded_io_adapters::std::FromStd;

use crate::ios_base::{FormatState, IosBase};
use crate::ostream::Ostream;

static STDOUT_STATE: Mutex<IosBase> = Mutex::new(IosBase::new());
static STDERR_STATE: Mutex<IosBase> = Mutex::new(IosBase::new());

/// Formatting state shared by every handle to one standard stream.
///
/// The lock is held only while a value is read or written back, so several
/// handles may be alive at once.
#[derive(Debug, Clone, Copy)]
pub struct SharedState(&'static Mutex<IosBase>);

impl FormatState for SharedState {
    fn load(&self) -> IosBase {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn store(&mut self, ios: IosBase) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = ios;
    }
}

pub type StdoutStream = Ostream<FromStd<std::io::Stdout>, SharedState>;
pub type StderrStream = Ostream<FromStd<std::io::Stderr>, SharedState>;

/// A handle to the process standard output.
///
/// Precision and width are process-wide: a value set through one handle is
/// seen by every later `stdout()` call.
#[must_use]
pub fn stdout() -> StdoutStream {
    Ostream::with_state(FromStd::new(std::io::stdout()), SharedState(&STDOUT_STATE))
}

/// A handle to the process standard error, with its own process-wide state.
#[must_use]
pub fn stderr() -> StderrStream {
    Ostream::with_state(FromStd::new(std::io::stderr()), SharedState(&STDERR_STATE))
}
