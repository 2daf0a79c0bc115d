/*++

Licensed under the Apache-2.0 license.

File Name:

    log.rs

Abstract:

    File contains a shared text log for unit tests, and a `log` facade
    backend that records warnings and errors raised by peripherals.

--*/
use std::{
    cell::{Ref, RefCell},
    fmt::Write,
    ops::Deref,
    rc::Rc,
    sync::Once,
};

/// Text buffer shared between clones, written through `&self`.
///
/// Fake collaborators and hooks write into their own clone and the test
/// asserts on the first handle.
///
/// * Example
///
/// ```
/// use gecko_emu_bus::testing::Log;
/// use std::fmt::Write;
///
/// let log = Log::new();
/// writeln!(log.clone().w(), "hfxo selected").unwrap();
/// assert!(log.contains("hfxo"));
/// assert_eq!("hfxo selected\n", log.take());
/// assert_eq!("", log.take());
/// ```
#[derive(Clone, Default)]
pub struct Log {
    buf: Rc<RefCell<String>>,
}

impl Log {
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrows the current contents.
    pub fn as_str(&self) -> (impl Deref<Target = str> + '_) {
        Ref::map(self.buf.borrow(), String::as_str)
    }

    /// Empties the log, returning what it held.
    pub fn take(&self) -> String {
        std::mem::take(&mut *self.buf.borrow_mut())
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.buf.borrow().contains(needle)
    }

    /// Writer for use with `write!()` and `writeln!()`.
    pub fn w(&self) -> (impl Write + '_) {
        LogWriter { buf: &self.buf }
    }
}

struct LogWriter<'a> {
    buf: &'a RefCell<String>,
}

impl Write for LogWriter<'_> {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        self.buf.borrow_mut().push_str(s);
        Ok(())
    }
}

thread_local! {
    static CAPTURE: RefCell<Option<Log>> = RefCell::new(None);
}

struct CaptureLogger;

impl ::log::Log for CaptureLogger {
    fn enabled(&self, _metadata: &::log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &::log::Record) {
        CAPTURE.with(|capture| {
            if let Some(log) = capture.borrow().as_ref() {
                let _ = writeln!(log.w(), "{} {}", record.level(), record.args());
            }
        });
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;

/// Records every `log` message emitted on the calling thread into the
/// returned [`Log`], one `LEVEL message` line per record.
///
/// Installs the capturing logger on first use. Each call replaces the
/// thread's previous capture buffer.
pub fn capture_logs() -> Log {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        if ::log::set_logger(&LOGGER).is_ok() {
            ::log::set_max_level(::log::LevelFilter::Trace);
        }
    });
    let log = Log::new();
    CAPTURE.with(|capture| *capture.borrow_mut() = Some(log.clone()));
    log
}
