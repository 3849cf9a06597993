// std imports
use std::sync::Arc;
use std::thread::{JoinHandle, spawn};

// third-party imports
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::{Handle, Signals};

// local imports
use crate::closers::{Closers, Peripheral, Shutdown, registry};
use crate::error::*;

// ---

/// Runs the shutdown sequence on the first SIGINT or SIGTERM.
///
/// The extra peripherals are closed first, then the process-wide
/// [`closers`](crate::closers) registry. Dropping the handler stops
/// listening for signals.
pub struct CloseHandler {
    signals: Handle,
    shutdown: Arc<Shutdown>,
    thread: Option<JoinHandle<()>>,
}

impl CloseHandler {
    pub(crate) fn new(extra: Vec<Box<dyn Peripheral>>, registry: &'static std::sync::Mutex<Closers>) -> Result<Self> {
        let mut signals = Signals::new([SIGINT, SIGTERM])?;
        let handle = signals.handle();
        let shutdown = Arc::new(Shutdown::new(extra, registry));
        let sd = shutdown.clone();

        let thread = spawn(move || {
            if let Some(signal) = signals.forever().next() {
                log::debug!("received signal {}", signal);
                println!("\r- Ctrl+C pressed in Terminal");
                sd.run();
            }
        });

        Ok(Self {
            signals: handle,
            shutdown,
            thread: Some(thread),
        })
    }

    /// Blocks until the shutdown sequence has completed.
    pub fn wait(&self) {
        self.shutdown.wait()
    }

    pub fn is_done(&self) -> bool {
        self.shutdown.is_done()
    }

    /// Runs the shutdown sequence without waiting for a signal.
    pub fn close_now(&self) {
        self.shutdown.run()
    }
}

impl Drop for CloseHandler {
    fn drop(&mut self) {
        self.signals.close();
        if let Some(thread) = self.thread.take() {
            thread.join().ok();
        }
    }
}

/// Installs a [`CloseHandler`] closing `extra` and the global registry on Ctrl+C or SIGTERM.
pub fn setup_close_handler(extra: Vec<Box<dyn Peripheral>>) -> Result<CloseHandler> {
    CloseHandler::new(extra, registry())
}

/// Installs a [`CloseHandler`] and blocks until it has run.
pub fn setup_close_handler_and_wait(extra: Vec<Box<dyn Peripheral>>) -> Result<()> {
    setup_close_handler(extra)?.wait();
    Ok(())
}
