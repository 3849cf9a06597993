// std imports
use std::sync::Mutex;

// local imports
use crate::closers::{Closers, Peripheral, Shutdown, registry};
use crate::error::*;

// ---

/// Shutdown handle. Signals are not intercepted on this platform,
/// so the sequence runs only through [`CloseHandler::close_now`].
pub struct CloseHandler {
    shutdown: Shutdown,
}

impl CloseHandler {
    pub(crate) fn new(extra: Vec<Box<dyn Peripheral>>, registry: &'static Mutex<Closers>) -> Result<Self> {
        Ok(Self {
            shutdown: Shutdown::new(extra, registry),
        })
    }

    pub fn wait(&self) {
        self.shutdown.wait()
    }

    pub fn is_done(&self) -> bool {
        self.shutdown.is_done()
    }

    pub fn close_now(&self) {
        self.shutdown.run()
    }
}

pub fn setup_close_handler(extra: Vec<Box<dyn Peripheral>>) -> Result<CloseHandler> {
    CloseHandler::new(extra, registry())
}

pub fn setup_close_handler_and_wait(extra: Vec<Box<dyn Peripheral>>) -> Result<()> {
    setup_close_handler(extra)?.wait();
    Ok(())
}
