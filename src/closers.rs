//! Shutdown hooks: peripherals and close functions run once on exit.

// std imports
use std::mem;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

// local imports
use crate::error::Result;

pub use crate::signal::{CloseHandler, setup_close_handler, setup_close_handler_and_wait};

// ---

/// Something that holds resources and must be closed on shutdown,
/// e.g. a connection pool.
pub trait Peripheral: Send {
    fn close(&mut self);
}

/// A [`Peripheral`] that has to be opened before use.
pub trait Infrastructure: Peripheral {
    fn open(&mut self) -> Result<()>;
}

// ---

/// A simple host for peripherals, closing all of them at once.
#[derive(Default)]
pub struct Basic {
    peripherals: Vec<Box<dyn Peripheral>>,
}

impl Basic {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_peripheral(&mut self, peripheral: impl Peripheral + 'static) {
        self.peripherals.push(Box::new(peripheral));
    }

    pub fn len(&self) -> usize {
        self.peripherals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peripherals.is_empty()
    }
}

impl Peripheral for Basic {
    /// Closes all peripherals and forgets them.
    fn close(&mut self) {
        for mut p in self.peripherals.drain(..) {
            p.close();
        }
    }
}

// ---

struct CloseFns(Vec<Box<dyn FnMut() + Send>>);

impl Peripheral for CloseFns {
    fn close(&mut self) {
        for f in &mut self.0 {
            f();
        }
    }
}

/// Registry of peripherals closed in registration order, at most once.
#[derive(Default)]
pub struct Closers {
    closers: Vec<Box<dyn Peripheral>>,
    closed: bool,
}

impl Closers {
    pub const fn new() -> Self {
        Self {
            closers: Vec::new(),
            closed: false,
        }
    }

    pub fn register_peripheral(&mut self, peripheral: impl Peripheral + 'static) {
        self.closers.push(Box::new(peripheral));
    }

    /// Registers plain functions to be called on close, as a single entry.
    pub fn register_close_fns<I, F>(&mut self, fns: I)
    where
        I: IntoIterator<Item = F>,
        F: FnMut() + Send + 'static,
    {
        let fns = fns.into_iter().map(|f| Box::new(f) as Box<dyn FnMut() + Send>).collect();
        self.closers.push(Box::new(CloseFns(fns)));
    }

    pub fn len(&self) -> usize {
        self.closers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closers.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Closes all registered peripherals. Subsequent calls do nothing.
    pub fn close(&mut self) {
        for mut c in self.take() {
            c.close();
        }
    }

    fn take(&mut self) -> Vec<Box<dyn Peripheral>> {
        if mem::replace(&mut self.closed, true) {
            return Vec::new();
        }
        mem::take(&mut self.closers)
    }
}

impl Peripheral for Closers {
    fn close(&mut self) {
        Closers::close(self)
    }
}

// ---

static CLOSERS: Mutex<Closers> = Mutex::new(Closers::new());

pub(crate) fn registry() -> &'static Mutex<Closers> {
    &CLOSERS
}

fn lock(registry: &Mutex<Closers>) -> MutexGuard<'_, Closers> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Adds a peripheral to the process-wide registry.
pub fn register_peripheral(peripheral: impl Peripheral + 'static) {
    lock(&CLOSERS).register_peripheral(peripheral)
}

/// Adds close functions to the process-wide registry.
pub fn register_close_fns<I, F>(fns: I)
where
    I: IntoIterator<Item = F>,
    F: FnMut() + Send + 'static,
{
    lock(&CLOSERS).register_close_fns(fns)
}

/// Closes everything in the process-wide registry, once.
pub fn close() {
    close_registry(&CLOSERS)
}

/// Returns the number of entries in the process-wide registry.
pub fn closers_count() -> usize {
    lock(&CLOSERS).len()
}

fn close_registry(registry: &Mutex<Closers>) {
    // Peripherals run without the lock held so they may register more.
    let closers = lock(registry).take();
    for mut c in closers {
        c.close();
    }
}

// ---

/// Shutdown sequence shared by the signal handler and [`CloseHandler::close_now`].
pub(crate) struct Shutdown {
    extra: Mutex<Vec<Box<dyn Peripheral>>>,
    registry: &'static Mutex<Closers>,
    phase: Mutex<Phase>,
    cv: Condvar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Running,
    Done,
}

impl Shutdown {
    pub(crate) fn new(extra: Vec<Box<dyn Peripheral>>, registry: &'static Mutex<Closers>) -> Self {
        Self {
            extra: Mutex::new(extra),
            registry,
            phase: Mutex::new(Phase::Idle),
            cv: Condvar::new(),
        }
    }

    /// Closes the extra peripherals, then the registry, and wakes up waiters.
    ///
    /// Only the first caller runs the sequence, later callers wait for it to complete.
    pub(crate) fn run(&self) {
        {
            let mut phase = self.phase();
            if *phase != Phase::Idle {
                drop(phase);
                return self.wait();
            }
            *phase = Phase::Running;
        }

        let extra = mem::take(&mut *self.extra.lock().unwrap_or_else(PoisonError::into_inner));
        for mut p in extra {
            p.close();
        }
        close_registry(self.registry);

        *self.phase() = Phase::Done;
        self.cv.notify_all();
    }

    pub(crate) fn is_done(&self) -> bool {
        *self.phase() == Phase::Done
    }

    pub(crate) fn wait(&self) {
        let mut phase = self.phase();
        while *phase != Phase::Done {
            phase = self.cv.wait(phase).unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn phase(&self) -> MutexGuard<'_, Phase> {
        self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
