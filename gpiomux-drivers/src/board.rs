//! Board context
//!
//! Process root for pin and peripheral arbitration. Construction of any
//! handle flows through here:
//!
//! ```text
//! translate ──► claim access mode ──► register pin ──► configure driver
//! ```
//!
//! The context sits behind `Rc<RefCell<..>>`. User callbacks never run
//! while it is borrowed; handles dropped while it is borrowed (from inside
//! a callback being released, for example) queue their release and it is
//! applied as soon as the borrow ends.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use gpiomux_core::scheduler::{edge_callback, Dispatch, Owner, PinLevels, WatchOrigin};
use gpiomux_core::{
    AccessMode, BoardModel, Claim, DuplicateCheck, Edge, Error, GpioOptions, ModeArbiter,
    PeripheralKind, PinRegistry, PinTranslator, Result, Scheduler,
};
use gpiomux_hal::{Direction, Driver, ExportProbe, GpioRegisters, NoProbe, Pull};

use crate::pwm::PwmTracker;

/// Board-wide configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoardConfig {
    /// Detected or configured board model
    pub model: BoardModel,
    /// Defaults for pins opened without explicit options
    pub gpio: GpioOptions,
}

/// Deferred release of a handle's resources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Release {
    Pin {
        session: u32,
        owner: Owner,
        header: u8,
        bcm: u8,
        direction: Direction,
    },
    Pwm {
        session: u32,
        header: u8,
        bcm: u8,
    },
    I2c {
        session: u32,
    },
    Spi {
        session: u32,
    },
}

impl Release {
    fn session(self) -> u32 {
        match self {
            Release::Pin { session, .. }
            | Release::Pwm { session, .. }
            | Release::I2c { session }
            | Release::Spi { session } => session,
        }
    }
}

pub(crate) struct BoardState<D> {
    pub(crate) driver: D,
    probe: Box<dyn ExportProbe>,
    pub(crate) translator: PinTranslator,
    pub(crate) arbiter: ModeArbiter,
    pub(crate) registry: PinRegistry,
    pub(crate) scheduler: Scheduler,
    pub(crate) pwm: PwmTracker,
    pub(crate) model: BoardModel,
    pub(crate) defaults: GpioOptions,
    pub(crate) now_ms: u64,
    /// Bumped by shutdown; handles from an older session are dead
    pub(crate) session: u32,
    next_owner: u32,
    /// Started I2C handles sharing the controller
    pub(crate) i2c_users: u32,
    /// Started SPI handles sharing the controller
    pub(crate) spi_users: u32,
}

impl<D: Driver> BoardState<D> {
    /// Make sure the register window for `kind` is open
    pub(crate) fn claim(&mut self, kind: PeripheralKind) -> Result<()> {
        if let Claim::Latched(window) = self.arbiter.check(kind)? {
            self.driver.open_window(window).map_err(|fault| {
                log::error!("cannot open {:?} register window: {}", window, fault.reason());
                Error::HardwareAccess(fault)
            })?;
            self.arbiter.latch(kind);
            log::info!("{:?} register window open for {}", window, kind);
        }
        Ok(())
    }

    /// Allocate the owner token for a new pin handle
    pub(crate) fn next_owner(&mut self) -> Owner {
        self.next_owner = self.next_owner.wrapping_add(1).max(1);
        Owner(self.next_owner)
    }

    /// Open a digital pin; returns its controller pin
    pub(crate) fn open_pin(
        &mut self,
        header: u8,
        direction: Direction,
        options: &GpioOptions,
    ) -> Result<u8> {
        let bcm = self.translator.translate(header)?;
        self.claim(PeripheralKind::Gpio)?;
        let check = options.duplicate_check.unwrap_or(self.registry.check());
        self.registry.register_with(header, direction, check)?;
        self.probe_export(header, bcm);

        self.driver.configure(bcm, direction);
        match direction {
            Direction::Input => self.driver.set_pull(bcm, options.pull),
            Direction::Output => {
                self.driver.write_level(bcm, false);
                if options.initial_level {
                    self.driver.write_level(bcm, true);
                }
            }
        }
        log::debug!("pin {} (GPIO{}) open as {:?}", header, bcm, direction);
        Ok(bcm)
    }

    fn probe_export(&self, header: u8, bcm: u8) {
        match self.probe.is_exported(bcm) {
            Ok(true) => log::warn!(
                "pin {} (GPIO{}) is exported through sysfs, another program may be using it",
                header,
                bcm
            ),
            Ok(false) => {}
            Err(_) => log::debug!("sysfs export check failed for GPIO{}", bcm),
        }
    }

    fn release(&mut self, release: Release) {
        if release.session() != self.session {
            return;
        }
        match release {
            Release::Pin {
                owner,
                header,
                bcm,
                direction,
                ..
            } => {
                self.scheduler.cancel_owner(owner);
                self.registry.unregister_as(header, direction);
                if !self.registry.contains(header) {
                    // Last handle gone, drop the `watch_all` entry too
                    self.scheduler.cancel_pin(header);
                    self.driver.configure(bcm, Direction::Input);
                    self.driver.set_pull(bcm, Pull::None);
                }
                log::debug!("pin {} closed", header);
            }
            Release::Pwm { header, bcm, .. } => {
                self.pwm.close(header);
                self.driver.pwm_enable(bcm, false);
                self.driver.pwm_set_range(bcm, 0);
                self.driver.pwm_set_data(bcm, 0);
                if self.pwm.is_empty() {
                    self.driver.pwm_reset();
                }
                self.driver.configure(bcm, Direction::Input);
                log::debug!("PWM pin {} closed", header);
            }
            Release::I2c { .. } => {
                self.i2c_users = self.i2c_users.saturating_sub(1);
                if self.i2c_users == 0 {
                    self.driver.i2c_stop();
                    log::debug!("I2C stopped");
                }
            }
            Release::Spi { .. } => {
                self.spi_users = self.spi_users.saturating_sub(1);
                if self.spi_users == 0 {
                    self.driver.spi_stop();
                    log::debug!("SPI stopped");
                }
            }
        }
    }

    fn poll(&mut self) -> Vec<Dispatch> {
        let mut levels = Levels {
            driver: &mut self.driver,
            translator: &mut self.translator,
        };
        self.scheduler.poll(self.now_ms, &mut levels)
    }
}

/// Scheduler view of the driver, by header pin
struct Levels<'a, D> {
    driver: &'a mut D,
    translator: &'a mut PinTranslator,
}

impl<D: GpioRegisters> PinLevels for Levels<'_, D> {
    fn level(&mut self, pin: u8) -> bool {
        match self.translator.translate(pin) {
            Ok(bcm) => self.driver.read_level(bcm),
            Err(_) => false,
        }
    }

    fn drive(&mut self, pin: u8, high: bool) {
        if let Ok(bcm) = self.translator.translate(pin) {
            self.driver.write_level(bcm, high);
        }
    }
}

struct BoardInner<D> {
    state: RefCell<BoardState<D>>,
    pending: RefCell<Vec<Release>>,
}

/// Shared board context
pub struct Board<D: Driver> {
    inner: Rc<BoardInner<D>>,
}

impl<D: Driver> Clone for Board<D> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<D: Driver> Board<D> {
    /// Create a board context with default configuration
    pub fn new(driver: D) -> Self {
        let state = BoardState {
            driver,
            probe: Box::new(NoProbe),
            translator: PinTranslator::new(),
            arbiter: ModeArbiter::new(),
            registry: PinRegistry::new(DuplicateCheck::default()),
            scheduler: Scheduler::new(),
            pwm: PwmTracker::default(),
            model: BoardModel::default(),
            defaults: GpioOptions::default(),
            now_ms: 0,
            session: 0,
            next_owner: 0,
            i2c_users: 0,
            spi_users: 0,
        };
        Self {
            inner: Rc::new(BoardInner {
                state: RefCell::new(state),
                pending: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Create a board context with explicit configuration
    ///
    /// Fails if the default poll interval is zero.
    pub fn with_config(driver: D, config: BoardConfig) -> Result<Self> {
        let board = Self::new(driver);
        board.with(|st| -> Result<()> {
            if let Some(ms) = config.gpio.poll_interval_ms {
                st.scheduler.set_default_interval(ms)?;
            }
            st.registry
                .set_check(config.gpio.duplicate_check.unwrap_or_default());
            st.model = config.model;
            st.defaults = config.gpio;
            Ok(())
        })?;
        Ok(board)
    }

    /// Install a sysfs export probe
    pub fn with_probe(self, probe: impl ExportProbe + 'static) -> Self {
        self.with(|st| st.probe = Box::new(probe));
        self
    }

    /// Run `f` on the context, then apply releases queued meanwhile
    pub(crate) fn with<R>(&self, f: impl FnOnce(&mut BoardState<D>) -> R) -> R {
        let result = {
            let mut state = self.inner.state.borrow_mut();
            f(&mut state)
        };
        self.flush();
        result
    }

    /// Release a handle's resources now, or as soon as the context is free
    pub(crate) fn release(&self, release: Release) {
        self.inner.pending.borrow_mut().push(release);
        self.flush();
    }

    fn flush(&self) {
        loop {
            let next = self.inner.pending.borrow_mut().pop();
            let Some(release) = next else { break };
            match self.inner.state.try_borrow_mut() {
                Ok(mut state) => state.release(release),
                Err(_) => {
                    self.inner.pending.borrow_mut().push(release);
                    break;
                }
            }
        }
    }

    pub(crate) fn session(&self) -> u32 {
        self.inner.state.borrow().session
    }

    /// Board model in use
    pub fn model(&self) -> BoardModel {
        self.inner.state.borrow().model
    }

    /// Committed access mode
    pub fn mode(&self) -> AccessMode {
        self.inner.state.borrow().arbiter.mode()
    }

    /// Default options for pins opened without explicit ones
    pub fn defaults(&self) -> GpioOptions {
        self.inner.state.borrow().defaults
    }

    /// True if at least one handle has `pin` open
    pub fn is_open(&self, pin: u8) -> bool {
        self.inner.state.borrow().registry.contains(pin)
    }

    /// Number of open digital pin handles
    pub fn open_pin_count(&self) -> usize {
        self.inner.state.borrow().registry.len()
    }

    /// Current virtual time in milliseconds
    pub fn now_ms(&self) -> u64 {
        self.inner.state.borrow().now_ms
    }

    /// Earliest time the scheduler has work
    pub fn next_deadline(&self) -> Option<u64> {
        let state = self.inner.state.borrow();
        state.scheduler.next_deadline(state.now_ms)
    }

    /// Advance the virtual clock by `ms`, running every pass due meanwhile
    ///
    /// Returns the number of callbacks run.
    pub fn advance(&self, ms: u64) -> usize {
        let target = self.now_ms() + ms;
        self.advance_to(target)
    }

    /// Advance the virtual clock to `target` milliseconds
    pub fn advance_to(&self, target: u64) -> usize {
        let mut ran = 0;
        loop {
            let pass = self.with(|st| match st.scheduler.next_deadline(st.now_ms) {
                Some(due) if due <= target => {
                    st.now_ms = st.now_ms.max(due);
                    Some(st.poll())
                }
                _ => {
                    st.now_ms = st.now_ms.max(target);
                    None
                }
            });
            let Some(dispatches) = pass else { break };
            ran += dispatches.len();
            for dispatch in dispatches {
                dispatch.run();
            }
        }
        ran
    }

    /// Watch every open input pin with one shared callback
    ///
    /// Replaces any watch already on those pins. Returns the number of
    /// pins armed.
    pub fn watch_all(
        &self,
        edge: Edge,
        interval_ms: Option<u32>,
        callback: impl FnMut(bool, u8) + 'static,
    ) -> Result<usize> {
        let callback = edge_callback(callback);
        self.with(|st| -> Result<usize> {
            let interval = st.scheduler.resolve_interval(interval_ms)?;
            let now = st.now_ms;
            let mut armed = 0;
            for pin in st.registry.inputs() {
                let bcm = st.translator.translate(pin)?;
                let initial = st.driver.read_level(bcm);
                st.scheduler.arm(
                    now,
                    pin,
                    Owner::BOARD,
                    edge,
                    Some(interval),
                    initial,
                    WatchOrigin::Aggregate,
                    callback.clone(),
                )?;
                armed += 1;
            }
            Ok(armed)
        })
    }

    /// Remove every watch armed by `watch_all`
    pub fn unwatch_all(&self) -> usize {
        self.with(|st| st.scheduler.unwatch_aggregate())
    }

    /// Forget the committed access mode
    ///
    /// For test harnesses. The register window stays mapped; the next
    /// claim maps it again for whichever kind comes first.
    pub fn reset_arbitration(&self) {
        self.with(|st| {
            st.arbiter.reset();
            log::warn!("access mode arbitration reset");
        });
    }

    /// Close everything and unmap the register window
    ///
    /// Pending timers and watches are cancelled, open pins return to
    /// floating inputs and running peripherals are stopped. Handles still
    /// alive afterwards report themselves closed.
    pub fn shutdown(&self) {
        self.with(|st| {
            st.scheduler.clear();
            let entries: Vec<(u8, Direction)> = st.registry.iter().collect();
            for (header, _) in entries {
                if let Ok(bcm) = st.translator.translate(header) {
                    st.driver.configure(bcm, Direction::Input);
                    st.driver.set_pull(bcm, Pull::None);
                }
            }
            st.registry.clear();
            if !st.pwm.is_empty() {
                st.pwm.clear();
                st.driver.pwm_reset();
            }
            if st.i2c_users > 0 {
                st.driver.i2c_stop();
                st.i2c_users = 0;
            }
            if st.spi_users > 0 {
                st.driver.spi_stop();
                st.spi_users = 0;
            }
            st.driver.close_window();
            st.arbiter.reset();
            st.session = st.session.wrapping_add(1);
            log::info!("board shut down");
        });
    }
}
