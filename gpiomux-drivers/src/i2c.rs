//! I2C (BSC) master handle
//!
//! The I2C object claims the full register window when it is created. It
//! can start right away on a pin set or wait for `begin`.

use embedded_hal::i2c::{self as hal_i2c, ErrorType, Operation};
use gpiomux_core::{ArgumentFault, Error, PeripheralKind, Result};
use gpiomux_hal::{Driver, I2cConfig, PinSet};

use crate::board::{Board, Release};

impl<D: Driver> Board<D> {
    /// Create an I2C master and start it on `pins`
    pub fn i2c(&self, pins: PinSet) -> Result<I2c<D>> {
        let mut i2c = self.i2c_deferred()?;
        i2c.begin_with(pins)?;
        Ok(i2c)
    }

    /// Create an I2C master without starting it
    pub fn i2c_deferred(&self) -> Result<I2c<D>> {
        let session = self.with(|st| -> Result<u32> {
            st.claim(PeripheralKind::I2c)?;
            Ok(st.session)
        })?;
        Ok(I2c {
            board: self.clone(),
            session,
            pins: None,
            slave: None,
        })
    }
}

/// I2C master
///
/// Stopped automatically when dropped.
pub struct I2c<D: Driver> {
    board: Board<D>,
    session: u32,
    pins: Option<PinSet>,
    slave: Option<u8>,
}

impl<D: Driver> I2c<D> {
    /// Pin set in use while started
    pub fn pins(&self) -> Option<PinSet> {
        self.pins
    }

    /// Selected slave address
    pub fn slave(&self) -> Option<u8> {
        self.slave
    }

    /// True between `begin` and `end`
    pub fn is_started(&self) -> bool {
        self.pins.is_some() && self.board.session() == self.session
    }

    fn ensure_started(&self) -> Result<()> {
        if self.is_started() {
            Ok(())
        } else {
            Err(Error::NotStarted(PeripheralKind::I2c))
        }
    }

    /// Start on SDA1/SCL1 (header pins 3 and 5)
    pub fn begin(&mut self) -> Result<()> {
        self.begin_with(PinSet::Sda1Scl1)
    }

    /// Start on the given pin set
    pub fn begin_with(&mut self, pins: PinSet) -> Result<()> {
        let joining = !self.is_started();
        let session = self.board.with(|st| -> Result<u32> {
            st.claim(PeripheralKind::I2c)?;
            st.driver.i2c_start(pins);
            if joining {
                st.i2c_users += 1;
            }
            Ok(st.session)
        })?;
        log::debug!("I2C started on {:?}", pins);
        self.session = session;
        self.pins = Some(pins);
        Ok(())
    }

    /// Start on pin set 0 (SDA0/SCL0) or 1 (SDA1/SCL1)
    pub fn begin_index(&mut self, index: u8) -> Result<()> {
        let pins = PinSet::from_index(index).ok_or(Error::InvalidArgument(ArgumentFault::PinSet))?;
        self.begin_with(pins)
    }

    /// Set the bus speed in bits per second
    ///
    /// The divider is the core clock divided by `baud`.
    pub fn set_baud_rate(&mut self, baud: u32) -> Result<()> {
        self.ensure_started()?;
        if baud == 0 {
            return Err(ArgumentFault::BaudRate.into());
        }
        let clock = self.board.model().core_clock_hz();
        let divider = u16::try_from(clock / baud)
            .ok()
            .filter(|&div| div > 0)
            .ok_or(Error::InvalidArgument(ArgumentFault::ClockDivider))?;
        self.board
            .with(|st| st.driver.i2c_set_clock_divider(divider));
        log::info!("I2C data rate: {} kHz", baud / 1000);
        Ok(())
    }

    /// Set the bus speed from a preset such as [`I2cConfig::FAST`]
    pub fn set_bus_speed(&mut self, config: I2cConfig) -> Result<()> {
        self.set_baud_rate(config.frequency)
    }

    /// Set the raw clock divider
    pub fn set_clock_divider(&mut self, divider: u16) -> Result<()> {
        self.ensure_started()?;
        if divider == 0 {
            return Err(ArgumentFault::ClockDivider.into());
        }
        let clock = self.board.model().core_clock_hz();
        self.board
            .with(|st| st.driver.i2c_set_clock_divider(divider));
        log::info!(
            "I2C data rate: {} kHz (div {})",
            clock / u32::from(divider) / 1000,
            divider
        );
        Ok(())
    }

    /// Select the 7-bit slave address
    pub fn select_slave(&mut self, address: u8) -> Result<()> {
        self.ensure_started()?;
        if address > 0x7F {
            return Err(ArgumentFault::SlaveAddress.into());
        }
        self.board.with(|st| st.driver.i2c_select_slave(address));
        self.slave = Some(address);
        Ok(())
    }

    /// Read `len` bytes into the front of `buf`
    pub fn read(&mut self, buf: &mut [u8], len: usize) -> Result<()> {
        self.ensure_started()?;
        if len > buf.len() {
            return Err(Error::BufferTooSmall {
                requested: len,
                capacity: buf.len(),
            });
        }
        self.board
            .with(|st| st.driver.i2c_read(&mut buf[..len]))
            .map_err(Error::Bus)
    }

    /// Write the first `len` bytes of `buf`
    pub fn write(&mut self, buf: &[u8], len: usize) -> Result<()> {
        self.ensure_started()?;
        if len > buf.len() {
            return Err(Error::BufferTooSmall {
                requested: len,
                capacity: buf.len(),
            });
        }
        self.board
            .with(|st| st.driver.i2c_write(&buf[..len]))
            .map_err(Error::Bus)
    }

    /// Read a single byte
    pub fn read_byte(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.read(&mut byte, 1)?;
        Ok(byte[0])
    }

    /// Stop using the controller
    ///
    /// The controller stops and its pins return to input once the last
    /// started handle ends. The full access mode stays committed. Ending
    /// twice is harmless.
    pub fn end(&mut self) {
        if self.pins.take().is_some() {
            self.board.release(Release::I2c {
                session: self.session,
            });
        }
    }
}

impl<D: Driver> Drop for I2c<D> {
    fn drop(&mut self) {
        self.end();
    }
}

impl<D: Driver> ErrorType for I2c<D> {
    type Error = Error;
}

impl<D: Driver> hal_i2c::I2c for I2c<D> {
    fn transaction(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<()> {
        self.select_slave(address)?;
        for op in operations {
            match op {
                Operation::Read(buf) => {
                    let len = buf.len();
                    I2c::read(self, buf, len)?;
                }
                Operation::Write(bytes) => I2c::write(self, bytes, bytes.len())?,
            }
        }
        Ok(())
    }
}
