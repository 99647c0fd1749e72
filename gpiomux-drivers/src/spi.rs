//! SPI0 master handle

use alloc::vec::Vec;

use embedded_hal::spi::{ErrorType, SpiBus};
use gpiomux_core::{ArgumentFault, Error, PeripheralKind, Result};
use gpiomux_hal::{Driver, Mode};

use crate::board::{Board, Release};

/// Largest SPI clock divider (written as 0)
pub const SPI_MAX_DIVIDER: u32 = 65_536;

impl<D: Driver> Board<D> {
    /// Create an SPI master and start it
    pub fn spi(&self) -> Result<Spi<D>> {
        let mut spi = self.spi_deferred()?;
        spi.begin()?;
        Ok(spi)
    }

    /// Create an SPI master without starting it
    pub fn spi_deferred(&self) -> Result<Spi<D>> {
        let session = self.with(|st| -> Result<u32> {
            st.claim(PeripheralKind::Spi)?;
            Ok(st.session)
        })?;
        Ok(Spi {
            board: self.clone(),
            session,
            active: false,
            mode: Mode::default(),
            divider: None,
            chip_select: 0,
        })
    }
}

fn check_len(len: usize, buf_len: usize) -> Result<()> {
    if len > buf_len {
        return Err(Error::BufferTooSmall {
            requested: len,
            capacity: buf_len,
        });
    }
    Ok(())
}

/// SPI master
///
/// Stopped automatically when dropped.
pub struct Spi<D: Driver> {
    board: Board<D>,
    session: u32,
    active: bool,
    mode: Mode,
    divider: Option<u32>,
    chip_select: u8,
}

impl<D: Driver> Spi<D> {
    /// Data mode in use
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Clock divider last set
    pub fn divider(&self) -> Option<u32> {
        self.divider
    }

    /// Selected chip select line
    pub fn chip_select_line(&self) -> u8 {
        self.chip_select
    }

    /// True between `begin` and `end`
    pub fn is_started(&self) -> bool {
        self.active && self.board.session() == self.session
    }

    fn ensure_started(&self) -> Result<()> {
        if self.is_started() {
            Ok(())
        } else {
            Err(Error::NotStarted(PeripheralKind::Spi))
        }
    }

    /// Route SPI0 pins and start the controller
    pub fn begin(&mut self) -> Result<()> {
        let joining = !self.is_started();
        let session = self.board.with(|st| -> Result<u32> {
            st.claim(PeripheralKind::Spi)?;
            st.driver.spi_start();
            if joining {
                st.spi_users += 1;
            }
            Ok(st.session)
        })?;
        self.session = session;
        self.active = true;
        Ok(())
    }

    /// Set the data mode (0-3)
    pub fn set_data_mode(&mut self, mode: u8) -> Result<()> {
        self.ensure_started()?;
        let mode = Mode::from_index(mode).ok_or(Error::InvalidArgument(ArgumentFault::DataMode))?;
        self.board.with(|st| st.driver.spi_set_mode(mode));
        self.mode = mode;
        Ok(())
    }

    /// Set the clock divider
    ///
    /// Must be even and at most 65536; 0 also means 65536.
    pub fn set_clock_divider(&mut self, divider: u32) -> Result<()> {
        self.ensure_started()?;
        if divider > SPI_MAX_DIVIDER || divider % 2 != 0 {
            return Err(ArgumentFault::ClockDivider.into());
        }
        let effective = if divider == 0 { SPI_MAX_DIVIDER } else { divider };
        let register = if effective == SPI_MAX_DIVIDER {
            0
        } else {
            effective as u16
        };
        let clock = self.board.model().core_clock_hz();
        self.board
            .with(|st| st.driver.spi_set_clock_divider(register));
        self.divider = Some(effective);
        log::info!(
            "SPI clock {} kHz (div {})",
            clock / effective / 1000,
            effective
        );
        Ok(())
    }

    /// Set the active level of chip select line `cs` (0-2)
    pub fn set_cs_polarity(&mut self, cs: u8, active_high: bool) -> Result<()> {
        self.ensure_started()?;
        if cs > 2 {
            return Err(ArgumentFault::ChipSelect.into());
        }
        self.board
            .with(|st| st.driver.spi_set_cs_polarity(cs, active_high));
        Ok(())
    }

    /// Select chip select line `cs` (0-2)
    pub fn chip_select(&mut self, cs: u8) -> Result<()> {
        self.ensure_started()?;
        if cs > 2 {
            return Err(ArgumentFault::ChipSelect.into());
        }
        self.board.with(|st| st.driver.spi_chip_select(cs));
        self.chip_select = cs;
        Ok(())
    }

    /// Exchange `len` bytes
    pub fn transfer(&mut self, write: &[u8], read: &mut [u8], len: usize) -> Result<()> {
        self.ensure_started()?;
        check_len(len, write.len())?;
        check_len(len, read.len())?;
        self.board
            .with(|st| st.driver.spi_transfer(&write[..len], &mut read[..len]));
        Ok(())
    }

    /// Send the first `len` bytes of `write`
    pub fn write(&mut self, write: &[u8], len: usize) -> Result<()> {
        self.ensure_started()?;
        check_len(len, write.len())?;
        self.board.with(|st| st.driver.spi_write(&write[..len]));
        Ok(())
    }

    /// Receive `len` bytes into the front of `read`
    pub fn read(&mut self, read: &mut [u8], len: usize) -> Result<()> {
        self.ensure_started()?;
        check_len(len, read.len())?;
        self.board.with(|st| st.driver.spi_read(&mut read[..len]));
        Ok(())
    }

    /// Stop using the controller
    ///
    /// SPI0 pins return to input once the last started handle ends. The
    /// full access mode stays committed. Ending twice is harmless.
    pub fn end(&mut self) {
        if self.active {
            self.active = false;
            self.board.release(Release::Spi {
                session: self.session,
            });
        }
    }
}

impl<D: Driver> Drop for Spi<D> {
    fn drop(&mut self) {
        self.end();
    }
}

impl<D: Driver> ErrorType for Spi<D> {
    type Error = Error;
}

impl<D: Driver> SpiBus<u8> for Spi<D> {
    fn read(&mut self, words: &mut [u8]) -> Result<()> {
        let len = words.len();
        Spi::read(self, words, len)
    }

    fn write(&mut self, words: &[u8]) -> Result<()> {
        Spi::write(self, words, words.len())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<()> {
        let common = read.len().min(write.len());
        Spi::transfer(self, &write[..common], &mut read[..common], common)?;
        if write.len() > common {
            Spi::write(self, &write[common..], write.len() - common)?;
        }
        if read.len() > common {
            let rest = read.len() - common;
            Spi::read(self, &mut read[common..], rest)?;
        }
        Ok(())
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<()> {
        let outgoing: Vec<u8> = words.to_vec();
        let len = words.len();
        Spi::transfer(self, &outgoing, words, len)
    }

    fn flush(&mut self) -> Result<()> {
        self.ensure_started()
    }
}
