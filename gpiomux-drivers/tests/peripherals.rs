//! PWM, I2C and SPI scenarios, and access mode arbitration across them

use gpiomux_core::{
    AccessMode, ArgumentFault, BoardModel, Error, ErrorKind, PeripheralKind, PinFault,
};
use gpiomux_drivers::{Board, BoardConfig, PwmSetup};
use gpiomux_hal::{
    AccessFault, I2cConfig, I2cFault, Mode, Phase, PinSet, Polarity, PwmChannel, Window,
};
use gpiomux_hal_sim::SimBoard;

fn board() -> (Board<SimBoard>, SimBoard) {
    let sim = SimBoard::new();
    (Board::new(sim.clone()), sim)
}

#[test]
fn test_digital_first_blocks_full_peripherals() {
    let (board, sim) = board();
    let _input = board.input(11).unwrap();
    assert_eq!(sim.window(), Some(Window::Restricted));
    assert_eq!(
        board.i2c(PinSet::Sda1Scl1).err(),
        Some(Error::ModeConflict {
            requested: PeripheralKind::I2c,
            owner: PeripheralKind::Gpio,
        })
    );
    assert_eq!(board.spi().err().map(|e| e.kind()), Some(ErrorKind::ModeConflict));
    assert_eq!(board.pwm(12, None).err().map(|e| e.kind()), Some(ErrorKind::ModeConflict));
    // The committed mode is untouched by the refusals
    assert_eq!(board.mode(), AccessMode::Light);
    assert_eq!(sim.window_opens(), 1);
}

#[test]
fn test_full_peripherals_share_mode_in_any_order() {
    let (board, sim) = board();
    let spi = board.spi().unwrap();
    let i2c = board.i2c(PinSet::Sda1Scl1).unwrap();
    let pwm = board.pwm(12, None).unwrap();
    assert!(spi.is_started());
    assert!(i2c.is_started());
    assert!(pwm.is_open());
    assert_eq!(board.mode(), AccessMode::Full);
    assert_eq!(sim.window(), Some(Window::Full));
    assert_eq!(sim.window_opens(), 1);

    // Digital I/O lives in the restricted window
    assert_eq!(
        board.output(33).err(),
        Some(Error::ModeConflict {
            requested: PeripheralKind::Gpio,
            owner: PeripheralKind::Spi,
        })
    );
}

#[test]
fn test_mode_stays_latched_after_close() {
    let (board, _) = board();
    let mut i2c = board.i2c(PinSet::Sda1Scl1).unwrap();
    i2c.end();
    drop(i2c);
    assert_eq!(board.mode(), AccessMode::Full);
    assert_eq!(board.input(11).err().map(|e| e.kind()), Some(ErrorKind::ModeConflict));

    board.reset_arbitration();
    assert!(board.input(11).is_ok());
    assert_eq!(board.mode(), AccessMode::Light);
}

#[test]
fn test_failed_window_leaves_arbiter_unlatched() {
    let (board, sim) = board();
    sim.fail_next_open(AccessFault::PermissionDenied);
    let err = board.spi().err();
    assert_eq!(err, Some(Error::HardwareAccess(AccessFault::PermissionDenied)));
    assert_eq!(board.mode(), AccessMode::Uninitialized);

    // Next claimant decides the mode
    let _input = board.input(11).unwrap();
    assert_eq!(board.mode(), AccessMode::Light);
}

#[test]
fn test_pwm_pin_validation() {
    let (board, _) = board();
    assert_eq!(
        board.pwm(11, None).err(),
        Some(Error::InvalidPin(PinFault::NotPwm(11)))
    );
    assert_eq!(board.pwm(6, None).err().map(|e| e.kind()), Some(ErrorKind::InvalidPin));
    assert_eq!(board.mode(), AccessMode::Uninitialized);
}

#[test]
fn test_pwm_same_pin_twice_fails() {
    let (board, _) = board();
    let _first = board.pwm(12, None).unwrap();
    assert_eq!(board.pwm(12, None).err(), Some(Error::DuplicatePin(12)));
    assert_eq!(board.pwm_count(), 1);
}

#[test]
fn test_pwm_paired_pins_share_channel() {
    let (board, sim) = board();
    let mut a = board.pwm(12, None).unwrap();
    let b = board.pwm(32, None).unwrap();
    assert_eq!(a.channel(), Some(PwmChannel::One));
    assert_eq!(b.channel(), Some(PwmChannel::One));
    a.set_range(1000).unwrap();
    a.set_data(250).unwrap();
    assert_eq!(sim.pwm_channel(PwmChannel::One).data, 250);
    assert_eq!(board.pwm_count(), 2);
}

#[test]
fn test_pwm_setup_presets() {
    let (board, sim) = board();
    let pwm = board.pwm(33, Some(PwmSetup::new(10, 1000, 250))).unwrap();
    assert_eq!(pwm.divider(), Some(1920));
    assert_eq!(pwm.clock_hz(), Some(10_000));
    assert_eq!(sim.pwm_clock_divider(), 1920);
    let channel = sim.pwm_channel(PwmChannel::Two);
    assert!(channel.enabled);
    assert!(channel.mark_space);
    assert_eq!(channel.range, 1000);
    assert_eq!(channel.data, 250);

    assert_eq!(
        board.pwm(35, Some(PwmSetup::new(20, 100, 10))).err(),
        Some(Error::InvalidArgument(ArgumentFault::Frequency))
    );
}

#[test]
fn test_pwm_clock_divider_bounds() {
    let (board, sim) = board();
    let mut pwm = board.pwm(12, None).unwrap();
    for bad in [0, 4095, 5000] {
        assert_eq!(
            pwm.set_clock_divider(bad),
            Err(Error::InvalidArgument(ArgumentFault::ClockDivider))
        );
    }
    pwm.set_clock_divider(4094).unwrap();
    assert_eq!(sim.pwm_clock_divider(), 4094);
}

#[test]
fn test_pwm_start_stop_pulse() {
    let (board, sim) = board();
    let mut pwm = board.pwm(12, None).unwrap();
    pwm.set_clock_divider(192).unwrap();
    pwm.set_range(100).unwrap();
    pwm.set_data(0).unwrap();
    assert_eq!(sim.pwm_channel(PwmChannel::One).data, 0);

    pwm.stop().unwrap();
    assert!(!sim.pwm_channel(PwmChannel::One).enabled);
    pwm.set_data(1).unwrap();
    pwm.start().unwrap();
    assert!(pwm.is_started());
    // Width 1 means full duty
    assert_eq!(pwm.data(), 100);
    assert_eq!(sim.pwm_channel(PwmChannel::One).data, 100);
    assert!(sim.pwm_channel(PwmChannel::One).enabled);

    pwm.pulse(Some(30)).unwrap();
    assert!(pwm.is_started());
    assert_eq!(sim.pwm_channel(PwmChannel::One).data, 30);
    pwm.stop_pulse().unwrap();
    assert!(!pwm.is_started());
    assert!(!sim.pwm_channel(PwmChannel::One).enabled);
}

#[test]
fn test_pwm_close_resets_and_frees_pin() {
    let (board, sim) = board();
    let mut pwm = board.pwm(12, Some(PwmSetup::new(100, 100, 50))).unwrap();
    let other = board.pwm(33, Some(PwmSetup::new(100, 200, 20))).unwrap();
    pwm.close();
    assert_eq!(sim.pwm_channel(PwmChannel::One).range, 0);
    assert_eq!(sim.pwm_channel(PwmChannel::Two).range, 200);
    assert_eq!(pwm.set_data(5), Err(Error::Closed { pin: 12 }));
    assert!(board.pwm(12, None).is_ok());

    let resets = sim.pwm_resets();
    drop(other);
    assert_eq!(sim.pwm_resets(), resets + 1);
    assert_eq!(board.mode(), AccessMode::Full);
}

#[test]
fn test_pwm_duty_cycle_trait() {
    use embedded_hal::pwm::SetDutyCycle;

    let (board, sim) = board();
    let mut pwm = board.pwm(35, None).unwrap();
    pwm.set_range(200).unwrap();
    assert_eq!(pwm.max_duty_cycle(), 200);
    pwm.set_duty_cycle_percent(50).unwrap();
    assert_eq!(sim.pwm_channel(PwmChannel::Two).data, 100);
}

#[test]
fn test_i2c_start_and_transfer() {
    let (board, sim) = board();
    sim.attach_i2c_device(0x48);
    let mut i2c = board.i2c(PinSet::Sda1Scl1).unwrap();
    assert_eq!(sim.i2c().pins, Some(PinSet::Sda1Scl1));

    i2c.select_slave(0x48).unwrap();
    i2c.write(&[0x01, 0x02, 0x03], 2).unwrap();
    assert_eq!(sim.i2c().last_write.as_slice(), &[0x01, 0x02]);

    let mut buf = [0u8; 4];
    i2c.read(&mut buf, 2).unwrap();
    assert_eq!(&buf[..2], &[0x01, 0x02]);
    assert_eq!(i2c.read_byte(), Ok(0x01));
}

#[test]
fn test_i2c_errors() {
    let (board, _) = board();
    let mut i2c = board.i2c(PinSet::Sda0Scl0).unwrap();
    assert_eq!(
        i2c.select_slave(0x80),
        Err(Error::InvalidArgument(ArgumentFault::SlaveAddress))
    );
    i2c.select_slave(0x20).unwrap();
    assert_eq!(i2c.write(&[1], 1), Err(Error::Bus(I2cFault::Nack)));

    let mut buf = [0u8; 2];
    let err = i2c.read(&mut buf, 3).unwrap_err();
    assert_eq!(err, Error::BufferTooSmall { requested: 3, capacity: 2 });
    assert!(err.to_string().starts_with("Insufficient buffer size"));
}

#[test]
fn test_i2c_deferred_start() {
    let (board, sim) = board();
    let mut i2c = board.i2c_deferred().unwrap();
    assert_eq!(board.mode(), AccessMode::Full);
    assert!(!i2c.is_started());
    assert_eq!(
        i2c.select_slave(0x10),
        Err(Error::NotStarted(PeripheralKind::I2c))
    );
    assert_eq!(
        i2c.begin_index(2),
        Err(Error::InvalidArgument(ArgumentFault::PinSet))
    );
    i2c.begin_index(0).unwrap();
    assert_eq!(sim.i2c().pins, Some(PinSet::Sda0Scl0));
    i2c.end();
    assert!(!sim.i2c().enabled);
    i2c.end();
    assert_eq!(board.mode(), AccessMode::Full);
}

#[test]
fn test_i2c_baud_rate() {
    let (board, sim) = board();
    let mut i2c = board.i2c(PinSet::Sda1Scl1).unwrap();
    // Unknown models clock the core at 400 MHz
    i2c.set_baud_rate(100_000).unwrap();
    assert_eq!(sim.i2c().divider, 4000);
    assert_eq!(
        i2c.set_baud_rate(0),
        Err(Error::InvalidArgument(ArgumentFault::BaudRate))
    );
    assert_eq!(
        i2c.set_baud_rate(1_000),
        Err(Error::InvalidArgument(ArgumentFault::ClockDivider))
    );
    i2c.set_clock_divider(626).unwrap();
    assert_eq!(sim.i2c().divider, 626);

    i2c.set_bus_speed(I2cConfig::FAST).unwrap();
    assert_eq!(sim.i2c().divider, 1000);
    i2c.set_bus_speed(I2cConfig::default()).unwrap();
    assert_eq!(sim.i2c().divider, 4000);
}

#[test]
fn test_i2c_baud_rate_follows_board_clock() {
    let sim = SimBoard::new();
    let config = BoardConfig {
        model: BoardModel::from_model_line("Raspberry Pi Model B Plus Rev 1.2"),
        ..Default::default()
    };
    let board = Board::with_config(sim.clone(), config).unwrap();
    let mut i2c = board.i2c(PinSet::Sda1Scl1).unwrap();
    i2c.set_baud_rate(100_000).unwrap();
    assert_eq!(sim.i2c().divider, 2500);
}

#[test]
fn test_i2c_controller_stops_with_last_handle() {
    let (board, sim) = board();
    let mut first = board.i2c(PinSet::Sda1Scl1).unwrap();
    let mut second = board.i2c(PinSet::Sda1Scl1).unwrap();
    // Starting again does not count twice
    second.begin().unwrap();

    first.end();
    assert!(second.is_started());
    assert!(sim.i2c().enabled);
    second.end();
    assert!(!sim.i2c().enabled);
}

#[test]
fn test_i2c_embedded_hal_transaction() {
    use embedded_hal::i2c::I2c as _;

    let (board, sim) = board();
    sim.attach_i2c_device(0x50);
    let mut i2c = board.i2c(PinSet::Sda1Scl1).unwrap();
    let mut read = [0u8; 2];
    i2c.write_read(0x50, &[0xAA, 0xBB], &mut read).unwrap();
    assert_eq!(read, [0xAA, 0xBB]);
    assert_eq!(i2c.slave(), Some(0x50));
}

#[test]
fn test_spi_configuration() {
    let (board, sim) = board();
    let mut spi = board.spi().unwrap();
    assert!(sim.spi().enabled);

    spi.set_data_mode(3).unwrap();
    assert_eq!(sim.spi().mode, Mode::Mode3);
    assert_eq!(sim.spi().polarity, Polarity::IdleHigh);
    assert_eq!(sim.spi().phase, Phase::CaptureOnSecondTransition);
    assert_eq!(
        spi.set_data_mode(4),
        Err(Error::InvalidArgument(ArgumentFault::DataMode))
    );

    spi.set_clock_divider(256).unwrap();
    assert_eq!(sim.spi().divider, 256);
    spi.set_clock_divider(0).unwrap();
    assert_eq!(spi.divider(), Some(65_536));
    assert_eq!(sim.spi().divider, 0);
    for bad in [3, 65_538] {
        assert_eq!(
            spi.set_clock_divider(bad),
            Err(Error::InvalidArgument(ArgumentFault::ClockDivider))
        );
    }

    spi.chip_select(1).unwrap();
    assert_eq!(sim.spi().chip_select, 1);
    assert_eq!(
        spi.chip_select(3),
        Err(Error::InvalidArgument(ArgumentFault::ChipSelect))
    );
    spi.set_cs_polarity(2, true).unwrap();
    assert!(sim.spi().cs_active_high[2]);
}

#[test]
fn test_spi_transfers() {
    let (board, sim) = board();
    let mut spi = board.spi().unwrap();
    let mut rx = [0u8; 3];
    spi.transfer(&[1, 2, 3], &mut rx, 3).unwrap();
    assert_eq!(rx, [1, 2, 3]);
    spi.write(&[9, 8, 7], 1).unwrap();
    assert_eq!(sim.spi().sent.as_slice(), &[1, 2, 3, 9]);
    assert_eq!(
        spi.transfer(&[1], &mut rx, 2),
        Err(Error::BufferTooSmall { requested: 2, capacity: 1 })
    );
    let mut zeros = [0xFFu8; 2];
    spi.read(&mut zeros, 2).unwrap();
    assert_eq!(zeros, [0, 0]);
}

#[test]
fn test_spi_bus_trait() {
    use embedded_hal::spi::SpiBus;

    let (board, _) = board();
    let mut spi = board.spi().unwrap();
    let mut words = [4u8, 5, 6];
    SpiBus::transfer_in_place(&mut spi, &mut words).unwrap();
    assert_eq!(words, [4, 5, 6]);
    let mut read = [0u8; 4];
    SpiBus::transfer(&mut spi, &mut read, &[1, 2]).unwrap();
    assert_eq!(read, [1, 2, 0, 0]);
    SpiBus::flush(&mut spi).unwrap();
}

#[test]
fn test_spi_end_then_use() {
    let (board, sim) = board();
    let mut spi = board.spi_deferred().unwrap();
    assert_eq!(spi.write(&[1], 1), Err(Error::NotStarted(PeripheralKind::Spi)));
    spi.begin().unwrap();
    spi.end();
    assert!(!sim.spi().enabled);
    assert_eq!(spi.write(&[1], 1), Err(Error::NotStarted(PeripheralKind::Spi)));
}

#[test]
fn test_spi_controller_stops_with_last_handle() {
    let (board, sim) = board();
    let mut first = board.spi().unwrap();
    let second = board.spi().unwrap();
    first.end();
    assert!(second.is_started());
    assert!(sim.spi().enabled);
    drop(second);
    assert!(!sim.spi().enabled);
}

#[test]
fn test_shutdown_stops_peripherals() {
    let (board, sim) = board();
    let i2c = board.i2c(PinSet::Sda1Scl1).unwrap();
    let spi = board.spi().unwrap();
    let mut pwm = board.pwm(12, Some(PwmSetup::new(1000, 10, 5))).unwrap();
    board.shutdown();
    assert!(!sim.i2c().enabled);
    assert!(!sim.spi().enabled);
    assert!(!sim.pwm_channel(PwmChannel::One).enabled);
    assert_eq!(sim.window(), None);
    assert!(!i2c.is_started());
    assert!(!spi.is_started());
    assert_eq!(pwm.start(), Err(Error::Closed { pin: 12 }));

    // A fresh session may pick either mode
    let _input = board.input(11).unwrap();
    assert_eq!(sim.window(), Some(Window::Restricted));
}
