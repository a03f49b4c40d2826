#![cfg_attr(not(test), no_std)]

//! HD44780 16x2 character LCD behind a PCF8574 I2C backpack.

pub mod protocol;

use embedded_hal::{delay::DelayNs, i2c::I2c};

/// Driver configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    /// 7-bit I2C address of the backpack.
    pub address: u8,
    /// Power-on settle time before the first command, in milliseconds.
    pub power_on_ms: u32,
    /// Execution time of clear, in microseconds.
    pub clear_us: u32,
    /// Execution time of every other command, in microseconds.
    pub command_us: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: protocol::DEFAULT_ADDRESS,
            power_on_ms: 50,
            clear_us: 2_000,
            command_us: 50,
        }
    }
}

/// Driver errors.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LcdError<E> {
    /// I2C write to the backpack failed.
    I2c(E),
    /// Cursor position outside the panel.
    InvalidInput,
}

pub type LcdResult<E> = Result<(), LcdError<E>>;

/// HD44780 driver.
#[derive(Debug)]
pub struct Hd44780<I2C, D> {
    i2c: I2C,
    delay: D,
    config: Config,
    backlight: bool,
}

impl<I2C, D> Hd44780<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Creates a new driver instance. Nothing is sent until [`Self::init`].
    pub fn new(i2c: I2C, delay: D, config: Config) -> Self {
        Self {
            i2c,
            delay,
            config,
            backlight: false,
        }
    }

    /// Releases owned bus and delay.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    /// Runs the 4-bit initialisation sequence, then turns the display on and clears it.
    pub fn init(&mut self) -> LcdResult<I2C::Error> {
        self.delay.delay_ms(self.config.power_on_ms);

        let control = protocol::control_bits(false, self.backlight);
        for (nibble, settle_us) in protocol::WAKE_SEQUENCE {
            self.write_frames(&protocol::nibble_frames(nibble, control))?;
            self.delay.delay_us(settle_us);
        }

        self.command(protocol::CMD_FUNCTION_SET)?;
        self.command(protocol::CMD_DISPLAY_ON)?;
        self.clear()?;
        self.command(protocol::CMD_ENTRY_MODE)
    }

    /// Switches the backlight; the expander latches it on the next write.
    pub fn set_backlight(&mut self, on: bool) -> LcdResult<I2C::Error> {
        self.backlight = on;
        let control = protocol::control_bits(false, on);
        self.write_frames(&[control])
    }

    pub fn clear(&mut self) -> LcdResult<I2C::Error> {
        self.command(protocol::CMD_CLEAR)?;
        self.delay.delay_us(self.config.clear_us);
        Ok(())
    }

    pub fn set_cursor(&mut self, column: u8, row: u8) -> LcdResult<I2C::Error> {
        let command = protocol::cursor_command(column, row).ok_or(LcdError::InvalidInput)?;
        self.command(command)
    }

    /// Overwrites a whole row, padding with spaces.
    pub fn write_row(&mut self, row: u8, text: &str) -> LcdResult<I2C::Error> {
        self.set_cursor(0, row)?;
        for byte in protocol::row_bytes(text) {
            self.data(byte)?;
        }
        Ok(())
    }

    fn command(&mut self, command: u8) -> LcdResult<I2C::Error> {
        let control = protocol::control_bits(false, self.backlight);
        self.write_frames(&protocol::byte_frames(command, control))?;
        self.delay.delay_us(self.config.command_us);
        Ok(())
    }

    fn data(&mut self, byte: u8) -> LcdResult<I2C::Error> {
        let control = protocol::control_bits(true, self.backlight);
        self.write_frames(&protocol::byte_frames(byte, control))
    }

    fn write_frames(&mut self, frames: &[u8]) -> LcdResult<I2C::Error> {
        self.i2c
            .write(self.config.address, frames)
            .map_err(LcdError::I2c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};

    #[derive(Default)]
    struct RecordingBus {
        writes: Vec<(u8, Vec<u8>)>,
        fail: bool,
    }

    impl ErrorType for RecordingBus {
        type Error = ErrorKind;
    }

    impl I2c for RecordingBus {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if self.fail {
                return Err(ErrorKind::Other);
            }
            for op in operations {
                if let Operation::Write(bytes) = op {
                    self.writes.push((address, bytes.to_vec()));
                }
            }
            Ok(())
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn lcd() -> Hd44780<RecordingBus, NoDelay> {
        Hd44780::new(RecordingBus::default(), NoDelay, Config::default())
    }

    fn sent(lcd: Hd44780<RecordingBus, NoDelay>) -> Vec<u8> {
        let (bus, _) = lcd.release();
        bus.writes.into_iter().flat_map(|(_, bytes)| bytes).collect()
    }

    #[test]
    fn init_starts_with_wake_nibbles() {
        let mut lcd = lcd();
        lcd.init().unwrap();

        let (bus, _) = lcd.release();
        assert!(bus.writes.iter().all(|(address, _)| *address == 0x27));
        let first: Vec<Vec<u8>> = bus.writes.iter().take(4).map(|(_, b)| b.clone()).collect();
        assert_eq!(
            first,
            vec![
                vec![0x34, 0x30],
                vec![0x34, 0x30],
                vec![0x34, 0x30],
                vec![0x24, 0x20],
            ]
        );
        // function set, display on, clear, entry mode
        assert_eq!(bus.writes.len(), 8);
        assert_eq!(bus.writes[4].1, vec![0x24, 0x20, 0x84, 0x80]);
    }

    #[test]
    fn row_write_positions_cursor_then_pads() {
        let mut lcd = lcd();
        lcd.set_backlight(true).unwrap();
        lcd.write_row(1, "6:05").unwrap();

        let bytes = sent(lcd);
        // backlight latch, cursor command, 16 data bytes
        assert_eq!(bytes.len(), 1 + 4 + 16 * 4);
        assert_eq!(bytes[0], protocol::BACKLIGHT);
        assert_eq!(&bytes[1..5], &[0xCC, 0xC8, 0x0C, 0x08]);
        assert_eq!(&bytes[5..9], &[0x3D, 0x39, 0x6D, 0x69]);
    }

    #[test]
    fn cursor_outside_panel_is_rejected() {
        let mut lcd = lcd();
        assert_eq!(lcd.set_cursor(0, 2), Err(LcdError::InvalidInput));
        assert!(sent(lcd).is_empty());
    }

    #[test]
    fn bus_errors_are_wrapped() {
        let mut lcd = Hd44780::new(
            RecordingBus {
                fail: true,
                ..Default::default()
            },
            NoDelay,
            Config::default(),
        );
        assert_eq!(lcd.clear(), Err(LcdError::I2c(ErrorKind::Other)));
    }
}
