use embedded_hal::{delay::DelayNs, i2c::I2c};
use hd44780_i2c::{Config, Hd44780, LcdError};

use wakealarm_core::io::TextDisplay;

/// Board-level adapter for the 16x2 LCD on the I2C backpack.
#[derive(Debug)]
pub struct CharDisplay<I2C, D> {
    lcd: Hd44780<I2C, D>,
}

impl<I2C, D> CharDisplay<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self {
            lcd: Hd44780::new(i2c, delay, Config::default()),
        }
    }

    /// Dark and blank, for the panel state across deep sleep.
    pub fn power_down(&mut self) -> Result<(), LcdError<I2C::Error>> {
        self.lcd.clear()?;
        self.lcd.set_backlight(false)
    }
}

impl<I2C, D> TextDisplay for CharDisplay<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    type Error = LcdError<I2C::Error>;

    fn begin(&mut self) -> Result<(), Self::Error> {
        self.lcd.set_backlight(true)?;
        self.lcd.init()
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        self.power_down()
    }

    fn show(&mut self, top: &str, bottom: &str) -> Result<(), Self::Error> {
        self.lcd.write_row(0, top)?;
        self.lcd.write_row(1, bottom)
    }
}
