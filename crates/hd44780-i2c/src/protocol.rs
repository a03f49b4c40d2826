//! PCF8574 backpack encoding for an HD44780 controller in 4-bit mode.
//!
//! Expander port mapping:
//! - P0: RS
//! - P1: RW
//! - P2: EN
//! - P3: backlight
//! - P4..P7: D4..D7

/// Default 7-bit address of the common backpack (A0..A2 pulled high).
pub const DEFAULT_ADDRESS: u8 = 0x27;
/// Characters per row.
pub const COLUMNS: u8 = 16;
/// Rows on the panel.
pub const ROWS: u8 = 2;

pub const RS: u8 = 1 << 0;
pub const RW: u8 = 1 << 1;
pub const EN: u8 = 1 << 2;
pub const BACKLIGHT: u8 = 1 << 3;

pub const CMD_CLEAR: u8 = 0x01;
/// Entry mode: increment, no shift.
pub const CMD_ENTRY_MODE: u8 = 0x06;
/// Display on, cursor off, blink off.
pub const CMD_DISPLAY_ON: u8 = 0x0C;
/// 4-bit bus, two lines, 5x8 font.
pub const CMD_FUNCTION_SET: u8 = 0x28;
pub const CMD_SET_DDRAM: u8 = 0x80;

/// Nibbles written before the controller is known to be in 4-bit mode.
///
/// Three `0x3` writes force 8-bit mode from any state, then `0x2` switches to
/// 4-bit. Each pairs with the minimum delay in microseconds that must follow it.
pub const WAKE_SEQUENCE: [(u8, u32); 4] = [(0x03, 4_500), (0x03, 4_500), (0x03, 150), (0x02, 150)];

/// DDRAM start address of each row.
const ROW_OFFSETS: [u8; ROWS as usize] = [0x00, 0x40];

/// Control bits on the expander apart from data and strobe.
#[inline]
pub const fn control_bits(register_select: bool, backlight: bool) -> u8 {
    (if register_select { RS } else { 0 }) | (if backlight { BACKLIGHT } else { 0 })
}

/// Expander writes that strobe one nibble into the controller: EN high, then low.
#[inline]
pub const fn nibble_frames(nibble: u8, control: u8) -> [u8; 2] {
    let data = (nibble & 0x0F) << 4;
    [data | control | EN, data | control]
}

/// Expander writes for one full byte, high nibble first.
#[inline]
pub const fn byte_frames(byte: u8, control: u8) -> [u8; 4] {
    let high = nibble_frames(byte >> 4, control);
    let low = nibble_frames(byte, control);
    [high[0], high[1], low[0], low[1]]
}

/// Set-DDRAM-address command for a cell. `None` outside the panel.
#[inline]
pub fn cursor_command(column: u8, row: u8) -> Option<u8> {
    if column >= COLUMNS || row >= ROWS {
        return None;
    }
    Some(CMD_SET_DDRAM | (ROW_OFFSETS[row as usize] + column))
}

/// Maps a char onto the controller's ROM. Non-ASCII shows as `?`.
#[inline]
pub fn glyph(ch: char) -> u8 {
    if ch.is_ascii() && !ch.is_ascii_control() {
        ch as u8
    } else {
        b'?'
    }
}

/// Fills a row buffer from `text`, truncated and space-padded to the panel width.
pub fn row_bytes(text: &str) -> [u8; COLUMNS as usize] {
    let mut row = [b' '; COLUMNS as usize];
    for (cell, ch) in row.iter_mut().zip(text.chars()) {
        *cell = glyph(ch);
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nibble_is_strobed_on_the_high_port_bits() {
        assert_eq!(nibble_frames(0x3, 0), [0x34, 0x30]);
        assert_eq!(nibble_frames(0xA, BACKLIGHT | RS), [0xAD, 0xA9]);
    }

    #[test]
    fn byte_is_sent_high_nibble_first() {
        let control = control_bits(true, true);
        assert_eq!(byte_frames(b'A', control), [0x4D, 0x49, 0x1D, 0x19]);
        assert_eq!(byte_frames(CMD_CLEAR, control_bits(false, false)), [0x04, 0x00, 0x14, 0x10]);
    }

    #[test]
    fn control_bits_never_set_read_mode() {
        for rs in [false, true] {
            for bl in [false, true] {
                assert_eq!(control_bits(rs, bl) & (RW | EN), 0);
            }
        }
    }

    #[test]
    fn cursor_addresses_follow_row_offsets() {
        assert_eq!(cursor_command(0, 0), Some(0x80));
        assert_eq!(cursor_command(5, 1), Some(0xC5));
        assert_eq!(cursor_command(15, 1), Some(0xCF));
        assert_eq!(cursor_command(16, 0), None);
        assert_eq!(cursor_command(0, 2), None);
    }

    #[test]
    fn rows_are_padded_and_truncated() {
        assert_eq!(&row_bytes("6:05"), b"6:05            ");
        assert_eq!(&row_bytes("Wed, 06:05:09 and more"), b"Wed, 06:05:09 an");
        assert_eq!(&row_bytes("caf\u{e9}"), b"caf?            ");
    }
}
