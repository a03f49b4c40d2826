//! SNTP (RFC 4330) client packet encoding and reply validation.

pub const NTP_PORT: u16 = 123;
pub const PACKET_LEN: usize = 48;

/// Seconds between 1900-01-01 and 1970-01-01.
pub const NTP_UNIX_OFFSET: u64 = 2_208_988_800;

// LI=0, VN=3, Mode=3 (client)
const CLIENT_HEADER: u8 = 0x1B;
const MODE_MASK: u8 = 0x07;
const MODE_SERVER: u8 = 4;
const TRANSMIT_OFFSET: usize = 40;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SntpError {
    Truncated,
    NotServerMode,
    /// Stratum 0: the server refused service.
    KissOfDeath,
    BadTimestamp,
}

/// Server transmit time converted to the UNIX epoch.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NtpTime {
    pub unix_secs: u64,
    pub micros: u32,
}

pub const fn request_packet() -> [u8; PACKET_LEN] {
    let mut packet = [0u8; PACKET_LEN];
    packet[0] = CLIENT_HEADER;
    packet
}

pub fn parse_reply(reply: &[u8]) -> Result<NtpTime, SntpError> {
    if reply.len() < PACKET_LEN {
        return Err(SntpError::Truncated);
    }
    if reply[0] & MODE_MASK != MODE_SERVER {
        return Err(SntpError::NotServerMode);
    }
    if reply[1] == 0 {
        return Err(SntpError::KissOfDeath);
    }

    let ts = &reply[TRANSMIT_OFFSET..TRANSMIT_OFFSET + 8];
    let seconds = u32::from_be_bytes([ts[0], ts[1], ts[2], ts[3]]) as u64;
    let fraction = u32::from_be_bytes([ts[4], ts[5], ts[6], ts[7]]) as u64;

    if seconds < NTP_UNIX_OFFSET {
        return Err(SntpError::BadTimestamp);
    }

    Ok(NtpTime {
        unix_secs: seconds - NTP_UNIX_OFFSET,
        micros: ((fraction * 1_000_000) >> 32) as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(unix_secs: u64, fraction: u32) -> [u8; PACKET_LEN] {
        let mut packet = [0u8; PACKET_LEN];
        packet[0] = 0x1C; // LI=0, VN=3, Mode=4
        packet[1] = 2;
        let secs = (unix_secs + NTP_UNIX_OFFSET) as u32;
        packet[40..44].copy_from_slice(&secs.to_be_bytes());
        packet[44..48].copy_from_slice(&fraction.to_be_bytes());
        packet
    }

    #[test]
    fn request_is_a_v3_client_packet() {
        let packet = request_packet();
        assert_eq!(packet[0], 0x1B);
        assert!(packet[1..].iter().all(|b| *b == 0));
    }

    #[test]
    fn reply_timestamp_is_converted_to_unix() {
        let time = parse_reply(&reply(1_736_946_309, 0x8000_0000)).unwrap();
        assert_eq!(time.unix_secs, 1_736_946_309);
        assert_eq!(time.micros, 500_000);
    }

    #[test]
    fn invalid_replies_are_rejected() {
        assert_eq!(parse_reply(&[0x1C; 20]), Err(SntpError::Truncated));

        let mut client = reply(1_736_946_309, 0);
        client[0] = 0x1B;
        assert_eq!(parse_reply(&client), Err(SntpError::NotServerMode));

        let mut kod = reply(1_736_946_309, 0);
        kod[1] = 0;
        assert_eq!(parse_reply(&kod), Err(SntpError::KissOfDeath));

        let mut early = reply(0, 0);
        early[40..44].copy_from_slice(&12u32.to_be_bytes());
        assert_eq!(parse_reply(&early), Err(SntpError::BadTimestamp));
    }
}
