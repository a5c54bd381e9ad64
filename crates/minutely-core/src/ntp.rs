//! Minimal SNTP (RFC 4330) wire codec.
//!
//! Only what a one-shot bootstrap sync needs: build a client request,
//! pull the transmit timestamp out of a validated server reply.

/// SNTP packets are fixed-size.
pub const PACKET_LEN: usize = 48;
/// NTP well-known server port.
pub const PORT: u16 = 123;
/// Seconds between the NTP era (1900-01-01) and the Unix epoch.
pub const UNIX_OFFSET: u64 = 2_208_988_800;

const MODE_CLIENT: u8 = 3;
const MODE_SERVER: u8 = 4;
const VERSION: u8 = 3;
const LEAP_UNSYNCHRONIZED: u8 = 3;
const TRANSMIT_TS_OFFSET: usize = 40;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NtpError {
    /// Packet shorter than [`PACKET_LEN`].
    TooShort,
    /// Mode field is not a server reply.
    NotServerReply,
    /// Stratum 0: kiss-of-death, the server refuses service.
    KissOfDeath,
    /// Stratum above the valid secondary-server range.
    InvalidStratum,
    /// Server clock itself is unsynchronized.
    ServerUnsynchronized,
    /// Transmit timestamp missing.
    ZeroTimestamp,
}

/// Builds a version-3 client request.
pub fn client_request() -> [u8; PACKET_LEN] {
    let mut packet = [0u8; PACKET_LEN];
    packet[0] = (VERSION << 3) | MODE_CLIENT;
    packet
}

/// Validates a server reply and returns its transmit time as Unix seconds.
pub fn parse_server_reply(packet: &[u8]) -> Result<u64, NtpError> {
    if packet.len() < PACKET_LEN {
        return Err(NtpError::TooShort);
    }

    if packet[0] & 0x07 != MODE_SERVER {
        return Err(NtpError::NotServerReply);
    }
    if packet[0] >> 6 == LEAP_UNSYNCHRONIZED {
        return Err(NtpError::ServerUnsynchronized);
    }

    match packet[1] {
        0 => return Err(NtpError::KissOfDeath),
        1..=15 => {}
        _ => return Err(NtpError::InvalidStratum),
    }

    let ntp_seconds = u32::from_be_bytes([
        packet[TRANSMIT_TS_OFFSET],
        packet[TRANSMIT_TS_OFFSET + 1],
        packet[TRANSMIT_TS_OFFSET + 2],
        packet[TRANSMIT_TS_OFFSET + 3],
    ]);
    if ntp_seconds == 0 {
        return Err(NtpError::ZeroTimestamp);
    }

    Ok(u64::from(ntp_seconds) - UNIX_OFFSET)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server_reply(stratum: u8, ntp_seconds: u32) -> [u8; PACKET_LEN] {
        let mut packet = [0u8; PACKET_LEN];
        packet[0] = (VERSION << 3) | MODE_SERVER;
        packet[1] = stratum;
        packet[TRANSMIT_TS_OFFSET..TRANSMIT_TS_OFFSET + 4]
            .copy_from_slice(&ntp_seconds.to_be_bytes());
        packet
    }

    #[test]
    fn request_has_client_mode_and_version() {
        let packet = client_request();
        assert_eq!(packet[0], 0x1B);
        assert!(packet[1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn valid_reply_converts_to_unix_seconds() {
        // NTP second of the Unix epoch itself.
        let packet = server_reply(2, UNIX_OFFSET as u32);
        assert_eq!(parse_server_reply(&packet), Ok(0));

        let packet = server_reply(2, (UNIX_OFFSET + 1_786_181_405) as u32);
        assert_eq!(parse_server_reply(&packet), Ok(1_786_181_405));
    }

    #[test]
    fn truncated_reply_is_rejected() {
        assert_eq!(parse_server_reply(&[0u8; 12]), Err(NtpError::TooShort));
    }

    #[test]
    fn non_server_mode_is_rejected() {
        let mut packet = server_reply(2, 1);
        packet[0] = (VERSION << 3) | MODE_CLIENT;
        assert_eq!(parse_server_reply(&packet), Err(NtpError::NotServerReply));
    }

    #[test]
    fn stratum_bounds_are_enforced() {
        assert_eq!(parse_server_reply(&server_reply(0, 1)), Err(NtpError::KissOfDeath));
        assert_eq!(parse_server_reply(&server_reply(16, 1)), Err(NtpError::InvalidStratum));
    }

    #[test]
    fn unsynchronized_server_is_rejected() {
        let mut packet = server_reply(2, 1);
        packet[0] |= 0xC0;
        assert_eq!(parse_server_reply(&packet), Err(NtpError::ServerUnsynchronized));
    }

    #[test]
    fn zero_timestamp_is_rejected() {
        assert_eq!(parse_server_reply(&server_reply(2, 0)), Err(NtpError::ZeroTimestamp));
    }
}
