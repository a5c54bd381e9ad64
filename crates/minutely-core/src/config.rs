//! Credential file parsing.
//!
//! The settings file on the SD card is two newline-terminated lines: the
//! network identifier first, the secret second. Parsed once at boot; the
//! raw buffer is dropped immediately after.

use heapless::String;

/// Wireless network identifier limit (802.11 SSID).
pub const IDENTIFIER_MAX_BYTES: usize = 31;
/// Passphrase limit (WPA2 PSK).
pub const SECRET_MAX_BYTES: usize = 63;

/// Parsed wireless credentials, read-only after boot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Credentials {
    ssid: String<IDENTIFIER_MAX_BYTES>,
    secret: String<SECRET_MAX_BYTES>,
}

impl Credentials {
    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigError {
    /// File content is not UTF-8 text.
    NotText,
    /// First line is empty or absent.
    MissingIdentifier,
    /// No second line to read the secret from.
    MissingSecret,
    /// Identifier exceeds [`IDENTIFIER_MAX_BYTES`].
    IdentifierTooLong,
    /// Secret exceeds [`SECRET_MAX_BYTES`].
    SecretTooLong,
}

/// Parses the raw settings-file content into credentials.
///
/// Lines are trimmed of trailing CR/LF only; interior whitespace is part
/// of the value. An empty secret is accepted (open network).
pub fn parse_credentials(raw: &[u8]) -> Result<Credentials, ConfigError> {
    let text = core::str::from_utf8(raw).map_err(|_| ConfigError::NotText)?;

    let mut lines = text.split('\n');
    let identifier = lines
        .next()
        .map(trim_line_ending)
        .filter(|line| !line.is_empty())
        .ok_or(ConfigError::MissingIdentifier)?;
    let secret = lines
        .next()
        .map(trim_line_ending)
        .ok_or(ConfigError::MissingSecret)?;

    let mut credentials = Credentials {
        ssid: String::new(),
        secret: String::new(),
    };
    credentials
        .ssid
        .push_str(identifier)
        .map_err(|_| ConfigError::IdentifierTooLong)?;
    credentials
        .secret
        .push_str(secret)
        .map_err(|_| ConfigError::SecretTooLong)?;

    Ok(credentials)
}

fn trim_line_ending(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_lines_parse_without_trailing_newline() {
        let credentials = parse_credentials(b"mynet\nsecret123\n").unwrap();
        assert_eq!(credentials.ssid(), "mynet");
        assert_eq!(credentials.secret(), "secret123");
    }

    #[test]
    fn crlf_endings_are_trimmed() {
        let credentials = parse_credentials(b"mynet\r\nsecret123\r\n").unwrap();
        assert_eq!(credentials.ssid(), "mynet");
        assert_eq!(credentials.secret(), "secret123");
    }

    #[test]
    fn interior_spaces_survive() {
        let credentials = parse_credentials(b"my home net\npass with spaces\n").unwrap();
        assert_eq!(credentials.ssid(), "my home net");
        assert_eq!(credentials.secret(), "pass with spaces");
    }

    #[test]
    fn open_network_has_empty_secret() {
        let credentials = parse_credentials(b"cafe\n\n").unwrap();
        assert_eq!(credentials.secret(), "");
    }

    #[test]
    fn missing_lines_are_rejected() {
        assert_eq!(parse_credentials(b""), Err(ConfigError::MissingIdentifier));
        assert_eq!(parse_credentials(b"\n"), Err(ConfigError::MissingIdentifier));
        assert_eq!(parse_credentials(b"mynet"), Err(ConfigError::MissingSecret));
    }

    #[test]
    fn oversized_fields_are_rejected() {
        let long_ssid = [b'a'; IDENTIFIER_MAX_BYTES + 1];
        let mut raw = heapless::Vec::<u8, 128>::new();
        raw.extend_from_slice(&long_ssid).unwrap();
        raw.extend_from_slice(b"\npw\n").unwrap();
        assert_eq!(parse_credentials(&raw), Err(ConfigError::IdentifierTooLong));

        let long_secret = [b'b'; SECRET_MAX_BYTES + 1];
        let mut raw = heapless::Vec::<u8, 128>::new();
        raw.extend_from_slice(b"net\n").unwrap();
        raw.extend_from_slice(&long_secret).unwrap();
        assert_eq!(parse_credentials(&raw), Err(ConfigError::SecretTooLong));
    }

    #[test]
    fn binary_content_is_rejected() {
        assert_eq!(parse_credentials(&[0xFF, 0xFE, b'\n']), Err(ConfigError::NotText));
    }
}
