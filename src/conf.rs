use base64::prelude::*;
use std::{
    net::{AddrParseError, IpAddr, Ipv4Addr},
    num::ParseIntError,
    str::FromStr,
};

pub mod endpoints;
pub mod model;
pub mod parse;
pub mod render;

pub const KEY_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("decoded {0} bytes, expected {KEY_LEN}")]
    Length(usize),
}

/// A WireGuard key in its 32-byte raw form; the text form is standard base64.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key([u8; KEY_LEN]);

impl AsRef<[u8]> for Key {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for Key {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = BASE64_STANDARD.decode(s)?;
        let inner: [u8; KEY_LEN] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| KeyError::Length(bytes.len()))?;
        Ok(Key(inner))
    }
}

impl Key {
    pub fn random() -> Key {
        Key(rand::random())
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", BASE64_STANDARD.encode(self.0))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CidrError {
    #[error("bad address: {0}")]
    Addr(#[from] AddrParseError),

    #[error("bad prefix: {0}")]
    Prefix(#[from] ParseIntError),

    #[error("prefix /{prefix} out of range, max /{max}")]
    Range { prefix: u8, max: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cidr {
    pub ip: IpAddr,
    pub prefix: u8,
}

impl Default for Cidr {
    fn default() -> Self {
        Self {
            ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            prefix: 0,
        }
    }
}

impl FromStr for Cidr {
    type Err = CidrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ip, prefix) = match s.split_once('/') {
            Some((ip, prefix)) => {
                let ip: IpAddr = ip.trim().parse()?;
                (ip, prefix.trim().parse()?)
            }
            // bare address, host prefix
            None => {
                let ip: IpAddr = s.trim().parse()?;
                (ip, if ip.is_ipv4() { 32 } else { 128 })
            }
        };

        let max = if ip.is_ipv4() { 32 } else { 128 };
        if prefix > max {
            return Err(CidrError::Range { prefix, max });
        }

        Ok(Cidr { ip, prefix })
    }
}

impl std::fmt::Display for Cidr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.ip, self.prefix)
    }
}

/// Routing-table selector: the implicit default table, routing disabled
/// (the literal `off` in the text form), or an explicit table number.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    #[default]
    Default,
    Off,
    Explicit(u32),
}

impl FromStr for Table {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("off") {
            Ok(Table::Off)
        } else {
            Ok(Table::Explicit(s.parse()?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_text_round_trip() {
        let key = Key::random();
        let parsed: Key = key.to_string().parse().unwrap();
        assert_eq!(key, parsed);
    }

    #[test]
    fn key_rejects_bad_base64() {
        assert!(matches!("not!base64".parse::<Key>(), Err(KeyError::Base64(_))));
    }

    #[test]
    fn key_rejects_wrong_length() {
        // "AAAA" is valid base64 but decodes to 3 bytes
        assert!(matches!("AAAA".parse::<Key>(), Err(KeyError::Length(3))));
        let long = BASE64_STANDARD.encode([0u8; 33]);
        assert!(matches!(long.parse::<Key>(), Err(KeyError::Length(33))));
    }

    #[test]
    fn cidr_with_and_without_prefix() {
        let cidr: Cidr = "10.0.0.0/24".parse().unwrap();
        assert_eq!(cidr.ip, IpAddr::V4(Ipv4Addr::new(10, 0, 0, 0)));
        assert_eq!(cidr.prefix, 24);

        let host: Cidr = "100.64.0.1".parse().unwrap();
        assert_eq!(host.prefix, 32);

        let v6: Cidr = "fd00::1".parse().unwrap();
        assert_eq!(v6.prefix, 128);
    }

    #[test]
    fn cidr_rejects_oversized_prefix() {
        assert!(matches!(
            "10.0.0.0/33".parse::<Cidr>(),
            Err(CidrError::Range { prefix: 33, max: 32 })
        ));
    }

    #[test]
    fn cidr_display() {
        let cidr: Cidr = "192.168.1.0/24".parse().unwrap();
        assert_eq!(cidr.to_string(), "192.168.1.0/24");
    }

    #[test]
    fn table_grammar() {
        assert_eq!("off".parse::<Table>().unwrap(), Table::Off);
        assert_eq!("OFF".parse::<Table>().unwrap(), Table::Off);
        assert_eq!("42".parse::<Table>().unwrap(), Table::Explicit(42));
        assert!("main?".parse::<Table>().is_err());
    }
}
