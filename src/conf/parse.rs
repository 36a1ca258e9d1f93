use std::{
    net::{AddrParseError, ToSocketAddrs},
    num::ParseIntError,
    str::{FromStr, ParseBoolError},
    time::Duration,
};

use super::{
    CidrError, KeyError,
    model::{Config, Peer},
};

/// Which section the scanner is currently inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Section {
    None,
    Interface,
    Peer,
}

#[derive(Debug, thiserror::Error)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    pub line: usize,
    #[source]
    pub kind: DirectiveError,
}

#[derive(Debug, thiserror::Error)]
pub enum DirectiveError {
    #[error("missing '='")]
    MissingEquals,

    #[error("directive before any section header")]
    NoSection,

    #[error("unknown directive {0}")]
    UnknownDirective(String),

    #[error("bad key: {0}")]
    Key(#[from] KeyError),

    #[error("bad CIDR: {0}")]
    Cidr(#[from] CidrError),

    #[error("bad IP: {0}")]
    Ip(#[from] AddrParseError),

    #[error("bad integer: {0}")]
    Int(#[from] ParseIntError),

    #[error("bad boolean: {0}")]
    Bool(#[from] ParseBoolError),

    #[error("preshared key already set for this peer")]
    DuplicatePresharedKey,

    #[error("cannot resolve endpoint {endpoint}: {source}")]
    EndpointResolve {
        endpoint: String,
        source: std::io::Error,
    },

    #[error("endpoint {0} resolved to no addresses")]
    EndpointEmpty(String),
}

impl FromStr for Config {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Config::parse(text)
    }
}

impl Config {
    /// Decodes the wg-quick text form. All-or-nothing: the first bad line
    /// aborts the whole decode, carrying its 1-based line number.
    pub fn parse(text: &str) -> Result<Config, ParseError> {
        let mut cfg = Config::default();
        let mut section = Section::None;

        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let ln = raw.trim();
            if ln.is_empty() || ln.starts_with('#') {
                continue;
            }

            match ln {
                "[Interface]" => {
                    section = Section::Interface;
                    continue;
                }
                "[Peer]" => {
                    section = Section::Peer;
                    cfg.peers.push(Peer::default());
                    continue;
                }
                _ => {}
            }

            // everything after the first '=' belongs to the value
            let Some((lhs, rhs)) = ln.split_once('=') else {
                return Err(ParseError {
                    line,
                    kind: DirectiveError::MissingEquals,
                });
            };
            let (lhs, rhs) = (lhs.trim(), rhs.trim());

            let res = match section {
                Section::Interface => interface_directive(&mut cfg, lhs, rhs),
                Section::Peer => {
                    // a [Peer] header always precedes this state
                    let peer = cfg.peers.last_mut().expect("peer section without peer");
                    peer_directive(peer, lhs, rhs)
                }
                Section::None => Err(DirectiveError::NoSection),
            };
            res.map_err(|kind| ParseError { line, kind })?;
        }

        Ok(cfg)
    }
}

fn interface_directive(cfg: &mut Config, lhs: &str, rhs: &str) -> Result<(), DirectiveError> {
    match lhs {
        "Address" => append_list(&mut cfg.addresses, rhs)?,
        "DNS" => {
            for part in list_items(rhs) {
                cfg.dns.push(part.parse()?);
            }
        }
        "MTU" => cfg.mtu = rhs.parse()?,
        "Table" => cfg.table = rhs.parse()?,
        "ListenPort" => cfg.listen_port = Some(rhs.parse()?),
        "PreUp" => cfg.pre_up.push(rhs.to_string()),
        "PostUp" => cfg.post_up.push(rhs.to_string()),
        "PreDown" => cfg.pre_down.push(rhs.to_string()),
        "PostDown" => cfg.post_down.push(rhs.to_string()),
        "SaveConfig" => cfg.save_config = rhs.parse()?,
        "PrivateKey" => cfg.private_key = rhs.parse()?,
        "WgBin" => cfg.wg_bin = rhs.to_string(),
        other => return Err(DirectiveError::UnknownDirective(other.to_string())),
    }
    Ok(())
}

fn peer_directive(peer: &mut Peer, lhs: &str, rhs: &str) -> Result<(), DirectiveError> {
    match lhs {
        "PublicKey" => peer.public_key = rhs.parse()?,
        "PresharedKey" => {
            if peer.preshared_key.is_some() {
                return Err(DirectiveError::DuplicatePresharedKey);
            }
            peer.preshared_key = Some(rhs.parse()?);
        }
        "AllowedIPs" => append_list(&mut peer.allowed_ips, rhs)?,
        "Endpoint" => {
            let addr = rhs
                .to_socket_addrs()
                .map_err(|source| DirectiveError::EndpointResolve {
                    endpoint: rhs.to_string(),
                    source,
                })?
                .next()
                .ok_or_else(|| DirectiveError::EndpointEmpty(rhs.to_string()))?;
            peer.endpoint = Some(addr);
        }
        "PersistentKeepalive" => {
            peer.persistent_keepalive = Some(Duration::from_secs(rhs.parse()?));
        }
        other => return Err(DirectiveError::UnknownDirective(other.to_string())),
    }
    Ok(())
}

fn append_list<T: FromStr>(out: &mut Vec<T>, rhs: &str) -> Result<(), T::Err> {
    for part in list_items(rhs) {
        out.push(part.parse()?);
    }
    Ok(())
}

/// Comma-separated list elements, trimmed. An empty value yields no items
/// so an always-emitted empty `AllowedIPs =` line round-trips.
fn list_items(rhs: &str) -> impl Iterator<Item = &str> {
    rhs.split(',').map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use super::super::{Cidr, Key, Table, model::Config};
    use super::DirectiveError;

    #[test]
    fn parse_full_config() {
        let priv_key = Key::random();
        let srv_key = Key::random();
        let laptop_key = Key::random();
        let psk = Key::random();

        let text = format!(
            "# server tunnel
[Interface]
PrivateKey = {priv_key}
Address = 100.64.0.2/24, fd00::2/64
DNS = 1.1.1.1, 8.8.8.8
ListenPort = 51822
MTU = 1380
Table = 123
PostUp = iptables -A FORWARD -i %i -j ACCEPT
PostUp = iptables -t nat -A POSTROUTING -o eth0 -j MASQUERADE
SaveConfig = true

[Peer]
PublicKey = {srv_key}
PresharedKey = {psk}
Endpoint = 192.0.2.10:51821
AllowedIPs = 100.64.0.1, 192.168.0.0/24
PersistentKeepalive = 25

[Peer]
PublicKey = {laptop_key}
AllowedIPs = 100.64.0.3
"
        );

        let cfg = Config::parse(&text).unwrap();

        assert_eq!(cfg.private_key, priv_key);
        assert_eq!(
            cfg.addresses,
            vec![
                "100.64.0.2/24".parse::<Cidr>().unwrap(),
                "fd00::2/64".parse::<Cidr>().unwrap(),
            ]
        );
        assert_eq!(
            cfg.dns,
            vec![
                IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)),
                IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)),
            ]
        );
        assert_eq!(cfg.listen_port, Some(51822));
        assert_eq!(cfg.mtu, 1380);
        assert_eq!(cfg.table, Table::Explicit(123));
        assert_eq!(cfg.post_up.len(), 2);
        assert!(cfg.save_config);

        assert_eq!(cfg.peers.len(), 2);
        let srv = &cfg.peers[0];
        assert_eq!(srv.public_key, srv_key);
        assert_eq!(srv.preshared_key, Some(psk));
        assert_eq!(srv.endpoint, Some("192.0.2.10:51821".parse().unwrap()));
        assert_eq!(srv.allowed_ips.len(), 2);
        assert_eq!(srv.allowed_ips[1].prefix, 24);
        assert_eq!(
            srv.persistent_keepalive,
            Some(std::time::Duration::from_secs(25))
        );

        let laptop = &cfg.peers[1];
        assert_eq!(laptop.public_key, laptop_key);
        assert_eq!(laptop.preshared_key, None);
        assert_eq!(laptop.endpoint, None);
    }

    #[test]
    fn value_keeps_everything_after_first_equals() {
        let key = Key::random();
        let text = format!(
            "[Interface]\nPrivateKey = {key}\nPostUp = env FOO=bar wg set %i\n"
        );
        let cfg = Config::parse(&text).unwrap();
        assert_eq!(cfg.post_up, vec!["env FOO=bar wg set %i".to_string()]);
    }

    #[test]
    fn table_tri_state() {
        let off = Config::parse("[Interface]\nTable = off\n").unwrap();
        assert_eq!(off.table, Table::Off);

        let upper = Config::parse("[Interface]\nTable = OFF\n").unwrap();
        assert_eq!(upper.table, Table::Off);

        let unset = Config::parse("[Interface]\n").unwrap();
        assert_eq!(unset.table, Table::Default);

        let explicit = Config::parse("[Interface]\nTable = 42\n").unwrap();
        assert_eq!(explicit.table, Table::Explicit(42));
    }

    #[test]
    fn duplicate_preshared_key_fails() {
        let psk = Key::random();
        let text = format!(
            "[Peer]\nPublicKey = {}\nPresharedKey = {psk}\nPresharedKey = {psk}\n",
            Key::random(),
        );
        let err = Config::parse(&text).unwrap_err();
        assert_eq!(err.line, 4);
        assert!(matches!(err.kind, DirectiveError::DuplicatePresharedKey));
    }

    #[test]
    fn unknown_directive_fails_with_line() {
        let err = Config::parse("[Interface]\nFoo = bar\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(matches!(err.kind, DirectiveError::UnknownDirective(ref d) if d == "Foo"));

        let err = Config::parse("[Peer]\nFoo = bar\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(matches!(err.kind, DirectiveError::UnknownDirective(_)));
    }

    #[test]
    fn missing_equals_fails_with_line() {
        let err = Config::parse("[Interface]\nMTU 1420\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(matches!(err.kind, DirectiveError::MissingEquals));
    }

    #[test]
    fn directive_before_section_fails() {
        let err = Config::parse("MTU = 1420\n").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(matches!(err.kind, DirectiveError::NoSection));
    }

    #[test]
    fn short_key_is_rejected() {
        let err = Config::parse("[Interface]\nPrivateKey = AAAA\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(matches!(err.kind, DirectiveError::Key(_)));
    }

    #[test]
    fn empty_peer_block_is_legal() {
        let cfg = Config::parse("[Interface]\n\n[Peer]\n").unwrap();
        assert_eq!(cfg.peers.len(), 1);
        assert_eq!(cfg.peers[0], Default::default());
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let text = "# leading comment\n\n[Interface]\n  # indented comment\nMTU = 1400\n";
        let cfg = Config::parse(text).unwrap();
        assert_eq!(cfg.mtu, 1400);
    }

    #[test]
    fn bad_cidr_reports_field_error() {
        let err = Config::parse("[Interface]\nAddress = 10.0.0.0/24, nonsense\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(matches!(err.kind, DirectiveError::Cidr(_)));
    }
}
