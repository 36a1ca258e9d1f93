use std::{collections::HashMap, net::SocketAddr, time::Duration};

use crate::{conf::Key, error::Error};

/// Per-peer runtime state as reported by the control plane.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PeerStatus {
    pub endpoint: Option<SocketAddr>,

    // seconds since the unix epoch, None when no handshake happened yet
    pub latest_handshake: Option<u64>,

    pub rx_bytes: u64,
    pub tx_bytes: u64,

    pub persistent_keepalive: Option<Duration>,
}

/// The interface-control collaborator, seen from the config side.
pub trait DeviceApi {
    fn peer_status(&self, iface: &str) -> Result<HashMap<Key, PeerStatus>, Error>;
}

/// Backend that shells out to the `wg` tool.
pub struct WgCmdBackend;

impl WgCmdBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WgCmdBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceApi for WgCmdBackend {
    fn peer_status(&self, iface: &str) -> Result<HashMap<Key, PeerStatus>, Error> {
        let out = std::process::Command::new("wg")
            .arg("show")
            .arg(iface)
            .arg("dump")
            .output()?;

        if !out.status.success() {
            return Err(Error::WgCommandFail(out.status.code()));
        }

        parse_dump(&String::from_utf8_lossy(&out.stdout))
    }
}

/// `wg show <iface> dump`: one tab-separated line per peer after the
/// interface line, with `(none)` and `off` placeholder tokens.
fn parse_dump(dump: &str) -> Result<HashMap<Key, PeerStatus>, Error> {
    let mut peers = HashMap::new();

    // first line describes the interface itself
    for line in dump.lines().skip(1) {
        let mut fields = line.split('\t');
        let mut next = || {
            fields
                .next()
                .ok_or_else(|| Error::WgOutput(format!("truncated peer line: {line}")))
        };

        let key: Key = next()?
            .parse()
            .map_err(|err| Error::WgOutput(format!("bad peer key: {err}")))?;
        let _preshared = next()?;
        let endpoint = optional(next()?)
            .map(|s| s.parse::<SocketAddr>())
            .transpose()
            .map_err(|err| Error::WgOutput(format!("bad endpoint: {err}")))?;
        let _allowed_ips = next()?;
        let latest_handshake = match parse_u64(next()?, line)? {
            0 => None,
            secs => Some(secs),
        };
        let rx_bytes = parse_u64(next()?, line)?;
        let tx_bytes = parse_u64(next()?, line)?;
        let persistent_keepalive = optional(next()?)
            .map(|s| parse_u64(s, line).map(Duration::from_secs))
            .transpose()?;

        peers.insert(
            key,
            PeerStatus {
                endpoint,
                latest_handshake,
                rx_bytes,
                tx_bytes,
                persistent_keepalive,
            },
        );
    }

    Ok(peers)
}

fn optional(field: &str) -> Option<&str> {
    match field {
        "(none)" | "off" => None,
        other => Some(other),
    }
}

fn parse_u64(field: &str, line: &str) -> Result<u64, Error> {
    field
        .parse()
        .map_err(|_| Error::WgOutput(format!("bad number {field:?} in: {line}")))
}
