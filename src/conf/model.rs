use std::{net::IpAddr, net::SocketAddr, time::Duration};

use super::{Cidr, Key, Table};

/// A full wg-quick style interface configuration.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Config {
    // PrivateKey
    pub private_key: Key,

    // ListenPort, absent lets the kernel pick one
    pub listen_port: Option<u16>,

    // Address, one entry per assigned interface address
    pub addresses: Vec<Cidr>,

    // DNS
    pub dns: Vec<IpAddr>,

    // MTU, 0 means automatic discovery
    pub mtu: u16,

    // Table
    pub table: Table,

    // PreUp / PostUp / PreDown / PostDown, run in order by the
    // interface-control backend
    pub pre_up: Vec<String>,
    pub post_up: Vec<String>,
    pub pre_down: Vec<String>,
    pub post_down: Vec<String>,

    // Route protocol to set on managed routes, see linux/rtnetlink.h
    pub route_protocol: u32,

    // Metric to set on managed routes, lower wins
    pub route_metric: u32,

    // Label to set on the link address
    pub address_label: String,

    // SaveConfig, parsed but not enforced here
    pub save_config: bool,

    // WgBin, userspace wireguard binary path, empty for kernel WireGuard
    pub wg_bin: String,

    pub peers: Vec<Peer>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Peer {
    // PublicKey
    pub public_key: Key,

    // PresharedKey
    pub preshared_key: Option<Key>,

    // AllowedIPs
    pub allowed_ips: Vec<Cidr>,

    // Endpoint, resolved while decoding
    pub endpoint: Option<SocketAddr>,

    // PersistentKeepalive, whole seconds
    pub persistent_keepalive: Option<Duration>,
}
