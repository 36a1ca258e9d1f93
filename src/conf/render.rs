use std::fmt;

use super::{
    Table,
    model::{Config, Peer},
};

/// Canonical wg-quick text form. Never fails on a well-formed value:
/// absent optional fields are simply omitted, validation is the caller's
/// business.
impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[Interface]")?;
        for addr in &self.addresses {
            writeln!(f, "Address = {addr}")?;
        }
        for dns in &self.dns {
            writeln!(f, "DNS = {dns}")?;
        }
        writeln!(f, "PrivateKey = {}", self.private_key)?;

        if let Some(port) = self.listen_port {
            writeln!(f, "ListenPort = {port}")?;
        }
        if self.mtu != 0 {
            writeln!(f, "MTU = {}", self.mtu)?;
        }
        match self.table {
            Table::Default => {}
            Table::Off => writeln!(f, "Table = off")?,
            Table::Explicit(n) => writeln!(f, "Table = {n}")?,
        }

        // hook lists collapse to one line each, unlike the one-per-line decode
        hook_line(f, "PreUp", &self.pre_up)?;
        hook_line(f, "PostUp", &self.post_up)?;
        hook_line(f, "PreDown", &self.pre_down)?;
        hook_line(f, "PostDown", &self.post_down)?;

        if self.save_config {
            writeln!(f, "SaveConfig = true")?;
        }

        for peer in &self.peers {
            writeln!(f)?;
            write!(f, "{peer}")?;
        }

        Ok(())
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[Peer]")?;
        writeln!(f, "PublicKey = {}", self.public_key)?;

        write!(f, "AllowedIPs = ")?;
        for (i, cidr) in self.allowed_ips.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{cidr}")?;
        }
        writeln!(f)?;

        if let Some(psk) = &self.preshared_key {
            writeln!(f, "PresharedKey = {psk}")?;
        }
        if let Some(keepalive) = self.persistent_keepalive {
            writeln!(f, "PersistentKeepalive = {}", keepalive.as_secs())?;
        }
        if let Some(endpoint) = self.endpoint {
            writeln!(f, "Endpoint = {endpoint}")?;
        }

        Ok(())
    }
}

fn hook_line(f: &mut fmt::Formatter<'_>, name: &str, cmds: &[String]) -> fmt::Result {
    if !cmds.is_empty() {
        writeln!(f, "{name} = {}", cmds.join(" "))?;
    }
    Ok(())
}
