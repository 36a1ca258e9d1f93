use std::path::PathBuf;

use clap::Parser;
use error::Error;
use runtime::{DeviceApi, WgCmdBackend};
use store::{ConfigStore, DirProvider};

mod conf;
pub(crate) mod error;
mod runtime;
mod store;

#[derive(Debug, clap::Parser)]
pub struct Args {
    /// Directory holding <name>.conf files
    #[arg(long, default_value = "/etc/wireguard")]
    dir: PathBuf,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Debug, clap::Subcommand)]
enum Cmd {
    /// Decode a config and print its canonical text form
    Show { name: String },
    /// Decode every config whose name matches a pattern
    Match { pattern: String },
    /// Print the unresolved peer endpoints of a config
    Endpoints { name: String },
    /// Print per-peer runtime status of a live interface
    Status { iface: String },
}

fn main() -> Result<(), Error> {
    unsafe { std::env::set_var("RUST_LOG", "info") };
    env_logger::init();

    let args = Args::parse();
    let store = ConfigStore::new(DirProvider::new(&args.dir));

    match args.cmd {
        Cmd::Show { name } => {
            let cfg = store.get(&name)?;
            print!("{cfg}");
        }
        Cmd::Match { pattern } => {
            for (name, res) in store.matching(&pattern)? {
                match res {
                    Ok(cfg) => {
                        println!("# {name}");
                        print!("{cfg}");
                        println!();
                    }
                    Err(err) => log::error!("skipping {name}: {err}"),
                }
            }
        }
        Cmd::Endpoints { name } => {
            for (key, endpoint) in store.unresolved_endpoints(&name)? {
                println!("{key} {endpoint}");
            }
        }
        Cmd::Status { iface } => {
            for (key, status) in WgCmdBackend::new().peer_status(&iface)? {
                println!(
                    "{key} endpoint={} handshake={} rx={} tx={}",
                    status
                        .endpoint
                        .map_or_else(|| "(none)".to_string(), |ep| ep.to_string()),
                    status.latest_handshake.unwrap_or(0),
                    status.rx_bytes,
                    status.tx_bytes,
                );
            }
        }
    }

    Ok(())
}
