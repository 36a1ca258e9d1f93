use std::collections::HashMap;

use super::{
    Key,
    parse::{DirectiveError, ParseError, Section},
};

/// Pairs each peer's public key with its raw `Endpoint` value, without
/// decoding the rest of the file. Hostname endpoints stay unresolved, which
/// is the point: callers re-resolve them later.
///
/// Both transient fields reset on every `[Peer]` header and after each
/// committed pair; a later peer re-declaring a public key overwrites the
/// earlier entry.
pub fn unresolved_endpoints(text: &str) -> Result<HashMap<Key, String>, ParseError> {
    let mut section = Section::None;
    let mut pubkey = "";
    let mut endpoint = "";
    let mut out = HashMap::new();

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
                pubkey = "";
                endpoint = "";
                continue;
            }
            _ => {}
        }

        if section != Section::Peer {
            continue;
        }

        let Some((lhs, rhs)) = ln.split_once('=') else {
            return Err(ParseError {
                line,
                kind: DirectiveError::MissingEquals,
            });
        };

        match lhs.trim() {
            "PublicKey" => pubkey = rhs.trim(),
            "Endpoint" => endpoint = rhs.trim(),
            _ => {}
        }

        if pubkey.is_empty() || endpoint.is_empty() {
            continue;
        }

        let key: Key = pubkey
            .parse()
            .map_err(|err: super::KeyError| ParseError {
                line,
                kind: err.into(),
            })?;
        out.insert(key, endpoint.to_string());
        pubkey = "";
        endpoint = "";
    }

    Ok(out)
}
