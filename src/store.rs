use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use regex::Regex;

use crate::{
    conf::{Key, endpoints::unresolved_endpoints, model::Config},
    error::Error,
};

/// Where config texts come from. The store never walks directories itself.
pub trait FileProvider {
    /// Names of every available config, without the `.conf` suffix.
    fn list(&self) -> io::Result<Vec<String>>;

    /// Raw text of the named config.
    fn read(&self, name: &str) -> io::Result<String>;
}

/// `<name>.conf` files in a single directory, `/etc/wireguard` by default.
pub struct DirProvider {
    dir: PathBuf,
}

impl Default for DirProvider {
    fn default() -> Self {
        Self::new("/etc/wireguard")
    }
}

impl DirProvider {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl FileProvider for DirProvider {
    fn list(&self) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if let Some(name) = entry
                .file_name()
                .to_str()
                .and_then(|n| n.strip_suffix(".conf"))
            {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn read(&self, name: &str) -> io::Result<String> {
        fs::read_to_string(self.dir.join(format!("{name}.conf")))
    }
}

pub struct ConfigStore<P> {
    provider: P,
}

impl<P: FileProvider> ConfigStore<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Fetches and decodes one named config. Read failures carry the name,
    /// decode failures the line number.
    pub fn get(&self, name: &str) -> Result<Config, Error> {
        let text = self.provider.read(name).map_err(|source| Error::Read {
            name: name.to_string(),
            source,
        })?;
        Ok(Config::parse(&text)?)
    }

    /// Decodes every config whose name matches the pattern. The pattern is
    /// anchored with `^`/`$` unless the caller anchored it already. One bad
    /// file does not spoil the batch: each name maps to its own result.
    pub fn matching(&self, pattern: &str) -> Result<HashMap<String, Result<Config, Error>>, Error> {
        let re = Regex::new(&anchor(pattern))?;

        let mut out = HashMap::new();
        for name in self.provider.list().map_err(Error::List)? {
            if re.is_match(&name) {
                let cfg = self.get(&name);
                out.insert(name, cfg);
            }
        }
        Ok(out)
    }

    /// Raw `PublicKey`/`Endpoint` pairs of the named config, hostnames left
    /// unresolved.
    pub fn unresolved_endpoints(&self, name: &str) -> Result<HashMap<Key, String>, Error> {
        let text = self.provider.read(name).map_err(|source| Error::Read {
            name: name.to_string(),
            source,
        })?;
        Ok(unresolved_endpoints(&text)?)
    }
}

fn anchor(pattern: &str) -> String {
    let mut anchored = String::with_capacity(pattern.len() + 2);
    if !pattern.starts_with('^') {
        anchored.push('^');
    }
    anchored.push_str(pattern);
    if !pattern.ends_with('$') {
        anchored.push('$');
    }
    anchored
}
