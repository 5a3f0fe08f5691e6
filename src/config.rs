//! INI-like repo configuration: `[section]` or `[section "subsection"]`
//! headers followed by `key = value` lines. Recognized content is
//! `core.bare`, `remote.<name>.url` and `branch.<name>.remote`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Result};

type Section = (String, Option<String>);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    sections: BTreeMap<Section, BTreeMap<String, String>>,
}

impl Config {
    #[must_use]
    pub fn new(bare: bool) -> Self {
        let mut config = Self::default();
        config.set("core", None, "bare", if bare { "true" } else { "false" });
        config
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::parse(&fs::read_to_string(path)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.serialize())?;
        Ok(())
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut sections: BTreeMap<Section, BTreeMap<String, String>> = BTreeMap::new();
        let mut current: Option<Section> = None;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                let section = match header.split_once(' ') {
                    Some((name, sub)) => {
                        let sub = sub.trim();
                        let Some(sub) = sub.strip_prefix('"').and_then(|s| s.strip_suffix('"')) else {
                            bail!("malformed config section header: [{header}]");
                        };
                        (name.trim().to_owned(), Some(sub.to_owned()))
                    }
                    None => (header.trim().to_owned(), None),
                };
                sections.entry(section.clone()).or_default();
                current = Some(section);
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                bail!("malformed config line: {line}");
            };
            let Some(section) = &current else {
                bail!("config key outside of any section: {line}");
            };
            sections
                .entry(section.clone())
                .or_default()
                .insert(key.trim().to_owned(), value.trim().to_owned());
        }

        Ok(Self { sections })
    }

    #[must_use]
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for ((name, sub), keys) in &self.sections {
            match sub {
                Some(sub) => out.push_str(&format!("[{name} \"{sub}\"]\n")),
                None => out.push_str(&format!("[{name}]\n")),
            }
            for (key, value) in keys {
                out.push_str(&format!("  {key} = {value}\n"));
            }
        }
        out
    }

    #[must_use]
    pub fn get(&self, section: &str, subsection: Option<&str>, key: &str) -> Option<&str> {
        let section = (section.to_owned(), subsection.map(ToOwned::to_owned));
        self.sections.get(&section)?.get(key).map(String::as_str)
    }

    pub fn set(&mut self, section: &str, subsection: Option<&str>, key: &str, value: &str) {
        let section = (section.to_owned(), subsection.map(ToOwned::to_owned));
        self.sections
            .entry(section)
            .or_default()
            .insert(key.to_owned(), value.to_owned());
    }

    #[inline]
    #[must_use]
    pub fn is_bare(&self) -> bool {
        self.get("core", None, "bare") == Some("true")
    }

    #[inline]
    #[must_use]
    pub fn remote_url(&self, name: &str) -> Option<&str> {
        self.get("remote", Some(name), "url")
    }

    #[inline]
    #[must_use]
    pub fn has_remote(&self, name: &str) -> bool {
        self.remote_url(name).is_some()
    }

    pub fn set_remote(&mut self, name: &str, url: &str) {
        self.set("remote", Some(name), "url", url);
    }

    #[inline]
    #[must_use]
    pub fn branch_remote(&self, branch: &str) -> Option<&str> {
        self.get("branch", Some(branch), "remote")
    }

    pub fn set_branch_remote(&mut self, branch: &str, remote: &str) {
        self.set("branch", Some(branch), "remote", remote);
    }
}
