//
//  Copyright (C) 2022-2024  Chase Ruskin
//
//  This program is free software: you can redistribute it and/or modify
//  it under the terms of the GNU General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  This program is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU General Public License for more details.
//
//  You should have received a copy of the GNU General Public License
//  along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

use crate::error::{Error, LastError};
use crate::util::anyerror::{Fault, FromFile};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde_derive::{Deserialize, Serialize};

pub const DEFAULT_BASE_ADDRESS: u32 = 0x10000;
pub const DEFAULT_ALIGNMENT: u32 = 4;
pub const DEFAULT_BACKUP_EXT: &str = "base";

#[derive(PartialEq, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Bus {
    #[serde(rename = "base-address")]
    base_address: Option<u32>,
    alignment: Option<u32>,
}

impl Bus {
    pub fn new() -> Self {
        Self {
            base_address: None,
            alignment: None,
        }
    }
}

#[derive(PartialEq, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Output {
    directory: Option<PathBuf>,
    #[serde(rename = "backup-extension")]
    backup_extension: Option<String>,
}

impl Output {
    pub fn new() -> Self {
        Self {
            directory: None,
            backup_extension: None,
        }
    }
}

/// Settings for a generation session, usually read from a TOML file.
///
/// Every entry is optional and falls back to a default.
#[derive(PartialEq, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    bus: Option<Bus>,
    output: Option<Output>,
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self {
            bus: None,
            output: None,
        }
    }

    /// First address given to newly allocated slaves.
    pub fn get_base_address(&self) -> u32 {
        self.bus
            .as_ref()
            .and_then(|b| b.base_address)
            .unwrap_or(DEFAULT_BASE_ADDRESS)
    }

    pub fn get_alignment(&self) -> u32 {
        self.bus
            .as_ref()
            .and_then(|b| b.alignment)
            .unwrap_or(DEFAULT_ALIGNMENT)
    }

    /// Directory where standalone module files are written.
    pub fn get_output_dir(&self) -> PathBuf {
        self.output
            .as_ref()
            .and_then(|o| o.directory.clone())
            .unwrap_or(PathBuf::from("."))
    }

    pub fn get_backup_ext(&self) -> &str {
        self.output
            .as_ref()
            .and_then(|o| o.backup_extension.as_deref())
            .unwrap_or(DEFAULT_BACKUP_EXT)
    }

    pub fn set_output_dir(&mut self, dir: &Path) {
        self.output
            .get_or_insert_with(Output::new)
            .directory = Some(dir.to_path_buf());
    }

    pub fn set_bus(&mut self, base_address: u32, alignment: u32) {
        let bus = self.bus.get_or_insert_with(Bus::new);
        bus.base_address = Some(base_address);
        bus.alignment = Some(alignment);
    }
}

impl FromStr for GeneratorConfig {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s).map_err(|e| Error::ConfigInvalid(LastError(e.to_string())))
    }
}

impl FromFile for GeneratorConfig {
    fn from_file(path: &Path) -> Result<Self, Fault> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigUnreadable(path.to_path_buf(), LastError::from(e)))?;
        Ok(Self::from_str(&contents)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const C_0: &str = r#"
# This is a blank configuration file.
"#;

    const C_1: &str = r#"
[bus]
base-address = 0x20000
alignment = 16

[output]
directory = "rtl/gen"
backup-extension = "orig"
"#;

    const C_2: &str = r#"
[bus]
alignment = 8
page-size = 4096
"#;

    #[test]
    fn parse_empty_config() {
        let cfg = GeneratorConfig::from_str(C_0).unwrap();
        assert_eq!(cfg, GeneratorConfig::new());
        assert_eq!(cfg.get_base_address(), 0x10000);
        assert_eq!(cfg.get_alignment(), 4);
        assert_eq!(cfg.get_output_dir(), PathBuf::from("."));
        assert_eq!(cfg.get_backup_ext(), "base");
    }

    #[test]
    fn parse_basic_config() {
        let cfg = GeneratorConfig::from_str(C_1).unwrap();
        assert_eq!(cfg.get_base_address(), 0x20000);
        assert_eq!(cfg.get_alignment(), 16);
        assert_eq!(cfg.get_output_dir(), PathBuf::from("rtl/gen"));
        assert_eq!(cfg.get_backup_ext(), "orig");
    }

    #[test]
    fn reject_unknown_keys() {
        match GeneratorConfig::from_str(C_2) {
            Err(Error::ConfigInvalid(_)) => (),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wbgen.toml");
        std::fs::write(&path, C_1).unwrap();
        let cfg = GeneratorConfig::from_file(&path).unwrap();
        assert_eq!(cfg.get_alignment(), 16);

        let missing = dir.path().join("missing.toml");
        assert_eq!(GeneratorConfig::from_file(&missing).is_err(), true);
    }

    #[test]
    fn setters_override_defaults() {
        let mut cfg = GeneratorConfig::new();
        cfg.set_bus(0x8000, 32);
        cfg.set_output_dir(Path::new("out"));
        assert_eq!(cfg.get_base_address(), 0x8000);
        assert_eq!(cfg.get_alignment(), 32);
        assert_eq!(cfg.get_output_dir(), PathBuf::from("out"));
    }
}
