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

use colored::Colorize;
use std::{fmt::Display, path::PathBuf};

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("module name must be a string of non-zero length")]
    EmptyModuleName,
    #[error("instance entity must be a string of non-zero length")]
    EmptyEntity,
    #[error("instance name must be a string of non-zero length")]
    EmptyInstanceName,
    #[error("port name must be a string of non-zero length")]
    EmptyPortName,
    #[error("signal name must be a string of non-zero length")]
    EmptySignalName,
    #[error("parameter name must be a string of non-zero length")]
    EmptyParameterName,
    #[error("{0:?} cannot have a width of zero")]
    ZeroWidth(String),
    #[error("failed to read target file {0:?}: {1}")]
    TargetFileUnreadable(PathBuf, LastError),
    #[error("target file {0:?} has no N_WB_SLAVES declaration{1}")]
    SlaveCountNotFound(PathBuf, Hint),
    #[error("target file {0:?} has a malformed N_WB_SLAVES declaration: {1:?}")]
    SlaveCountMalformed(PathBuf, String),
    #[error("bus alignment must be at least 1 byte")]
    ZeroAlignment,
    #[error("bus interface {0:?} must span at least 1 byte")]
    ZeroBusSize(String),
    #[error("bus interface {0:?} does not fit in the 32-bit address space")]
    AddressOverflow(String),
    #[error("bus addresses for module {0:?} have already been allocated")]
    AlreadyAllocated(String),
    #[error("target file {0:?} is missing markers: {1}{2}")]
    MissingMarkers(PathBuf, String, Hint),
    #[error("target file {0:?} declares {1} {2} times")]
    RepeatedMarker(PathBuf, String, usize),
    #[error("failed to back up {0:?}: {1}")]
    BackupFailed(PathBuf, LastError),
    #[error("failed to write {0:?}: {1}")]
    WriteFailed(PathBuf, LastError),
    #[error("failed to read configuration file {0:?}: {1}")]
    ConfigUnreadable(PathBuf, LastError),
    #[error("failed to parse configuration: {0}")]
    ConfigInvalid(LastError),
}

#[derive(Debug, PartialEq)]
pub struct LastError(pub String);

impl Display for LastError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Error::lowerize(self.0.to_string()))
    }
}

impl From<std::io::Error> for LastError {
    fn from(value: std::io::Error) -> Self {
        Self(value.to_string())
    }
}

impl Error {
    pub fn lowerize(s: String) -> String {
        // get the first word
        let first_word = match s.split_whitespace().next() {
            Some(w) => w,
            None => return s,
        };
        // retain punctuation if the first word is all-caps and longer than 1 character
        if first_word.len() > 1 && first_word.chars().any(|c| c.is_ascii_lowercase()) == false {
            s
        } else {
            s.char_indices()
                .map(|(i, c)| if i == 0 { c.to_ascii_lowercase() } else { c })
                .collect()
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Hint {
    SlaveCountDeclaration,
    PatchMarkers,
}

impl Display for Hint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Self::SlaveCountDeclaration => {
                "declare the slave count as `localparam N_WB_SLAVES = <n>;` in the target file"
            }
            Self::PatchMarkers => {
                "the target file needs `module`, `localparam N_WB_SLAVES`, `localparam SLAVE_BASE = {`, `localparam SLAVE_HIGH = {` and `endmodule` lines"
            }
        };
        write!(
            f,
            "\n\n{}: {}",
            "hint".green(),
            Error::lowerize(message.to_string())
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lowerize_first_word() {
        assert_eq!(
            Error::lowerize(String::from("No such file or directory")),
            String::from("no such file or directory")
        );
        // acronyms keep their casing
        assert_eq!(
            Error::lowerize(String::from("IO failure")),
            String::from("IO failure")
        );
        assert_eq!(Error::lowerize(String::new()), String::new());
    }

    #[test]
    fn last_error_from_io() {
        let e = std::io::Error::new(std::io::ErrorKind::Other, "Disk full");
        assert_eq!(LastError::from(e).to_string(), "disk full");
    }
}
