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

//! Splices a generated module into an existing, partially hand-written
//! Verilog file.
//!
//! The target file is not parsed. Each line is checked, after removing its
//! leading whitespace, against a small set of marker prefixes and everything
//! else is copied through untouched.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use crate::core::verilog::module::Module;
use crate::error::{Error, Hint, LastError};
use crate::util::filesystem;

/// A line in the target file that the patcher rewrites or extends.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Marker {
    ModuleDeclaration,
    SlaveCount,
    SlaveBase,
    SlaveHigh,
    EndModule,
}

impl Marker {
    /// Every marker in the order lines are tested against them.
    pub const ALL: [Marker; 5] = [
        Self::ModuleDeclaration,
        Self::SlaveCount,
        Self::SlaveBase,
        Self::SlaveHigh,
        Self::EndModule,
    ];

    pub fn prefix(&self) -> &'static str {
        match self {
            Self::ModuleDeclaration => "module",
            Self::SlaveCount => "localparam N_WB_SLAVES",
            Self::SlaveBase => "localparam SLAVE_BASE = {",
            Self::SlaveHigh => "localparam SLAVE_HIGH = {",
            Self::EndModule => "endmodule",
        }
    }

    /// Identifies which marker, if any, the `line` opens.
    pub fn detect(line: &str) -> Option<Marker> {
        let line = line.trim_start();
        Self::ALL.into_iter().find(|m| match m {
            // identifiers must not be the front of a longer identifier
            Self::ModuleDeclaration | Self::EndModule | Self::SlaveCount => {
                starts_with_keyword(line, m.prefix())
            }
            _ => line.starts_with(m.prefix()),
        })
    }

    fn position(&self) -> usize {
        match self {
            Self::ModuleDeclaration => 0,
            Self::SlaveCount => 1,
            Self::SlaveBase => 2,
            Self::SlaveHigh => 3,
            Self::EndModule => 4,
        }
    }
}

impl Display for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\"", self.prefix())
    }
}

fn starts_with_keyword(line: &str, kw: &str) -> bool {
    match line.strip_prefix(kw) {
        Some(rest) => match rest.chars().next() {
            Some(c) => c.is_ascii_alphanumeric() == false && c != '_' && c != '$',
            None => true,
        },
        None => false,
    }
}

/// Locates the byte range of the last decimal literal in the code portion of
/// a line, ignoring any `//` comment.
fn find_count(line: &str) -> Option<(usize, usize)> {
    let code = match line.find("//") {
        Some(i) => &line[..i],
        None => line,
    };
    let end = code.rfind(|c: char| c.is_ascii_digit())? + 1;
    let start = code[..end]
        .rfind(|c: char| c.is_ascii_digit() == false)
        .map(|i| i + 1)
        .unwrap_or(0);
    Some((start, end))
}

/// Reads the number of slaves from a `localparam N_WB_SLAVES` line.
pub fn parse_slave_count(line: &str) -> Option<usize> {
    let (start, end) = find_count(line)?;
    line[start..end].parse::<usize>().ok()
}

/// Rewrites a `localparam N_WB_SLAVES` line so its count grows by `added`.
///
/// Everything around the literal, including a trailing comment and the line
/// ending, is kept as is.
pub fn rewrite_slave_count(line: &str, added: usize) -> Option<String> {
    let (start, end) = find_count(line)?;
    let count = line[start..end].parse::<usize>().ok()?;
    let total = count.checked_add(added)?;
    Some(format!("{}{}{}", &line[..start], total, &line[end..]))
}

/// Finds how many wishbone slaves the file at `path` already declares.
pub fn discover_slave_count(path: &Path) -> Result<usize, Error> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| Error::TargetFileUnreadable(path.to_path_buf(), LastError::from(e)))?;
    let line = contents
        .lines()
        .find(|l| Marker::detect(l) == Some(Marker::SlaveCount))
        .ok_or_else(|| {
            Error::SlaveCountNotFound(path.to_path_buf(), Hint::SlaveCountDeclaration)
        })?;
    log::info!("found N_WB_SLAVES declaration in {}", path.display());
    parse_slave_count(line)
        .ok_or_else(|| Error::SlaveCountMalformed(path.to_path_buf(), line.trim().to_string()))
}

/// Converts the `\n` line endings of generated `text` to `eol`.
fn with_line_ending(text: &str, eol: &str) -> String {
    match eol {
        "\n" => text.to_string(),
        _ => text.replace("\r\n", "\n").replace('\n', eol),
    }
}

/// Produces the patched text of `contents`, the current text of the module's
/// target file at `path`.
///
/// Fails if any marker is absent or appears more than once, since the result
/// would silently lack (or duplicate) generated content.
pub fn patch_text(module: &Module, contents: &str, path: &Path) -> Result<String, Error> {
    // generated lines follow the host file's line endings
    let eol = match contents.contains("\r\n") {
        true => "\r\n",
        false => "\n",
    };
    let added = module.allocated_slaves();
    let (base_table, high_table) = match module.get_address_map() {
        Some(map) => (map.into_base_table(), map.into_high_table()),
        None => (String::new(), String::new()),
    };
    let base_table = with_line_ending(&base_table, eol);
    let high_table = with_line_ending(&high_table, eol);
    let port_list = with_line_ending(&module.into_port_list(), eol);
    let fragment = with_line_ending(&module.into_fragment(), eol);

    let mut seen = [0usize; 5];
    let mut result = format!("// {}, AUTOMATICALLY MODIFIED{}{}", path.display(), eol, eol);
    for line in contents.split_inclusive('\n') {
        let marker = match Marker::detect(line) {
            Some(m) => m,
            None => {
                result.push_str(line);
                continue;
            }
        };
        log::info!("found {} in {}", marker, path.display());
        seen[marker.position()] += 1;
        match marker {
            Marker::ModuleDeclaration => {
                result.push_str(line);
                result.push_str(&port_list);
            }
            Marker::SlaveCount => {
                let rewritten = rewrite_slave_count(line, added).ok_or_else(|| {
                    Error::SlaveCountMalformed(path.to_path_buf(), line.trim().to_string())
                })?;
                result.push_str(&rewritten);
            }
            Marker::SlaveBase => {
                result.push_str(line);
                result.push_str(&base_table);
            }
            Marker::SlaveHigh => {
                result.push_str(line);
                result.push_str(&high_table);
            }
            Marker::EndModule => {
                result.push_str(&fragment);
                result.push_str(line);
            }
        }
    }

    let missing: Vec<String> = Marker::ALL
        .iter()
        .filter(|m| seen[m.position()] == 0)
        .map(|m| m.to_string())
        .collect();
    if missing.is_empty() == false {
        return Err(Error::MissingMarkers(
            path.to_path_buf(),
            missing.join(", "),
            Hint::PatchMarkers,
        ));
    }
    if let Some(m) = Marker::ALL.iter().find(|m| seen[m.position()] > 1) {
        return Err(Error::RepeatedMarker(
            path.to_path_buf(),
            m.to_string(),
            seen[m.position()],
        ));
    }
    Ok(result)
}

/// Rewrites the module's target file in place, keeping the original next to
/// it with the `backup_ext` extension.
///
/// Returns the path of the backup. Nothing on disk changes unless every
/// marker was found.
pub fn patch_file(module: &Module, target: &Path, backup_ext: &str) -> Result<PathBuf, Error> {
    let contents = std::fs::read_to_string(target)
        .map_err(|e| Error::TargetFileUnreadable(target.to_path_buf(), LastError::from(e)))?;
    let patched = patch_text(module, &contents, target)?;
    filesystem::replace_with_backup(target, &patched, backup_ext)
}
