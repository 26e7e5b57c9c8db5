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

use std::fmt::Display;

/// The Verilog keywords the generator emits.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Keyword {
    Module,     // IEEE 1364-1995 - current
    Endmodule,  // IEEE 1364-1995 - current
    Input,      // IEEE 1364-1995 - current
    Output,     // IEEE 1364-1995 - current
    Inout,      // IEEE 1364-1995 - current
    Wire,       // IEEE 1364-1995 - current
    Parameter,  // IEEE 1364-1995 - current
    Localparam, // IEEE 1364-2001 - current
    Assign,     // IEEE 1364-1995 - current
}

impl Keyword {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Module => "module",
            Self::Endmodule => "endmodule",
            Self::Input => "input",
            Self::Output => "output",
            Self::Inout => "inout",
            Self::Wire => "wire",
            Self::Parameter => "parameter",
            Self::Localparam => "localparam",
            Self::Assign => "assign",
        }
    }
}

impl Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Formats the packed range for a vector of `width` bits, or nothing for a
/// scalar.
pub fn display_range(width: Option<u32>) -> String {
    match width {
        Some(w) => format!("[{}:0] ", w.saturating_sub(1)),
        None => String::new(),
    }
}

/// Formats a trailing line comment, or nothing when there is no comment.
pub fn display_comment(comment: &Option<String>) -> String {
    match comment {
        Some(c) => format!(" // {}", c),
        None => String::new(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ranges() {
        assert_eq!(display_range(None), "");
        assert_eq!(display_range(Some(1)), "[0:0] ");
        assert_eq!(display_range(Some(32)), "[31:0] ");
    }

    #[test]
    fn keywords() {
        assert_eq!(Keyword::Localparam.to_string(), "localparam");
        assert_eq!(Keyword::Endmodule.to_string(), "endmodule");
    }
}
