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

use super::keyword::{self, Keyword};
use crate::error::Error;
use std::fmt::Display;

pub type PortList = Vec<Port>;
pub type ParamList = Vec<Parameter>;

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Direction {
    In,
    Out,
    Inout,
}

impl Direction {
    pub fn as_keyword(&self) -> Keyword {
        match self {
            Self::In => Keyword::Input,
            Self::Out => Keyword::Output,
            Self::Inout => Keyword::Inout,
        }
    }
}

/// A port on the module being generated.
///
/// A port without a width is a scalar; a port with width `N` is declared as
/// the vector `[N-1:0]`.
#[derive(Debug, PartialEq, Clone)]
pub struct Port {
    name: String,
    direction: Direction,
    width: Option<u32>,
    comment: Option<String>,
    attributes: Vec<(String, String)>,
}

impl Port {
    pub fn new(name: &str, direction: Direction) -> Self {
        Self {
            name: name.to_string(),
            direction: direction,
            width: None,
            comment: None,
            attributes: Vec::new(),
        }
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = Some(comment.to_string());
        self
    }

    /// Attaches a Verilog attribute, kept in the order attributes are added.
    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.push((key.to_string(), value.to_string()));
        self
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_direction(&self) -> Direction {
        self.direction
    }

    pub fn get_width(&self) -> Option<u32> {
        self.width
    }

    pub fn get_comment(&self) -> &Option<String> {
        &self.comment
    }

    pub fn get_attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.name.is_empty() == true {
            return Err(Error::EmptyPortName);
        }
        if self.width == Some(0) {
            return Err(Error::ZeroWidth(self.name.clone()));
        }
        Ok(())
    }

    /// Creates the declaration of the port as it appears in an ANSI port list,
    /// without the separating comma or trailing comment.
    pub fn into_declaration(&self) -> String {
        let mut result = String::new();
        if self.attributes.is_empty() == false {
            result.push_str("(* ");
            result.push_str(
                &self
                    .attributes
                    .iter()
                    .map(|(k, v)| format!("{} = \"{}\"", k, v))
                    .collect::<Vec<String>>()
                    .join(", "),
            );
            result.push_str(" *) ");
        }
        result.push_str(self.direction.as_keyword().as_str());
        result.push(' ');
        result.push_str(&keyword::display_range(self.width));
        result.push_str(&self.name);
        result
    }
}

/// The value bound to a parameter: either a number or verbatim Verilog text.
#[derive(Debug, PartialEq, Clone)]
pub enum ParamValue {
    Int(i64),
    Text(String),
}

impl Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Int(value as i64)
    }
}

impl From<usize> for ParamValue {
    fn from(value: usize) -> Self {
        Self::Int(value as i64)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// A `parameter` or `localparam` declaration.
///
/// Both kinds share one record; the keyword is chosen by the list the module
/// stores it in.
#[derive(Debug, PartialEq, Clone)]
pub struct Parameter {
    name: String,
    value: ParamValue,
    comment: Option<String>,
}

impl Parameter {
    pub fn new(name: &str, value: ParamValue, comment: Option<&str>) -> Result<Self, Error> {
        if name.is_empty() == true {
            return Err(Error::EmptyParameterName);
        }
        Ok(Self {
            name: name.to_string(),
            value: value,
            comment: comment.map(|c| c.to_string()),
        })
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_value(&self) -> &ParamValue {
        &self.value
    }

    pub fn into_declaration(&self, kw: Keyword) -> String {
        format!(
            "  {} {} = {};{}\n",
            kw,
            self.name,
            self.value,
            keyword::display_comment(&self.comment)
        )
    }
}

/// An internal net of the module.
#[derive(Debug, PartialEq, Clone)]
pub struct Signal {
    name: String,
    width: Option<u32>,
    comment: Option<String>,
}

impl Signal {
    pub fn new(name: &str, width: Option<u32>, comment: Option<&str>) -> Result<Self, Error> {
        if name.is_empty() == true {
            return Err(Error::EmptySignalName);
        }
        if width == Some(0) {
            return Err(Error::ZeroWidth(name.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            width: width,
            comment: comment.map(|c| c.to_string()),
        })
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn into_declaration(&self) -> String {
        format!(
            "  {} {}{};{}\n",
            Keyword::Wire,
            keyword::display_range(self.width),
            self.name,
            keyword::display_comment(&self.comment)
        )
    }
}

/// A continuous assignment `assign lhs = rhs;`.
///
/// Either side may carry Verilog indexing, such as `bus[15:8]`.
#[derive(Debug, PartialEq, Clone)]
pub struct Assignment {
    lhs: String,
    rhs: String,
    comment: Option<String>,
}

impl Assignment {
    pub fn new(lhs: &str, rhs: &str, comment: Option<&str>) -> Self {
        Self {
            lhs: lhs.to_string(),
            rhs: rhs.to_string(),
            comment: comment.map(|c| c.to_string()),
        }
    }

    pub fn into_declaration(&self) -> String {
        format!(
            "  {} {} = {};{}\n",
            Keyword::Assign,
            self.lhs,
            self.rhs,
            keyword::display_comment(&self.comment)
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn port_declarations() {
        assert_eq!(
            Port::new("clk", Direction::In).into_declaration(),
            "input clk"
        );
        assert_eq!(
            Port::new("led", Direction::Out)
                .with_width(8)
                .into_declaration(),
            "output [7:0] led"
        );
        assert_eq!(
            Port::new("sda", Direction::Inout)
                .with_attribute("LOC", "G12")
                .with_attribute("IOSTANDARD", "LVCMOS33")
                .into_declaration(),
            "(* LOC = \"G12\", IOSTANDARD = \"LVCMOS33\" *) inout sda"
        );
    }

    #[test]
    fn port_validation() {
        assert_eq!(Port::new("", Direction::In).validate(), Err(Error::EmptyPortName));
        assert_eq!(
            Port::new("d", Direction::In).with_width(0).validate(),
            Err(Error::ZeroWidth(String::from("d")))
        );
        assert_eq!(Port::new("d", Direction::In).with_width(1).validate(), Ok(()));
    }

    #[test]
    fn parameter_declarations() {
        let p = Parameter::new("WIDTH", ParamValue::from(16i64), None).unwrap();
        assert_eq!(p.into_declaration(Keyword::Parameter), "  parameter WIDTH = 16;\n");
        let p = Parameter::new("MODE", ParamValue::from("\"fast\""), Some("speed grade")).unwrap();
        assert_eq!(
            p.into_declaration(Keyword::Localparam),
            "  localparam MODE = \"fast\"; // speed grade\n"
        );
        assert_eq!(
            Parameter::new("", ParamValue::from(1i64), None),
            Err(Error::EmptyParameterName)
        );
    }

    #[test]
    fn signal_declarations() {
        assert_eq!(
            Signal::new("valid", None, None).unwrap().into_declaration(),
            "  wire valid;\n"
        );
        assert_eq!(
            Signal::new("data", Some(32), Some("payload"))
                .unwrap()
                .into_declaration(),
            "  wire [31:0] data; // payload\n"
        );
        assert_eq!(Signal::new("", None, None), Err(Error::EmptySignalName));
    }

    #[test]
    fn assignment_declaration() {
        assert_eq!(
            Assignment::new("led[3:0]", "count[27:24]", Some("blink")).into_declaration(),
            "  assign led[3:0] = count[27:24]; // blink\n"
        );
    }
}
