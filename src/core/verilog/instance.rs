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

use super::interface::ParamValue;
use crate::error::Error;
use std::collections::BTreeSet;

/// A named hookup inside an instantiation: `.name(value)`.
#[derive(Debug, PartialEq, Clone)]
pub struct Connection {
    name: String,
    value: String,
}

impl Connection {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_value(&self) -> &str {
        &self.value
    }

    fn into_connection(&self) -> String {
        format!("    .{}({})", self.name, self.value)
    }
}

const BUS_ID_SUFFIX: &str = "_WBID";

/// A wishbone slave interface exposed by an instance.
#[derive(Debug, PartialEq, Clone)]
pub struct BusInterface {
    size_bytes: u32,
    label: String,
    id: String,
}

impl BusInterface {
    /// Number of bytes of address space the interface decodes.
    pub fn get_size(&self) -> u32 {
        self.size_bytes
    }

    pub fn get_label(&self) -> &str {
        &self.label
    }

    /// The identifier of the local parameter that holds this interface's slave
    /// index, e.g. `ADC_WBID0`.
    pub fn get_id(&self) -> &str {
        &self.id
    }
}

/// One instantiation of a sub-component inside a parent module.
#[derive(Debug, PartialEq, Clone)]
pub struct Instance {
    entity: String,
    name: String,
    comment: Option<String>,
    ports: Vec<Connection>,
    parameters: Vec<Connection>,
    bus_interfaces: Vec<BusInterface>,
    source_files: BTreeSet<String>,
}

impl Instance {
    /// Creates an instance of `entity` named `name`.
    ///
    /// Errors if either identifier is empty.
    pub fn new(entity: &str, name: &str, comment: Option<&str>) -> Result<Self, Error> {
        if entity.is_empty() == true {
            return Err(Error::EmptyEntity);
        }
        if name.is_empty() == true {
            return Err(Error::EmptyInstanceName);
        }
        Ok(Self {
            entity: entity.to_string(),
            name: name.to_string(),
            comment: comment.map(|c| c.to_string()),
            ports: Vec::new(),
            parameters: Vec::new(),
            bus_interfaces: Vec::new(),
            source_files: BTreeSet::new(),
        })
    }

    pub fn get_entity(&self) -> &str {
        &self.entity
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_ports(&self) -> &[Connection] {
        &self.ports
    }

    pub fn get_parameters(&self) -> &[Connection] {
        &self.parameters
    }

    pub fn get_bus_interfaces(&self) -> &[BusInterface] {
        &self.bus_interfaces
    }

    pub fn get_source_files(&self) -> &BTreeSet<String> {
        &self.source_files
    }

    /// Records a source file (or directory) needed to build this instance.
    pub fn add_source_file(&mut self, file: &str) {
        self.source_files.insert(file.to_string());
    }

    /// Connects port `name` to `signal`, which may include indexing such as
    /// `my_signal[15:8]`.
    pub fn add_port(&mut self, name: &str, signal: &str) {
        self.ports.push(Connection::new(name, signal));
    }

    pub fn add_parameter<V: Into<ParamValue>>(&mut self, name: &str, value: V) {
        self.parameters
            .push(Connection::new(name, &value.into().to_string()));
    }

    /// Declares a wishbone slave interface spanning `size_bytes` bytes and
    /// connects the standard slave ports to the parent's bus.
    ///
    /// The slave-dependent ports index the parent's bus by the interface's id,
    /// which the parent defines as a local parameter once addresses are
    /// allocated. `label` defaults to the instance name.
    pub fn add_bus_interface(
        &mut self,
        size_bytes: u32,
        label: Option<&str>,
    ) -> Result<&BusInterface, Error> {
        let label = label.unwrap_or(&self.name).to_string();
        if size_bytes == 0 {
            return Err(Error::ZeroBusSize(label));
        }
        let id = format!(
            "{}{}{}",
            label.to_uppercase(),
            BUS_ID_SUFFIX,
            self.bus_interfaces.len()
        );

        self.add_port("wb_clk_i", "wb_clk_i");
        self.add_port("wb_rst_i", "wb_rst_i");
        self.add_port("wb_cyc_i", &format!("wbs_cyc_o[{}]", id));
        self.add_port("wb_stb_i", &format!("wbs_stb_o[{}]", id));
        self.add_port("wb_we_i", "wbs_we_o");
        self.add_port("wb_sel_i", "wbs_sel_o");
        self.add_port("wb_adr_i", "wbs_adr_o");
        self.add_port("wb_dat_i", "wbs_dat_o");
        self.add_port("wb_dat_o", &format!("wbs_dat_i[({0}+1)*32-1:({0})*32]", id));
        self.add_port("wb_ack_o", &format!("wbs_ack_i[{}]", id));
        self.add_port("wb_err_o", &format!("wbs_err_i[{}]", id));

        self.bus_interfaces.push(BusInterface {
            size_bytes: size_bytes,
            label: label,
            id: id,
        });
        // the vector was just pushed to
        Ok(&self.bus_interfaces[self.bus_interfaces.len() - 1])
    }

    /// Writes the instantiation of this instance.
    pub fn into_instance(&self) -> String {
        let mut result = String::new();
        if let Some(c) = &self.comment {
            result.push_str(&format!("  // {}\n", c));
        }
        result.push_str("  ");
        result.push_str(&self.entity);
        // parameters
        if self.parameters.is_empty() == false {
            result.push_str(" #(\n");
            result.push_str(&display_connections(&self.parameters));
            result.push_str("  )");
        }
        result.push(' ');
        result.push_str(&self.name);
        // ports
        result.push_str(" (\n");
        result.push_str(&display_connections(&self.ports));
        result.push_str("  );\n");
        result
    }
}

/// Lists every connection on its own line, separating them with commas.
fn display_connections(conns: &[Connection]) -> String {
    let mut result = conns
        .iter()
        .map(|c| c.into_connection())
        .collect::<Vec<String>>()
        .join(",\n");
    if result.is_empty() == false {
        result.push('\n');
    }
    result
}
