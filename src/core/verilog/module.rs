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

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::core::bus::AddressMap;
use crate::core::patch;
use crate::error::Error;

use super::instance::Instance;
use super::interface::{Assignment, ParamList, ParamValue, Parameter, Port, PortList, Signal};
use super::keyword::{self, Keyword};

/// The in-memory model of a Verilog module under generation.
///
/// A module is built up with additive calls and then rendered once, either
/// as a new file or spliced into its existing target file.
#[derive(Debug, PartialEq)]
pub struct Module {
    name: String,
    target: Option<PathBuf>,
    ports: PortList,
    parameters: ParamList,
    localparams: ParamList,
    signals: Vec<Signal>,
    instances: Vec<Instance>,
    assignments: Vec<Assignment>,
    raw: String,
    source_files: BTreeSet<String>,
    base_slave_count: usize,
    address_map: Option<AddressMap>,
}

impl Module {
    /// Creates a new module named `name`.
    ///
    /// When a `target` file is given, the number of wishbone slaves it already
    /// declares is read from it immediately. A missing file or a missing
    /// declaration is an error.
    pub fn new(name: &str, target: Option<&Path>) -> Result<Self, Error> {
        if name.is_empty() == true {
            return Err(Error::EmptyModuleName);
        }
        let base_slave_count = match target {
            Some(path) => patch::discover_slave_count(path)?,
            None => 0,
        };
        Ok(Self {
            name: name.to_string(),
            target: target.map(|p| p.to_path_buf()),
            ports: Vec::new(),
            parameters: Vec::new(),
            localparams: Vec::new(),
            signals: Vec::new(),
            instances: Vec::new(),
            assignments: Vec::new(),
            raw: String::new(),
            source_files: BTreeSet::new(),
            base_slave_count: base_slave_count,
            address_map: None,
        })
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_target(&self) -> Option<&PathBuf> {
        self.target.as_ref()
    }

    /// Number of wishbone slaves the target file declared before this session.
    pub fn get_base_slave_count(&self) -> usize {
        self.base_slave_count
    }

    pub fn get_instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn get_localparams(&self) -> &[Parameter] {
        &self.localparams
    }

    /// References the bus address allocation, if one has been made.
    pub fn get_address_map(&self) -> Option<&AddressMap> {
        self.address_map.as_ref()
    }

    /// Number of slaves allocated in this session.
    pub fn allocated_slaves(&self) -> usize {
        self.address_map.as_ref().map(|m| m.len()).unwrap_or(0)
    }
}

impl Module {
    pub fn add_port(&mut self, port: Port) -> Result<(), Error> {
        port.validate()?;
        self.ports.push(port);
        Ok(())
    }

    pub fn add_parameter<V: Into<ParamValue>>(
        &mut self,
        name: &str,
        value: V,
        comment: Option<&str>,
    ) -> Result<(), Error> {
        self.parameters
            .push(Parameter::new(name, value.into(), comment)?);
        Ok(())
    }

    pub fn add_localparam<V: Into<ParamValue>>(
        &mut self,
        name: &str,
        value: V,
        comment: Option<&str>,
    ) -> Result<(), Error> {
        self.localparams
            .push(Parameter::new(name, value.into(), comment)?);
        Ok(())
    }

    pub fn add_signal(
        &mut self,
        name: &str,
        width: Option<u32>,
        comment: Option<&str>,
    ) -> Result<(), Error> {
        self.signals.push(Signal::new(name, width, comment)?);
        Ok(())
    }

    /// Drives `lhs` from `rhs`; both may be ports or signals with indexing.
    pub fn assign_signal(&mut self, lhs: &str, rhs: &str, comment: Option<&str>) {
        self.assignments.push(Assignment::new(lhs, rhs, comment));
    }

    /// Creates a new instance of `entity` named `name` inside this module and
    /// returns it for further configuration.
    pub fn add_new_instance(
        &mut self,
        entity: &str,
        name: &str,
        comment: Option<&str>,
    ) -> Result<&mut Instance, Error> {
        let inst = Instance::new(entity, name, comment)?;
        self.instances.push(inst);
        let last = self.instances.len() - 1;
        Ok(&mut self.instances[last])
    }

    /// Moves an existing instance into this module.
    pub fn add_instance(&mut self, inst: Instance) {
        self.instances.push(inst);
    }

    pub fn add_raw_string(&mut self, s: &str) {
        self.raw.push_str(s);
    }

    pub fn add_source_file(&mut self, file: &str) {
        self.source_files.insert(file.to_string());
    }

    /// Collects the source files required by this module and every instance
    /// it owns.
    pub fn source_files(&self) -> BTreeSet<String> {
        let mut files = self.source_files.clone();
        self.instances
            .iter()
            .for_each(|i| files.extend(i.get_source_files().iter().cloned()));
        files
    }

    /// Assigns an address range and slave index to every bus interface of every
    /// instance, starting at `base_address`.
    ///
    /// Each slave index is also declared as a local parameter named by the
    /// interface's id. A module can only be allocated once.
    pub fn allocate(&mut self, base_address: u32, alignment: u32) -> Result<&AddressMap, Error> {
        if self.address_map.is_some() == true {
            return Err(Error::AlreadyAllocated(self.name.clone()));
        }
        let map = AddressMap::allocate(
            &self.instances,
            base_address,
            alignment,
            self.base_slave_count,
        )?;
        for slave in map.iter() {
            self.localparams
                .push(Parameter::new(slave.get_id(), ParamValue::from(slave.get_index()), None)?);
        }
        Ok(&*self.address_map.insert(map))
    }
}

const PORT_INDENT: &str = "    ";

impl Module {
    /// Writes the ports as a list where every entry ends with a comma, for
    /// splicing ahead of the ports already in a module declaration.
    pub fn into_port_list(&self) -> String {
        self.ports
            .iter()
            .map(|p| {
                format!(
                    "{}{},{}\n",
                    PORT_INDENT,
                    p.into_declaration(),
                    keyword::display_comment(p.get_comment())
                )
            })
            .collect()
    }

    /// Writes the module header with its complete ANSI port list.
    pub fn into_declaration(&self) -> String {
        let mut result = format!("{} {} (\n", Keyword::Module, self.name);
        let n_ports = self.ports.len();
        for (i, p) in self.ports.iter().enumerate() {
            result.push_str(PORT_INDENT);
            result.push_str(&p.into_declaration());
            if i + 1 != n_ports {
                result.push(',');
            }
            result.push_str(&keyword::display_comment(p.get_comment()));
            result.push('\n');
        }
        result.push_str("  );\n");
        result
    }

    pub fn into_parameters(&self) -> String {
        self.parameters
            .iter()
            .map(|p| p.into_declaration(Keyword::Parameter))
            .collect()
    }

    pub fn into_localparams(&self) -> String {
        self.localparams
            .iter()
            .map(|p| p.into_declaration(Keyword::Localparam))
            .collect()
    }

    pub fn into_signals(&self) -> String {
        self.signals.iter().map(|s| s.into_declaration()).collect()
    }

    /// Writes every instantiation with a blank line between neighbors.
    pub fn into_instances(&self) -> String {
        self.instances
            .iter()
            .map(|i| i.into_instance())
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn into_assignments(&self) -> String {
        self.assignments
            .iter()
            .map(|a| a.into_declaration())
            .collect()
    }

    /// Everything between the module header and `endmodule`.
    fn into_body(&self) -> String {
        let mut result = String::new();
        for block in [
            self.into_parameters(),
            self.into_localparams(),
            self.into_signals(),
            self.into_instances(),
            self.into_assignments(),
        ] {
            result.push_str(&block);
            result.push('\n');
        }
        result.push_str(&self.raw);
        result
    }

    /// Writes the declarations to splice into an existing module, without the
    /// module header or `endmodule`.
    pub fn into_fragment(&self) -> String {
        let mut result = format!("// INSTANCE {}, AUTOMATICALLY GENERATED\n\n", self.name);
        result.push_str(&self.into_body());
        result
    }

    /// Writes the complete text of a new module file.
    pub fn into_module_file(&self) -> String {
        let mut result = format!("// MODULE {}, AUTOMATICALLY GENERATED\n\n", self.name);
        result.push_str(&self.into_declaration());
        result.push('\n');
        result.push_str(&self.into_body());
        result.push('\n');
        result.push_str(Keyword::Endmodule.as_str());
        result.push('\n');
        result
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::verilog::interface::Direction;

    fn create_module() -> Module {
        let mut m = Module::new("blinky", None).unwrap();
        m.add_port(Port::new("clk", Direction::In).with_comment("system clock"))
            .unwrap();
        m.add_port(Port::new("led", Direction::Out).with_width(4))
            .unwrap();
        m.add_parameter("DIV", 24i64, Some("counter bits")).unwrap();
        m.add_localparam("TOP", "DIV-1", None).unwrap();
        m.add_signal("count", Some(24), None).unwrap();
        let inst = m.add_new_instance("counter", "u_count", None).unwrap();
        inst.add_port("clk", "clk");
        inst.add_port("q", "count");
        m.add_new_instance("pwm", "u_pwm", None)
            .unwrap()
            .add_port("duty", "count[23:20]");
        m.assign_signal("led", "count[23:20]", Some("top bits"));
        m.add_raw_string("  // hand written\n");
        m
    }

    #[test]
    fn rejects_empty_name() {
        assert_eq!(Module::new("", None), Err(Error::EmptyModuleName));
    }

    #[test]
    fn no_target_means_no_base_slaves() {
        assert_eq!(Module::new("top", None).unwrap().get_base_slave_count(), 0);
    }

    #[test]
    fn module_file() {
        assert_eq!(create_module().into_module_file(), MODULE_0);
    }

    #[test]
    fn fragment_drops_header_and_footer() {
        let m = create_module();
        let frag = m.into_fragment();
        assert_eq!(frag.starts_with("// INSTANCE blinky, AUTOMATICALLY GENERATED\n\n"), true);
        assert_eq!(frag.contains("module blinky"), false);
        assert_eq!(frag.contains("endmodule"), false);
        assert_eq!(frag.ends_with("  // hand written\n"), true);
    }

    #[test]
    fn rendering_is_repeatable() {
        let m = create_module();
        assert_eq!(m.into_module_file(), m.into_module_file());
        assert_eq!(m.into_fragment(), m.into_fragment());
    }

    #[test]
    fn port_list_is_comma_terminated() {
        assert_eq!(
            create_module().into_port_list(),
            "    input clk, // system clock\n    output [3:0] led,\n"
        );
    }

    #[test]
    fn source_files_include_instances() {
        let mut m = Module::new("top", None).unwrap();
        m.add_source_file("rtl/top.v");
        let mut inst = Instance::new("uart", "u_uart", None).unwrap();
        inst.add_source_file("ip/uart/");
        m.add_instance(inst);
        m.add_new_instance("spi", "u_spi", None)
            .unwrap()
            .add_source_file("ip/spi.v");
        let files: Vec<String> = m.source_files().into_iter().collect();
        assert_eq!(files, vec!["ip/spi.v", "ip/uart/", "rtl/top.v"]);
    }

    #[test]
    fn allocate_declares_slave_ids() {
        let mut m = Module::new("top", None).unwrap();
        m.add_new_instance("adc_ctrl", "adc", None)
            .unwrap()
            .add_bus_interface(4, None)
            .unwrap();
        m.add_new_instance("dac_ctrl", "dac", None)
            .unwrap()
            .add_bus_interface(16, None)
            .unwrap();
        assert_eq!(m.allocate(0x10000, 4).unwrap().len(), 2);
        assert_eq!(m.allocated_slaves(), 2);
        assert_eq!(
            m.into_localparams(),
            "  localparam ADC_WBID0 = 0;\n  localparam DAC_WBID0 = 1;\n"
        );
        assert_eq!(
            m.allocate(0x10000, 4).map(|_| ()),
            Err(Error::AlreadyAllocated(String::from("top")))
        );
    }

    const MODULE_0: &str = "// MODULE blinky, AUTOMATICALLY GENERATED

module blinky (
    input clk, // system clock
    output [3:0] led
  );

  parameter DIV = 24; // counter bits

  localparam TOP = DIV-1;

  wire [23:0] count;

  counter u_count (
    .clk(clk),
    .q(count)
  );

  pwm u_pwm (
    .duty(count[23:20])
  );

  assign led = count[23:20]; // top bits

  // hand written

endmodule
";
}
