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

use crate::core::verilog::instance::Instance;
use crate::error::Error;

/// A wishbone slave with its allocated address range.
#[derive(Debug, PartialEq, Clone)]
pub struct Slave {
    base: u32,
    high: u32,
    label: String,
    id: String,
    index: usize,
}

impl Slave {
    /// First address decoded by the slave.
    pub fn get_base(&self) -> u32 {
        self.base
    }

    /// Last address decoded by the slave (inclusive).
    pub fn get_high(&self) -> u32 {
        self.high
    }

    pub fn get_label(&self) -> &str {
        &self.label
    }

    pub fn get_id(&self) -> &str {
        &self.id
    }

    /// Position of the slave on the bus, counting slaves declared before
    /// this session.
    pub fn get_index(&self) -> usize {
        self.index
    }
}

/// The result of allocating addresses to every bus interface of a module, in
/// allocation order.
#[derive(Debug, PartialEq, Clone)]
pub struct AddressMap {
    slaves: Vec<Slave>,
}

impl AddressMap {
    /// Walks the interfaces of `instances` in order and gives each one the next
    /// free range, starting at `base_address`.
    ///
    /// Every range length is the interface size rounded up to a multiple of
    /// `alignment`. Slave indices continue from `base_slave_count`.
    pub fn allocate(
        instances: &[Instance],
        base_address: u32,
        alignment: u32,
        base_slave_count: usize,
    ) -> Result<Self, Error> {
        if alignment == 0 {
            return Err(Error::ZeroAlignment);
        }
        let align = alignment as u64;
        let mut next = base_address as u64;
        let mut slaves = Vec::new();

        for iface in instances.iter().flat_map(|i| i.get_bus_interfaces()) {
            if iface.get_size() == 0 {
                return Err(Error::ZeroBusSize(iface.get_label().to_string()));
            }
            let span = align * ((iface.get_size() as u64 + align - 1) / align);
            let high = next + span - 1;
            if high > u32::MAX as u64 {
                return Err(Error::AddressOverflow(iface.get_label().to_string()));
            }
            let slave = Slave {
                base: next as u32,
                high: high as u32,
                label: iface.get_label().to_string(),
                id: iface.get_id().to_string(),
                index: slaves.len() + base_slave_count,
            };
            log::debug!(
                "allocated wishbone slave {} ({}) at 32'h{:08x}-32'h{:08x}",
                slave.index,
                slave.label,
                slave.base,
                slave.high
            );
            slaves.push(slave);
            next = high + 1;
        }
        Ok(Self { slaves: slaves })
    }

    pub fn len(&self) -> usize {
        self.slaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slaves.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slave> {
        self.slaves.iter()
    }

    pub fn get(&self, i: usize) -> Option<&Slave> {
        self.slaves.get(i)
    }

    /// Writes the array elements for the `SLAVE_BASE` table.
    ///
    /// The first allocated slave occupies the highest array index, so entries
    /// are listed last-allocated first.
    pub fn into_base_table(&self) -> String {
        Self::into_table(&self.slaves, |s| s.base)
    }

    /// Writes the array elements for the `SLAVE_HIGH` table, in the same order
    /// as [`AddressMap::into_base_table`].
    pub fn into_high_table(&self) -> String {
        Self::into_table(&self.slaves, |s| s.high)
    }

    fn into_table<F: Fn(&Slave) -> u32>(slaves: &[Slave], addr: F) -> String {
        slaves
            .iter()
            .rev()
            .map(|s| format!("    32'h{:08x}, // {}\n", addr(s), s.label))
            .collect()
    }
}
