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

use std::path::PathBuf;

use crate::core::bus::AddressMap;
use crate::core::config::GeneratorConfig;
use crate::core::patch;
use crate::core::verilog::module::Module;
use crate::error::Error;
use crate::util::filesystem;

/// Allocates the module's bus addresses with the configured base address and
/// alignment.
pub fn allocate_bus<'a>(
    module: &'a mut Module,
    cfg: &GeneratorConfig,
) -> Result<&'a AddressMap, Error> {
    module.allocate(cfg.get_base_address(), cfg.get_alignment())
}

/// Writes out the module: a new `<name>.v` file in the output directory when
/// it has no target file, or the patched target file otherwise.
///
/// Returns the path of the file that now holds the generated code.
pub fn write_module(module: &Module, cfg: &GeneratorConfig) -> Result<PathBuf, Error> {
    match module.get_target() {
        Some(target) => {
            patch::patch_file(module, target, cfg.get_backup_ext())?;
            log::info!("patched {}", target.display());
            Ok(target.clone())
        }
        None => {
            if module.allocated_slaves() > 0 {
                log::warn!(
                    "module {} has {} allocated wishbone slaves but no target file to record their addresses",
                    module.get_name(),
                    module.allocated_slaves()
                );
            }
            let dest = cfg
                .get_output_dir()
                .join(format!("{}.v", module.get_name()));
            filesystem::write_atomic(&dest, &module.into_module_file())?;
            log::info!("wrote {}", dest.display());
            Ok(dest)
        }
    }
}
