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
use std::io::Write;
use std::path::{Path, PathBuf};

/// Returns the path of the backup copy for `path`, which is `path` with `.ext`
/// appended to its file name.
pub fn backup_path(path: &Path, ext: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Directory that holds `path`, using the current directory for bare file names.
fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if p.as_os_str().is_empty() == false => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Writes `contents` to `dest` through a temporary file in the same directory.
///
/// The temporary file is persisted over `dest` only once every byte is written,
/// so a failed write never leaves a truncated `dest` behind.
pub fn write_atomic(dest: &Path, contents: &str) -> Result<(), Error> {
    let to_err = |e: std::io::Error| Error::WriteFailed(dest.to_path_buf(), LastError::from(e));

    let dir = parent_dir(dest);
    std::fs::create_dir_all(&dir).map_err(to_err)?;
    let mut temp = tempfile::NamedTempFile::new_in(&dir).map_err(to_err)?;
    temp.write_all(contents.as_bytes()).map_err(to_err)?;
    temp.flush().map_err(to_err)?;
    temp.persist(dest).map_err(|e| to_err(e.error))?;
    Ok(())
}

/// Copies the current `dest` to its backup location and then replaces `dest`
/// with `contents`.
///
/// The replacement is never attempted unless the backup copy completed.
pub fn replace_with_backup(dest: &Path, contents: &str, ext: &str) -> Result<PathBuf, Error> {
    let backup = backup_path(dest, ext);
    std::fs::copy(dest, &backup)
        .map_err(|e| Error::BackupFailed(dest.to_path_buf(), LastError::from(e)))?;
    log::info!("backed up {} to {}", dest.display(), backup.display());
    write_atomic(dest, contents)?;
    Ok(backup)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn backup_name_appends_extension() {
        assert_eq!(
            backup_path(&PathBuf::from("rtl/top.v"), "base"),
            PathBuf::from("rtl/top.v.base")
        );
        assert_eq!(
            backup_path(&PathBuf::from("top.v"), "orig"),
            PathBuf::from("top.v.orig")
        );
    }

    #[test]
    fn replace_keeps_original_in_backup() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("top.v");
        std::fs::write(&dest, "module top;\nendmodule\n").unwrap();

        let backup = replace_with_backup(&dest, "// replaced\n", "base").unwrap();
        assert_eq!(backup, dir.path().join("top.v.base"));
        assert_eq!(
            std::fs::read_to_string(&backup).unwrap(),
            "module top;\nendmodule\n"
        );
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "// replaced\n");
    }

    #[test]
    fn replace_missing_file_fails_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("missing.v");
        match replace_with_backup(&dest, "text", "base") {
            Err(Error::BackupFailed(p, _)) => assert_eq!(p, dest),
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(dest.exists(), false);
    }

    #[test]
    fn write_atomic_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("gen").join("adc.v");
        write_atomic(&dest, "endmodule\n").unwrap();
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "endmodule\n");
    }
}
