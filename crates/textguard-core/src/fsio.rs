//! 文件读写（整读 + 原子写回）
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::GuardError;

/// 整体读取文件字节
pub(crate) fn read_bytes(path: &Path) -> Result<Vec<u8>, GuardError> {
    let file = File::open(path).map_err(|e| GuardError::io(path, e))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).map_err(|e| GuardError::io(path, e))?;
    Ok(buf)
}

/// 原子写回：先写同目录临时文件并 fsync，再 rename 覆盖目标。
/// 符号链接先解析到真实文件，链接本身保持不变。
/// 任一步失败时目标文件保持原内容，本次创建的临时文件被清理。
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> Result<(), GuardError> {
    let target = fs::canonicalize(path).map_err(|e| GuardError::io(path, e))?;
    let tmp = temp_path(&target);
    // create_new：同名文件已存在时直接失败，不截断他人的文件
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp)
        .map_err(|e| GuardError::io(&tmp, e))?;
    let result = write_then_rename(file, &target, &tmp, data);
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result.map_err(|e| GuardError::io(path, e))
}

fn write_then_rename(mut f: File, target: &Path, tmp: &Path, data: &[u8]) -> std::io::Result<()> {
    let perms = fs::metadata(target)?.permissions();
    f.write_all(data)?;
    f.sync_all()?;
    drop(f);
    fs::set_permissions(tmp, perms)?;
    fs::rename(tmp, target)
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.textguard.tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_replaces_content_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("a.py");
        fs::write(&p, b"old").unwrap();

        write_atomic(&p, b"new").unwrap();

        assert_eq!(fs::read(&p).unwrap(), b"new");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn write_atomic_on_missing_target_fails_without_creating_it() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("missing.py");

        let err = write_atomic(&p, b"x").unwrap_err();

        assert!(matches!(err, GuardError::Io { .. }));
        assert!(!p.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn write_atomic_refuses_to_clobber_existing_temp_name() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("a.py");
        let squatter = dir.path().join(".a.py.textguard.tmp");
        fs::write(&p, b"old").unwrap();
        fs::write(&squatter, b"keep me").unwrap();

        let err = write_atomic(&p, b"new").unwrap_err();

        assert!(matches!(err, GuardError::Io { .. }));
        assert_eq!(fs::read(&p).unwrap(), b"old");
        assert_eq!(fs::read(&squatter).unwrap(), b"keep me");
    }

    #[cfg(unix)]
    #[test]
    fn write_atomic_through_symlink_updates_target_and_keeps_link() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real.py");
        let link = dir.path().join("link.py");
        fs::write(&real, b"old").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        write_atomic(&link, b"new").unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read(&real).unwrap(), b"new");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn read_bytes_reports_path_on_failure() {
        let err = read_bytes(Path::new("/definitely/not/here.py")).unwrap_err();
        assert!(err.to_string().contains("not/here.py"));
    }
}
