//! 转录文件的原子写入
//!
//! 先写同目录下的临时文件，成功后再 rename 覆盖目标，
//! 避免中途失败留下半截的转录文件。

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// 原子写文件，必要时创建父目录
pub fn write_atomic(target: &Path, contents: &[u8]) -> io::Result<()> {
    let parent = target.parent().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "transcript path has no parent directory",
        )
    })?;

    fs::create_dir_all(parent)?;

    let tmp_path = build_tmp_path(parent, target);
    let result = File::create(&tmp_path).and_then(|mut tmp_file| {
        tmp_file.write_all(contents)?;
        tmp_file.sync_all()
    });

    if let Err(err) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }

    fs::rename(&tmp_path, target)
}

fn build_tmp_path(parent: &Path, target: &Path) -> PathBuf {
    let base_name = target
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("transcript");

    let counter = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);

    parent.join(format!(".{base_name}.tmp-{}-{counter}", std::process::id()))
}
