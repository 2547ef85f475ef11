//! 转录文件路径
//!
//! `<root>/<account>/<group|1on1>/<contact>/<YYYY-MM-DD>.txt`
//!
//! account 与 contact 来自备份内容，必须各自是单个普通路径组件，
//! 防止 `..`、分隔符或绝对路径把输出写到根目录之外。

use std::path::{Component, Path, PathBuf};

use crate::error::Ceb2TxtError;

pub const GROUP_DIR: &str = "group";
pub const ONE_ON_ONE_DIR: &str = "1on1";

pub fn transcript_path(
    root: &Path,
    account: &str,
    group: bool,
    contact: &str,
    date: &str,
) -> Result<PathBuf, Ceb2TxtError> {
    let kind = if group { GROUP_DIR } else { ONE_ON_ONE_DIR };

    let mut path = root.to_path_buf();
    for segment in [account, kind, contact] {
        path.push(validate_segment(segment)?);
    }
    path.push(format!("{date}.txt"));

    Ok(path)
}

/// 校验单个路径段只包含一个普通组件
fn validate_segment(segment: &str) -> Result<&str, Ceb2TxtError> {
    let unsafe_segment =
        || Ceb2TxtError::InvalidAddress(format!("unsafe path segment: {segment:?}"));

    if segment.contains(['/', '\\']) {
        return Err(unsafe_segment());
    }

    let mut components = Path::new(segment).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(segment),
        _ => Err(unsafe_segment()),
    }
}
