mod decrypt;
mod encrypt;

pub mod crypto;
pub mod error;
pub mod format;
pub mod fs;
pub mod import;
pub mod model;
pub mod render;
pub mod store;

pub use decrypt::Backup;
pub use encrypt::{write_backup, write_backup_with_header};
pub use error::{Ceb2TxtError, Result};
pub use format::header::Header;
pub use format::stream::PlainText;
pub use import::{ContentFormat, ImportStats};
pub use model::Jid;
pub use render::{RenderSummary, render_transcripts};
pub use store::Store;

use std::path::Path;

use chrono::TimeZone;

/// 解密、导入并渲染一个备份文件
pub fn convert<Tz: TimeZone>(
    archive: &Path,
    password: &str,
    output_root: &Path,
    tz: &Tz,
) -> Result<RenderSummary>
where
    Tz::Offset: std::fmt::Display,
{
    let content = Backup::open(archive)?.decrypt(password)?;

    let mut store = Store::open_in_memory()?;
    store.import(content)?;

    render_transcripts(&store, output_root, tz)
}
