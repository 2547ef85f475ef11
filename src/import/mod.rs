//! 备份正文导入
//!
//! 正文有两种历史格式，与 Header 的版本号无固定对应关系，
//! 因此按内容判别：首个非空白字符为 `[` 时按 JSON 行格式解析，
//! 否则按语句流格式解析。判别只发生一次。

pub mod rows;
pub mod statements;

use std::io::BufRead;

use crate::error::Result;
use crate::format::stream::content_error;
use crate::store::Sink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentFormat {
    /// 逐行的 INSERT 语句，字符串字面量可跨行
    Statements,
    /// `[{"table": .., "values": {..}}, ..]`
    Rows,
}

impl ContentFormat {
    /// 跳过前导空白并查看第一个有效字节，不消费该字节
    pub fn sniff<R: BufRead>(reader: &mut R) -> Result<Self> {
        loop {
            let buf = reader.fill_buf().map_err(content_error)?;
            if buf.is_empty() {
                return Ok(Self::Statements);
            }

            let skip = buf.iter().take_while(|b| b.is_ascii_whitespace()).count();
            if skip < buf.len() {
                let format = if buf[skip] == b'[' {
                    Self::Rows
                } else {
                    Self::Statements
                };
                reader.consume(skip);
                return Ok(format);
            }

            let len = buf.len();
            reader.consume(len);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportStats {
    pub format: ContentFormat,
    pub statements: usize,
}

pub fn import_content<R: BufRead, S: Sink>(mut reader: R, sink: &mut S) -> Result<ImportStats> {
    let format = ContentFormat::sniff(&mut reader)?;
    tracing::debug!(?format, "detected backup content format");

    let statements = match format {
        ContentFormat::Statements => statements::import_statements(reader, sink)?,
        ContentFormat::Rows => rows::import_rows(reader, sink)?,
    };

    Ok(ImportStats { format, statements })
}
