//! 语句流格式（早期备份）
//!
//! 每条语句通常占一行；字符串字面量内含换行时会跨越多行。
//! 仅靠单引号计数判断语句是否完整：累计数量为偶数即完整，
//! 奇数则说明仍处在字面量内，需拼接下一行（以换行连接）。
//!
//! 该格式信任生成方，语句不做表名 / 列名校验，原样执行。

use std::io::{BufRead, Lines};

use crate::error::Result;
use crate::format::stream::content_error;
use crate::store::Sink;

/// 将物理行组装为完整语句的迭代器
pub struct Statements<R> {
    lines: Lines<R>,
}

impl<R: BufRead> Statements<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }
}

impl<R: BufRead> Iterator for Statements<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut pending: Option<(String, usize)> = None;

        loop {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => return Some(Err(content_error(e))),
                None => {
                    if let Some((statement, _)) = pending {
                        tracing::warn!(
                            len = statement.len(),
                            "discarding unterminated statement at end of backup"
                        );
                    }
                    return None;
                }
            };

            let quotes = line.matches('\'').count();

            pending = match pending {
                None if line.trim().is_empty() => None,
                None if quotes % 2 == 0 => return Some(Ok(line)),
                None => Some((line, quotes)),
                Some((mut statement, count)) => {
                    statement.push('\n');
                    statement.push_str(&line);
                    let count = count + quotes;
                    if count % 2 == 0 {
                        return Some(Ok(statement));
                    }
                    Some((statement, count))
                }
            };
        }
    }
}

/// 逐条执行语句，返回执行的语句数
pub fn import_statements<R: BufRead, S: Sink>(reader: R, sink: &mut S) -> Result<usize> {
    let mut executed = 0;
    for statement in Statements::new(reader) {
        sink.execute(&statement?, &[])?;
        executed += 1;
    }
    Ok(executed)
}
