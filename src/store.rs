//! 内存 SQLite 关系存储
//!
//! 表结构与生成备份的客户端一致，导入前一次性建好。
//! 导入阶段只写、渲染阶段只读，二者严格先后执行。

use std::io::BufRead;

use rusqlite::types::{Value, ValueRef};
use rusqlite::{Connection, Row, Transaction, params, params_from_iter};

use crate::error::Result;
use crate::import::{self, ImportStats};
use crate::model::{Account, Conversation, Jid, Message, MessageStatus, MessageType};

pub const CREATE_TABLES: &str = "
create table accounts (uuid text primary key, username text, server text, password text,
    display_name text, status number, status_message text, rosterversion text, options number,
    avatar text, keys text, hostname text, port number, resource text, pinned_mechanism TEXT,
    pinned_channel_binding TEXT, fast_mechanism TEXT, fast_token TEXT);
create table conversations (uuid text, accountUuid text, name text, contactUuid text,
    contactJid text, created number, status number, mode number, attributes text);
create table messages (uuid text, conversationUuid text, timeSent number, counterpart text,
    trueCounterpart text, body text, encryption number, status number, type number,
    relativeFilePath text, serverMsgId text, axolotl_fingerprint text, carbon number,
    edited number, read number, oob number, errorMsg text, readByMarkers text, markable number,
    remoteMsgId text, deleted number, bodyLanguage text, reactions text, occupantId number);
create table prekeys (account text, id text, key text);
create table signed_prekeys (account text, id text, key text);
create table sessions (account text, name text, device_id text, key text);
create table identities (account text, name text, ownkey text, fingerprint text,
    certificate text, trust number, active number, last_activation number, key text);
";

/// 两种格式解析器共用的写入接口
///
/// `params` 为空时 `sql` 原样执行，只执行其中第一条语句。
pub trait Sink {
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<()>;
}

impl Sink for Transaction<'_> {
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<()> {
        Connection::execute(self, sql, params_from_iter(params.iter()))?;
        Ok(())
    }
}

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(CREATE_TABLES)?;
        Ok(Self { conn })
    }

    /// 导入解密后的正文
    ///
    /// 整个导入位于同一事务中，任一错误都不会留下部分数据。
    pub fn import<R: BufRead>(&mut self, content: R) -> Result<ImportStats> {
        let mut tx = self.conn.transaction()?;
        let stats = import::import_content(content, &mut tx)?;
        tx.commit()?;

        tracing::info!(
            format = ?stats.format,
            statements = stats.statements,
            "backup content imported"
        );
        Ok(stats)
    }

    /// 第一条账户记录
    pub fn account(&self) -> Result<Option<Account>> {
        let mut stmt = self
            .conn
            .prepare("select uuid, username, server, resource from accounts limit 1")?;
        let mut rows = stmt.query([])?;

        match rows.next()? {
            Some(row) => Ok(Some(Account {
                uuid: text_column(row, 0)?.unwrap_or_default(),
                username: text_column(row, 1)?,
                server: text_column(row, 2)?,
                resource: text_column(row, 3)?,
            })),
            None => Ok(None),
        }
    }

    pub fn conversations(&self, account_uuid: &str) -> Result<Vec<Conversation>> {
        let mut stmt = self.conn.prepare(
            "select uuid, mode, contactJid from conversations where accountUuid = ?1 order by rowid",
        )?;

        let conversations = stmt
            .query_map(params![account_uuid], |row| {
                Ok(Conversation {
                    uuid: text_column(row, 0)?.unwrap_or_default(),
                    mode: int_column(row, 1)?,
                    contact: text_column(row, 2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(conversations)
    }

    /// 会话内的全部消息，按 timeSent 升序
    pub fn messages(&self, conversation_uuid: &str) -> Result<Vec<Message>> {
        let mut stmt = self.conn.prepare(
            "select conversationUuid, timeSent, status, body, type, counterpart from messages \
             where conversationUuid = ?1 order by timeSent, rowid",
        )?;

        let messages = stmt
            .query_map(params![conversation_uuid], |row| {
                Ok(Message {
                    conversation_uuid: text_column(row, 0)?.unwrap_or_default(),
                    time_sent: int_column(row, 1)?,
                    status: MessageStatus::from_code(int_column(row, 2)?),
                    body: text_column(row, 3)?,
                    kind: MessageType::from_code(int_column(row, 4)?),
                    counterpart: text_column(row, 5)?.and_then(|c| c.parse::<Jid>().ok()),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(messages)
    }
}

// 备份中的列类型并不可靠，读取时宽松转换
fn text_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) | ValueRef::Blob(t) => Some(String::from_utf8_lossy(t).into_owned()),
    })
}

fn int_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<i64> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null | ValueRef::Blob(_) => 0,
        ValueRef::Integer(i) => i,
        ValueRef::Real(f) => f as i64,
        ValueRef::Text(t) => std::str::from_utf8(t)
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0),
    })
}
