//! 转录渲染
//!
//! 对账户下的每个会话，按 timeSent 升序取出消息，
//! 按日历日期切分为连续的 run，每个 run 写入一个文件。
//!
//! 单行格式：`HH:mm [nickname ]<arrow> <body>`
//! - nickname 仅群聊输出
//! - 收到的消息为 `<-`，其余为 `->`
//! - body 中的换行续行缩进到 body 起始列
//!
//! 日期与时间格式化均为纯函数，时区由调用方传入。

use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};

use crate::error::{Ceb2TxtError, Result};
use crate::fs::{atomic::write_atomic, paths::transcript_path};
use crate::model::{CallSessionStatus, FileTransferParams, Message, MessageType};
use crate::store::Store;

pub const P2P_FILE_PLACEHOLDER: &str = "[file received over P2P (Jingle)]";

/// `HH:mm ` 加箭头与空格的宽度
const BODY_INDENT: usize = 9;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderSummary {
    /// 账户 bare 地址，即输出目录名
    pub account: String,
    pub conversations: usize,
    pub files: usize,
}

/// 超出 chrono 可表示范围的时间戳报错，不做回退
fn to_zone<Tz: TimeZone>(millis: i64, tz: &Tz) -> Result<DateTime<Tz>> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|utc| utc.with_timezone(tz))
        .ok_or(Ceb2TxtError::InvalidTimestamp(millis))
}

/// `YYYY-MM-DD`
pub fn format_date<Tz: TimeZone>(millis: i64, tz: &Tz) -> Result<String>
where
    Tz::Offset: std::fmt::Display,
{
    Ok(to_zone(millis, tz)?.format("%Y-%m-%d").to_string())
}

/// `HH:mm`
pub fn format_time<Tz: TimeZone>(millis: i64, tz: &Tz) -> Result<String>
where
    Tz::Offset: std::fmt::Display,
{
    Ok(to_zone(millis, tz)?.format("%H:%M").to_string())
}

/// 按消息类型渲染 body
pub fn render_body(message: &Message) -> String {
    match message.kind {
        kind if kind.is_file_or_image() => {
            let params = FileTransferParams::decode(message.body.as_deref());
            if params.url.is_empty() {
                P2P_FILE_PLACEHOLDER.to_string()
            } else {
                params.url
            }
        }
        MessageType::CallSession => {
            let call = CallSessionStatus::decode(message.body.as_deref());
            let received = message.status.is_received();
            match (call.successful, call.duration_ms > 0) {
                (false, _) => "Missed call".to_string(),
                (true, false) if received => "Incoming call".to_string(),
                (true, false) => "Outgoing call ".to_string(),
                (true, true) => format!(
                    "{} call. Duration {} seconds",
                    if received { "Incoming" } else { "Outgoing" },
                    call.duration_ms / 1000
                ),
            }
        }
        _ => message.body_or_empty().to_string(),
    }
}

/// 渲染单条消息（不含行尾换行）
pub fn format_line<Tz: TimeZone>(message: &Message, group: bool, tz: &Tz) -> Result<String>
where
    Tz::Offset: std::fmt::Display,
{
    let nick = if group { message.nickname() } else { "" };
    let arrow = if message.status.is_received() { "<-" } else { "->" };

    let indent = BODY_INDENT + nick.chars().count() + usize::from(!nick.is_empty());
    let body = render_body(message).replace('\n', &format!("\n{}", " ".repeat(indent)));

    let mut line = format_time(message.time_sent, tz)?;
    line.push(' ');
    if !nick.is_empty() {
        line.push_str(nick);
        line.push(' ');
    }
    line.push_str(arrow);
    line.push(' ');
    line.push_str(&body);
    Ok(line)
}

/// 将 store 中的账户会话写为转录文件
pub fn render_transcripts<Tz: TimeZone>(
    store: &Store,
    output_root: &Path,
    tz: &Tz,
) -> Result<RenderSummary>
where
    Tz::Offset: std::fmt::Display,
{
    let account = store.account()?.ok_or(Ceb2TxtError::MissingAccount)?;
    let account_address = account.address()?.bare().to_string();

    let conversations = store.conversations(&account.uuid)?;
    let mut summary = RenderSummary {
        account: account_address.clone(),
        conversations: conversations.len(),
        files: 0,
    };

    for conversation in &conversations {
        let group = conversation.is_group_chat();
        let contact = conversation.contact_address()?.bare().to_string();
        let messages = store.messages(&conversation.uuid)?;

        tracing::debug!(
            conversation = %conversation.uuid,
            contact = %contact,
            messages = messages.len(),
            "rendering conversation"
        );

        let mut run: Option<(String, String)> = None;
        for message in &messages {
            let date = format_date(message.time_sent, tz)?;

            if let Some((current, text)) = run.take_if(|(current, _)| *current != date) {
                write_run(output_root, &account_address, group, &contact, &current, &text)?;
                summary.files += 1;
            }

            let (_, text) = run.get_or_insert_with(|| (date, String::new()));
            text.push_str(&format_line(message, group, tz)?);
            text.push('\n');
        }

        if let Some((current, text)) = run {
            write_run(output_root, &account_address, group, &contact, &current, &text)?;
            summary.files += 1;
        }
    }

    tracing::info!(
        conversations = summary.conversations,
        files = summary.files,
        "transcripts written"
    );
    Ok(summary)
}

fn write_run(
    root: &Path,
    account: &str,
    group: bool,
    contact: &str,
    date: &str,
    text: &str,
) -> Result<()> {
    let path = transcript_path(root, account, group, contact, date)?;
    write_atomic(&path, text.as_bytes())?;
    tracing::debug!(path = %path.display(), "transcript written");
    Ok(())
}
