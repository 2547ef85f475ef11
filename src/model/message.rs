//! 消息实体及 body 中的两种内嵌编码
//!
//! body 在得知 type 之前是不透明的：
//! - 图片 / 文件类消息：`|` 分隔的 FileTransferParams
//! - 通话消息：`:` 分隔的 CallSessionStatus
//! - 其余类型：原始文本
//!
//! 内嵌数字字段解析失败时回退为 0，不中断渲染。

use super::jid::Jid;

/// 消息状态码（与生成备份的客户端保持一致）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStatus {
    Received,
    Unsend,
    Send,
    SendFailed,
    Waiting,
    Offered,
    SendReceived,
    SendDisplayed,
    Other(i64),
}

impl MessageStatus {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Received,
            1 => Self::Unsend,
            2 => Self::Send,
            3 => Self::SendFailed,
            5 => Self::Waiting,
            6 => Self::Offered,
            7 => Self::SendReceived,
            8 => Self::SendDisplayed,
            other => Self::Other(other),
        }
    }

    pub fn is_received(self) -> bool {
        self == Self::Received
    }
}

/// 消息类型码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Text,
    Image,
    File,
    Status,
    Private,
    PrivateFile,
    CallSession,
    Other(i64),
}

impl MessageType {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Text,
            1 => Self::Image,
            2 => Self::File,
            3 => Self::Status,
            4 => Self::Private,
            5 => Self::PrivateFile,
            6 => Self::CallSession,
            other => Self::Other(other),
        }
    }

    pub fn is_file_or_image(self) -> bool {
        matches!(self, Self::Image | Self::File | Self::PrivateFile)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub conversation_uuid: String,
    pub time_sent: i64,
    pub status: MessageStatus,
    pub body: Option<String>,
    pub kind: MessageType,
    pub counterpart: Option<Jid>,
}

impl Message {
    /// 群聊昵称：counterpart 的 resource 部分
    pub fn nickname(&self) -> &str {
        self.counterpart
            .as_ref()
            .map(Jid::resource_or_empty)
            .unwrap_or("")
    }

    pub fn body_or_empty(&self) -> &str {
        self.body.as_deref().unwrap_or("")
    }
}

/// 文件传输参数，从 body 派生，不落库
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTransferParams {
    pub url: String,
    pub size: i64,
    pub width: i32,
    pub height: i32,
    pub runtime_ms: i32,
}

impl FileTransferParams {
    /// 解析 `|` 分隔的编码
    ///
    /// 按段数区分：
    /// - 1 段：数字即 size，否则为 url
    /// - 2 段：url|size
    /// - 3 段：size|width|height
    /// - 4 段：url|size|width|height
    /// - 5 段：url|size|width|height|runtime
    ///
    /// 其它段数返回默认值。
    pub fn decode(body: Option<&str>) -> Self {
        let parts = body.map(split_pipes).unwrap_or_default();
        let mut params = Self::default();

        match parts.as_slice() {
            [single] => match single.parse::<i64>() {
                Ok(size) => params.size = size,
                Err(_) => params.url = single.to_string(),
            },
            [url, size] => {
                params.url = url.to_string();
                params.size = parse_or_zero(size);
            }
            [size, width, height] => {
                params.size = parse_or_zero(size);
                params.width = parse_or_zero(width);
                params.height = parse_or_zero(height);
            }
            [url, size, width, height] => {
                params.url = url.to_string();
                params.size = parse_or_zero(size);
                params.width = parse_or_zero(width);
                params.height = parse_or_zero(height);
            }
            [url, size, width, height, runtime] => {
                params.url = url.to_string();
                params.size = parse_or_zero(size);
                params.width = parse_or_zero(width);
                params.height = parse_or_zero(height);
                params.runtime_ms = parse_or_zero(runtime);
            }
            _ => {}
        }

        params
    }
}

// 不含分隔符时整体为一段；否则丢弃末尾的空段
fn split_pipes(body: &str) -> Vec<&str> {
    if !body.contains('|') {
        return vec![body];
    }

    let mut parts: Vec<&str> = body.split('|').collect();
    while parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }
    parts
}

fn parse_or_zero<T: std::str::FromStr + Default>(value: &str) -> T {
    value.parse().unwrap_or_default()
}

/// 通话结果，从 body 派生
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallSessionStatus {
    pub successful: bool,
    pub duration_ms: i64,
}

impl CallSessionStatus {
    /// 解析 `successful:duration` 编码，只在第一个 `:` 处切分
    pub fn decode(body: Option<&str>) -> Self {
        let body = body.unwrap_or("");
        let (flag, duration) = match body.split_once(':') {
            Some((flag, duration)) => (flag, duration.parse().unwrap_or(0)),
            None => (body, 0),
        };

        Self {
            successful: flag.eq_ignore_ascii_case("true"),
            duration_ms: duration,
        }
    }
}
