//! 导出渲染所需的实体

pub mod jid;
pub mod message;

pub use jid::Jid;
pub use message::{CallSessionStatus, FileTransferParams, Message, MessageStatus, MessageType};

use crate::error::Ceb2TxtError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub uuid: String,
    pub username: Option<String>,
    pub server: Option<String>,
    pub resource: Option<String>,
}

impl Account {
    pub fn address(&self) -> Result<Jid, Ceb2TxtError> {
        let server = self
            .server
            .as_deref()
            .ok_or_else(|| Ceb2TxtError::InvalidAddress("account without server".to_string()))?;
        Jid::from_parts(self.username.as_deref(), server, self.resource.as_deref())
    }
}

/// 会话模式：0 单聊，1 群聊
pub const MODE_GROUP: i64 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub uuid: String,
    pub mode: i64,
    pub contact: Option<String>,
}

impl Conversation {
    pub fn is_group_chat(&self) -> bool {
        self.mode == MODE_GROUP
    }

    pub fn contact_address(&self) -> Result<Jid, Ceb2TxtError> {
        self.contact
            .as_deref()
            .ok_or_else(|| {
                Ceb2TxtError::InvalidAddress(format!("conversation {} has no contact", self.uuid))
            })?
            .parse()
    }
}
