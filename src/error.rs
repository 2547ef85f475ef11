use thiserror::Error;

#[derive(Debug, Error)]
pub enum Ceb2TxtError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("backup file version was {found} but only versions up to {supported} are supported")]
    UnsupportedVersion { found: i32, supported: i32 },

    #[error("malformed backup header: {0}")]
    MalformedHeader(String),

    /// 认证失败与解压失败对外不做区分
    #[error("wrong password or corrupt backup file")]
    DecryptionFailed,

    #[error("{0} is not recognized for import")]
    UnsupportedTable(String),

    #[error("unexpected column name {0}")]
    UnsupportedColumn(String),

    #[error("malformed backup row: {0}")]
    MalformedRow(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("timestamp {0} is out of range")]
    InvalidTimestamp(i64),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("backup does not contain an account")]
    MissingAccount,
}

pub type Result<T> = std::result::Result<T, Ceb2TxtError>;
