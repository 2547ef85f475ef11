//! 用户地址（`[local@]domain[/resource]`）
//!
//! - local 与 domain 统一转为小写
//! - resource 原样保留，群聊中即为昵称
//! - bare 形式去掉 resource，用作目录名与 Header 中的 owner

use std::fmt;
use std::str::FromStr;

use crate::error::Ceb2TxtError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Jid {
    local: Option<String>,
    domain: String,
    resource: Option<String>,
}

impl Jid {
    /// 由三个组成部分构造地址
    ///
    /// 账户表中 username / resource 允许为空，server 必须存在。
    pub fn from_parts(
        local: Option<&str>,
        domain: &str,
        resource: Option<&str>,
    ) -> Result<Self, Ceb2TxtError> {
        let local = match local {
            Some(l) if !l.is_empty() => Some(normalize_part(l, "local part")?),
            _ => None,
        };

        if domain.is_empty() {
            return Err(Ceb2TxtError::InvalidAddress("empty domain".to_string()));
        }
        let domain = normalize_part(domain, "domain")?;

        let resource = resource.filter(|r| !r.is_empty()).map(str::to_string);

        Ok(Self {
            local,
            domain,
            resource,
        })
    }

    pub fn local(&self) -> Option<&str> {
        self.local.as_deref()
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    pub fn resource_or_empty(&self) -> &str {
        self.resource.as_deref().unwrap_or("")
    }

    pub fn bare(&self) -> Jid {
        Jid {
            local: self.local.clone(),
            domain: self.domain.clone(),
            resource: None,
        }
    }

    pub fn is_bare(&self) -> bool {
        self.resource.is_none()
    }
}

fn normalize_part(part: &str, what: &str) -> Result<String, Ceb2TxtError> {
    if part
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || c == '@' || c == '/')
    {
        return Err(Ceb2TxtError::InvalidAddress(format!(
            "{what} contains invalid characters: {part:?}"
        )));
    }
    Ok(part.to_lowercase())
}

impl FromStr for Jid {
    type Err = Ceb2TxtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (address, resource) = match s.split_once('/') {
            Some((_, "")) => {
                return Err(Ceb2TxtError::InvalidAddress(format!("empty resource: {s:?}")));
            }
            Some((address, resource)) => (address, Some(resource)),
            None => (s, None),
        };

        let (local, domain) = match address.split_once('@') {
            Some(("", _)) => {
                return Err(Ceb2TxtError::InvalidAddress(format!("empty local part: {s:?}")));
            }
            Some((local, domain)) => (Some(local), domain),
            None => (None, address),
        };

        Jid::from_parts(local, domain, resource)
    }
}

impl fmt::Display for Jid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(local) = &self.local {
            write!(f, "{local}@")?;
        }
        write!(f, "{}", self.domain)?;
        if let Some(resource) = &self.resource {
            write!(f, "/{resource}")?;
        }
        Ok(())
    }
}
