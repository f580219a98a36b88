//! IPv4 address value object.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Dotted-quad IPv4 address, validated on construction.
///
/// Kept in its original string form; exactly four octets, each 0-255.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IpAddress(String);

impl IpAddress {
    pub fn parse(s: &str) -> DomainResult<Self> {
        let octets: Vec<&str> = s.split('.').collect();
        if octets.len() != 4 {
            return Err(DomainError::invalid_input(format!(
                "invalid IP format: {s}. Expected format: xxx.xxx.xxx.xxx"
            )));
        }
        for octet in octets {
            let ok = !octet.is_empty()
                && octet.len() <= 3
                && octet.bytes().all(|b| b.is_ascii_digit())
                && octet.parse::<u16>().is_ok_and(|v| v <= 255);
            if !ok {
                return Err(DomainError::invalid_input(format!(
                    "invalid IP {s}: octets must be 0-255"
                )));
            }
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for IpAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for IpAddress {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for IpAddress {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<IpAddress> for String {
    fn from(value: IpAddress) -> Self {
        value.0
    }
}
