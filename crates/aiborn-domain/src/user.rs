//! User domain types.

use serde::{Deserialize, Serialize};

/// Site-wide permission level injected by the gateway.
///
/// Wire format: `u8` (0 = Reader, 1 = Admin).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Reader = 0,
    Admin = 1,
}

impl UserRole {
    /// Convert from the `u8` wire value. Unknown higher values are treated as admin
    /// so that new privileged roles keep admin rights.
    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Reader,
            _ => Self::Admin,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}
