//! Types shared between the verse client and anything speaking its wire protocol.

pub mod domain;
pub mod error;
pub mod protocol;
