//! Cookie storage for protected tickets.

pub mod chunking;
pub mod ticket_cookie;

pub use chunking::ChunkingCookieManager;
pub use ticket_cookie::{clear_ticket, issue_ticket, read_ticket, renew_ticket, write_ticket};
