//! Cookie storage capability used to read and write ticket cookies.

use crate::types::{CookieOptions, RequestCookies, ResponseCookie};

/// Reads and writes a named cookie value, possibly spread over several
/// physical cookies.
pub trait CookieManager: Send + Sync + std::fmt::Debug + 'static {
    /// Read the logical value of cookie `key` from the request.
    fn get_request_cookie(&self, request: &RequestCookies, key: &str) -> Option<String>;

    /// Emit the cookies needed to store `value` under `key`.
    fn append_response_cookie(
        &self,
        response: &mut Vec<ResponseCookie>,
        key: &str,
        value: &str,
        options: &CookieOptions,
    );

    /// Emit expired cookies removing `key` and any pieces the request carried.
    fn delete_cookie(
        &self,
        response: &mut Vec<ResponseCookie>,
        request: &RequestCookies,
        key: &str,
        options: &CookieOptions,
    );
}
