//! Cookie manager that splits large values across several cookies.
//!
//! A value too large for one cookie is stored as a header cookie
//! `key=chunks-N` followed by `keyC1` .. `keyCN` holding consecutive
//! segments of the value.

use chrono::{DateTime, Utc};

use cookiegate_core::traits::CookieManager;
use cookiegate_core::types::{CookieOptions, RequestCookies, ResponseCookie};

/// Browsers commonly cap a cookie at 4096 bytes including attributes.
pub const DEFAULT_CHUNK_SIZE: usize = 4050;

const CHUNK_KEY_SUFFIX: &str = "C";
const CHUNK_COUNT_PREFIX: &str = "chunks-";

/// Smallest useful room for data in a chunk after the template.
const MIN_CHUNK_DATA: usize = 10;

/// Default [`CookieManager`] with transparent chunking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingCookieManager {
    /// Maximum rendered `Set-Cookie` length. `None` disables chunking.
    pub chunk_size: Option<usize>,
}

impl Default for ChunkingCookieManager {
    fn default() -> Self {
        Self {
            chunk_size: Some(DEFAULT_CHUNK_SIZE),
        }
    }
}

impl ChunkingCookieManager {
    pub fn new(chunk_size: Option<usize>) -> Self {
        Self { chunk_size }
    }

    fn chunk_key(key: &str, index: usize) -> String {
        format!("{key}{CHUNK_KEY_SUFFIX}{index}")
    }

    /// Number of chunks announced by a header value, or 0 if it is not one.
    fn parse_chunk_count(value: &str) -> usize {
        value
            .strip_prefix(CHUNK_COUNT_PREFIX)
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(0)
    }

    fn expired(options: &CookieOptions) -> CookieOptions {
        CookieOptions {
            expires: Some(DateTime::<Utc>::UNIX_EPOCH),
            max_age: None,
            ..options.clone()
        }
    }
}

impl CookieManager for ChunkingCookieManager {
    fn get_request_cookie(&self, request: &RequestCookies, key: &str) -> Option<String> {
        let value = request.get(key)?;
        let chunks = Self::parse_chunk_count(value);
        if chunks == 0 {
            return Some(value.to_string());
        }

        let mut assembled = String::new();
        for index in 1..=chunks {
            match request.get(&Self::chunk_key(key, index)) {
                Some(chunk) => assembled.push_str(chunk),
                None => {
                    tracing::debug!(key, index, chunks, "Chunked cookie is incomplete");
                    return Some(value.to_string());
                }
            }
        }
        Some(assembled)
    }

    fn append_response_cookie(
        &self,
        response: &mut Vec<ResponseCookie>,
        key: &str,
        value: &str,
        options: &CookieOptions,
    ) {
        let template_len = ResponseCookie::new(key, "", options).header_len();

        let Some(chunk_size) = self.chunk_size else {
            response.push(ResponseCookie::new(key, value, options));
            return;
        };
        if chunk_size > template_len + value.len() {
            response.push(ResponseCookie::new(key, value, options));
            return;
        }
        let Some(segments) = plan_segments(value, chunk_size.saturating_sub(template_len)) else {
            tracing::warn!(
                key,
                chunk_size,
                template_len,
                "Chunk size too small for cookie attributes; writing a single cookie"
            );
            response.push(ResponseCookie::new(key, value, options));
            return;
        };

        response.push(ResponseCookie::new(
            key,
            format!("{CHUNK_COUNT_PREFIX}{}", segments.len()),
            options,
        ));
        for (i, segment) in segments.into_iter().enumerate() {
            response.push(ResponseCookie::new(
                Self::chunk_key(key, i + 1),
                segment,
                options,
            ));
        }
    }

    fn delete_cookie(
        &self,
        response: &mut Vec<ResponseCookie>,
        request: &RequestCookies,
        key: &str,
        options: &CookieOptions,
    ) {
        let expired = Self::expired(options);
        let chunks = request
            .get(key)
            .map(Self::parse_chunk_count)
            .unwrap_or(0);

        response.push(ResponseCookie::new(key, "", &expired));
        // The announced count is client-controlled; only expire chunks that exist.
        for index in 1..=chunks {
            let chunk_key = Self::chunk_key(key, index);
            if request.get(&chunk_key).is_none() {
                break;
            }
            response.push(ResponseCookie::new(chunk_key, "", &expired));
        }
    }
}

/// Splits `value` so each chunk cookie fits in `room` bytes beyond the
/// base template, accounting for the `C<index>` name suffix.
///
/// Returns `None` when there is not enough room for useful data.
fn plan_segments(value: &str, room: usize) -> Option<Vec<&str>> {
    let mut digits = 1;
    loop {
        let per_cookie = room.checked_sub(CHUNK_KEY_SUFFIX.len() + digits)?;
        if per_cookie < MIN_CHUNK_DATA {
            return None;
        }
        let segments = split_at_char_boundaries(value, per_cookie);
        if segments.len().to_string().len() <= digits {
            return Some(segments);
        }
        digits += 1;
    }
}

/// Splits `value` into pieces of at most `max` bytes without cutting a
/// UTF-8 sequence.
fn split_at_char_boundaries(value: &str, max: usize) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut rest = value;
    while !rest.is_empty() {
        let mut end = max.min(rest.len());
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        if end == 0 {
            end = rest
                .char_indices()
                .nth(1)
                .map(|(i, _)| i)
                .unwrap_or(rest.len());
        }
        let (head, tail) = rest.split_at(end);
        segments.push(head);
        rest = tail;
    }
    segments
}
