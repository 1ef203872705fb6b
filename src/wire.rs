// File: wire.rs
// SPDX-License-Identifier: MIT OR Apache-2.0

use log::{debug, warn};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};

const MAX_LINE_BYTES: usize = 65536;
const MAX_HEADER_COUNT: usize = 256;

/// Statuses that never carry a body, in addition to the whole 1xx class.
static BODYLESS_STATUS: Lazy<HashSet<u16>> = Lazy::new(|| HashSet::from([204, 304]));

/// How a structured request frames its body on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestFraming {
    /// Emit a Content-Length header derived from the body.
    ContentLength,
    /// Emit Transfer-Encoding: chunked and split the body at these sizes.
    /// Any remainder becomes a final non-empty chunk.
    Chunked { chunk_sizes: Vec<usize> },
    /// No framing header at all. Body bytes, if any, follow the blank line
    /// verbatim.
    None,
}

/// A request to put on the wire. The raw variant is the escape hatch for
/// probing malformed input a conformant builder would refuse to produce
/// (missing colon, space before colon, duplicate Host, and so on).
#[derive(Debug, Clone)]
pub enum RequestSpec {
    Raw(Vec<u8>),
    Structured {
        method: String,
        target: String,
        headers: Vec<(String, String)>,
        body: Option<Vec<u8>>,
        framing: RequestFraming,
    },
}

impl RequestSpec {
    pub fn raw(bytes: impl Into<Vec<u8>>) -> Self {
        RequestSpec::Raw(bytes.into())
    }

    pub fn structured(method: impl Into<String>, target: impl Into<String>) -> Self {
        RequestSpec::Structured {
            method: method.into(),
            target: target.into(),
            headers: Vec::new(),
            body: None,
            framing: RequestFraming::None,
        }
    }

    pub fn get(target: impl Into<String>) -> Self {
        Self::structured("GET", target)
    }

    pub fn post(target: impl Into<String>) -> Self {
        Self::structured("POST", target)
    }

    /// Append a header. Order and duplicates are preserved on the wire.
    /// No effect on raw specs.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let RequestSpec::Structured { headers, .. } = &mut self {
            headers.push((name.into(), value.into()));
        }
        self
    }

    /// Attach a body, framed with Content-Length unless overridden by
    /// [`RequestSpec::framing`].
    pub fn body(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        if let RequestSpec::Structured { body, framing, .. } = &mut self {
            *body = Some(bytes.into());
            *framing = RequestFraming::ContentLength;
        }
        self
    }

    pub fn framing(mut self, choice: RequestFraming) -> Self {
        if let RequestSpec::Structured { framing, .. } = &mut self {
            *framing = choice;
        }
        self
    }

    /// Serialize to wire bytes. Deterministic: identical specs always
    /// produce identical bytes.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            RequestSpec::Raw(bytes) => bytes.clone(),
            RequestSpec::Structured {
                method,
                target,
                headers,
                body,
                framing,
            } => {
                let mut out = Vec::with_capacity(256);
                out.extend_from_slice(format!("{} {} HTTP/1.1\r\n", method, target).as_bytes());
                for (name, value) in headers {
                    out.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
                }
                let has_header = |name: &str| {
                    headers.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
                };
                match framing {
                    RequestFraming::ContentLength => {
                        if !has_header("content-length") {
                            let len = body.as_ref().map_or(0, |b| b.len());
                            out.extend_from_slice(
                                format!("Content-Length: {}\r\n", len).as_bytes(),
                            );
                        }
                    }
                    RequestFraming::Chunked { .. } => {
                        if !has_header("transfer-encoding") {
                            out.extend_from_slice(b"Transfer-Encoding: chunked\r\n");
                        }
                    }
                    RequestFraming::None => {}
                }
                out.extend_from_slice(b"\r\n");
                match framing {
                    RequestFraming::Chunked { chunk_sizes } => {
                        encode_chunked(body.as_deref().unwrap_or(&[]), chunk_sizes, &mut out);
                    }
                    _ => {
                        if let Some(bytes) = body {
                            out.extend_from_slice(bytes);
                        }
                    }
                }
                out
            }
        }
    }
}

fn encode_chunked(body: &[u8], chunk_sizes: &[usize], out: &mut Vec<u8>) {
    let mut offset = 0;
    for &size in chunk_sizes {
        if size == 0 || offset >= body.len() {
            break;
        }
        let end = (offset + size).min(body.len());
        out.extend_from_slice(format!("{:x}\r\n", end - offset).as_bytes());
        out.extend_from_slice(&body[offset..end]);
        out.extend_from_slice(b"\r\n");
        offset = end;
    }
    if offset < body.len() {
        out.extend_from_slice(format!("{:x}\r\n", body.len() - offset).as_bytes());
        out.extend_from_slice(&body[offset..]);
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(b"0\r\n\r\n");
}

/// Terminal outcome of one request/response exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Completed,
    TimedOut,
    ConnectionRefused,
    ConnectionReset,
    Malformed,
}

/// Ordered, duplicate-preserving header list. Framing decisions and the
/// oracle re-scan the list instead of assuming a map, because detecting a
/// doubled Host or Content-Length is part of the job.
#[derive(Debug, Clone, Default)]
pub struct HeaderList {
    entries: Vec<(String, String)>,
}

impl HeaderList {
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// First value for `name`, case-insensitive. When duplicates exist this
    /// deliberately returns the first occurrence; callers that care about
    /// multiplicity use [`HeaderList::all`] or [`HeaderList::count`].
    pub fn first(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.entries
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .count()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.first(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Decoded HTTP/1.1 response. On anything but `Outcome::Completed` the
/// fields hold whatever was parsed before the exchange went wrong; the
/// partial body is kept for diagnostics.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub reason: String,
    pub headers: HeaderList,
    pub body: Vec<u8>,
    pub outcome: Outcome,
}

impl Response {
    /// An exchange that failed before any response byte arrived.
    pub fn aborted(outcome: Outcome) -> Self {
        Response {
            status: 0,
            reason: String::new(),
            headers: HeaderList::default(),
            body: Vec::new(),
            outcome,
        }
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
    pub read_timeout: Duration,
    pub max_body_size: usize,
    /// The request was HEAD, so the response has no body regardless of its
    /// framing headers.
    pub head_response: bool,
}

impl DecodeOptions {
    pub fn new(read_timeout: Duration, max_body_size: usize) -> Self {
        Self {
            read_timeout,
            max_body_size,
            head_response: false,
        }
    }

    pub fn head(mut self) -> Self {
        self.head_response = true;
        self
    }
}

enum ReadFailure {
    TimedOut,
    Io(std::io::Error),
}

impl ReadFailure {
    fn outcome(&self) -> Outcome {
        match self {
            ReadFailure::TimedOut => Outcome::TimedOut,
            ReadFailure::Io(e) => match e.kind() {
                std::io::ErrorKind::ConnectionRefused => Outcome::ConnectionRefused,
                _ => Outcome::ConnectionReset,
            },
        }
    }
}

enum Line {
    Complete(Vec<u8>),
    BareLf,
    TooLong,
    Eof,
}

/// Buffered reader over the response stream. Every underlying read is
/// bounded by the configured timeout.
struct WireReader<'a, R> {
    inner: &'a mut R,
    buf: Vec<u8>,
    pos: usize,
    timeout: Duration,
    eof: bool,
}

impl<'a, R: AsyncRead + Unpin> WireReader<'a, R> {
    fn new(inner: &'a mut R, timeout: Duration) -> Self {
        Self {
            inner,
            buf: Vec::new(),
            pos: 0,
            timeout,
            eof: false,
        }
    }

    async fn fill(&mut self) -> Result<usize, ReadFailure> {
        if self.eof {
            return Ok(0);
        }
        let mut chunk = [0u8; 4096];
        match tokio::time::timeout(self.timeout, self.inner.read(&mut chunk)).await {
            Ok(Ok(0)) => {
                self.eof = true;
                Ok(0)
            }
            Ok(Ok(n)) => {
                self.buf.extend_from_slice(&chunk[..n]);
                Ok(n)
            }
            Ok(Err(e)) => Err(ReadFailure::Io(e)),
            Err(_) => Err(ReadFailure::TimedOut),
        }
    }

    /// Next CRLF-terminated line, terminator stripped. A lone LF is a
    /// framing violation, not something to paper over.
    async fn read_line(&mut self) -> Result<Line, ReadFailure> {
        loop {
            if let Some(rel) = self.buf[self.pos..].iter().position(|&b| b == b'\n') {
                let nl = self.pos + rel;
                if nl == self.pos || self.buf[nl - 1] != b'\r' {
                    return Ok(Line::BareLf);
                }
                let line = self.buf[self.pos..nl - 1].to_vec();
                self.pos = nl + 1;
                return Ok(Line::Complete(line));
            }
            if self.buf.len() - self.pos > MAX_LINE_BYTES {
                return Ok(Line::TooLong);
            }
            if self.fill().await? == 0 {
                return Ok(Line::Eof);
            }
        }
    }

    /// Append exactly `n` bytes to `body`. Ok(false) means EOF arrived
    /// first; whatever was read stays in `body`.
    async fn read_exact_body(
        &mut self,
        n: usize,
        body: &mut Vec<u8>,
    ) -> Result<bool, ReadFailure> {
        let mut remaining = n;
        while remaining > 0 {
            let available = self.buf.len() - self.pos;
            if available > 0 {
                let take = available.min(remaining);
                body.extend_from_slice(&self.buf[self.pos..self.pos + take]);
                self.pos += take;
                remaining -= take;
                continue;
            }
            if self.fill().await? == 0 {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Append everything up to EOF. Ok(false) means the cap was exceeded.
    async fn read_to_eof(&mut self, body: &mut Vec<u8>, cap: usize) -> Result<bool, ReadFailure> {
        loop {
            body.extend_from_slice(&self.buf[self.pos..]);
            self.pos = self.buf.len();
            if body.len() > cap {
                return Ok(false);
            }
            if self.fill().await? == 0 {
                return Ok(true);
            }
        }
    }
}

#[derive(Default)]
struct Partial {
    status: u16,
    reason: String,
    headers: HeaderList,
    body: Vec<u8>,
}

impl Partial {
    fn finish(self, outcome: Outcome) -> Response {
        Response {
            status: self.status,
            reason: self.reason,
            headers: self.headers,
            body: self.body,
            outcome,
        }
    }

    fn parse_status_line(&mut self, line: &[u8]) -> bool {
        let Ok(s) = std::str::from_utf8(line) else {
            debug!("status line is not valid UTF-8");
            return false;
        };
        let mut parts = s.splitn(3, ' ');
        let version = parts.next().unwrap_or("");
        let code = parts.next().unwrap_or("");
        let reason = parts.next().unwrap_or("");
        if version != "HTTP/1.1" {
            debug!("unexpected version token: {:?}", version);
            return false;
        }
        if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_digit()) {
            debug!("bad status token: {:?}", code);
            return false;
        }
        let status: u16 = match code.parse() {
            Ok(v) => v,
            Err(_) => return false,
        };
        if !(100..=599).contains(&status) {
            debug!("status {} out of range", status);
            return false;
        }
        self.status = status;
        self.reason = reason.to_string();
        true
    }
}

fn parse_header_line(line: &[u8]) -> Result<(String, String), String> {
    let s = std::str::from_utf8(line).map_err(|_| "header line is not valid UTF-8".to_string())?;
    let colon = s
        .find(':')
        .ok_or_else(|| format!("header line without colon: {:?}", s))?;
    let name = &s[..colon];
    if name.is_empty() {
        return Err("empty header name".to_string());
    }
    // RFC 7230 3.2.4: whitespace between the field name and the colon is a
    // hard parse error, never trimmed.
    if name.ends_with(' ') || name.ends_with('\t') {
        return Err(format!("whitespace before colon: {:?}", s));
    }
    if name.contains(' ') || name.contains('\t') {
        return Err(format!("whitespace in header name: {:?}", s));
    }
    let value = s[colon + 1..]
        .trim_matches(|c| c == ' ' || c == '\t')
        .to_string();
    Ok((name.to_string(), value))
}

enum Framing {
    Length(usize),
    Chunked { ambiguous: bool },
    Close,
}

fn transfer_encoding_is_chunked(headers: &HeaderList) -> bool {
    headers.all("transfer-encoding").iter().any(|v| {
        v.split(',')
            .any(|coding| coding.trim().eq_ignore_ascii_case("chunked"))
    })
}

fn parse_content_length(value: &str) -> Result<usize, String> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid Content-Length: {:?}", value));
    }
    value
        .parse::<usize>()
        .map_err(|_| format!("Content-Length out of range: {:?}", value))
}

fn decide_framing(headers: &HeaderList, max_body_size: usize) -> Result<Framing, String> {
    let lengths = headers.all("content-length");
    if transfer_encoding_is_chunked(headers) {
        if !lengths.is_empty() {
            warn!("ambiguous framing: Content-Length alongside Transfer-Encoding: chunked");
            return Ok(Framing::Chunked { ambiguous: true });
        }
        return Ok(Framing::Chunked { ambiguous: false });
    }
    if let Some(&first) = lengths.first() {
        if lengths.iter().any(|&v| v != first) {
            return Err(format!("conflicting Content-Length values: {:?}", lengths));
        }
        let n = parse_content_length(first)?;
        if n > max_body_size {
            return Err(format!(
                "Content-Length {} exceeds configured maximum {}",
                n, max_body_size
            ));
        }
        return Ok(Framing::Length(n));
    }
    Ok(Framing::Close)
}

enum ChunkError {
    Transport(ReadFailure),
    TruncatedEof,
    Malformed(String),
}

fn parse_chunk_size(line: &[u8]) -> Result<usize, ChunkError> {
    let s = std::str::from_utf8(line)
        .map_err(|_| ChunkError::Malformed("chunk size line is not valid UTF-8".to_string()))?;
    // Everything after ';' is a chunk extension, ignored for reconstruction.
    let token = s.split(';').next().unwrap_or("");
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ChunkError::Malformed(format!("bad chunk size line: {:?}", s)));
    }
    usize::from_str_radix(token, 16)
        .map_err(|_| ChunkError::Malformed(format!("chunk size out of range: {:?}", s)))
}

async fn read_chunked<R: AsyncRead + Unpin>(
    rd: &mut WireReader<'_, R>,
    body: &mut Vec<u8>,
    cap: usize,
) -> Result<(), ChunkError> {
    loop {
        let line = match rd.read_line().await {
            Ok(Line::Complete(l)) => l,
            Ok(Line::Eof) => return Err(ChunkError::TruncatedEof),
            Ok(Line::BareLf) | Ok(Line::TooLong) => {
                return Err(ChunkError::Malformed("bad chunk size line ending".to_string()))
            }
            Err(f) => return Err(ChunkError::Transport(f)),
        };
        let size = parse_chunk_size(&line)?;
        if size == 0 {
            break;
        }
        if body.len() + size > cap {
            return Err(ChunkError::Malformed(format!(
                "chunked body exceeds configured maximum {}",
                cap
            )));
        }
        match rd.read_exact_body(size, body).await {
            Ok(true) => {}
            Ok(false) => return Err(ChunkError::TruncatedEof),
            Err(f) => return Err(ChunkError::Transport(f)),
        }
        match rd.read_line().await {
            Ok(Line::Complete(l)) if l.is_empty() => {}
            Ok(Line::Complete(_)) | Ok(Line::BareLf) | Ok(Line::TooLong) => {
                return Err(ChunkError::Malformed(
                    "missing CRLF after chunk data".to_string(),
                ))
            }
            Ok(Line::Eof) => return Err(ChunkError::TruncatedEof),
            Err(f) => return Err(ChunkError::Transport(f)),
        }
    }
    // Optional trailer section, read and discarded.
    loop {
        match rd.read_line().await {
            Ok(Line::Complete(l)) if l.is_empty() => return Ok(()),
            Ok(Line::Complete(l)) => {
                let (name, value) =
                    parse_header_line(&l).map_err(ChunkError::Malformed)?;
                debug!("discarding trailer {}: {}", name, value);
            }
            Ok(Line::Eof) => return Err(ChunkError::TruncatedEof),
            Ok(Line::BareLf) | Ok(Line::TooLong) => {
                return Err(ChunkError::Malformed("bad trailer line ending".to_string()))
            }
            Err(f) => return Err(ChunkError::Transport(f)),
        }
    }
}

fn body_forbidden(status: u16, head_response: bool) -> bool {
    head_response || status < 200 || BODYLESS_STATUS.contains(&status)
}

/// Decode one HTTP/1.1 response from `reader`. Single pass, no retries, no
/// global state. Transport and protocol problems come back as the response's
/// outcome tag instead of errors; the oracle judges them against the
/// expectation.
pub async fn decode_response<R>(reader: &mut R, opts: DecodeOptions) -> Response
where
    R: AsyncRead + Unpin,
{
    let mut rd = WireReader::new(reader, opts.read_timeout);
    let mut partial = Partial::default();

    let line = match rd.read_line().await {
        Ok(Line::Complete(l)) => l,
        Ok(Line::Eof) => return partial.finish(Outcome::ConnectionReset),
        Ok(Line::BareLf) | Ok(Line::TooLong) => return partial.finish(Outcome::Malformed),
        Err(f) => return partial.finish(f.outcome()),
    };
    if !partial.parse_status_line(&line) {
        return partial.finish(Outcome::Malformed);
    }

    loop {
        match rd.read_line().await {
            Ok(Line::Complete(l)) if l.is_empty() => break,
            Ok(Line::Complete(l)) => match parse_header_line(&l) {
                Ok((name, value)) => partial.headers.push(name, value),
                Err(reason) => {
                    debug!("rejecting header line: {}", reason);
                    return partial.finish(Outcome::Malformed);
                }
            },
            Ok(Line::Eof) => return partial.finish(Outcome::ConnectionReset),
            Ok(Line::BareLf) | Ok(Line::TooLong) => {
                return partial.finish(Outcome::Malformed)
            }
            Err(f) => return partial.finish(f.outcome()),
        }
        if partial.headers.len() > MAX_HEADER_COUNT {
            debug!("more than {} headers, giving up", MAX_HEADER_COUNT);
            return partial.finish(Outcome::Malformed);
        }
    }

    if body_forbidden(partial.status, opts.head_response) {
        return partial.finish(Outcome::Completed);
    }

    let framing = match decide_framing(&partial.headers, opts.max_body_size) {
        Ok(f) => f,
        Err(reason) => {
            debug!("framing rejected: {}", reason);
            return partial.finish(Outcome::Malformed);
        }
    };

    match framing {
        Framing::Length(n) => match rd.read_exact_body(n, &mut partial.body).await {
            Ok(true) => partial.finish(Outcome::Completed),
            Ok(false) => partial.finish(Outcome::ConnectionReset),
            Err(f) => partial.finish(f.outcome()),
        },
        Framing::Chunked { ambiguous } => {
            match read_chunked(&mut rd, &mut partial.body, opts.max_body_size).await {
                Ok(()) if ambiguous => partial.finish(Outcome::Malformed),
                Ok(()) => partial.finish(Outcome::Completed),
                Err(ChunkError::TruncatedEof) => partial.finish(Outcome::ConnectionReset),
                Err(ChunkError::Transport(f)) => partial.finish(f.outcome()),
                Err(ChunkError::Malformed(reason)) => {
                    debug!("chunked body rejected: {}", reason);
                    partial.finish(Outcome::Malformed)
                }
            }
        }
        Framing::Close => match rd.read_to_eof(&mut partial.body, opts.max_body_size).await {
            Ok(true) => partial.finish(Outcome::Completed),
            Ok(false) => {
                debug!("close-delimited body exceeds configured maximum");
                partial.finish(Outcome::Malformed)
            }
            Err(f) => partial.finish(f.outcome()),
        },
    }
}
