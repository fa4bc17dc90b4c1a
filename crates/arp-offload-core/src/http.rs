//! Minimal HTTP/1.1 plumbing for the control panel: read a request head,
//! parse it, write a response.

use core::fmt::Write as CoreWrite;

use embedded_io_async::{Read, Write};
use heapless::Vec;
use log::{debug, error};

use crate::buffer::{RequestBuffer, ResponseBuffer};
use crate::{Error, Result};

const MAX_HEADERS: usize = 32;
const HEAD_BYTES_LEN: usize = 192;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Other,
}

impl Method {
    fn parse(method: &str) -> Self {
        match method {
            "GET" => Method::Get,
            "POST" => Method::Post,
            _ => Method::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    NotFound,
    MethodNotAllowed,
    InternalServerError,
}

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::NotFound => 404,
            Status::MethodNotAllowed => 405,
            Status::InternalServerError => 500,
        }
    }

    fn line(self) -> &'static str {
        match self {
            Status::Ok => "HTTP/1.1 200 OK\r\n",
            Status::NotFound => "HTTP/1.1 404 Not Found\r\n",
            Status::MethodNotAllowed => "HTTP/1.1 405 Method Not Allowed\r\n",
            Status::InternalServerError => "HTTP/1.1 500 Internal Server Error\r\n",
        }
    }
}

/// A parsed request head borrowing from the request buffer.
#[derive(Debug)]
pub struct Request<'a> {
    pub method: Method,
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub headers: Vec<&'a str, MAX_HEADERS>,
    pub data: &'a str,
}

impl<'a> Request<'a> {
    pub fn parse(raw: &'a [u8]) -> Result<Self> {
        let text = core::str::from_utf8(raw).map_err(|_| Error::Request)?;
        let mut lines = text.split("\r\n");
        let first_line = lines.next().unwrap_or("");
        let mut parts = first_line.split(' ');
        let method = parts.next().unwrap_or("");
        let target = parts.next().unwrap_or("");
        if method.is_empty() || !target.starts_with('/') {
            return Err(Error::Request);
        }

        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (target, None),
        };

        let mut headers = Vec::new();
        for line in lines.by_ref() {
            if line.is_empty() {
                break;
            }
            // Headers beyond the table size are not needed by any page.
            let _ = headers.push(line);
        }
        let data = lines.next().unwrap_or("").trim_matches(char::from(0));

        Ok(Self {
            method: Method::parse(method),
            path,
            query,
            headers,
            data,
        })
    }
}

fn head_complete(bytes: &[u8]) -> bool {
    bytes.windows(4).any(|w| w == b"\r\n\r\n")
}

/// Reads from `socket` until the request head is complete.
pub async fn read_request<R: Read, const S: usize>(
    socket: &mut R,
    request_buffer: &mut RequestBuffer<S>,
) -> Result<()> {
    loop {
        if request_buffer.is_full() {
            error!("Request head exceeds {} bytes", S);
            return Err(Error::Request);
        }
        match socket.read(request_buffer.spare_mut()).await {
            Ok(0) => {
                debug!("read EOF before end of request head");
                return Err(Error::Request);
            }
            Ok(len) => {
                request_buffer.advance(len);
                if head_complete(request_buffer.buffer()) {
                    return Ok(());
                }
            }
            Err(e) => {
                error!("read error: {:?}", e);
                return Err(Error::Request);
            }
        }
    }
}

fn write_head<const S: usize>(
    head: &mut ResponseBuffer<S>,
    status: Status,
    content_type: Option<&str>,
    content_length: usize,
) -> core::fmt::Result {
    head.write_str(status.line())?;
    if let Some(content_type) = content_type {
        write!(head, "Content-Type: {}\r\n", content_type)?;
    }
    write!(head, "Content-Length: {}\r\n", content_length)?;
    head.write_str("Connection: close\r\n\r\n")
}

/// Writes a complete response: status line, headers and body.
pub async fn write_response<W: Write>(
    socket: &mut W,
    status: Status,
    content_type: Option<&str>,
    body: &[u8],
) -> Result<()> {
    let mut head = ResponseBuffer::<HEAD_BYTES_LEN>::new();
    if write_head(&mut head, status, content_type, body.len()).is_err() {
        error!("Response head exceeds {} bytes", HEAD_BYTES_LEN);
        return Err(Error::BufferOverflow);
    }

    if let Err(e) = socket.write_all(head.buffer()).await {
        error!("Failed to write HTTP response head: {:?}", e);
        return Err(Error::WriteFailure);
    }
    if let Err(e) = socket.write_all(body).await {
        error!("Failed to write HTTP response body: {:?}", e);
        return Err(Error::WriteFailure);
    }
    if let Err(e) = socket.flush().await {
        error!("flush error: {:?}", e);
        return Err(Error::WriteFailure);
    }
    Ok(())
}
