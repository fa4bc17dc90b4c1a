use core::fmt;

/// Errors raised by the connection manager and the HTTP control surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A required credential was not provided.
    InvalidArgument,
    /// Joining the access point failed or the link is in an unusable state.
    Connection,
    /// The join succeeded but no address was assigned in time.
    Timeout,
    /// Formatted content does not fit the response buffer.
    BufferOverflow,
    /// The HTTP stream refused the response.
    WriteFailure,
    /// The request could not be read or parsed.
    Request,
    /// A resource could not be added to the resource table.
    Registration,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Error::InvalidArgument => "invalid argument",
            Error::Connection => "connection error",
            Error::Timeout => "timed out waiting for an address",
            Error::BufferOverflow => "response exceeds the buffer size",
            Error::WriteFailure => "failed to write HTTP response",
            Error::Request => "malformed HTTP request",
            Error::Registration => "resource registration failed",
        };
        f.write_str(msg)
    }
}

impl core::error::Error for Error {}

pub type Result<T> = core::result::Result<T, Error>;
