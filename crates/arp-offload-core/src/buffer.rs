use core::fmt::Write;

/// Holds the head of an incoming request.
pub struct RequestBuffer<const S: usize> {
    buf: [u8; S],
    len: usize,
}

impl<const S: usize> Default for RequestBuffer<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const S: usize> RequestBuffer<S> {
    pub fn new() -> Self {
        Self { buf: [0; S], len: 0 }
    }

    /// Bytes received so far.
    pub fn buffer(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Free space after the received bytes.
    pub fn spare_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.len..]
    }

    pub fn advance(&mut self, n: usize) {
        self.len = (self.len + n).min(S);
    }

    pub fn is_full(&self) -> bool {
        self.len == S
    }
}

/// Fixed-capacity response body. Writes that would not fit are refused as a
/// whole, nothing is partially copied.
pub struct ResponseBuffer<const S: usize> {
    data: [u8; S],
    pos: usize,
}

impl<const S: usize> Default for ResponseBuffer<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const S: usize> ResponseBuffer<S> {
    pub fn new() -> Self {
        Self { data: [0; S], pos: 0 }
    }

    pub fn buffer(&self) -> &[u8] {
        &self.data[..self.pos]
    }

    pub fn len(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos == 0
    }

    pub fn clear(&mut self) {
        self.pos = 0;
    }

    pub fn write(&mut self, bytes: &[u8]) -> core::fmt::Result {
        if (self.pos + bytes.len()) > self.data.len() {
            return Err(core::fmt::Error);
        }
        self.data[self.pos..(self.pos + bytes.len())].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }
}

impl<const S: usize> Write for ResponseBuffer<S> {
    fn write_str(&mut self, in_str: &str) -> core::fmt::Result {
        self.write(in_str.as_bytes())
    }
}
