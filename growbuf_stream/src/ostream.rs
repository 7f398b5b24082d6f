use core::fmt;

use embedded_io::{Error as _, ErrorType, Write};
use growbuf::{ByteBuffer, GrowBufError, RawAlloc};

use crate::error::{Result, StreamError};
use crate::ios_base::{FormatState, IosBase, StreamSize};

const PADDING: [u8; 16] = [b' '; 16];
const ZEROS: [u8; 16] = [b'0'; 16];

/// Largest precision `core::fmt` accepts at runtime.
const MAX_FMT_PRECISION: usize = u16::MAX as usize;

/// Formatted output over an `embedded_io` sink.
///
/// Every `write_*` call produces one field: it is right-aligned to the
/// current width with spaces, after which the width goes back to 0.
/// The calls return the stream again, so writes chain with `?`.
///
/// The precision and width live in `S`: a private [`IosBase`] by default,
/// or state shared with other streams.
#[derive(Debug)]
pub struct Ostream<W, S = IosBase> {
    sink: W,
    state: S,
    scratch: ByteBuffer,
}

/// Formats into the scratch buffer and keeps the allocation error, if any.
struct Scratch<'buf> {
    buf: &'buf mut ByteBuffer,
    error: Option<GrowBufError>,
}

impl fmt::Write for Scratch<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.buf.append(s.as_bytes()).map_err(|err| {
            self.error = Some(err);
            fmt::Error
        })
    }
}

impl<W: Write> Ostream<W> {
    #[must_use]
    pub fn new(sink: W) -> Self {
        Ostream::with_state(sink, IosBase::new())
    }
}

impl<W: Write, S: FormatState> Ostream<W, S> {
    #[must_use]
    pub fn with_state(sink: W, state: S) -> Self {
        Ostream {
            sink,
            state,
            scratch: ByteBuffer::new(),
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    /// Snapshot of the formatting state.
    #[must_use]
    pub fn ios(&self) -> IosBase {
        self.state.load()
    }

    #[must_use]
    pub fn precision(&self) -> StreamSize {
        self.ios().precision()
    }

    /// See [`IosBase::set_precision`].
    pub fn set_precision(&mut self, precision: StreamSize) -> StreamSize {
        self.update(|ios| ios.set_precision(precision))
    }

    #[must_use]
    pub fn width(&self) -> StreamSize {
        self.ios().width()
    }

    /// See [`IosBase::set_width`].
    pub fn set_width(&mut self, width: StreamSize) -> StreamSize {
        self.update(|ios| ios.set_width(width))
    }

    /// # Errors
    ///
    /// From the underlying sink.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self> {
        self.write_field(bytes, 0)?;
        Ok(self)
    }

    /// # Errors
    ///
    /// From the underlying sink.
    pub fn write_str(&mut self, s: &str) -> Result<&mut Self> {
        self.write_bytes(s.as_bytes())
    }

    /// Writes the content of `buf`, without its terminator.
    ///
    /// # Errors
    ///
    /// From the underlying sink.
    pub fn write_buf<A: RawAlloc>(&mut self, buf: &ByteBuffer<A>) -> Result<&mut Self> {
        self.write_bytes(buf.as_bytes())
    }

    /// # Errors
    ///
    /// From the underlying sink.
    pub fn write_char(&mut self, c: char) -> Result<&mut Self> {
        let mut encoded = [0u8; 4];
        self.write_bytes(c.encode_utf8(&mut encoded).as_bytes())
    }

    /// # Errors
    ///
    /// From the underlying sink, or when the formatting buffer cannot grow.
    pub fn write_int(&mut self, value: i64) -> Result<&mut Self> {
        self.write_display(value)
    }

    /// # Errors
    ///
    /// From the underlying sink, or when the formatting buffer cannot grow.
    pub fn write_uint(&mut self, value: u64) -> Result<&mut Self> {
        self.write_display(value)
    }

    /// Writes `value` in fixed notation with `precision()` fractional digits.
    ///
    /// Digits past what `core::fmt` renders are zeros for any `f64`, so they
    /// are written directly.
    ///
    /// # Errors
    ///
    /// From the underlying sink, or when the formatting buffer cannot grow.
    pub fn write_float(&mut self, value: f64) -> Result<&mut Self> {
        let precision = usize::try_from(self.precision()).unwrap_or(usize::MAX);
        let rendered = precision.min(MAX_FMT_PRECISION);
        let zeros = if value.is_finite() {
            precision - rendered
        } else {
            0
        };
        self.write_fmt_field(format_args!("{value:.rendered$}"), zeros)?;
        Ok(self)
    }

    /// Writes any `Display` value as one field.
    ///
    /// # Errors
    ///
    /// From the underlying sink, from the value's formatting, or when the
    /// formatting buffer cannot grow.
    pub fn write_display<T: fmt::Display>(&mut self, value: T) -> Result<&mut Self> {
        self.write_fmt_field(format_args!("{value}"), 0)?;
        Ok(self)
    }

    /// # Errors
    ///
    /// From the underlying sink.
    pub fn flush(&mut self) -> Result<&mut Self> {
        self.sink.flush().map_err(|e| StreamError::Io(e.kind()))?;
        Ok(self)
    }

    fn update<R>(&mut self, change: impl FnOnce(&mut IosBase) -> R) -> R {
        let mut ios = self.state.load();
        let result = change(&mut ios);
        self.state.store(ios);
        result
    }

    fn write_fmt_field(&mut self, args: fmt::Arguments<'_>, zeros: usize) -> Result<()> {
        // The scratch buffer keeps its capacity from one number to the next.
        let mut buf = core::mem::take(&mut self.scratch);
        buf.truncate(0);
        let mut scratch = Scratch {
            buf: &mut buf,
            error: None,
        };
        let formatted = fmt::write(&mut scratch, args);
        let error = scratch.error;
        let result = match formatted {
            Ok(()) => self.write_field(buf.as_bytes(), zeros),
            Err(fmt::Error) => Err(error.map_or(StreamError::Format, StreamError::Buffer)),
        };
        self.scratch = buf;
        result
    }

    /// Writes `bytes` followed by `zeros` `'0'` digits as one padded field.
    fn write_field(&mut self, bytes: &[u8], zeros: usize) -> Result<()> {
        let width = usize::try_from(self.set_width(0)).unwrap_or(0);
        let padding = width.saturating_sub(bytes.len().saturating_add(zeros));
        self.put_repeated(&PADDING, padding)?;
        self.put(bytes)?;
        self.put_repeated(&ZEROS, zeros)
    }

    fn put_repeated(&mut self, chunk: &[u8], mut count: usize) -> Result<()> {
        while count > 0 {
            let n = count.min(chunk.len());
            self.put(&chunk[..n])?;
            count -= n;
        }
        Ok(())
    }

    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        self.sink
            .write_all(bytes)
            .map_err(|e| StreamError::Io(e.kind()))
    }
}

/// Unformatted text: ignores and keeps the width.
impl<W: Write, S: FormatState> fmt::Write for Ostream<W, S> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.put(s.as_bytes()).map_err(|_| fmt::Error)
    }
}

impl<W, S> ErrorType for Ostream<W, S> {
    type Error = StreamError;
}

/// Unformatted bytes, so one stream can feed another.
impl<W: Write, S: FormatState> Write for Ostream<W, S> {
    fn write(&mut self, buf: &[u8]) -> core::result::Result<usize, StreamError> {
        self.put(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> core::result::Result<(), StreamError> {
        Ostream::flush(self).map(|_| ())
    }
}
