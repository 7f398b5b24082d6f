/// Signed size type used for precision and width.
pub type StreamSize = i64;

pub const DEFAULT_PRECISION: StreamSize = 6;
pub const DEFAULT_WIDTH: StreamSize = 0;

/// Formatting state shared by output streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IosBase {
    precision: StreamSize,
    width: StreamSize,
}

impl IosBase {
    #[must_use]
    pub const fn new() -> Self {
        IosBase {
            precision: DEFAULT_PRECISION,
            width: DEFAULT_WIDTH,
        }
    }

    /// Digits written after the decimal point of floating-point values.
    #[must_use]
    pub fn precision(&self) -> StreamSize {
        self.precision
    }

    /// Sets the precision and returns the previous one. Negative values are ignored.
    pub fn set_precision(&mut self, precision: StreamSize) -> StreamSize {
        let previous = self.precision;
        if precision >= 0 {
            self.precision = precision;
        }
        previous
    }

    /// Minimum field width of the next formatted write.
    #[must_use]
    pub fn width(&self) -> StreamSize {
        self.width
    }

    /// Sets the width and returns the previous one. Negative values are ignored.
    pub fn set_width(&mut self, width: StreamSize) -> StreamSize {
        let previous = self.width;
        if width >= 0 {
            self.width = width;
        }
        previous
    }
}

/// Where a stream keeps its [`IosBase`].
///
/// A stream reads a snapshot with `load` and writes every change back with
/// `store`, so implementations may share one state between many streams.
pub trait FormatState {
    fn load(&self) -> IosBase;
    fn store(&mut self, ios: IosBase);
}

impl FormatState for IosBase {
    fn load(&self) -> IosBase {
        *self
    }

    fn store(&mut self, ios: IosBase) {
        *self = ios;
    }
}

impl Default for IosBase {
    fn default() -> Self {
        Self::new()
    }
}
