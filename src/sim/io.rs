//! IO handling for the LMC simulator.
//!
//! The interface for IO devices is defined with the [`IODevice`] trait.
//! `INP` reads one line from the device and `OUT` writes one value to it.
//!
//! Besides the trait, this module also includes:
//! - [`EmptyIO`]: An `IODevice` holding the implementation for a lack of IO support.
//! - [`BufferedIO`]: An `IODevice` holding an in-memory buffered implementation for IO.
//! - [`StreamIO`]: An `IODevice` that reads from and writes to caller-supplied streams.

use std::collections::VecDeque;
use std::io::{BufRead, Write};

/// An IO device that lines can be read from and values can be written to.
///
/// Both operations block until they complete.
pub trait IODevice {
    /// Reads the next line of input, without its line terminator.
    ///
    /// This returns `None` if the input has ended.
    fn read_line(&mut self) -> std::io::Result<Option<String>>;

    /// Writes a value to the output, as a decimal number followed by a new line.
    fn write_value(&mut self, value: i16) -> std::io::Result<()>;
}
impl dyn IODevice {} // assert IODevice is dyn safe

impl<D: IODevice + ?Sized> IODevice for &mut D {
    fn read_line(&mut self) -> std::io::Result<Option<String>> {
        (**self).read_line()
    }

    fn write_value(&mut self, value: i16) -> std::io::Result<()> {
        (**self).write_value(value)
    }
}

/// No IO.
///
/// The input is always empty and all output is discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyIO;
impl IODevice for EmptyIO {
    fn read_line(&mut self) -> std::io::Result<Option<String>> {
        Ok(None)
    }

    fn write_value(&mut self, _value: i16) -> std::io::Result<()> {
        Ok(())
    }
}

/// IO that reads from an input buffer and writes to an output buffer.
///
/// The buffers can be accessed in code via [`BufferedIO::push_input`] and [`BufferedIO::output`].
///
/// ```
/// use lmc_ensemble::sim::io::{BufferedIO, IODevice};
///
/// let mut io = BufferedIO::with_input(["12", "-3"]);
/// assert_eq!(io.read_line().unwrap().as_deref(), Some("12"));
///
/// io.write_value(15).unwrap();
/// io.write_value(7).unwrap();
/// assert_eq!(io.output(), "15\n7\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct BufferedIO {
    input: VecDeque<String>,
    output: String
}
impl BufferedIO {
    /// Creates a new BufferedIO with empty buffers.
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates a new BufferedIO whose input holds the given lines.
    pub fn with_input<I>(lines: I) -> Self
        where I: IntoIterator,
              I::Item: Into<String>
    {
        Self {
            input: lines.into_iter().map(Into::into).collect(),
            output: String::new()
        }
    }

    /// Adds a line to the end of the input.
    pub fn push_input(&mut self, line: impl Into<String>) {
        self.input.push_back(line.into());
    }

    /// Gets the lines of input that have not been read yet.
    pub fn remaining_input(&self) -> &VecDeque<String> {
        &self.input
    }

    /// Gets everything written to the output so far.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Takes everything written to the output so far, clearing the output buffer.
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}
impl IODevice for BufferedIO {
    fn read_line(&mut self) -> std::io::Result<Option<String>> {
        Ok(self.input.pop_front())
    }

    fn write_value(&mut self, value: i16) -> std::io::Result<()> {
        use std::fmt::Write;

        // Writing to a String cannot fail.
        let _ = writeln!(self.output, "{value}");
        Ok(())
    }
}

/// IO that reads lines from a reader and writes values to a writer.
///
/// This is typically used with standard input and output:
/// ```no_run
/// use lmc_ensemble::sim::io::StreamIO;
///
/// let io = StreamIO::new(std::io::stdin().lock(), std::io::stdout());
/// ```
///
/// The writer is flushed after every value, so output is visible
/// before the next `INP` blocks on the reader.
#[derive(Debug)]
pub struct StreamIO<R, W> {
    reader: R,
    writer: W
}
impl<R: BufRead, W: Write> StreamIO<R, W> {
    /// Creates a new stream IO from a reader and a writer.
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Unwraps this IO, returning the underlying reader and writer.
    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}
impl<R: BufRead, W: Write> IODevice for StreamIO<R, W> {
    fn read_line(&mut self) -> std::io::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }

    fn write_value(&mut self, value: i16) -> std::io::Result<()> {
        writeln!(self.writer, "{value}")?;
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::{BufferedIO, EmptyIO, IODevice, StreamIO};

    #[test]
    fn test_empty_io() {
        let mut io = EmptyIO;
        assert_eq!(io.read_line().unwrap(), None);
        assert!(io.write_value(5).is_ok());
    }

    #[test]
    fn test_buffered_io() {
        let mut io = BufferedIO::new();
        assert_eq!(io.read_line().unwrap(), None);

        io.push_input("1");
        io.push_input("2");
        assert_eq!(io.read_line().unwrap().as_deref(), Some("1"));
        assert_eq!(io.remaining_input().len(), 1);

        io.write_value(0).unwrap();
        io.write_value(999).unwrap();
        assert_eq!(io.take_output(), "0\n999\n");
        assert_eq!(io.output(), "");
    }

    #[test]
    fn test_stream_io() {
        let input: &[u8] = b"042\r\n-7\nlast";
        let mut io = StreamIO::new(input, Vec::new());

        assert_eq!(io.read_line().unwrap().as_deref(), Some("042"));
        assert_eq!(io.read_line().unwrap().as_deref(), Some("-7"));
        assert_eq!(io.read_line().unwrap().as_deref(), Some("last"));
        assert_eq!(io.read_line().unwrap(), None);

        io.write_value(42).unwrap();
        io.write_value(7).unwrap();
        let (_, output) = io.into_inner();
        assert_eq!(output, b"42\n7\n");
    }

    #[test]
    fn test_through_mut_ref() {
        fn write_twice(mut io: impl IODevice) {
            io.write_value(1).unwrap();
            io.write_value(2).unwrap();
        }

        let mut io = BufferedIO::new();
        write_twice(&mut io);
        assert_eq!(io.output(), "1\n2\n");
    }
}
