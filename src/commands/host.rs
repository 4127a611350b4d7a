use std::io::{self, Write};

/// Abstract the host environment to enable testing
pub trait Host: Send + Sync {
    // where to send normal output (e.g., stdout)
    fn output(&mut self) -> impl Write;

    // where to send error output (e.g., stderr)
    fn error(&mut self) -> impl Write;

    /// Read one line of user input, without the line terminator
    fn read_line(&mut self) -> io::Result<String>;
}

/// Test host that captures output to in-memory buffers and answers prompts from a script
#[cfg(test)]
#[derive(Debug, Default)]
pub struct TestHost {
    pub output_buf: Vec<u8>,
    pub error_buf: Vec<u8>,
    pub input_lines: Vec<String>,
}

#[cfg(test)]
impl Host for TestHost {
    fn output(&mut self) -> impl Write {
        io::Cursor::new(&mut self.output_buf)
    }

    fn error(&mut self) -> impl Write {
        io::Cursor::new(&mut self.error_buf)
    }

    fn read_line(&mut self) -> io::Result<String> {
        if self.input_lines.is_empty() {
            Err(io::Error::new(io::ErrorKind::UnexpectedEof, "no more input"))
        } else {
            Ok(self.input_lines.remove(0))
        }
    }
}
