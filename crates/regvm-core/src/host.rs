//! Host integration seam
//!
//! The syscall dispatcher performs every side effect through `Host`, so the
//! engine itself never touches the console, filesystem or process table.
//! Capability checks happen in the VM before a guarded method is called.

use std::collections::{HashMap, VecDeque};
use std::io;

/// Side effects the syscall table needs from its embedder.
pub trait Host {
    /// Write text to the console, without a trailing newline.
    fn write(&mut self, text: &str) -> io::Result<()>;

    /// Show `prompt` and read one line, without its line terminator.
    /// `None` means the input is exhausted.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    fn read_file(&mut self, path: &str) -> io::Result<String>;

    /// Create or truncate `path` and write `contents`.
    fn write_file(&mut self, path: &str, contents: &str) -> io::Result<()>;

    /// Run `code` as host-level code.
    fn execute(&mut self, code: &str) -> io::Result<()>;
}

impl<H: Host + ?Sized> Host for &mut H {
    fn write(&mut self, text: &str) -> io::Result<()> {
        (**self).write(text)
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        (**self).read_line(prompt)
    }

    fn read_file(&mut self, path: &str) -> io::Result<String> {
        (**self).read_file(path)
    }

    fn write_file(&mut self, path: &str, contents: &str) -> io::Result<()> {
        (**self).write_file(path, contents)
    }

    fn execute(&mut self, code: &str) -> io::Result<()> {
        (**self).execute(code)
    }
}

/// In-memory host: scripted console input, captured output, a map of files
/// and a log of executed code.
#[derive(Debug, Default, Clone)]
pub struct MemoryHost {
    pub output: String,
    pub input: VecDeque<String>,
    pub prompts: Vec<String>,
    pub files: HashMap<String, String>,
    pub executed: Vec<String>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue console input lines, consumed in order by `read_line`.
    pub fn with_input<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input.extend(lines.into_iter().map(Into::into));
        self
    }

    pub fn with_file(mut self, path: impl Into<String>, contents: impl Into<String>) -> Self {
        self.files.insert(path.into(), contents.into());
        self
    }
}

impl Host for MemoryHost {
    fn write(&mut self, text: &str) -> io::Result<()> {
        self.output.push_str(text);
        Ok(())
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        self.output.push_str(prompt);
        Ok(self.input.pop_front())
    }

    fn read_file(&mut self, path: &str) -> io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no such file: {path}")))
    }

    fn write_file(&mut self, path: &str, contents: &str) -> io::Result<()> {
        self.files.insert(path.to_string(), contents.to_string());
        Ok(())
    }

    fn execute(&mut self, code: &str) -> io::Result<()> {
        self.executed.push(code.to_string());
        Ok(())
    }
}
