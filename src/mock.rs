//! Scripted stand-in for a serial port, for tests.

use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
    io::{self, Read, Write},
    rc::Rc,
};

/// What the fake device does when it receives a command line.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Answer with this text followed by `\r\n`.
    Line(String),
    /// Answer with these exact bytes.
    Bytes(Vec<u8>),
    /// Close the stream.
    Eof,
}

#[derive(Debug, Default)]
pub struct MockPort {
    replies: HashMap<String, Reply>,
    line: Vec<u8>,
    pending: VecDeque<u8>,
    eof: bool,
    fail_writes: bool,
    written: Rc<RefCell<Vec<u8>>>,
}

impl MockPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, command: &str, response: &str) -> Self {
        self.replies
            .insert(command.to_string(), Reply::Line(response.to_string()));
        self
    }

    pub fn reply_with(mut self, command: &str, reply: Reply) -> Self {
        self.replies.insert(command.to_string(), reply);
        self
    }

    pub fn fail_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Handle to everything written to the port.
    pub fn written(&self) -> Rc<RefCell<Vec<u8>>> {
        Rc::clone(&self.written)
    }

    fn complete_line(&mut self) {
        let line = String::from_utf8_lossy(&self.line)
            .trim_end_matches(['\r', '\n'])
            .to_string();
        self.line.clear();
        // Unknown commands get no answer, which reads as a timeout.
        match self.replies.get(&line) {
            Some(Reply::Line(text)) => {
                self.pending.extend(text.as_bytes());
                self.pending.extend(b"\r\n");
            }
            Some(Reply::Bytes(bytes)) => self.pending.extend(bytes),
            Some(Reply::Eof) => self.eof = true,
            None => {}
        }
    }
}

impl Write for MockPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "device unplugged"));
        }
        self.written.borrow_mut().extend_from_slice(buf);
        for &byte in buf {
            self.line.push(byte);
            if byte == b'\n' {
                self.complete_line();
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for MockPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pending.is_empty() {
            if self.eof {
                return Ok(0);
            }
            return Err(io::Error::new(io::ErrorKind::TimedOut, "Operation timed out"));
        }
        let n = buf.len().min(self.pending.len());
        for (slot, byte) in buf.iter_mut().zip(self.pending.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}
