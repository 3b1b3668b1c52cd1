//! Converter backed by an external program.

use crate::import::ContentConverter;
use crate::resource::ResourceLocator;
use crate::{Error, Result};
use std::io::{Read, Write};
use std::process::{Command, Stdio};

/// Environment variable carrying the dispatch file name.
pub const FILE_NAME_ENV: &str = "CONTENT_FILE_NAME";

/// Environment variable carrying the full resource locator.
pub const LOCATOR_ENV: &str = "CONTENT_LOCATOR";

/// Converts `.content` resources by piping them through a program.
///
/// The program receives the resource on stdin and must write a complete XML
/// batch document to stdout. The resource is identified through
/// `CONTENT_FILE_NAME` and `CONTENT_LOCATOR`. A non-zero exit status fails the
/// conversion with the program's stderr as the cause.
#[derive(Debug, Clone)]
pub struct CommandConverter {
    program: String,
    args: Vec<String>,
}

impl CommandConverter {
    /// Creates a converter running `program` with `args`.
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Returns the program name.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl ContentConverter for CommandConverter {
    fn to_xml(
        &self,
        reader: &mut dyn Read,
        locator: &ResourceLocator,
        file_name: &str,
    ) -> Result<String> {
        let mut input = Vec::new();
        reader
            .read_to_end(&mut input)
            .map_err(|e| Error::operation("read_content", e))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env(FILE_NAME_ENV, file_name)
            .env(LOCATOR_ENV, locator.as_str())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::operation("spawn_converter", format!("{}: {e}", self.program)))?;

        // Feed stdin from a separate thread so a chatty converter cannot
        // deadlock on a full stdout pipe.
        let writer = child.stdin.take().map(|mut stdin| {
            std::thread::spawn(move || {
                // A converter may exit without draining stdin.
                let _ = stdin.write_all(&input);
            })
        });

        let output = child
            .wait_with_output()
            .map_err(|e| Error::operation("run_converter", e))?;
        if let Some(writer) = writer {
            let _ = writer.join();
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::debug!(
                program = %self.program,
                status = %output.status,
                file_name,
                "Converter exited unsuccessfully"
            );
            return Err(Error::operation(
                "run_converter",
                format!("{} exited with {}: {}", self.program, output.status, stderr.trim()),
            ));
        }

        String::from_utf8(output.stdout).map_err(|e| Error::operation("decode_converter_output", e))
    }
}
