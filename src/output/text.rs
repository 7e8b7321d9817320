//! Plain text output, one path per line.
//!
//! ```text
//! # I/O errors in files:
//! # /data/locked.bin: Cannot open /data/locked.bin: Permission denied (os error 13)
//!
//! # 2 files, 1.0 KiB each
//! /data/a.txt
//! /data/b.txt
//!
//! ```
//!
//! Comment lines start with `#`, so the paths can be extracted with
//! `grep -v '^#'`. Every block, including the last, ends with a blank line.

use std::io::{self, Write};

use bytesize::ByteSize;

use crate::duplicates::FindResult;

/// Text renderer for a [`FindResult`].
#[derive(Debug)]
pub struct TextOutput<'a> {
    result: &'a FindResult,
}

impl<'a> TextOutput<'a> {
    /// Wrap a result for rendering.
    #[must_use]
    pub fn new(result: &'a FindResult) -> Self {
        Self { result }
    }

    /// Write the failures block (if any) and then every group.
    ///
    /// # Errors
    ///
    /// Returns any error from `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        if !self.result.failures.is_empty() {
            writeln!(writer, "# I/O errors in files:")?;
            for failure in &self.result.failures {
                writeln!(writer, "# {}: {}", failure.path.display(), failure.error)?;
            }
            writeln!(writer)?;
        }

        for group in &self.result.groups {
            writeln!(
                writer,
                "# {} files, {} each",
                group.len(),
                ByteSize::b(group.size)
            )?;
            for path in &group.files {
                writeln!(writer, "{}", path.display())?;
            }
            writeln!(writer)?;
        }

        Ok(())
    }

    /// Render to a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut buf = Vec::new();
        // Writing to a Vec cannot fail.
        let _ = self.write_to(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}
