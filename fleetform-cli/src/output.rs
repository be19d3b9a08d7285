//! Output formatting abstraction for text vs JSON rendering
//!
//! All subcommand output flows through [`OutputWriter`] which handles format switching.
//! Log lines go to stderr, so stdout carries only the rendered payload.

use std::io::Write;

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Abstraction for writing CLI output in different formats.
///
/// Subcommand handlers call `writer.render(&payload)` where `payload`
/// implements both `Serialize` (for JSON) and `Render` (for text).
pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    /// Create a new output writer with the specified format.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render a payload to stdout.
    pub fn render<T: Render + Serialize>(&self, payload: &T) -> Result<(), CliError> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.render_to(&mut handle, payload)
    }

    /// Render a payload to an arbitrary writer.
    ///
    /// For `Text` format, delegates to `Render::render_text()`.
    /// For `Json` format, serialises via `serde_json`.
    pub fn render_to<T: Render + Serialize>(
        &self,
        w: &mut dyn Write,
        payload: &T,
    ) -> Result<(), CliError> {
        match self.format {
            OutputFormat::Text => {
                payload.render_text(w)?;
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *w, payload)?;
                writeln!(w)?;
            }
        }
        Ok(())
    }
}

/// Trait for human-readable text rendering.
///
/// Implemented by every CLI output payload alongside `serde::Serialize`.
pub trait Render {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct TestPayload {
        field1: String,
        field2: u32,
    }

    impl Render for TestPayload {
        fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
            writeln!(w, "Field1: {}", self.field1)?;
            writeln!(w, "Field2: {}", self.field2)?;
            Ok(())
        }
    }

    fn payload() -> TestPayload {
        TestPayload {
            field1: "test value".to_owned(),
            field2: 42,
        }
    }

    #[test]
    fn test_output_writer_text_format() {
        let writer = OutputWriter::new(OutputFormat::Text);
        let mut buffer = Vec::new();
        writer
            .render_to(&mut buffer, &payload())
            .expect("text rendering should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(
            output.contains("Field1: test value"),
            "should render field1"
        );
        assert!(output.contains("Field2: 42"), "should render field2");
    }

    #[test]
    fn test_output_writer_json_format() {
        let writer = OutputWriter::new(OutputFormat::Json);
        let mut buffer = Vec::new();
        writer
            .render_to(&mut buffer, &payload())
            .expect("json rendering should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.ends_with('\n'), "json output should end with newline");
        assert!(output.contains("  "), "json output should be pretty-printed");

        let parsed: serde_json::Value =
            serde_json::from_str(&output).expect("should parse back to JSON");
        assert_eq!(parsed["field1"].as_str(), Some("test value"));
        assert_eq!(parsed["field2"].as_u64(), Some(42));
    }

    #[test]
    fn test_json_output_does_not_call_render_text() {
        #[derive(Serialize)]
        struct Failing;

        impl Render for Failing {
            fn render_text(&self, _w: &mut dyn Write) -> std::io::Result<()> {
                Err(std::io::Error::other("text path taken"))
            }
        }

        let writer = OutputWriter::new(OutputFormat::Json);
        let mut buffer = Vec::new();
        writer
            .render_to(&mut buffer, &Failing)
            .expect("json path should not touch render_text");
        assert_eq!(String::from_utf8(buffer).expect("valid UTF-8").trim(), "null");
    }

    #[test]
    fn test_text_render_error_propagates_as_io() {
        #[derive(Serialize)]
        struct Failing;

        impl Render for Failing {
            fn render_text(&self, _w: &mut dyn Write) -> std::io::Result<()> {
                Err(std::io::Error::other("broken pipe"))
            }
        }

        let writer = OutputWriter::new(OutputFormat::Text);
        let mut buffer = Vec::new();
        let err = writer
            .render_to(&mut buffer, &Failing)
            .expect_err("render error should propagate");
        assert!(matches!(err, CliError::Io(_)));
    }
}
