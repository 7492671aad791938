//! Colored terminal output for pipeline runs.
//!
//! Progress goes to stdout and is silenced by `--quiet`; errors always go to stderr.

use std::io::Write;
use termcolor::{Buffer, BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

/// Output manager for consistent colored terminal output
#[derive(Debug)]
pub struct OutputManager {
    bufwtr: BufferWriter,
    verbose: bool,
    quiet: bool,
}

impl Clone for OutputManager {
    fn clone(&self) -> Self {
        Self::new(self.verbose, self.quiet)
    }
}

impl Default for OutputManager {
    fn default() -> Self {
        Self::new(false, false)
    }
}

impl OutputManager {
    /// Create a new output manager
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            bufwtr: BufferWriter::stdout(ColorChoice::Auto),
            verbose,
            quiet,
        }
    }

    /// Output manager that prints nothing but errors
    pub fn silent() -> Self {
        Self::new(false, true)
    }

    fn marked(
        &self,
        marker: &str,
        marker_spec: ColorSpec,
        text_spec: Option<ColorSpec>,
        message: &str,
    ) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut buffer = self.bufwtr.buffer();
        write_marked(&mut buffer, marker, &marker_spec, text_spec.as_ref(), message)?;
        self.bufwtr.print(&buffer)
    }

    /// Print an info message
    pub fn info(&self, message: &str) -> std::io::Result<()> {
        self.marked("ℹ", spec(Color::Cyan, false), None, message)
    }

    /// Print a success message
    pub fn success(&self, message: &str) -> std::io::Result<()> {
        self.marked("✓", spec(Color::Green, true), None, message)
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) -> std::io::Result<()> {
        self.marked(
            "⚠",
            spec(Color::Yellow, true),
            Some(spec(Color::Yellow, false)),
            message,
        )
    }

    /// Print a progress message
    pub fn progress(&self, message: &str) -> std::io::Result<()> {
        self.marked("⋯", spec(Color::Magenta, false), None, message)
    }

    /// Print a message only in verbose mode
    pub fn verbose(&self, message: &str) -> std::io::Result<()> {
        if !self.verbose {
            return Ok(());
        }
        self.marked("→", spec(Color::Blue, false), None, message)
    }

    /// Print an error message to stderr (never silenced)
    pub fn error(&self, message: &str) {
        let bufwtr = BufferWriter::stderr(ColorChoice::Auto);
        let mut buffer = bufwtr.buffer();
        let printed = write_marked(
            &mut buffer,
            "✗",
            &spec(Color::Red, true),
            Some(&spec(Color::Red, false)),
            message,
        )
        .and_then(|()| bufwtr.print(&buffer));

        if printed.is_err() {
            eprintln!("✗ {message}");
        }
    }

    /// Print a section header
    pub fn section(&self, title: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut buffer = self.bufwtr.buffer();
        writeln!(&mut buffer)?;
        buffer.set_color(&spec(Color::Cyan, true))?;
        writeln!(&mut buffer, "═══ {title} ═══")?;
        buffer.reset()?;
        self.bufwtr.print(&buffer)
    }

    /// Print indented text for sub-items
    pub fn indent(&self, message: &str) -> std::io::Result<()> {
        self.println(&format!("    {message}"))
    }

    /// Print a plain line (respects quiet mode)
    pub fn println(&self, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut buffer = self.bufwtr.buffer();
        writeln!(&mut buffer, "{message}")?;
        self.bufwtr.print(&buffer)
    }

    /// Print a machine-readable line, even in quiet mode
    pub fn data(&self, message: &str) -> std::io::Result<()> {
        let mut buffer = self.bufwtr.buffer();
        writeln!(&mut buffer, "{message}")?;
        self.bufwtr.print(&buffer)
    }

    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }
}

fn spec(color: Color, bold: bool) -> ColorSpec {
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(color)).set_bold(bold);
    spec
}

fn write_marked(
    buffer: &mut Buffer,
    marker: &str,
    marker_spec: &ColorSpec,
    text_spec: Option<&ColorSpec>,
    message: &str,
) -> std::io::Result<()> {
    buffer.set_color(marker_spec)?;
    write!(buffer, "{marker}")?;
    buffer.reset()?;
    if let Some(spec) = text_spec {
        buffer.set_color(spec)?;
    }
    writeln!(buffer, " {message}")?;
    buffer.reset()
}
