//! Indent-aware string builder for Cadence code generation.
//!
//! Cadence uses 4-space indentation.

pub struct CodeWriter {
    buf: String,
    indent_level: usize,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self {
            buf: String::with_capacity(4096),
            indent_level: 0,
        }
    }

    /// Write a complete line (appends newline).
    pub fn line(&mut self, text: &str) {
        for _ in 0..self.indent_level {
            self.buf.push_str("    ");
        }
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    /// Write a `//` comment line.
    pub fn comment(&mut self, text: &str) {
        self.line(&format!("// {}", text));
    }

    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    /// Write `text {` and increase indent (e.g. `transaction {`).
    pub fn block_open(&mut self, text: &str) {
        self.line(&format!("{} {{", text));
        self.indent();
    }

    /// Decrease indent and write `}`.
    pub fn block_close(&mut self) {
        self.dedent();
        self.line("}");
    }

    pub fn finish(self) -> String {
        self.buf
    }
}

impl Default for CodeWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_line() {
        let mut w = CodeWriter::new();
        w.line("let x = 1");
        assert_eq!(w.finish(), "let x = 1\n");
    }

    #[test]
    fn nested_blocks() {
        let mut w = CodeWriter::new();
        w.block_open("transaction");
        w.block_open("prepare(signer: &Account)");
        w.comment("step");
        w.block_close();
        w.block_close();
        assert_eq!(
            w.finish(),
            "transaction {\n    prepare(signer: &Account) {\n        // step\n    }\n}\n"
        );
    }

    #[test]
    fn blank_line_has_no_indent() {
        let mut w = CodeWriter::new();
        w.indent();
        w.line("a()");
        w.blank();
        w.line("b()");
        assert_eq!(w.finish(), "    a()\n\n    b()\n");
    }

    #[test]
    fn dedent_saturates_at_zero() {
        let mut w = CodeWriter::new();
        w.dedent();
        w.line("x");
        assert_eq!(w.finish(), "x\n");
    }
}
