//! Indented line writer for TypeScript output.

/// Builds TypeScript source line by line (2 spaces per level).
#[derive(Debug, Default)]
pub(crate) struct CodeWriter {
    output: String,
    indent: usize,
}

impl CodeWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn finish(self) -> String {
        self.output
    }

    /// Write a line at the current indentation.
    pub(crate) fn line(&mut self, text: &str) {
        if text.is_empty() {
            self.output.push('\n');
            return;
        }
        for _ in 0..self.indent {
            self.output.push_str("  ");
        }
        self.output.push_str(text);
        self.output.push('\n');
    }

    /// Write pre-formatted text, re-indenting each of its lines.
    pub(crate) fn lines(&mut self, text: &str) {
        for line in text.lines() {
            self.line(line);
        }
    }

    pub(crate) fn blank(&mut self) {
        if !self.output.is_empty() && !self.output.ends_with("\n\n") {
            self.output.push('\n');
        }
    }

    /// Write `header` and indent the following lines.
    pub(crate) fn open(&mut self, header: &str) {
        self.line(header);
        self.indent += 1;
    }

    /// Dedent, write `middle` and indent again (`} else {`).
    pub(crate) fn reopen(&mut self, middle: &str) {
        self.indent = self.indent.saturating_sub(1);
        self.open(middle);
    }

    /// Dedent and write `footer`.
    pub(crate) fn close(&mut self, footer: &str) {
        self.indent = self.indent.saturating_sub(1);
        self.line(footer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_nested_blocks() {
        let mut w = CodeWriter::new();
        w.open("if (a) {");
        w.open("while (b) {");
        w.line("c();");
        w.close("}");
        w.reopen("} else {");
        w.line("d();");
        w.close("}");
        assert_eq!(
            w.finish(),
            "if (a) {\n  while (b) {\n    c();\n  }\n} else {\n  d();\n}\n"
        );
    }

    #[test]
    fn test_blank_lines_collapse() {
        let mut w = CodeWriter::new();
        w.blank();
        w.line("a;");
        w.blank();
        w.blank();
        w.line("b;");
        assert_eq!(w.finish(), "a;\n\nb;\n");
    }
}
