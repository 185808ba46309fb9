//! Diagnostics sink shared by every compiler pass.
//!
//! The passes never abort on the first problem. Each one pushes what it
//! finds into a [`Diagnostics`] value and continues from the next
//! synchronization point, so a single compile reports as many errors as
//! it can. Code is only emitted when the sink stays empty.
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Lexical,
    Syntax,
    Semantic,
    Type,
    NameResolution,
}

impl fmt::Display for DiagnosticKind {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Lexical        => write!(f, "Lexical"),
            Self::Syntax         => write!(f, "Syntax"),
            Self::Semantic       => write!(f, "Semantic"),
            Self::Type           => write!(f, "Type"),
            Self::NameResolution => write!(f, "Name Resolution"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// 1-based source line the error is anchored to.
    pub line: u32,
    pub message: String,
}

impl Diagnostic {
    /// Render in the format the editor consumes:
    ///
    /// ```text
    /// In Line <N>: <original source line>
    /// <Kind> Error: <message>
    /// ```
    pub fn render(&self, source: &str) -> String {
        let source_line = source
            .lines()
            .nth(self.line.saturating_sub(1) as usize)
            .unwrap_or("");
        format!(
            "In Line {}: {}\n{} Error: {}",
            self.line, source_line, self.kind, self.message
        )
    }
}

#[derive(Debug, Default)]
pub struct Diagnostics {
    list: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, kind: DiagnosticKind, line: u32, message: impl ToString) {
        self.list.push(Diagnostic {
            kind,
            line,
            message: message.to_string(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.list.iter()
    }

    /// Render every diagnostic in source order.
    pub fn render(&self, source: &str) -> Vec<String> {
        let mut sorted: Vec<&Diagnostic> = self.list.iter().collect();
        // Stable, so diagnostics on the same line keep insertion order.
        sorted.sort_by_key(|diagnostic| diagnostic.line);
        sorted
            .into_iter()
            .map(|diagnostic| diagnostic.render(source))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_render_format() {
        let source = "let x:int = 1;\nlet x:int = 2;\n";
        let mut diag = Diagnostics::new();
        diag.report(
            DiagnosticKind::NameResolution,
            2,
            "'x' is already declared in this scope",
        );

        let rendered = diag.render(source);
        assert_eq!(rendered.len(), 1);
        assert_eq!(
            rendered[0],
            "In Line 2: let x:int = 2;\nName Resolution Error: 'x' is already declared in this scope"
        );
    }

    #[test]
    fn test_render_source_order() {
        let source = "a\nb\nc\n";
        let mut diag = Diagnostics::new();
        diag.report(DiagnosticKind::Type, 3, "later");
        diag.report(DiagnosticKind::Syntax, 1, "earlier");

        let rendered = diag.render(source);
        assert!(rendered[0].starts_with("In Line 1:"));
        assert!(rendered[1].starts_with("In Line 3:"));
    }
}
