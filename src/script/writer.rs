const BANNER_RULE: &str =
    "// ============================================================";
const INDENT: &str = "    ";

/// Line-oriented builder for script source.
#[derive(Debug, Default)]
pub struct ScriptWriter {
    lines: Vec<String>,
    depth: usize,
}

impl ScriptWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        let text = text.as_ref();
        if text.is_empty() {
            self.lines.push(String::new());
        } else {
            self.lines.push(format!("{}{}", INDENT.repeat(self.depth), text));
        }
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        if self.lines.last().is_some_and(|l| !l.is_empty()) {
            self.lines.push(String::new());
        }
        self
    }

    /// A single-line comment. Line breaks inside `text` are flattened.
    pub fn comment(&mut self, text: &str) -> &mut Self {
        let flat = text.replace(['\r', '\n'], " ");
        self.line(format!("// {}", flat))
    }

    /// A section banner: a rule, the upper-cased title, and another rule.
    pub fn banner(&mut self, title: &str) -> &mut Self {
        self.blank();
        self.line(BANNER_RULE);
        self.line(format!("// {}", title.to_uppercase()));
        self.line(BANNER_RULE);
        self
    }

    /// `if <condition>` followed by an indented body.
    pub fn if_block(&mut self, condition: &str, body: impl FnOnce(&mut Self)) -> &mut Self {
        self.line(format!("if {}", condition));
        self.depth += 1;
        body(self);
        self.depth -= 1;
        self
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn finish(mut self) -> String {
        while self.lines.last().is_some_and(|l| l.is_empty()) {
            self.lines.pop();
        }
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}
