use std::{collections::HashMap, io::Write};

use comrak::{adapters::SyntaxHighlighterAdapter, markdown_to_html_with_plugins, Options, Plugins};
use once_cell::sync::Lazy;
use rocket_dyn_templates::tera::{self, escape_html, Value};
use syntect::{
    easy::HighlightLines,
    highlighting::{Theme, ThemeSet},
    html::{styled_line_to_highlighted_html, IncludeBackground},
    parsing::SyntaxSet,
    util::LinesWithEndings,
};

const THEME_NAME: &str = "base16-ocean.dark";

static HIGHLIGHTER: Lazy<CodeHighlighter> = Lazy::new(CodeHighlighter::load_defaults);

/// Renders article markdown to HTML. Fenced code blocks that name a known
/// language are syntax highlighted; everything else renders as plain code.
pub fn render_markdown(markdown: &str) -> String {
    let mut plugins = Plugins::default();
    plugins.render.codefence_syntax_highlighter = Some(&*HIGHLIGHTER);

    markdown_to_html_with_plugins(markdown, &Options::default(), &plugins)
}

/// Code fence renderer keyed by the fence's language name.
pub struct CodeHighlighter {
    syntaxes: SyntaxSet,
    theme: Option<Theme>,
}

impl CodeHighlighter {
    pub fn load_defaults() -> Self {
        let mut themes = ThemeSet::load_defaults();
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            theme: themes.themes.remove(THEME_NAME),
        }
    }

    /// Whether `lang` selects the highlighted rendering path.
    pub fn highlights(&self, lang: Option<&str>) -> bool {
        self.theme.is_some()
            && lang
                .filter(|lang| !lang.is_empty())
                .and_then(|lang| self.syntaxes.find_syntax_by_token(lang))
                .is_some()
    }

    fn highlight(&self, lang: &str, code: &str) -> Option<String> {
        let syntax = self.syntaxes.find_syntax_by_token(lang)?;
        let theme = self.theme.as_ref()?;
        let mut highlighter = HighlightLines::new(syntax, theme);

        let mut html = String::with_capacity(code.len() * 2);
        for line in LinesWithEndings::from(code) {
            let regions = highlighter.highlight_line(line, &self.syntaxes).ok()?;
            html.push_str(&styled_line_to_highlighted_html(&regions[..], IncludeBackground::No).ok()?);
        }
        Some(html)
    }
}

fn write_tag(
    output: &mut dyn Write,
    tag: &str,
    attributes: HashMap<String, String>,
) -> std::io::Result<()> {
    let mut attributes = attributes.into_iter().collect::<Vec<_>>();
    attributes.sort();

    write!(output, "<{}", tag)?;
    for (name, value) in attributes {
        write!(output, " {}=\"{}\"", name, escape_html(&value))?;
    }
    write!(output, ">")
}

impl SyntaxHighlighterAdapter for CodeHighlighter {
    fn write_highlighted(
        &self,
        output: &mut dyn Write,
        lang: Option<&str>,
        code: &str,
    ) -> std::io::Result<()> {
        let highlighted = lang
            .filter(|lang| !lang.is_empty())
            .and_then(|lang| self.highlight(lang, code));

        match highlighted {
            Some(html) => output.write_all(html.as_bytes()),
            None => output.write_all(escape_html(code).as_bytes()),
        }
    }

    fn write_pre_tag(
        &self,
        output: &mut dyn Write,
        attributes: HashMap<String, String>,
    ) -> std::io::Result<()> {
        write_tag(output, "pre", attributes)
    }

    fn write_code_tag(
        &self,
        output: &mut dyn Write,
        attributes: HashMap<String, String>,
    ) -> std::io::Result<()> {
        write_tag(output, "code", attributes)
    }
}

pub struct MarkdownFilter;

impl tera::Filter for MarkdownFilter {
    fn filter(&self, markdown_source: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
        let markdown = markdown_source.as_str().ok_or_else(|| {
            tera::Error::msg("Value passed to markdown filter needs to be a string")
        })?;
        Ok(Value::String(render_markdown(markdown)))
    }

    fn is_safe(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{render_markdown, HIGHLIGHTER};

    #[test]
    fn language_fence_is_highlighted() {
        let html = render_markdown("Intro\n\n```python\ndef answer():\n    return 42\n```\n");

        assert!(html.contains(r#"<code class="language-python">"#));
        assert!(html.contains("<span style=\""));
        assert!(html.contains("answer"));
    }

    #[test]
    fn bare_fence_is_plain() {
        let html = render_markdown("```\nif a < b {}\n```\n");

        assert!(html.contains("<pre><code>if a &lt; b {}"));
        assert!(!html.contains("<span"));
    }

    #[test]
    fn unknown_language_is_plain() {
        let html = render_markdown("```nosuchlanguage\nx < y\n```\n");

        assert!(html.contains(r#"class="language-nosuchlanguage""#));
        assert!(html.contains("x &lt; y"));
        assert!(!html.contains("<span"));
    }

    #[test]
    fn inline_code_is_plain() {
        let html = render_markdown("Call `print(\"hi\")` to greet.");

        assert!(html.contains("<code>print(&quot;hi&quot;)</code>"));
        assert!(!html.contains("<span"));
    }

    #[test]
    fn raw_html_is_not_passed_through() {
        let html = render_markdown("<script>alert(1)</script>\n\nText");

        assert!(!html.contains("<script>"));
    }

    #[test]
    fn highlight_path_selection() {
        assert!(HIGHLIGHTER.highlights(Some("python")));
        assert!(HIGHLIGHTER.highlights(Some("rust")));
        assert!(!HIGHLIGHTER.highlights(Some("")));
        assert!(!HIGHLIGHTER.highlights(Some("nosuchlanguage")));
        assert!(!HIGHLIGHTER.highlights(None));
    }
}
