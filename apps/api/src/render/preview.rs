//! Preview output: a serializable element tree the editor UI renders live, with an
//! HTML serialization for clients that just want markup.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::render::parity::RenderDecisions;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PreviewNode {
    Element {
        tag: &'static str,
        #[serde(skip_serializing_if = "BTreeMap::is_empty")]
        attrs: BTreeMap<&'static str, String>,
        children: Vec<PreviewNode>,
    },
    Text {
        text: String,
    },
    Image {
        src: String,
        alt: String,
        class: &'static str,
    },
}

impl PreviewNode {
    pub fn el(tag: &'static str, class: &str, children: Vec<PreviewNode>) -> Self {
        let mut attrs = BTreeMap::new();
        if !class.is_empty() {
            attrs.insert("class", class.to_string());
        }
        PreviewNode::Element {
            tag,
            attrs,
            children,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        PreviewNode::Text { text: text.into() }
    }

    /// `<tag class=..>text</tag>`; empty text yields no node.
    pub fn text_el(tag: &'static str, class: &str, text: &str) -> Option<Self> {
        (!text.is_empty()).then(|| PreviewNode::el(tag, class, vec![PreviewNode::text(text)]))
    }

    pub fn image(src: &str, alt: &str, class: &'static str) -> Self {
        PreviewNode::Image {
            src: src.to_string(),
            alt: alt.to_string(),
            class,
        }
    }

    pub fn with_attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        if let PreviewNode::Element { attrs, .. } = &mut self {
            attrs.insert(name, value.into());
        }
        self
    }

    /// Concatenated text content, depth-first.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            PreviewNode::Text { text } => {
                if !out.is_empty() && !out.ends_with(' ') {
                    out.push(' ');
                }
                out.push_str(text);
            }
            PreviewNode::Element { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
            PreviewNode::Image { .. } => {}
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            PreviewNode::Text { text } => out.push_str(&escape(text)),
            PreviewNode::Image { src, alt, class } => {
                out.push_str(&format!(
                    "<img class=\"{}\" src=\"{}\" alt=\"{}\">",
                    escape(class),
                    escape(src),
                    escape(alt)
                ));
            }
            PreviewNode::Element {
                tag,
                attrs,
                children,
            } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push_str(&format!(" {name}=\"{}\"", escape(value)));
                }
                out.push('>');
                for child in children {
                    child.write_html(out);
                }
                out.push_str(&format!("</{tag}>"));
            }
        }
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// A rendered preview plus the decisions that produced it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewTree {
    pub decisions: RenderDecisions,
    pub root: PreviewNode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escapes_text_and_attributes() {
        let node = PreviewNode::el(
            "p",
            "note",
            vec![PreviewNode::text("R&D <lead>")],
        )
        .with_attr("title", "\"quoted\"");
        assert_eq!(
            node.to_html(),
            "<p class=\"note\" title=\"&quot;quoted&quot;\">R&amp;D &lt;lead&gt;</p>"
        );
    }

    #[test]
    fn test_text_el_skips_empty() {
        assert!(PreviewNode::text_el("span", "", "").is_none());
        assert!(PreviewNode::text_el("span", "", "x").is_some());
    }

    #[test]
    fn test_text_content_joins_depth_first() {
        let node = PreviewNode::el(
            "div",
            "",
            vec![
                PreviewNode::el("h1", "", vec![PreviewNode::text("Ada")]),
                PreviewNode::image("blob:x", "photo", "avatar"),
                PreviewNode::text("Analyst"),
            ],
        );
        assert_eq!(node.text_content(), "Ada Analyst");
        assert!(node.to_html().contains("<img class=\"avatar\" src=\"blob:x\" alt=\"photo\">"));
    }
}
