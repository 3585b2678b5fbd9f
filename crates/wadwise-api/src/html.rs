//! Hyperscript-style HTML builder
//!
//! `element("button", "btn btn-sm [type=button]")` gives an immutable
//! [`ElementBuilder`]; refining it (`.add_class`, `.with`, `.attr`, `.flag`)
//! returns a new builder, so a base builder can be shared and specialised.
//! Selector tokens are whitespace separated:
//!
//! - `name` or `.name`: a class
//! - `#id`: the id attribute
//! - `[attr=value]`: an attribute
//! - `[flag]`: a boolean attribute
//! - `!`: drop the classes inherited so far
//!
//! Tokens like `[&>*]:flex-auto` that do not end in `]` are classes.

use std::cell::RefCell;
use std::collections::HashMap;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

pub const NBSP: &str = "\u{a0}";

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrValue {
    Value(String),
    Flag,
}

/// Rendered tree node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    /// Pre-rendered markup, emitted as is
    Raw(String),
    Fragment(Vec<Node>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    classes: Vec<String>,
    attrs: Vec<(String, AttrValue)>,
    children: Vec<Node>,
}

impl Node {
    pub fn text(text: impl Into<String>) -> Node {
        Node::Text(text.into())
    }

    pub fn raw(markup: impl Into<String>) -> Node {
        Node::Raw(markup.into())
    }

    pub fn empty() -> Node {
        Node::Fragment(Vec::new())
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(&escape_text(text)),
            Node::Raw(markup) => out.push_str(markup),
            Node::Fragment(nodes) => nodes.iter().for_each(|n| n.render_into(out)),
            Node::Element(el) => el.render_into(out),
        }
    }
}

impl Element {
    fn render_into(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        if !self.classes.is_empty() {
            out.push_str(" class=\"");
            out.push_str(&escape_attr(&self.classes.join(" ")));
            out.push('"');
        }
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            if let AttrValue::Value(v) = value {
                out.push_str("=\"");
                out.push_str(&escape_attr(v));
                out.push('"');
            }
        }
        out.push('>');
        if VOID_ELEMENTS.contains(&self.tag.as_str()) {
            return;
        }
        for child in &self.children {
            child.render_into(out);
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}

impl From<Vec<Node>> for Node {
    fn from(nodes: Vec<Node>) -> Self {
        Node::Fragment(nodes)
    }
}

impl From<Option<Node>> for Node {
    fn from(node: Option<Node>) -> Self {
        node.unwrap_or_else(Node::empty)
    }
}

/// Immutable element template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementBuilder {
    tag: String,
    classes: Vec<String>,
    attrs: Vec<(String, AttrValue)>,
}

/// Builder for `tag` refined by `selector`
pub fn element(tag: &str, selector: &str) -> ElementBuilder {
    ElementBuilder {
        tag: tag.to_string(),
        classes: Vec::new(),
        attrs: Vec::new(),
    }
    .add_class(selector)
}

impl ElementBuilder {
    /// Refine with more selector tokens
    pub fn add_class(&self, selector: &str) -> ElementBuilder {
        let mut next = self.clone();
        for token in selector.split_whitespace() {
            if token == "!" {
                next.classes.clear();
            } else if let Some(id) = token.strip_prefix('#') {
                next.set_attr("id", AttrValue::Value(id.to_string()));
            } else if token.starts_with('[') && token.ends_with(']') && token.len() > 2 {
                let inner = &token[1..token.len() - 1];
                match inner.split_once('=') {
                    Some((name, value)) => next.set_attr(name, AttrValue::Value(value.to_string())),
                    None => next.set_attr(inner, AttrValue::Flag),
                }
            } else {
                let class = token.strip_prefix('.').unwrap_or(token);
                if !class.is_empty() && !next.classes.iter().any(|c| c == class) {
                    next.classes.push(class.to_string());
                }
            }
        }
        next
    }

    /// Add the selector tokens only when `cond` holds
    pub fn class_if(&self, selector: &str, cond: bool) -> ElementBuilder {
        if cond {
            self.add_class(selector)
        } else {
            self.clone()
        }
    }

    /// Merge attributes; a `class` entry adds classes
    pub fn with(&self, attrs: &[(&str, &str)]) -> ElementBuilder {
        let mut next = self.clone();
        for (name, value) in attrs {
            if *name == "class" {
                next = next.add_class(value);
            } else {
                next.set_attr(name, AttrValue::Value(value.to_string()));
            }
        }
        next
    }

    pub fn attr(&self, name: &str, value: impl Into<String>) -> ElementBuilder {
        let mut next = self.clone();
        next.set_attr(name, AttrValue::Value(value.into()));
        next
    }

    /// Boolean attribute, present only when `on`
    pub fn flag(&self, name: &str, on: bool) -> ElementBuilder {
        let mut next = self.clone();
        if on {
            next.set_attr(name, AttrValue::Flag);
        } else {
            next.attrs.retain(|(n, _)| n != name);
        }
        next
    }

    fn set_attr(&mut self, name: &str, value: AttrValue) {
        match self.attrs.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn build(&self, children: impl IntoIterator<Item = Node>) -> Node {
        Node::Element(Element {
            tag: self.tag.clone(),
            classes: self.classes.clone(),
            attrs: self.attrs.clone(),
            children: children.into_iter().collect(),
        })
    }

    pub fn text(&self, text: impl Into<String>) -> Node {
        self.build([Node::text(text)])
    }

    pub fn empty(&self) -> Node {
        self.build([])
    }
}

/// Builders cached per `tag` and selector
#[derive(Default)]
pub struct Tags {
    cache: RefCell<HashMap<(String, String), ElementBuilder>>,
}

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, tag: &str, selector: &str) -> ElementBuilder {
        let key = (tag.to_string(), selector.to_string());
        if let Some(builder) = self.cache.borrow().get(&key) {
            return builder.clone();
        }
        let builder = element(tag, selector);
        self.cache.borrow_mut().insert(key, builder.clone());
        builder
    }

    pub fn len(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

thread_local! {
    static TAGS: Tags = Tags::new();
}

/// Cached builder from the per-thread tag table
pub fn tag(tag: &str, selector: &str) -> ElementBuilder {
    TAGS.with(|tags| tags.get(tag, selector))
}

pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_parsing() {
        let node = element("button", "btn #save [type=submit] [disabled]").text("Save");
        assert_eq!(
            node.render(),
            r#"<button class="btn" id="save" type="submit" disabled>Save</button>"#
        );
    }

    #[test]
    fn test_refinement_keeps_base_untouched() {
        let base = element("button", "btn");
        let primary = base.add_class("btn-primary");
        assert_eq!(base.empty().render(), r#"<button class="btn"></button>"#);
        assert_eq!(primary.empty().render(), r#"<button class="btn btn-primary"></button>"#);
        assert_eq!(primary.add_class("! flex").empty().render(), r#"<button class="flex"></button>"#);
    }

    #[test]
    fn test_bracketed_class_token() {
        let node = element("div", "flex [&>*]:flex-auto").empty();
        assert_eq!(node.render(), r#"<div class="flex [&amp;&gt;*]:flex-auto"></div>"#);
    }

    #[test]
    fn test_with_and_flag() {
        let input = element("input", "[type=text]")
            .with(&[("name", "desc"), ("class", "w-full"), ("value", "a \"b\" <c>")])
            .flag("readonly", true)
            .flag("disabled", false);
        assert_eq!(
            input.empty().render(),
            r#"<input class="w-full" type="text" name="desc" value="a &quot;b&quot; &lt;c&gt;" readonly>"#
        );
    }

    #[test]
    fn test_text_is_escaped_and_raw_is_not() {
        let node = element("p", "").build([Node::text("1 < 2 & 3"), Node::raw("<br>")]);
        assert_eq!(node.render(), "<p>1 &lt; 2 &amp; 3<br></p>");
    }

    #[test]
    fn test_fragments_and_options() {
        let maybe: Option<Node> = None;
        let node = element("div", "").build([maybe.into(), vec![Node::text("a"), Node::text("b")].into()]);
        assert_eq!(node.render(), "<div>ab</div>");
    }

    #[test]
    fn test_tags_cache() {
        let tags = Tags::new();
        let a = tags.get("div", "card");
        let b = tags.get("div", "card");
        assert_eq!(a, b);
        assert_eq!(tags.len(), 1);
        tags.get("div", "card p-2");
        assert_eq!(tags.len(), 2);
    }
}
