//! Shared widgets built on the element builder

use wadwise_core::SelectorOptions;
use wadwise_utils::urlqs;

use crate::html::{tag, ElementBuilder, Node};
use crate::islands::IslandSpec;

pub const DIALOG_ID: &str = "selector-dialog";

/// Button family: plain, primary, secondary and danger
pub struct ButtonSet {
    pub plain: ElementBuilder,
    pub primary: ElementBuilder,
    pub secondary: ElementBuilder,
    pub danger: ElementBuilder,
}

impl ButtonSet {
    fn new(base: ElementBuilder) -> Self {
        Self {
            primary: base.add_class("btn-primary"),
            secondary: base.add_class("btn-secondary"),
            danger: base.add_class("btn-error"),
            plain: base,
        }
    }
}

pub fn button() -> ButtonSet {
    ButtonSet::new(tag("button", "btn [type=button]"))
}

pub fn submit() -> ButtonSet {
    ButtonSet::new(tag("button", "btn [type=submit]"))
}

pub fn div(selector: &str) -> ElementBuilder {
    tag("div", selector)
}

pub fn span(selector: &str) -> ElementBuilder {
    tag("span", selector)
}

pub fn card(selector: &str) -> ElementBuilder {
    tag("div", "card card-body bg-base-100 shadow-sm").add_class(selector)
}

pub fn vcard(selector: &str) -> ElementBuilder {
    card("flex flex-col").add_class(selector)
}

pub fn vstack(selector: &str) -> ElementBuilder {
    tag("div", "flex flex-col").add_class(selector)
}

pub fn header(text: &str) -> Node {
    tag("h2", "text-lg font-medium mb-1").text(text)
}

pub fn text_input(name: &str, value: &str) -> ElementBuilder {
    tag("input", "input [type=text]").with(&[("name", name), ("value", value)])
}

pub fn number_input(name: &str, value: &str) -> ElementBuilder {
    tag("input", "input [type=text] [inputmode=decimal]").with(&[("name", name), ("value", value)])
}

pub fn date_input(name: &str, value: &str) -> ElementBuilder {
    tag("input", "input [type=date]").with(&[("name", name), ("value", value)])
}

pub fn hidden(name: &str, value: &str) -> Node {
    tag("input", "[type=hidden]").with(&[("name", name), ("value", value)]).empty()
}

pub fn textarea(name: &str, value: &str) -> Node {
    tag("textarea", "textarea w-full").attr("name", name).text(value)
}

/// `<select>` over `(value, title)` options
pub fn select(name: &str, options: &[(String, String)], selected: &str) -> Node {
    tag("select", "select w-full")
        .attr("name", name)
        .build(select_options(options, selected))
}

pub fn select_options(options: &[(String, String)], selected: &str) -> Vec<Node> {
    options
        .iter()
        .map(|(value, title)| {
            tag("option", "")
                .attr("value", value.as_str())
                .flag("selected", value == selected)
                .text(title.as_str())
        })
        .collect()
}

/// Floating label around a control
pub fn labeled(label: &str, control: Node) -> Node {
    tag("label", "floating-label").build([control, span("").text(label)])
}

/// HTMX attributes that post the enclosing island form back on click
pub fn island_control(builder: ElementBuilder, island: &IslandSpec, action: &str) -> ElementBuilder {
    builder.with(&[
        ("hx-post", island.post),
        ("hx-include", "closest form"),
        ("hx-target", "closest form"),
        ("hx-swap", "outerHTML"),
        ("name", "action"),
        ("value", action),
    ])
}

/// Island `<form>` re-rendered whenever a field changes
pub fn island_form(island: &IslandSpec, method_action: Option<&str>) -> ElementBuilder {
    let form = tag("form", "").with(&[
        ("id", island.target),
        ("hx-post", island.post),
        ("hx-trigger", "change"),
        ("hx-target", "this"),
        ("hx-swap", "outerHTML"),
    ]);
    match method_action {
        Some(action) => form.with(&[("method", "POST"), ("action", action)]),
        None => form,
    }
}

/// Form that re-posts `fields` to `action` as soon as the page loads
pub fn relay_form(action: &str, fields: &[(&'static str, String)]) -> Node {
    let mut children = fields
        .iter()
        .map(|(name, value)| hidden(name, value))
        .collect::<Vec<_>>();
    children.push(tag("noscript", "").build([submit().primary.text("Continue")]));
    Node::Fragment(vec![
        tag("form", "#relay [method=POST]").attr("action", action).build(children),
        tag("script", "").build([Node::raw(r#"document.getElementById("relay").submit();"#)]),
    ])
}

/// Empties the selector dialog from any island response
pub fn clear_dialog() -> Node {
    div("").with(&[("id", DIALOG_ID), ("hx-swap-oob", "true")]).empty()
}

/// URL opening the account selector dialog for a field
pub fn selector_url(island: &IslandSpec, field: &str, value: &str, options: SelectorOptions) -> String {
    urlqs(
        "/accounts/select",
        &[
            ("island", island.name),
            ("field", field),
            ("value", value),
            ("place", if options.select_placeholder { "1" } else { "" }),
            ("special", if options.exclude_special { "1" } else { "" }),
        ],
    )
}

/// Read-only account field: shows the title, carries the id, opens the
/// selector dialog on click
pub fn account_field(
    island: &IslandSpec,
    field: &str,
    value: &str,
    title: &str,
    options: SelectorOptions,
    selector: &str,
) -> Node {
    let url = selector_url(island, field, value, options);
    let dialog = format!("#{}", DIALOG_ID);
    let display = tag("input", "input [type=text] [readonly] cursor-pointer")
        .add_class(selector)
        .with(&[
            ("value", title),
            ("hx-get", url.as_str()),
            ("hx-trigger", "click"),
            ("hx-target", dialog.as_str()),
            ("hx-swap", "outerHTML"),
        ])
        .empty();
    Node::Fragment(vec![display, hidden(field, value)])
}
