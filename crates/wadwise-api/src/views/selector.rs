//! Account selector dialog
//!
//! The dialog is a fragment swapped into `#selector-dialog`. Folding a
//! group re-fetches the dialog with the disclosure state in `open`;
//! picking an account posts `select:<field>:<id>` to the owning island.

use log::debug;
use serde_json::json;
use wadwise_core::selector::{SearchRow, TreeRow};
use wadwise_core::{AccountTree, Selection, SelectorOptions, TreeView};
use wadwise_utils::urlqs;

use crate::components::{button, div, header, span, DIALOG_ID};
use crate::error::{ApiError, ApiResult};
use crate::fields::{select_action, FormFields};
use crate::html::{tag, ElementBuilder, Node};
use crate::islands::{island_spec, IslandSpec};

use super::ViewContext;

/// Parsed `GET /accounts/select` parameters
#[derive(Debug, Clone)]
pub struct SelectorRequest {
    pub island: &'static IslandSpec,
    pub field: String,
    pub value: String,
    pub query: String,
    pub toggle: Option<String>,
    /// Expanded groups carried across a round-trip; `None` on first open
    pub open: Option<Vec<String>>,
    pub options: SelectorOptions,
    pub close: bool,
}

impl SelectorRequest {
    pub fn from_params(params: &FormFields) -> ApiResult<Self> {
        let island_name = params.value("island");
        let island = island_spec(island_name)
            .ok_or_else(|| ApiError::bad_request(format!("unknown island '{}'", island_name)))?;
        let field = params
            .non_empty("field")
            .ok_or_else(|| ApiError::bad_request("missing field"))?;
        Ok(Self {
            island,
            field: field.to_string(),
            value: params.value("value").to_string(),
            query: params.value("q").trim().to_string(),
            toggle: params.non_empty("toggle").map(str::to_string),
            open: params.get("open").map(|open| {
                open.split(',')
                    .filter(|aid| !aid.is_empty())
                    .map(str::to_string)
                    .collect()
            }),
            options: SelectorOptions {
                select_placeholder: params.flag("place"),
                exclude_special: params.flag("special"),
            },
            close: params.flag("close"),
        })
    }

    fn url(&self, extra: &[(&str, &str)]) -> String {
        let mut params = vec![
            ("island", self.island.name),
            ("field", self.field.as_str()),
            ("value", self.value.as_str()),
            ("place", if self.options.select_placeholder { "1" } else { "" }),
            ("special", if self.options.exclude_special { "1" } else { "" }),
        ];
        params.extend_from_slice(extra);
        urlqs("/accounts/select", &params)
    }
}

/// Empty dialog container
pub fn closed() -> Node {
    div("").attr("id", DIALOG_ID).empty()
}

/// Disclosure tree for the request, with its toggle applied
pub fn browse(view: &ViewContext<'_>, request: &SelectorRequest) -> AccountTree {
    let mut tree = AccountTree::new(view.snapshot.accounts.clone(), &request.value, request.options);
    if let Some(open) = &request.open {
        tree.collapse_all();
        tree.expand_all(open.iter().map(String::as_str));
    }
    if let Some(aid) = &request.toggle {
        if let Some(selection) = tree.toggle(aid) {
            debug!("Toggle on leaf {} ignored, leaves select directly", selection.value());
        }
    }
    tree
}

pub fn dialog(view: &ViewContext<'_>, request: &SelectorRequest) -> Node {
    if request.close {
        return closed();
    }
    let tree = browse(view, request);
    let open = tree.expanded_ids().join(",");

    let body = match tree.view(&request.query) {
        TreeView::Tree(rows) => rows.iter().map(|row| tree_row(request, row, &open)).collect::<Vec<_>>(),
        TreeView::Search(rows) if rows.is_empty() => vec![span("opacity-60").text("No matching accounts")],
        TreeView::Search(rows) => rows.iter().map(|row| search_row(request, row)).collect(),
    };

    let target = format!("#{}", DIALOG_ID);
    let search_url = request.url(&[("open", open.as_str())]);
    let close_url = request.url(&[("close", "1")]);

    div("modal modal-open").attr("id", DIALOG_ID).build([div("modal-box flex flex-col gap-2").build([
        header("Select account"),
        tag("input", "input [type=search] w-full")
            .with(&[
                ("name", "q"),
                ("placeholder", "Search"),
                ("hx-trigger", "input changed delay:200ms"),
                ("hx-swap", "outerHTML"),
            ])
            .attr("value", request.query.as_str())
            .attr("hx-get", search_url)
            .attr("hx-target", target.as_str())
            .empty(),
        div("flex flex-col max-h-96 overflow-auto").build(body),
        div("modal-action").build([button()
            .plain
            .with(&[("hx-swap", "outerHTML")])
            .attr("hx-get", close_url)
            .attr("hx-target", target)
            .text("Close")]),
    ])])
}

/// Button posting a selection to the owning island
fn select_button(request: &SelectorRequest, selection: &Selection, base: &ElementBuilder) -> ElementBuilder {
    let target = format!("#{}", request.island.target);
    let vals = json!({ "action": select_action(&request.field, &selection.value()) }).to_string();
    base.with(&[("hx-post", request.island.post), ("hx-swap", "outerHTML")])
        .attr("hx-include", target.as_str())
        .attr("hx-target", target)
        .attr("hx-vals", vals)
}

fn joint_button(request: &SelectorRequest, aid: &str) -> Node {
    let base = tag("button", "btn btn-ghost btn-xs [type=button]");
    select_button(request, &Selection::Joint(aid.to_string()), &base).text("Joint")
}

fn tree_row(request: &SelectorRequest, row: &TreeRow, open: &str) -> Node {
    let name = tag("button", "btn btn-ghost btn-sm justify-start flex-1 [type=button]").class_if("font-bold", row.selected);
    let label = if row.has_children {
        let marker = if row.expanded { "▾" } else { "▸" };
        name.with(&[("hx-swap", "outerHTML")])
            .attr("hx-get", request.url(&[("open", open), ("toggle", row.aid.as_str())]))
            .attr("hx-target", format!("#{}", DIALOG_ID))
            .text(format!("{} {}", marker, row.name))
    } else {
        select_button(request, &Selection::Account(row.aid.clone()), &name).text(row.name.as_str())
    };

    let pick = row.can_select.then(|| {
        let base = tag("button", "btn btn-ghost btn-xs [type=button]");
        select_button(request, &Selection::Account(row.aid.clone()), &base).text("Select")
    });
    let joint = row.joint.then(|| joint_button(request, &row.aid));

    div("flex items-center")
        .attr("style", format!("padding-left: {}rem", row.depth))
        .build([label, pick.into(), joint.into()])
}

fn search_row(request: &SelectorRequest, row: &SearchRow) -> Node {
    let base = tag("button", "btn btn-ghost btn-sm justify-start flex-1 [type=button]").class_if("font-bold", row.selected);
    let joint = row.joint.then(|| joint_button(request, &row.aid));
    div("flex items-center").build([
        select_button(request, &Selection::Account(row.aid.clone()), &base).text(row.full_name.as_str()),
        joint.into(),
    ])
}
