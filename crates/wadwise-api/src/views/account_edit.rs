//! Account edit form and the delete confirmation step

use serde_json::json;
use wadwise_core::account_edit::HIDDEN_OPTIONS;
use wadwise_core::{AccountEditForm, AccountType, CoreError, DeleteConfirmation, DeleteRequest};
use wadwise_utils::urlqs;

use crate::components::{button, card, div, header, hidden, labeled, select, span, submit, text_input, textarea};
use crate::error::{ApiError, ApiResult};
use crate::fields::FormFields;
use crate::html::{tag, Node};
use crate::islands::IslandContext;

use super::ViewContext;

pub const DELETE_TARGET: &str = "account-delete";

/// Form for `aid`, or a new account under `parent`
pub fn form_for(view: &ViewContext<'_>, params: &FormFields) -> ApiResult<AccountEditForm> {
    match params.non_empty("aid") {
        Some(aid) => view
            .snapshot
            .data
            .accounts
            .iter()
            .find(|record| record.aid == aid)
            .map(AccountEditForm::from_record)
            .ok_or_else(|| ApiError::from(CoreError::AccountNotFound { id: aid.to_string() })),
        None => Ok(AccountEditForm::new_child(view.accounts(), params.non_empty("parent"))),
    }
}

pub fn mount(ctx: &IslandContext<'_>) -> ApiResult<Node> {
    let view = ViewContext::from(ctx);
    let form = form_for(&view, ctx.params)?;
    Ok(render(&view, &form))
}

/// Backend URL receiving the confirmed delete
pub fn delete_url(view: &ViewContext<'_>, request: &DeleteRequest) -> String {
    view.backend(&urlqs("/account/delete", &[("aid", request.aid.as_str())]))
}

pub fn render(view: &ViewContext<'_>, form: &AccountEditForm) -> Node {
    let action_url = view.backend(&urlqs("/account/edit", &[("aid", form.aid.as_deref().unwrap_or(""))]));
    let type_options = AccountType::ALL
        .iter()
        .map(|t| (t.code().to_string(), t.label().to_string()))
        .collect::<Vec<_>>();
    let hidden_options = HIDDEN_OPTIONS
        .iter()
        .map(|(value, title)| (value.to_string(), title.to_string()))
        .collect::<Vec<_>>();
    let title = if form.is_new() { "New account".to_string() } else { view.title(form.aid.as_deref().unwrap_or("")) };

    let delete = form.aid.as_ref().map(|aid| {
        let vals = json!({ "aid": aid }).to_string();
        button()
            .danger
            .with(&[("hx-post", "/account/edit/delete"), ("hx-swap", "innerHTML")])
            .attr("hx-target", format!("#{}", DELETE_TARGET))
            .attr("hx-vals", vals)
            .text("Delete")
    });

    card("flex flex-col gap-2").build([
        header(&title),
        tag("form", "flex flex-col gap-2 [method=POST]")
            .attr("action", action_url)
            .build([
                labeled("Name", text_input("name", &form.name).add_class("w-full").flag("required", true).empty()),
                labeled("Type", select("type", &type_options, form.account_type.code())),
                labeled("Parent", select("parent", &form.parent_options(view.accounts()), &form.parent)),
                labeled("Description", textarea("desc", &form.desc)),
                labeled("Visibility", select("is_hidden", &hidden_options, form.hidden_value())),
                tag("label", "label gap-2").build([
                    tag("input", "checkbox [type=checkbox] [name=is_placeholder]")
                        .flag("checked", form.is_placeholder)
                        .empty(),
                    span("").text("Group only (placeholder)"),
                ]),
                div("flex gap-2 justify-end").build([delete.into(), submit().primary.text("Save")]),
            ]),
        div("").attr("id", DELETE_TARGET).empty(),
    ])
}

/// Second step of a delete: the prompt with the real delete form
pub fn delete_prompt(view: &ViewContext<'_>, confirmation: &DeleteConfirmation) -> Node {
    let request = DeleteRequest { aid: confirmation.aid.clone() };
    let cancel_vals = json!({ "aid": confirmation.aid, "cancel": "1" }).to_string();
    div("alert alert-warning flex flex-col gap-2").build([
        span("font-medium").text(confirmation.prompt()),
        tag("form", "flex gap-2 [method=POST]")
            .attr("action", delete_url(view, &request))
            .build([
                hidden("confirm", "yes"),
                submit().danger.text("Delete"),
                button()
                    .plain
                    .with(&[("hx-post", "/account/edit/delete"), ("hx-swap", "innerHTML")])
                    .attr("hx-target", format!("#{}", DELETE_TARGET))
                    .attr("hx-vals", cancel_vals)
                    .text("Cancel"),
            ]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::tests::snapshot;
    use wadwise_config::Config;

    fn params(pairs: &[(&str, &str)]) -> FormFields {
        FormFields::new(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }

    #[test]
    fn test_form_for() {
        let snapshot = snapshot();
        let config = Config::default();
        let view = ViewContext::new(&snapshot, &config);

        let form = form_for(&view, &params(&[("parent", "assets")])).unwrap();
        assert!(form.is_new());
        assert_eq!(form.account_type, AccountType::Asset);

        let form = form_for(&view, &params(&[("aid", "bank")])).unwrap();
        assert_eq!(form.name, "Bank");

        assert!(form_for(&view, &params(&[("aid", "nope")])).is_err());
    }

    #[test]
    fn test_render_existing_account() {
        let snapshot = snapshot();
        let config = Config::default();
        let view = ViewContext::new(&snapshot, &config);
        let form = form_for(&view, &params(&[("aid", "assets")])).unwrap();
        let html = render(&view, &form).render();

        assert!(html.contains(r#"action="http://127.0.0.1:5000/account/edit?aid=assets""#));
        assert!(html.contains(r#"<option value="expenses">Expenses</option>"#));
        assert!(!html.contains(r#"<option value="bank">"#));
        assert!(html.contains(r#"name="is_placeholder" checked"#));
        assert!(html.contains(">Delete</button>"));
    }

    #[test]
    fn test_new_account_has_no_delete() {
        let snapshot = snapshot();
        let config = Config::default();
        let view = ViewContext::new(&snapshot, &config);
        let form = form_for(&view, &params(&[])).unwrap();
        assert!(!render(&view, &form).render().contains(">Delete</button>"));
    }

    #[test]
    fn test_delete_prompt() {
        let snapshot = snapshot();
        let config = Config::default();
        let view = ViewContext::new(&snapshot, &config);
        let form = form_for(&view, &params(&[("aid", "bank")])).unwrap();
        let confirmation = form.request_delete(view.accounts()).unwrap();
        let html = delete_prompt(&view, &confirmation).render();

        assert!(html.contains("Delete Assets:Bank?"));
        assert!(html.contains(r#"action="http://127.0.0.1:5000/account/delete?aid=bank""#));
        assert!(html.contains(r#"name="confirm" value="yes""#));
    }
}
