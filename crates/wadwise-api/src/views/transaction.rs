//! Transaction editor island

use chrono::{Local, NaiveDate};
use log::{debug, warn};
use wadwise_core::ledger::{op2, Amount, Mode, SimpleForm, SplitForm};
use wadwise_core::{
    batch, BalanceQuery, BalanceSheet, CoreResult, FormDefaults, Operation, SelectorOptions, SubmitAction,
    Submission, TransactionForm,
};
use wadwise_utils::{format_amount, urlqs};

use crate::components::{
    account_field, button, clear_dialog, date_input, div, hidden, island_control, island_form, labeled,
    number_input, select, span, submit, textarea, vcard,
};
use crate::error::{ApiError, ApiResult};
use crate::fields::{Action, FormFields};
use crate::html::{tag, Node};
use crate::islands::{IslandContext, TRANSACTION};

use super::{amount_text, currency_options, ViewContext};

/// Editor defaults for `GET /transaction/edit`
pub fn initial_defaults(view: &ViewContext<'_>, params: &FormFields) -> CoreResult<FormDefaults> {
    let mut defaults = match params.non_empty("tid") {
        Some(tid) => view.snapshot.data.transaction(tid)?.clone(),
        None => {
            let cur = view.currencies().into_iter().next().unwrap_or_default();
            FormDefaults::new_for(params.value("dest"), &cur, Local::now().naive_local())
        }
    };
    if params.flag("split") && !defaults.split {
        defaults.split = true;
        if defaults.ops.is_empty() {
            defaults.ops = op2(&defaults.src, &defaults.dest, defaults.amount.0, &defaults.cur, false).to_vec();
        }
    }
    Ok(defaults)
}

/// Rebuild the editor from the fields of a round-trip
pub fn restore(view: &ViewContext<'_>, fields: &FormFields) -> TransactionForm {
    let split = fields.flag("split");
    let ops = if split {
        fields
            .indexed("account")
            .iter()
            .enumerate()
            .map(|(i, account)| {
                Operation::new(
                    account,
                    fields.amount(&format!("amount.{}", i)),
                    fields.value(&format!("cur.{}", i)),
                    false,
                )
            })
            .collect()
    } else {
        Vec::new()
    };

    let defaults = FormDefaults {
        tid: fields.non_empty("tid").map(str::to_string),
        src: fields.value("src").to_string(),
        dest: fields.value("dest").to_string(),
        amount: Amount(fields.amount("amount")),
        cur: fields.value("cur").to_string(),
        ops,
        desc: fields.value("desc").to_string(),
        date: fields.date("date").unwrap_or_else(today),
        date_time: fields.value("date_time").to_string(),
        split,
    };

    let form = TransactionForm::from_defaults(&defaults, &view.currencies(), &view.snapshot.data.default_account);
    if let Some(simple) = form.simple() {
        batch(|| {
            if let Some(via) = fields.non_empty("via") {
                simple.via.set(via.to_string());
            }
            simple.mode.set(fields.value("mode").parse().unwrap_or_default());
            simple.current.set(fields.amount("current"));
            simple.target.set(fields.amount("target"));
        });
    }
    form
}

fn requested_mode(action: &Action) -> Option<Mode> {
    if action.name != "mode" {
        return None;
    }
    action.arg(0)?.parse().ok()
}

/// Balance lookup the action needs before it can be applied
pub fn pending_query(form: &TransactionForm, action: &Action) -> Option<BalanceQuery> {
    let simple = form.simple()?;
    let mode = requested_mode(action)?;
    simple.toggle_mode(mode, form.date.get_untracked())
}

/// Apply an island action. `balance` answers the query `pending_query`
/// returned for the same fields and action.
pub fn apply_action(form: &TransactionForm, action: &Action, balance: Option<CoreResult<BalanceSheet>>) {
    match action.name.as_str() {
        "" | "select" => {}
        "mode" => {
            let (Some(simple), Some(mode)) = (form.simple(), requested_mode(action)) else {
                debug!("Ignoring mode action {:?} on a split editor", action.args);
                return;
            };
            if let Some(query) = simple.toggle_mode(mode, form.date.get_untracked()) {
                match balance {
                    Some(result) => {
                        simple.apply_balance(&query, result);
                    }
                    None => warn!("Target mode for {} requested without a balance lookup", query.aid),
                }
            }
        }
        "add" => {
            if let Some(split) = form.split() {
                split.add_row();
            }
        }
        "remove" => {
            if let (Some(split), Some(idx)) = (form.split(), action.index(0)) {
                split.remove_row(idx);
            }
        }
        "fix" => {
            if let (Some(split), Some(idx)) = (form.split(), action.index(0)) {
                split.fix_remainder(idx);
            }
        }
        other => debug!("Ignoring unknown transaction action '{}'", other),
    }
}

/// Complete island: restore, apply, render
pub fn round_trip(
    view: &ViewContext<'_>,
    fields: &FormFields,
    action: &Action,
    balance: Option<CoreResult<BalanceSheet>>,
) -> Node {
    let form = restore(view, fields);
    apply_action(&form, action, balance);
    Node::Fragment(vec![render(view, &form), clear_dialog()])
}

pub fn mount(ctx: &IslandContext<'_>) -> ApiResult<Node> {
    let view = ViewContext::from(ctx);
    let defaults = initial_defaults(&view, ctx.params)?;
    let form = TransactionForm::from_defaults(&defaults, &view.currencies(), &view.snapshot.data.default_account);
    Ok(render(&view, &form))
}

/// Local endpoint the submit controls post to
pub const SUBMIT_URL: &str = "/transaction/submit";

/// Backend endpoint receiving the submission
pub fn backend_url(view: &ViewContext<'_>, form: &TransactionForm) -> String {
    view.backend(&urlqs(
        "/transaction/edit",
        &[("tid", form.tid().unwrap_or("")), ("dest", form.dest())],
    ))
}

/// Rebuild the form from a native submit and produce the POST for the
/// backend. The payload is serialized from the posted inputs, never taken
/// from the hidden `ops` of the last render.
pub fn submission(view: &ViewContext<'_>, fields: &FormFields) -> ApiResult<(String, Submission)> {
    let action: SubmitAction = fields.value("action").parse().map_err(ApiError::bad_request)?;
    let form = restore(view, fields);
    let submission = form.submission(action)?;
    Ok((backend_url(view, &form), submission))
}

pub fn render(view: &ViewContext<'_>, form: &TransactionForm) -> Node {
    let editor = match (form.simple(), form.split()) {
        (Some(simple), _) => render_simple(view, form, simple),
        (_, Some(split)) => render_split(view, split),
        (None, None) => Node::empty(),
    };

    island_form(&TRANSACTION, Some(SUBMIT_URL))
        .add_class("flex flex-col gap-2")
        .build([
            editor,
            vcard("gap-2").build([
                labeled("Description", textarea("desc", &form.desc.get())),
                labeled(
                    "Date",
                    date_input("date", &form.date.get().format("%Y-%m-%d").to_string()).empty(),
                ),
            ]),
            render_submit(form),
            hidden("ops", &form.serialized()),
            hidden("tid", form.tid().unwrap_or("")),
            hidden("dest", form.dest()),
            hidden("date_time", &form.date_time.get()),
            hidden("split", if form.is_split() { "1" } else { "" }),
        ])
}

fn render_submit(form: &TransactionForm) -> Node {
    let disabled = form.submit_disabled();
    let buttons = submit();
    let controls = form
        .actions()
        .into_iter()
        .map(|action| {
            let base = match action.field_value() {
                None => buttons.primary.clone(),
                Some(value) if value == "delete" => buttons.danger.with(&[("name", "action"), ("value", value)]),
                Some(value) => buttons.secondary.with(&[("name", "action"), ("value", value)]),
            };
            base.flag("disabled", disabled).text(action.label())
        })
        .collect::<Vec<_>>();
    div("flex gap-2 justify-end").build(controls)
}

fn mode_tabs(simple: &SimpleForm) -> Node {
    let active = simple.mode.get();
    let tabs = [Mode::Target, Mode::NoOp, Mode::Via]
        .into_iter()
        .map(|mode| {
            let action = format!("mode:{}", mode.as_str());
            island_control(tag("button", "tab [type=button]"), &TRANSACTION, &action)
                .class_if("tab-active", active == mode)
                .text(mode.label())
        })
        .collect::<Vec<_>>();
    div("tabs tabs-box").build(tabs)
}

fn render_simple(view: &ViewContext<'_>, form: &TransactionForm, simple: &SimpleForm) -> Node {
    let mode = simple.mode.get();
    let src = simple.src.get();
    let cur = simple.cur.get();
    let split_url = urlqs(
        "/transaction/edit",
        &[("tid", form.tid().unwrap_or("")), ("dest", form.dest()), ("split", "1")],
    );

    let via = (mode == Mode::Via).then(|| {
        let via = simple.via.get();
        labeled(
            "Via",
            account_field(&TRANSACTION, "via", &via, &view.title(&via), SelectorOptions::default(), "w-full"),
        )
    });

    let amount = if mode == Mode::Target {
        let line = simple.target_line();
        div("flex items-center gap-2").build([
            span("font-mono whitespace-nowrap").text(line.lhs(view.places())),
            number_input("target", &amount_text(line.target)).add_class("w-32").empty(),
            span("font-medium").text(cur.as_str()),
            hidden("amount", &amount_text(simple.amount.get())),
            hidden("cur", &cur),
        ])
    } else {
        div("flex items-center gap-2").build([
            labeled("Amount", number_input("amount", &amount_text(simple.amount.get())).empty()),
            select("cur", &currency_options(&view.currencies(), &cur), &cur),
            hidden("target", &amount_text(simple.target.get())),
        ])
    };

    vcard("gap-2").class_if("border-error", simple.is_error()).build([
        div("flex justify-between items-center").build([
            mode_tabs(simple),
            tag("a", "link").attr("href", split_url).text("Split"),
        ]),
        labeled(
            "From",
            account_field(&TRANSACTION, "src", &src, &view.title(&src), SelectorOptions::default(), "w-full"),
        ),
        via.into(),
        labeled(
            "To",
            tag("input", "input [type=text] [readonly] w-full")
                .attr("value", view.title(form.dest()))
                .empty(),
        ),
        amount,
        hidden("mode", mode.as_str()),
        hidden("current", &amount_text(simple.current.get())),
    ])
}

fn render_split(view: &ViewContext<'_>, split: &SplitForm) -> Node {
    let same_cur = split.same_cur();
    let buttons = button();
    let rows = split
        .rows()
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            let account = row.account.get();
            let cur = row.cur.get();
            let account_name = format!("account.{}", i);
            let fix = same_cur.then(|| {
                island_control(buttons.plain.add_class("btn-sm"), &TRANSACTION, &format!("fix:{}", i)).text("Fix")
            });
            div("flex items-center gap-2").build([
                account_field(
                    &TRANSACTION,
                    &account_name,
                    &account,
                    &view.title(&account),
                    SelectorOptions::default(),
                    "flex-1",
                ),
                number_input(&format!("amount.{}", i), &amount_text(row.amount.get()))
                    .add_class("w-32")
                    .empty(),
                select(&format!("cur.{}", i), &currency_options(split.cur_list(), &cur), &cur),
                fix.into(),
                island_control(buttons.danger.add_class("btn-sm"), &TRANSACTION, &format!("remove:{}", i)).text("×"),
            ])
        })
        .collect::<Vec<_>>();

    let total = same_cur.then(|| span("ml-auto").text(format!("Total: {}", format_amount(split.total(), view.places()))));

    vcard("gap-2").class_if("border-error", split.is_error()).build([
        div("flex flex-col gap-2").build(rows),
        div("flex items-center gap-2").build([
            island_control(buttons.plain.add_class("btn-sm"), &TRANSACTION, "add").text("Add"),
            total.into(),
        ]),
    ])
}

/// Today's date for round-trips that post none
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::tests::snapshot;
    use rust_decimal::Decimal;
    use wadwise_config::Config;
    use wadwise_core::Payload;

    fn fields(pairs: &[(&str, &str)]) -> FormFields {
        FormFields::new(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }

    fn simple_fields() -> FormFields {
        fields(&[
            ("src", "bank"),
            ("dest", "food"),
            ("amount", "12.50"),
            ("cur", "GBP"),
            ("desc", "Lunch"),
            ("date", "2024-03-01"),
            ("mode", "simple"),
        ])
    }

    #[test]
    fn test_restore_simple() {
        let snapshot = snapshot();
        let config = Config::default();
        let view = ViewContext::new(&snapshot, &config);
        let form = restore(&view, &simple_fields());

        let simple = form.simple().unwrap();
        assert_eq!(simple.src.get(), "bank");
        assert_eq!(simple.amount.get(), Decimal::new(125, 1));
        assert_eq!(form.desc.get(), "Lunch");
        assert_eq!(form.serialized(), r#"{"simple":["bank","food",12.5,"GBP"]}"#);
    }

    #[test]
    fn test_mode_action_without_balance() {
        let snapshot = snapshot();
        let config = Config::default();
        let view = ViewContext::new(&snapshot, &config);
        let form = restore(&view, &simple_fields());

        apply_action(&form, &Action::parse("mode:via"), None);
        let simple = form.simple().unwrap();
        assert_eq!(simple.mode.get(), Mode::Via);
        assert_eq!(simple.via.get(), "cash");
        assert!(matches!(simple.payload(), Payload::Ops(ops) if ops.len() == 4));

        apply_action(&form, &Action::parse("mode:via"), None);
        assert_eq!(simple.mode.get(), Mode::Simple);
    }

    #[test]
    fn test_target_round_trip() {
        let snapshot = snapshot();
        let config = Config::default();
        let view = ViewContext::new(&snapshot, &config);
        let posted = simple_fields();
        let action = Action::parse("mode:target");

        let query = pending_query(&restore(&view, &posted), &action).unwrap();
        assert_eq!(query.aid, "bank");
        assert_eq!(query.currency, "GBP");

        let sheet = BalanceSheet::from_amounts([("GBP", Decimal::new(120, 0))]);
        let form = restore(&view, &posted);
        apply_action(&form, &action, Some(Ok(sheet)));
        let simple = form.simple().unwrap();
        assert_eq!(simple.mode.get(), Mode::Target);
        assert_eq!(simple.current.get(), Decimal::new(120, 0));

        let html = render(&view, &form).render();
        assert!(html.contains(r#"name="mode" value="target""#));
        assert!(html.contains(r#"name="current" value="120""#));
        assert!(html.contains(r#"name="target""#));
    }

    #[test]
    fn test_target_line_sign_follows_direction() {
        let snapshot = snapshot();
        let config = Config::default();
        let view = ViewContext::new(&snapshot, &config);
        let action = Action::parse("mode:target");
        let sheet = || Some(Ok(BalanceSheet::from_amounts([("GBP", Decimal::new(120, 0))])));

        let mut posted = simple_fields();
        posted.set("target", "50");
        let form = restore(&view, &posted);
        apply_action(&form, &action, sheet());
        let html = render(&view, &form).render();
        assert!(html.contains(">120.00 - 70.00 =</span>"));
        assert!(html.contains(r#"name="target" value="50""#));

        posted.set("target", "150");
        let form = restore(&view, &posted);
        apply_action(&form, &action, sheet());
        let html = render(&view, &form).render();
        assert!(html.contains(">120.00 + 30.00 =</span>"));
        assert!(!html.contains("-30.00"));
    }

    #[test]
    fn test_submission_from_posted_fields() {
        let snapshot = snapshot();
        let config = Config::default();
        let view = ViewContext::new(&snapshot, &config);
        let mut posted = simple_fields();
        posted.set("amount", "30");
        posted.set("ops", r#"{"simple":["bank","food",12.5,"GBP"]}"#);

        let (url, submitted) = submission(&view, &posted).unwrap();
        assert_eq!(url, "http://127.0.0.1:5000/transaction/edit?dest=food");
        assert_eq!(submitted.ops, r#"{"simple":["bank","food",30.0,"GBP"]}"#);
        assert_eq!(submitted.action, SubmitAction::Save);

        posted.set("action", "copy");
        assert!(submission(&view, &posted).is_err());
    }

    #[test]
    fn test_split_actions() {
        let snapshot = snapshot();
        let config = Config::default();
        let view = ViewContext::new(&snapshot, &config);
        let posted = fields(&[
            ("dest", "food"),
            ("split", "1"),
            ("account.0", "bank"),
            ("amount.0", "-10"),
            ("cur.0", "GBP"),
            ("account.1", "food"),
            ("amount.1", "4"),
            ("cur.1", "GBP"),
        ]);

        let form = restore(&view, &posted);
        apply_action(&form, &Action::parse("fix:1"), None);
        let split = form.split().unwrap();
        assert_eq!(split.total(), Decimal::ZERO);

        apply_action(&form, &Action::parse("add"), None);
        assert_eq!(split.len(), 3);
        apply_action(&form, &Action::parse("remove:7"), None);
        assert_eq!(split.len(), 3);

        let html = render(&view, &form).render();
        assert!(html.contains(r#"name="account.2""#));
        assert!(html.contains(r#"value="fix:0""#));
        assert!(html.contains("Total: 0.00"));
    }

    #[test]
    fn test_error_disables_submit() {
        let snapshot = snapshot();
        let config = Config::default();
        let view = ViewContext::new(&snapshot, &config);
        let mut posted = simple_fields();
        posted.set("src", "food");
        posted.set("tid", "t1");

        let form = restore(&view, &posted);
        assert!(form.is_error());
        let html = render(&view, &form).render();
        assert!(html.contains(r#"type="submit" disabled>Save</button>"#));
        assert!(html.contains(r#"value="copy-now" disabled>"#));
    }

    #[test]
    fn test_initial_defaults_for_new_split() {
        let snapshot = snapshot();
        let config = Config::default();
        let view = ViewContext::new(&snapshot, &config);
        let defaults = initial_defaults(&view, &fields(&[("dest", "food"), ("split", "1")])).unwrap();
        assert!(defaults.split);
        assert_eq!(defaults.ops.len(), 2);
        assert_eq!(defaults.cur, "GBP");

        let missing = initial_defaults(&view, &fields(&[("tid", "nope")]));
        assert!(missing.is_err());
    }
}
