//! Import reconciliation island

use log::debug;
use wadwise_core::{batch, AccountType, ImportBatch, ImportList, ImportRow, SelectorOptions, Tone};
use wadwise_utils::format_amount;

use crate::components::{
    account_field, button, card, clear_dialog, div, header, hidden, island_control, island_form, span, submit,
    text_input,
};
use crate::error::{ApiError, ApiResult};
use crate::fields::{Action, FormFields};
use crate::html::Node;
use crate::islands::{IslandContext, IMPORT};

use super::{amount_text, ViewContext};

/// Rebuild the list from the pending batch and the posted row fields
pub fn restore(import: &ImportBatch, fields: &FormFields) -> ImportList {
    let list = ImportList::new(import);
    batch(|| {
        for (i, row) in list.rows().iter().enumerate() {
            if let Some(dest) = fields.get(&format!("dest.{}", i)) {
                row.dest.set(dest.to_string());
            }
            if let Some(desc) = fields.get(&format!("desc.{}", i)) {
                row.desc.set(desc.to_string());
            }
            if let Some(seen) = fields.get(&format!("seen.{}", i)) {
                row.seen.set(seen == "1");
            }
        }
    });
    list
}

pub fn apply_action(list: &ImportList, action: &Action) {
    match (action.name.as_str(), action.index(0)) {
        ("", _) | ("select", _) => {}
        ("toggle", Some(idx)) => {
            list.toggle_state(idx);
        }
        ("similar", Some(idx)) => {
            let updated = list.set_similar(idx);
            debug!("Copied row {} to {} similar rows", idx, updated);
        }
        (other, _) => debug!("Ignoring import action '{}' {:?}", other, action.args),
    }
}

pub fn round_trip(view: &ViewContext<'_>, fields: &FormFields, action: &Action) -> Node {
    let content = match &view.snapshot.data.import {
        Some(import) => {
            let list = restore(import, fields);
            apply_action(&list, action);
            render(view, import, &list)
        }
        None => nothing_to_import(),
    };
    Node::Fragment(vec![content, clear_dialog()])
}

pub fn mount(ctx: &IslandContext<'_>) -> ApiResult<Node> {
    let view = ViewContext::from(ctx);
    Ok(match &view.snapshot.data.import {
        Some(import) => render(&view, import, &ImportList::new(import)),
        None => nothing_to_import(),
    })
}

/// Local endpoint the Import control posts to
pub const SUBMIT_URL: &str = "/import/submit";

/// Rebuild the list from a native submit and produce the backend URL and
/// the fields to post there
pub fn submission(view: &ViewContext<'_>, fields: &FormFields) -> ApiResult<(String, Vec<(&'static str, String)>)> {
    let import = view
        .snapshot
        .data
        .import
        .as_ref()
        .ok_or_else(|| ApiError::bad_request("nothing to import"))?;
    let list = restore(import, fields);
    if !list.submit_ok() {
        return Err(ApiError::bad_request("every included row needs a destination account"));
    }
    Ok((view.backend("/import"), list.to_fields()))
}

fn nothing_to_import() -> Node {
    card("").build([header("Import"), span("opacity-60").text("Nothing to import")])
}

pub fn render(view: &ViewContext<'_>, import: &ImportBatch, list: &ImportList) -> Node {
    let src_type = view
        .accounts()
        .get(list.src())
        .map(|account| account.account_type)
        .unwrap_or(AccountType::Asset);

    let rows = list
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| render_row(view, src_type, i, row))
        .collect::<Vec<_>>();

    let mut currencies: Vec<&String> = import.balance.keys().collect();
    currencies.sort();
    let balances = currencies
        .into_iter()
        .map(|cur| span("font-mono").text(format!("{}: {}", cur, list.balance_line(cur, view.places()))))
        .collect::<Vec<_>>();

    let title = if list.name().is_empty() { view.title(list.src()) } else { list.name().to_string() };
    let mut fields = list
        .to_fields()
        .into_iter()
        .map(|(name, value)| hidden(name, &value))
        .collect::<Vec<_>>();

    fields.extend([
        header(&title),
        div("flex flex-col gap-1").build(rows),
        div("flex flex-col items-end").build(balances),
        div("flex justify-end").build([submit().primary.flag("disabled", !list.submit_ok()).text("Import")]),
    ]);
    island_form(&IMPORT, Some(SUBMIT_URL)).add_class("card card-body flex flex-col gap-2").build(fields)
}

fn render_row(view: &ViewContext<'_>, src_type: AccountType, i: usize, row: &ImportRow) -> Node {
    let seen = row.seen.get();
    let dest = row.dest.get();
    let buttons = button();
    let tone = Tone::of(src_type, row.amount);

    let similar = row.key.as_ref().map(|_| {
        island_control(buttons.plain.add_class("btn-xs"), &IMPORT, &format!("similar:{}", i)).text("Similar")
    });

    div("grid grid-cols-[5rem_1fr_7rem_14rem_1fr_auto_auto] items-center gap-2")
        .class_if("opacity-50", seen)
        .attr("title", row.category.as_str())
        .build([
            span("").text(row.date_str.as_str()),
            span("truncate").text(row.name.as_str()),
            span("text-right font-mono")
                .add_class(tone.css_class())
                .text(format!("{} {}", format_amount(row.amount, view.places()), row.cur)),
            account_field(&IMPORT, &format!("dest.{}", i), &dest, &view.title(&dest), SelectorOptions::default(), "w-full"),
            text_input(&format!("desc.{}", i), &row.desc.get()).add_class("w-full").empty(),
            island_control(buttons.secondary.add_class("btn-xs"), &IMPORT, &format!("toggle:{}", i))
                .text(if seen { "Include" } else { "Skip" }),
            similar.into(),
            hidden(&format!("seen.{}", i), if seen { "1" } else { "" }),
            hidden(&format!("amount.{}", i), &amount_text(row.amount)),
        ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::tests::snapshot;
    use crate::Snapshot;
    use rust_decimal::Decimal;
    use std::collections::HashMap;
    use wadwise_config::Config;
    use wadwise_core::ledger::Amount;
    use wadwise_core::ImportRecord;

    fn record(id: &str, amount: i64, key: Option<&str>) -> ImportRecord {
        ImportRecord {
            id: Some(id.to_string()),
            kind: "DEB".to_string(),
            date_str: "01/03".to_string(),
            name: format!("shop {}", id),
            amount: Amount(Decimal::new(amount, 0)),
            cur: "GBP".to_string(),
            category: String::new(),
            key: key.map(str::to_string),
            dest: String::new(),
            desc: String::new(),
            state: None,
        }
    }

    fn import_snapshot() -> Snapshot {
        let mut data = snapshot().data;
        data.import = Some(ImportBatch {
            src: "bank".to_string(),
            name: String::new(),
            balance: HashMap::from([("GBP".to_string(), Amount(Decimal::new(100, 0)))]),
            transactions: vec![record("a", -10, Some("k")), record("b", -20, Some("k")), record("c", -5, None)],
        });
        Snapshot::new(data)
    }

    fn fields(pairs: &[(&str, &str)]) -> FormFields {
        FormFields::new(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }

    #[test]
    fn test_restore_and_similar() {
        let snapshot = import_snapshot();
        let import = snapshot.data.import.as_ref().unwrap();
        let list = restore(import, &fields(&[("dest.0", "food"), ("desc.0", "Groceries"), ("seen.2", "1")]));

        assert!(list.row(2).unwrap().seen.get());
        assert_eq!(list.total(), Decimal::new(-30, 0));

        apply_action(&list, &Action::parse("similar:0"));
        assert_eq!(list.row(1).unwrap().dest.get(), "food");
        assert_eq!(list.row(1).unwrap().desc.get(), "Groceries");
        assert_eq!(list.row(2).unwrap().dest.get(), "");
        assert!(list.submit_ok());
    }

    #[test]
    fn test_render_round_trip() {
        let snapshot = import_snapshot();
        let config = Config::default();
        let view = ViewContext::new(&snapshot, &config);

        let html = round_trip(&view, &fields(&[("dest.0", "food")]), &Action::parse("toggle:1")).render();
        assert!(html.contains(r#"name="seen.1" value="1""#));
        assert!(html.contains("GBP: 100.00 + -15.00 = 85.00"));
        assert!(html.contains(r#"class="text-right font-mono text-error""#));
        assert!(html.contains(r#"type="submit" disabled>Import"#));
        assert!(html.contains(r#"id="selector-dialog" hx-swap-oob="true""#));
    }

    #[test]
    fn test_submission_uses_posted_rows() {
        let snapshot = import_snapshot();
        let config = Config::default();
        let view = ViewContext::new(&snapshot, &config);
        let posted = fields(&[
            ("dest.0", "food"),
            ("desc.0", "Groceries"),
            ("dest.1", "food"),
            ("seen.2", "1"),
            ("transactions", "[]"),
        ]);

        let (url, submitted) = submission(&view, &posted).unwrap();
        assert_eq!(url, "http://127.0.0.1:5000/import");
        assert_eq!(submitted[0], ("src", "bank".to_string()));
        assert!(submitted[1].1.contains(r#""desc":"Groceries""#));
        assert!(submitted[1].1.contains(r#""state":"seen""#));

        let incomplete = fields(&[("dest.0", "food")]);
        assert!(submission(&view, &incomplete).is_err());
    }

    #[test]
    fn test_no_pending_import() {
        let snapshot = snapshot();
        let config = Config::default();
        let view = ViewContext::new(&snapshot, &config);
        let html = round_trip(&view, &FormFields::default(), &Action::default()).render();
        assert!(html.contains("Nothing to import"));
    }
}
