//! Account overview page: breadcrumb, totals, sub-accounts and history

use wadwise_core::account_view::{display_amount, DateGroup, Leg, SubAccount, TotalLine, TotalsBlock, TransactionCard};
use wadwise_core::AccountView;
use wadwise_utils::urlqs;

use crate::components::{card, div, span, vcard, vstack};
use crate::error::ApiResult;
use crate::html::{tag, Node};
use crate::islands::IslandContext;

use super::ViewContext;

pub const PAGE_URL: &str = "/account";

pub fn mount(ctx: &IslandContext<'_>) -> ApiResult<Node> {
    let view = ViewContext::from(ctx);
    let model = AccountView::new(&view.snapshot.data, view.accounts(), ctx.params.non_empty("aid"));
    Ok(render(&view, &model))
}

fn account_url(aid: &str) -> String {
    urlqs(PAGE_URL, &[("aid", aid)])
}

pub fn render(view: &ViewContext<'_>, model: &AccountView) -> Node {
    let places = view.places();
    let status = (!model.status.is_empty())
        .then(|| card("flex flex-col gap-2").build(model.status.iter().map(|block| render_block(block, places))));
    let subs = (!model.sub_accounts.is_empty())
        .then(|| vcard("gap-2").build(model.sub_accounts.iter().map(|sub| render_sub(sub, places))));
    let history = model.aid().map(|aid| {
        vstack("gap-4").build(model.history.iter().map(|group| render_group(group, aid, places)))
    });

    vstack("gap-2").build([
        tag("nav", "flex items-center gap-2").build([render_crumbs(model), render_links(model)]),
        status.into(),
        subs.into(),
        history.into(),
    ])
}

fn render_crumbs(model: &AccountView) -> Node {
    if model.crumbs.is_empty() {
        return span("flex-1 text-sm font-medium").text("Home");
    }
    let last = model.crumbs.len() - 1;
    let items = model.crumbs.iter().enumerate().map(|(i, crumb)| {
        let href = if i == last {
            urlqs("/account/edit", &[("aid", crumb.aid.as_str())])
        } else {
            account_url(&crumb.aid)
        };
        tag("li", "").build([tag("a", "").attr("href", href).text(crumb.name.as_str())])
    });
    div("flex-1 breadcrumbs text-sm").build([tag("ul", "").build(items)])
}

fn render_links(model: &AccountView) -> Node {
    let Some(aid) = model.aid().filter(|_| model.accepts_transactions()) else {
        return Node::empty();
    };
    let joint = format!("{}{}", aid, wadwise_core::JOINT_SUFFIX);
    let mut links = vec![
        ("Add transaction", urlqs("/transaction/edit", &[("dest", aid)])),
        ("Add split", urlqs("/transaction/edit", &[("dest", aid), ("split", "1")])),
    ];
    if model.is_joint {
        links.push(("Add joint", urlqs("/transaction/edit", &[("dest", joint.as_str())])));
    }
    links.push(("Import", "/import".to_string()));

    let items = links
        .into_iter()
        .map(|(label, href)| tag("a", "btn btn-ghost btn-xs").attr("href", href).text(label));
    div("flex-none flex gap-1").build(items)
}

fn render_lines(lines: &[TotalLine], places: u32) -> Node {
    div("flex flex-col items-end").build(lines.iter().map(|line| {
        span("tabular-nums tracking-tighter").text(format!("{} {}", line.display(places), line.currency))
    }))
}

fn render_block(block: &TotalsBlock, places: u32) -> Node {
    div("grid grid-cols-2 w-full").build([span("").text(block.label), render_lines(&block.lines, places)])
}

fn render_sub(sub: &SubAccount, places: u32) -> Node {
    div("grid grid-cols-2 w-full").build([
        tag("a", "link link-hover").attr("href", account_url(&sub.aid)).text(sub.name.as_str()),
        render_lines(&sub.lines, places),
    ])
}

fn render_group(group: &DateGroup, aid: &str, places: u32) -> Node {
    div("").build([
        div("small-caps text-sm text-slate-600 mb-1").text(group.date.format("%a, %d %b %Y").to_string()),
        vstack("gap-2").build(group.transactions.iter().map(|tr| render_transaction(tr, aid, places))),
    ])
}

fn render_transaction(tr: &TransactionCard, aid: &str, places: u32) -> Node {
    let href = urlqs("/transaction/edit", &[("tid", tr.tid.as_deref().unwrap_or("")), ("dest", aid)]);
    let desc = (!tr.desc.is_empty()).then(|| {
        div("col-span-full")
            .class_if("border-b border-gray-300", tr.split)
            .text(tr.desc.as_str())
    });
    let mut children = vec![desc.into()];
    children.extend(tr.legs.iter().flat_map(|leg| render_leg(leg, places)));
    tag("a", "card card-body bg-base-100 shadow-sm grid grid-cols-2")
        .attr("id", format!("t-{}", tr.tid.as_deref().unwrap_or("")))
        .attr("href", href)
        .build(children)
}

fn render_leg(leg: &Leg, places: u32) -> [Node; 2] {
    [
        div("text-wrap tracking-tight").class_if("text-slate-500", leg.muted).text(leg.title.as_str()),
        div("justify-self-end whitespace-nowrap")
            .class_if("text-slate-500", leg.muted)
            .build([
                span("tabular-nums").add_class(leg.tone.css_class()).text(display_amount(leg.amount, places)),
                span("").text(format!(" {}", leg.currency)),
            ]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FormFields;
    use crate::views::tests::snapshot;
    use crate::Snapshot;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::collections::HashMap;
    use wadwise_config::Config;
    use wadwise_core::ledger::Amount;
    use wadwise_core::{AccountTotals, FormDefaults};

    fn populated() -> Snapshot {
        let mut data = snapshot().data;
        let totals = AccountTotals {
            current_total: HashMap::from([("GBP".to_string(), Amount(Decimal::new(123456, 1)))]),
            ..AccountTotals::default()
        };
        data.totals.insert("bank".to_string(), totals);
        data.transactions.insert(
            "t1".to_string(),
            FormDefaults {
                tid: Some("t1".to_string()),
                src: "bank".to_string(),
                dest: "food".to_string(),
                amount: Amount(Decimal::new(1250, 2)),
                cur: "GBP".to_string(),
                ops: Vec::new(),
                desc: "lunch".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                date_time: "12:30".to_string(),
                split: false,
            },
        );
        Snapshot::new(data)
    }

    fn mounted(snapshot: &Snapshot, query: &[(&str, &str)]) -> String {
        let config = Config::default();
        let params: HashMap<String, String> = query.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        let params = FormFields::from_query(&params);
        let ctx = IslandContext { snapshot, config: &config, params: &params };
        mount(&ctx).unwrap().render()
    }

    #[test]
    fn test_home_lists_root_accounts() {
        let html = mounted(&populated(), &[]);
        assert!(html.contains(">Home</span>"));
        assert!(html.contains(r#"href="/account?aid=assets">Assets</a>"#));
        assert!(html.contains(r#"href="/account?aid=expenses">Expenses</a>"#));
        assert!(!html.contains("Add transaction"));
    }

    #[test]
    fn test_account_page() {
        let html = mounted(&populated(), &[("aid", "bank")]);
        assert!(html.contains(r#"<a href="/account?aid=assets">Assets</a>"#));
        assert!(html.contains(r#"<a href="/account/edit?aid=bank">Bank</a>"#));
        assert!(html.contains(">Balance</span>"));
        assert!(html.contains(">12,345.60 GBP</span>"));
        assert!(html.contains(r#"href="/transaction/edit?dest=bank&amp;split=1""#));
        assert!(!html.contains("Add joint"));

        assert!(html.contains("Fri, 01 Mar 2024"));
        assert!(html.contains(r#"href="/transaction/edit?tid=t1&amp;dest=bank""#));
        assert!(html.contains(">Expenses:Food</div>"));
        assert!(html.contains(r#"<span class="tabular-nums text-error">-12.50</span>"#));
    }

    #[test]
    fn test_placeholder_has_no_links() {
        let html = mounted(&populated(), &[("aid", "assets")]);
        assert!(!html.contains("Add transaction"));
        assert!(html.contains(r#"href="/account?aid=bank">Bank</a>"#));
    }
}
