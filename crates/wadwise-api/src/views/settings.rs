//! Settings islands: favorite accounts, joint accounts, currency list
//!
//! All three post to the same endpoint; the hidden `section` field tells
//! them apart.

use log::debug;
use wadwise_core::settings::{format_currency_list, parse_currency_list};
use wadwise_core::{FavsForm, JointAccount, JointCard, JointForm, SelectorOptions};

use crate::components::{
    account_field, button, card, clear_dialog, div, header, hidden, island_control, island_form, labeled, span,
    submit, textarea,
};
use crate::error::{ApiError, ApiResult};
use crate::fields::{Action, FormFields};
use crate::html::Node;
use crate::islands::{IslandContext, CURRENCIES, FAVS, JOINTS};

use super::ViewContext;

/// Which settings island posted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Favs,
    Joints,
    Currencies,
}

impl Section {
    pub fn from_fields(fields: &FormFields) -> ApiResult<Section> {
        match fields.value("section") {
            "favs" => Ok(Section::Favs),
            "joints" => Ok(Section::Joints),
            "currencies" => Ok(Section::Currencies),
            other => Err(ApiError::bad_request(format!("unknown settings section '{}'", other))),
        }
    }
}

fn account_options() -> SelectorOptions {
    SelectorOptions {
        select_placeholder: false,
        exclude_special: true,
    }
}

fn group_options() -> SelectorOptions {
    SelectorOptions {
        select_placeholder: true,
        exclude_special: true,
    }
}

pub fn round_trip(view: &ViewContext<'_>, fields: &FormFields, action: &Action) -> ApiResult<Node> {
    let island = match Section::from_fields(fields)? {
        Section::Favs => {
            let form = FavsForm::new(&fields.indexed("fav"));
            apply_favs_action(&form, action);
            render_favs(view, &form)
        }
        Section::Joints => {
            let form = JointForm::new(&restore_joints(fields));
            apply_joints_action(&form, action);
            render_joints(view, &form)
        }
        Section::Currencies => render_currencies(view, &parse_currency_list(fields.value("currencies"))),
    };
    Ok(Node::Fragment(vec![island, clear_dialog()]))
}

// ==================== Favorites ====================

pub fn apply_favs_action(form: &FavsForm, action: &Action) {
    match (action.name.as_str(), action.index(0)) {
        ("", _) | ("select", _) => {}
        ("fav-add", _) => form.add(),
        ("fav-remove", Some(idx)) => {
            form.remove(idx);
        }
        (other, _) => debug!("Ignoring favorites action '{}'", other),
    }
}

pub fn mount_favs(ctx: &IslandContext<'_>) -> ApiResult<Node> {
    let view = ViewContext::from(ctx);
    Ok(render_favs(&view, &FavsForm::new(&view.snapshot.data.fav_accounts)))
}

pub fn render_favs(view: &ViewContext<'_>, form: &FavsForm) -> Node {
    let buttons = button();
    let items = form
        .items()
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let aid = item.get();
            div("flex items-center gap-2").build([
                account_field(&FAVS, &format!("fav.{}", i), &aid, &view.title(&aid), account_options(), "flex-1"),
                island_control(buttons.danger.add_class("btn-sm"), &FAVS, &format!("fav-remove:{}", i)).text("×"),
            ])
        })
        .collect::<Vec<_>>();

    let mut children = vec![
        header("Favorite accounts"),
        div("flex flex-col gap-2").build(items),
        div("flex gap-2 justify-end").build([
            island_control(buttons.plain.clone(), &FAVS, "fav-add").text("Add"),
            submit().primary.text("Save"),
        ]),
        hidden("section", "favs"),
    ];
    children.extend(form.to_fields().into_iter().map(|(name, value)| hidden(name, &value)));

    island_form(&FAVS, Some(&view.backend("/settings/favs")))
        .add_class("card card-body flex flex-col gap-2")
        .build(children)
}

// ==================== Joint accounts ====================

/// Cards posted as `joint.<c>.parent`, `joint.<c>.clear`,
/// `joint.<c>.joints.<j>` and `joint.<c>.assets.<j>`
pub fn restore_joints(fields: &FormFields) -> Vec<JointAccount> {
    (0..)
        .map_while(|c| {
            let prefix = format!("joint.{}", c);
            let parent = fields.get(&format!("{}.parent", prefix))?;
            Some(JointAccount {
                parent: parent.to_string(),
                clear: fields.value(&format!("{}.clear", prefix)).to_string(),
                joints: fields.indexed(&format!("{}.joints", prefix)),
                assets: fields.indexed(&format!("{}.assets", prefix)),
            })
        })
        .collect()
}

pub fn apply_joints_action(form: &JointForm, action: &Action) {
    match (action.name.as_str(), action.index(0)) {
        ("", _) | ("select", _) => {}
        ("joint-add", _) => form.add(),
        ("joint-remove", Some(idx)) => {
            form.remove(idx);
        }
        ("party-add", Some(idx)) => {
            if let Some(card) = form.card(idx) {
                card.add_party();
            }
        }
        ("party-remove", Some(idx)) => {
            if let (Some(card), Some(party)) = (form.card(idx), action.index(1)) {
                card.remove_party(party);
            }
        }
        (other, _) => debug!("Ignoring joint account action '{}' {:?}", other, action.args),
    }
}

pub fn mount_joints(ctx: &IslandContext<'_>) -> ApiResult<Node> {
    let view = ViewContext::from(ctx);
    Ok(render_joints(&view, &JointForm::new(&view.snapshot.data.joint_accounts)))
}

pub fn render_joints(view: &ViewContext<'_>, form: &JointForm) -> Node {
    let buttons = button();
    let cards = form
        .cards()
        .iter()
        .enumerate()
        .map(|(c, joint_card)| render_joint_card(view, c, joint_card))
        .collect::<Vec<_>>();

    island_form(&JOINTS, Some(&view.backend("/settings/joints")))
        .add_class("card card-body flex flex-col gap-2")
        .build([
            header("Joint accounts"),
            div("flex flex-col gap-2").build(cards),
            form.has_errors()
                .then(|| span("text-error").text("Every field of a joint account is required"))
                .into(),
            div("flex gap-2 justify-end").build([
                island_control(buttons.plain.clone(), &JOINTS, "joint-add").text("Add joint account"),
                submit().primary.flag("disabled", form.has_errors()).text("Save"),
            ]),
            hidden("section", "joints"),
            hidden("data", &form.serialized()),
        ])
}

fn render_joint_card(view: &ViewContext<'_>, c: usize, joint_card: &JointCard) -> Node {
    let buttons = button();
    let prefix = format!("joint.{}", c);
    let field = |name: &str, aid: &str, options: SelectorOptions| {
        account_field(&JOINTS, &format!("{}.{}", prefix, name), aid, &view.title(aid), options, "w-full")
    };

    let joints = joint_card.joints.get();
    let assets = joint_card.assets.get();
    let own = joints.first().map(|own| {
        labeled("Own share", field("joints.0", &own.get(), account_options()))
    });
    let parties = assets
        .iter()
        .enumerate()
        .map(|(p, asset)| {
            let joint = joints.get(p + 1).map(|joint| joint.get()).unwrap_or_default();
            div("flex items-center gap-2").build([
                labeled("Their share", field(&format!("joints.{}", p + 1), &joint, account_options())),
                labeled("Their asset", field(&format!("assets.{}", p), &asset.get(), account_options())),
                island_control(buttons.danger.add_class("btn-sm"), &JOINTS, &format!("party-remove:{}:{}", c, p))
                    .text("×"),
            ])
        })
        .collect::<Vec<_>>();

    card("flex flex-col gap-2").build([
        labeled("Parent", field("parent", &joint_card.parent.get(), group_options())),
        labeled("Clearing account", field("clear", &joint_card.clear.get(), account_options())),
        own.into(),
        div("flex flex-col gap-2").build(parties),
        div("flex gap-2 justify-end").build([
            island_control(buttons.plain.add_class("btn-sm"), &JOINTS, &format!("party-add:{}", c)).text("Add party"),
            island_control(buttons.danger.add_class("btn-sm"), &JOINTS, &format!("joint-remove:{}", c))
                .text("Remove"),
        ]),
    ])
}

// ==================== Currencies ====================

pub fn mount_currencies(ctx: &IslandContext<'_>) -> ApiResult<Node> {
    let view = ViewContext::from(ctx);
    Ok(render_currencies(&view, &view.currencies()))
}

pub fn render_currencies(view: &ViewContext<'_>, codes: &[String]) -> Node {
    let mut children = vec![
        header("Currencies"),
        labeled("One code per line", textarea("currencies", &format_currency_list(codes))),
        div("flex justify-end").build([submit().primary.flag("disabled", codes.is_empty()).text("Save")]),
        hidden("section", "currencies"),
    ];
    children.extend(codes.iter().map(|code| hidden("cur", code)));

    island_form(&CURRENCIES, Some(&view.backend("/settings/currencies")))
        .add_class("card card-body flex flex-col gap-2")
        .build(children)
}
