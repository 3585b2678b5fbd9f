//! Island mount table
//!
//! Pages declare the islands they host by name; the table maps each name to
//! the constructor rendering it. Names with no constructor render nothing.

use std::collections::HashMap;

use log::warn;
use wadwise_config::Config;

use crate::error::ApiResult;
use crate::fields::FormFields;
use crate::html::{tag, Node};
use crate::views;
use crate::Snapshot;

/// Where an island posts its round-trips and which element it replaces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IslandSpec {
    pub name: &'static str,
    pub post: &'static str,
    pub target: &'static str,
}

pub static TRANSACTION: IslandSpec = IslandSpec {
    name: "transaction",
    post: "/transaction/form",
    target: "transaction-form",
};
pub static IMPORT: IslandSpec = IslandSpec { name: "import", post: "/import/form", target: "import-form" };
pub static FAVS: IslandSpec = IslandSpec { name: "favs", post: "/settings/form", target: "favs-form" };
pub static JOINTS: IslandSpec = IslandSpec { name: "joints", post: "/settings/form", target: "joints-form" };
pub static CURRENCIES: IslandSpec = IslandSpec {
    name: "currencies",
    post: "/settings/form",
    target: "currencies-form",
};

/// Islands that post round-trips
pub static ISLANDS: [&IslandSpec; 5] = [&TRANSACTION, &IMPORT, &FAVS, &JOINTS, &CURRENCIES];

pub fn island_spec(name: &str) -> Option<&'static IslandSpec> {
    ISLANDS.iter().copied().find(|spec| spec.name == name)
}

/// Inputs available to an island constructor
pub struct IslandContext<'a> {
    pub snapshot: &'a Snapshot,
    pub config: &'a Config,
    /// Query parameters of the page request
    pub params: &'a FormFields,
}

type Constructor = Box<dyn Fn(&IslandContext<'_>) -> ApiResult<Node> + Send + Sync>;

#[derive(Default)]
pub struct MountTable {
    constructors: HashMap<&'static str, Constructor>,
}

impl MountTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with every island of the application
    pub fn standard() -> Self {
        let mut table = Self::new();
        table
            .register("transaction", views::transaction::mount)
            .register("import", views::import::mount)
            .register("favs", views::settings::mount_favs)
            .register("joints", views::settings::mount_joints)
            .register("currencies", views::settings::mount_currencies)
            .register("account-edit", views::account_edit::mount)
            .register("account-view", views::account_view::mount);
        table
    }

    pub fn register(
        &mut self,
        name: &'static str,
        constructor: impl Fn(&IslandContext<'_>) -> ApiResult<Node> + Send + Sync + 'static,
    ) -> &mut Self {
        self.constructors.insert(name, Box::new(constructor));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    pub fn mount(&self, name: &str, ctx: &IslandContext<'_>) -> ApiResult<Node> {
        match self.constructors.get(name) {
            Some(constructor) => constructor(ctx),
            None => {
                warn!("No island registered under '{}'", name);
                Ok(Node::empty())
            }
        }
    }

    /// Render each declared mount point once, in order
    pub fn mount_all(&self, names: &[&str], ctx: &IslandContext<'_>) -> ApiResult<Node> {
        let mut seen = Vec::new();
        let mut nodes = Vec::new();
        for name in names {
            if seen.contains(name) {
                continue;
            }
            seen.push(*name);
            let island = self.mount(name, ctx)?;
            nodes.push(tag("div", "").attr("data-island", *name).build([island]));
        }
        Ok(Node::Fragment(nodes))
    }
}
