use crate::{engine::PlannedJoin, Result};

use geostore_core::{err, schema::TableJoin};
use std::collections::BTreeMap;

/// Join identity: order and key columns do not take part.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct JoinKey {
    from_table: String,
    to_table: String,
    from_columns: Vec<String>,
    to_columns: Vec<String>,
}

impl From<&TableJoin> for JoinKey {
    fn from(join: &TableJoin) -> Self {
        let (from_table, to_table, from_columns, to_columns) = join.condition_key();
        Self {
            from_table: from_table.to_string(),
            to_table: to_table.to_string(),
            from_columns: from_columns.to_vec(),
            to_columns: to_columns.to_vec(),
        }
    }
}

type Chain = Vec<JoinKey>;

fn chain_key(chain: &[&TableJoin]) -> Chain {
    chain.iter().map(|join| JoinKey::from(*join)).collect()
}

/// Join chains collected from a filter or a projection.
///
/// Chains are kept sorted, so the aliases handed out do not depend on the
/// order in which paths were visited. Every prefix of a chain is a join of
/// its own; two paths through the same joins share their aliases.
#[derive(Debug, Default)]
pub(crate) struct JoinSet {
    chains: BTreeMap<Chain, TableJoin>,
}

impl JoinSet {
    pub(crate) fn add(&mut self, chain: &[&TableJoin]) {
        for end in 1..=chain.len() {
            let join = chain[end - 1];
            let planned = self
                .chains
                .entry(chain_key(&chain[..end]))
                .or_insert_with(|| join.clone());

            // The same join may be declared with and without ordering or
            // keys
            if !planned.is_ordered() && join.is_ordered() {
                planned.order_columns = join.order_columns.clone();
                planned.numbered_order = join.numbered_order;
            }

            if planned.key_columns.is_empty() {
                planned.key_columns = join.key_columns.clone();
            }
        }
    }

    /// Hands out aliases `{prefix}2`, `{prefix}3`, ... with `{prefix}1` for
    /// the primary table.
    pub(crate) fn assign(self, prefix: &str) -> JoinAliases {
        let base = format!("{prefix}1");
        let mut aliases = BTreeMap::new();
        let mut joins = vec![];

        // A prefix sorts before its extensions, so parents are aliased
        // first.
        for (chain, join) in self.chains {
            let parent = match chain.split_last() {
                Some((_, [])) | None => base.clone(),
                Some((_, parent)) => aliases
                    .get(parent)
                    .cloned()
                    .unwrap_or_else(|| base.clone()),
            };

            let alias = format!("{prefix}{}", joins.len() + 2);
            aliases.insert(chain, alias.clone());
            joins.push(PlannedJoin {
                alias,
                parent,
                join,
            });
        }

        JoinAliases {
            base,
            aliases,
            joins,
        }
    }
}

#[derive(Debug)]
pub(crate) struct JoinAliases {
    base: String,
    aliases: BTreeMap<Chain, String>,
    joins: Vec<PlannedJoin>,
}

impl JoinAliases {
    pub(crate) fn base(&self) -> &str {
        &self.base
    }

    /// Alias of the table `chain` ends in.
    pub(crate) fn alias(&self, chain: &[&TableJoin]) -> Result<&str> {
        if chain.is_empty() {
            return Ok(&self.base);
        }

        self.aliases
            .get(&chain_key(chain))
            .map(String::as_str)
            .ok_or_else(|| err!("join chain was not planned: {}", chain[chain.len() - 1]))
    }

    pub(crate) fn joins(&self) -> &[PlannedJoin] {
        &self.joins
    }

    pub(crate) fn into_joins(self) -> Vec<PlannedJoin> {
        self.joins
    }
}
