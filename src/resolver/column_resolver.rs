use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    catalog::{Column, ColumnCatalog},
    resolver::AliasTable,
};

/// Which resolution step produced a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Exact,
    Alias,
    Fuzzy,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution<'c> {
    pub column: &'c Column,
    pub matched_by: MatchKind,
}

/// Binds loosely named fields onto catalog columns.
///
/// Steps, first hit wins:
/// 1. exact id match, ignoring case
/// 2. alias table (normalized hint), only if the target is in the catalog
/// 3. containment between the hint and a column label or id, catalog order
///
/// A miss returns `None`. Callers must not guess a column in that case.
#[derive(Debug, Clone, Default)]
pub struct ColumnResolver {
    aliases: AliasTable,
}

impl ColumnResolver {
    pub fn new(aliases: AliasTable) -> Self {
        Self { aliases }
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub fn resolve<'c>(&self, hint: &str, catalog: &'c ColumnCatalog) -> Option<&'c Column> {
        self.resolve_with_kind(hint, catalog).map(|r| r.column)
    }

    pub fn resolve_id(&self, hint: &str, catalog: &ColumnCatalog) -> Option<String> {
        self.resolve(hint, catalog).map(|c| c.id.clone())
    }

    pub fn resolve_with_kind<'c>(&self, hint: &str, catalog: &'c ColumnCatalog) -> Option<Resolution<'c>> {
        if AliasTable::normalize(hint).is_empty() {
            return None;
        }

        let resolution = Self::exact(hint, catalog)
            .or_else(|| self.alias(hint, catalog))
            .or_else(|| Self::fuzzy(hint, catalog));

        match &resolution {
            Some(r) => debug!(hint, column = %r.column.id, matched_by = ?r.matched_by, "resolved column"),
            None => debug!(hint, "no column binding"),
        }
        resolution
    }

    fn exact<'c>(hint: &str, catalog: &'c ColumnCatalog) -> Option<Resolution<'c>> {
        catalog
            .get_ignore_case(hint.trim())
            .map(|column| Resolution { column, matched_by: MatchKind::Exact })
    }

    fn alias<'c>(&self, hint: &str, catalog: &'c ColumnCatalog) -> Option<Resolution<'c>> {
        let target = self.aliases.get(hint)?;
        catalog
            .get(target)
            .map(|column| Resolution { column, matched_by: MatchKind::Alias })
    }

    fn fuzzy<'c>(hint: &str, catalog: &'c ColumnCatalog) -> Option<Resolution<'c>> {
        let hint = loose_text(hint);
        catalog
            .iter()
            .find(|column| {
                [loose_text(&column.label), loose_text(&column.id)]
                    .iter()
                    .any(|candidate| candidate.contains(&hint) || hint.contains(candidate.as_str()))
            })
            .map(|column| Resolution { column, matched_by: MatchKind::Fuzzy })
    }
}

fn loose_text(text: &str) -> String {
    text.replace('_', " ").trim().to_lowercase()
}
