//! Table definition and match types.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

use super::identity::TableIdentity;

/// Searchable shape of one table: its identity, primary-key columns and
/// textual columns. Both column sets are sorted and deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableDefinition {
    identity: TableIdentity,
    primary_key_columns: BTreeSet<String>,
    text_columns: BTreeSet<String>,
}

impl TableDefinition {
    /// # Errors
    ///
    /// Returns `SearchError::InvalidArgument` if any column name is empty.
    pub fn new<P, T>(identity: TableIdentity, primary_key_columns: P, text_columns: T) -> Result<Self>
    where
        P: IntoIterator,
        P::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        let primary_key_columns = collect_names(&identity, "primary key", primary_key_columns)?;
        let text_columns = collect_names(&identity, "text", text_columns)?;
        Ok(Self {
            identity,
            primary_key_columns,
            text_columns,
        })
    }

    pub fn identity(&self) -> &TableIdentity {
        &self.identity
    }

    pub fn primary_key_columns(&self) -> &BTreeSet<String> {
        &self.primary_key_columns
    }

    pub fn text_columns(&self) -> &BTreeSet<String> {
        &self.text_columns
    }

    pub fn has_text_columns(&self) -> bool {
        !self.text_columns.is_empty()
    }

    /// Sorted union of primary-key and text columns: the select list of a
    /// search query.
    pub fn search_columns(&self) -> BTreeSet<&str> {
        self.primary_key_columns
            .iter()
            .chain(self.text_columns.iter())
            .map(String::as_str)
            .collect()
    }
}

fn collect_names<I>(identity: &TableIdentity, role: &str, names: I) -> Result<BTreeSet<String>>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let mut set = BTreeSet::new();
    for name in names {
        let name: String = name.into();
        if name.is_empty() {
            return Err(SearchError::InvalidArgument(format!(
                "empty {} column name in definition of {}",
                role, identity
            )));
        }
        set.insert(name);
    }
    Ok(set)
}

/// One textual cell containing the searched substring.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextMatch {
    /// Primary-key column name to value, sorted by column name.
    pub row_primary_key: BTreeMap<String, String>,
    pub matching_column: String,
    /// The full cell value, not just the matched fragment.
    pub matching_value: String,
}

impl TextMatch {
    /// `k=v, k=v` rendering of the primary key.
    pub fn primary_key_display(&self) -> String {
        self.row_primary_key
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One row of a dialect's column catalog query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogColumn {
    pub name: String,
    pub type_name: String,
    pub is_primary_key: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> TableIdentity {
        TableIdentity::new_table("people")
    }

    #[test]
    fn test_definition_sorts_and_dedups() {
        let def = TableDefinition::new(people(), ["id", "id"], ["name", "bio", "name"]).unwrap();
        assert_eq!(def.primary_key_columns().iter().collect::<Vec<_>>(), ["id"]);
        assert_eq!(
            def.text_columns().iter().collect::<Vec<_>>(),
            ["bio", "name"]
        );
    }

    #[test]
    fn test_definition_rejects_empty_column_name() {
        let err = TableDefinition::new(people(), ["id"], [""]).unwrap_err();
        assert!(matches!(err, SearchError::InvalidArgument(_)));
        assert!(err.to_string().contains("people"));
    }

    #[test]
    fn test_definition_structural_equality() {
        let a = TableDefinition::new(people(), ["id"], ["bio", "name"]).unwrap();
        let b = TableDefinition::new(people(), vec!["id".to_string()], ["name", "bio"]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_search_columns_is_sorted_union() {
        let def = TableDefinition::new(people(), ["name", "id"], ["name", "bio"]).unwrap();
        assert_eq!(
            def.search_columns().into_iter().collect::<Vec<_>>(),
            ["bio", "id", "name"]
        );
    }

    #[test]
    fn test_definition_without_text_columns() {
        let def = TableDefinition::new(people(), ["id"], Vec::<String>::new()).unwrap();
        assert!(!def.has_text_columns());
    }

    #[test]
    fn test_primary_key_display() {
        let m = TextMatch {
            row_primary_key: BTreeMap::from([
                ("b".to_string(), "2".to_string()),
                ("a".to_string(), "1".to_string()),
            ]),
            matching_column: "bio".into(),
            matching_value: "loves gears".into(),
        };
        assert_eq!(m.primary_key_display(), "a=1, b=2");
    }
}
