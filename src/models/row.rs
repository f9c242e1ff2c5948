use std::collections::{BTreeMap, BTreeSet};

/// One CSV record keyed by column name.
///
/// Columns are kept in a sorted map; their order only matters when the output
/// header is built, and that header is sorted anyway.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    fields: BTreeMap<String, String>,
}

impl Row {
    /// Value of a column, `None` if the row has no such column
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Value of a column, treating an empty string the same as an absent one
    pub fn non_empty(&self, column: &str) -> Option<&str> {
        self.get(column).filter(|v| !v.is_empty())
    }

    /// Set a column, replacing any previous value
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(column.into(), value.into());
    }

    /// Combine two rows; on a shared column the value from `right` wins
    pub fn merged_with(&self, right: &Row) -> Row {
        let mut fields = self.fields.clone();
        fields.extend(right.fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        Row { fields }
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A parsed CSV document: its header line and its rows in input order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    /// Column names as they appear in the header line
    pub headers: Vec<String>,
    /// Rows in input order
    pub rows: Vec<Row>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every column name seen in the header or in any row
    pub fn column_names(&self) -> BTreeSet<String> {
        let mut names: BTreeSet<String> = self.headers.iter().cloned().collect();
        for row in &self.rows {
            names.extend(row.columns().map(str::to_string));
        }
        names
    }
}
