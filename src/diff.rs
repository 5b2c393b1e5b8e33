//! Field-level diff of two product values documents.
//!
//! Each section has its own comparison strategy and its own label format.
//! The per-section results are merged, in [`Section::ALL`] order, into one
//! [`ChangeSet`] keyed by label.
//!
//! | Section | Label |
//! |---|---|
//! | common | `{field}` |
//! | categories | `categories` |
//! | channel specific, currency amount | `{field} ({currency}) - {channel}` |
//! | channel/locale specific, currency amount | `{field} ({currency}) - {channel}/{locale}` |
//! | channel/locale specific, plain value | `{field} - {channel}/{locale}` |
//!
//! Only the channel sections of the *new* document are walked, so a field,
//! locale or channel that exists only in the old document is not reported.
//! Plain (non-currency) values under `channel_specific` are not compared.
//!
//! # Examples
//!
//! ```
//! use pvdiff::diff;
//!
//! let old = r#"{"channel_specific": {"web": {"price": {"USD": "100"}}}}"#;
//! let new = r#"{"channel_specific": {"web": {"price": {"USD": "150"}}}}"#;
//!
//! let changes = diff(Some(old), Some(new));
//! let record = changes.get("price (USD) - web").unwrap();
//! assert_eq!(record.old.as_text(), "100");
//! assert_eq!(record.new.as_text(), "150");
//! ```

use crate::document::{FieldMap, FieldValue, ProductValues, Scalar, Section};
use crate::parser::{document_from_raw, parse_document};
use indexmap::IndexMap;
use serde::Serialize;

/// One detected difference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeRecord {
    /// Human-readable label, unique within a [`ChangeSet`].
    #[serde(rename = "name")]
    pub label: String,
    /// Section the change was detected in.
    #[serde(skip)]
    pub section: Section,
    /// Structured location: section key, then channel, locale, field and
    /// currency where they apply.
    #[serde(skip)]
    pub path: Vec<String>,
    pub old: Scalar,
    pub new: Scalar,
}

impl ChangeRecord {
    fn new(section: Section, path: Vec<String>, label: String, old: &Scalar, new: &Scalar) -> Self {
        Self {
            label,
            section,
            path,
            old: old.clone(),
            new: new.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.label
    }
}

/// Number of changes per section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionStats {
    pub common: usize,
    pub categories: usize,
    pub channel_specific: usize,
    pub channel_locale_specific: usize,
}

impl SectionStats {
    pub fn total(&self) -> usize {
        self.common + self.categories + self.channel_specific + self.channel_locale_specific
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn count(&self, section: Section) -> usize {
        match section {
            Section::Common => self.common,
            Section::Categories => self.categories,
            Section::ChannelSpecific => self.channel_specific,
            Section::ChannelLocaleSpecific => self.channel_locale_specific,
        }
    }

    fn record(&mut self, section: Section) {
        match section {
            Section::Common => self.common += 1,
            Section::Categories => self.categories += 1,
            Section::ChannelSpecific => self.channel_specific += 1,
            Section::ChannelLocaleSpecific => self.channel_locale_specific += 1,
        }
    }
}

/// Ordered mapping of label → [`ChangeRecord`], in detection order.
///
/// Serializes as the history entry map `{label: {name, old, new}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ChangeSet {
    records: IndexMap<String, ChangeRecord>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, label: &str) -> Option<&ChangeRecord> {
        self.records.get(label)
    }

    /// The underlying label → record map, in detection order.
    pub fn records(&self) -> &IndexMap<String, ChangeRecord> {
        &self.records
    }

    pub fn contains(&self, label: &str) -> bool {
        self.records.contains_key(label)
    }

    /// Inserts a record. A record with the same label is replaced and
    /// returned; the label keeps its original position.
    pub fn insert(&mut self, record: ChangeRecord) -> Option<ChangeRecord> {
        self.records.insert(record.label.clone(), record)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChangeRecord> {
        self.records.values()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn stats(&self) -> SectionStats {
        let mut stats = SectionStats::default();
        for record in self.iter() {
            stats.record(record.section);
        }
        stats
    }
}

impl FromIterator<ChangeRecord> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = ChangeRecord>>(iter: I) -> Self {
        let mut changes = ChangeSet::new();
        for record in iter {
            changes.insert(record);
        }
        changes
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a ChangeRecord;
    type IntoIter = indexmap::map::Values<'a, String, ChangeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.values()
    }
}

/// Diffs two encoded documents.
///
/// Absent or undecodable input is treated as an empty document, so this
/// never fails; the worst case is an empty [`ChangeSet`].
pub fn diff(old_raw: Option<&str>, new_raw: Option<&str>) -> ChangeSet {
    let old = parse_document(old_raw);
    let new = parse_document(new_raw);
    diff_documents(&old, &new)
}

/// Diffs two untyped stored values. Only JSON strings are decoded; any
/// other value counts as an empty document.
pub fn diff_raw(old_raw: &serde_json::Value, new_raw: &serde_json::Value) -> ChangeSet {
    diff_documents(&document_from_raw(old_raw), &document_from_raw(new_raw))
}

/// Diffs two decoded documents.
pub fn diff_documents(old: &ProductValues, new: &ProductValues) -> ChangeSet {
    let mut changes = ChangeSet::new();

    for section in Section::ALL {
        let records = match section {
            Section::Common => compare_common(&old.common, &new.common),
            Section::Categories => compare_categories(&old.categories, &new.categories),
            Section::ChannelSpecific => {
                compare_channel_specific(&old.channel_specific, &new.channel_specific)
            }
            Section::ChannelLocaleSpecific => compare_channel_locale_specific(
                &old.channel_locale_specific,
                &new.channel_locale_specific,
            ),
        };
        tracing::trace!(section = section.key(), changes = records.len(), "compared section");

        for record in records {
            if let Some(replaced) = changes.insert(record) {
                tracing::debug!(label = %replaced.label, "label reported by two sections, keeping the later one");
            }
        }
    }

    tracing::debug!(changes = changes.len(), "computed product values diff");
    changes
}

/// Compares the union of field names, old names first.
fn compare_common(
    old: &IndexMap<String, Scalar>,
    new: &IndexMap<String, Scalar>,
) -> Vec<ChangeRecord> {
    let empty = Scalar::empty();
    let fields = old
        .keys()
        .chain(new.keys().filter(|field| !old.contains_key(*field)));

    fields
        .filter_map(|field| {
            let old_value = old.get(field).unwrap_or(&empty);
            let new_value = new.get(field).unwrap_or(&empty);
            if old_value.loosely_equals(new_value) {
                return None;
            }
            Some(ChangeRecord::new(
                Section::Common,
                vec![Section::Common.key().to_string(), field.clone()],
                field.clone(),
                old_value,
                new_value,
            ))
        })
        .collect()
}

/// Compares the joined category lists. Reordering counts as a change.
fn compare_categories(old: &[Scalar], new: &[Scalar]) -> Vec<ChangeRecord> {
    let old_joined = join_categories(old);
    let new_joined = join_categories(new);

    if old_joined == new_joined {
        return Vec::new();
    }

    vec![ChangeRecord::new(
        Section::Categories,
        vec![Section::Categories.key().to_string()],
        Section::Categories.key().to_string(),
        &Scalar::Text(old_joined),
        &Scalar::Text(new_joined),
    )]
}

fn join_categories(categories: &[Scalar]) -> String {
    categories
        .iter()
        .map(Scalar::as_text)
        .collect::<Vec<_>>()
        .join(", ")
}

fn compare_channel_specific(
    old: &IndexMap<String, FieldMap>,
    new: &IndexMap<String, FieldMap>,
) -> Vec<ChangeRecord> {
    let empty = Scalar::empty();
    let mut records = Vec::new();

    for (channel, fields) in new {
        for (field, value) in fields {
            let FieldValue::CurrencyMap(amounts) = value else {
                continue;
            };
            for (currency, amount) in amounts {
                let old_amount = old
                    .get(channel)
                    .and_then(|fields| fields.get(field))
                    .and_then(|value| value.amount(currency))
                    .unwrap_or(&empty);
                if old_amount.loosely_equals(amount) {
                    continue;
                }
                records.push(ChangeRecord::new(
                    Section::ChannelSpecific,
                    vec![
                        Section::ChannelSpecific.key().to_string(),
                        channel.clone(),
                        field.clone(),
                        currency.clone(),
                    ],
                    format!("{} ({}) - {}", field, currency, channel),
                    old_amount,
                    amount,
                ));
            }
        }
    }

    records
}

fn compare_channel_locale_specific(
    old: &IndexMap<String, IndexMap<String, FieldMap>>,
    new: &IndexMap<String, IndexMap<String, FieldMap>>,
) -> Vec<ChangeRecord> {
    let empty = Scalar::empty();
    let mut records = Vec::new();

    for (channel, locales) in new {
        for (locale, fields) in locales {
            let old_fields = old.get(channel).and_then(|locales| locales.get(locale));

            for (field, value) in fields {
                let old_value = old_fields.and_then(|fields| fields.get(field));
                let base_path = vec![
                    Section::ChannelLocaleSpecific.key().to_string(),
                    channel.clone(),
                    locale.clone(),
                    field.clone(),
                ];

                match value {
                    FieldValue::CurrencyMap(amounts) => {
                        for (currency, amount) in amounts {
                            let old_amount = old_value
                                .and_then(|value| value.amount(currency))
                                .unwrap_or(&empty);
                            if old_amount.loosely_equals(amount) {
                                continue;
                            }
                            let mut path = base_path.clone();
                            path.push(currency.clone());
                            records.push(ChangeRecord::new(
                                Section::ChannelLocaleSpecific,
                                path,
                                format!("{} ({}) - {}/{}", field, currency, channel, locale),
                                old_amount,
                                amount,
                            ));
                        }
                    }
                    FieldValue::Scalar(new_value) => {
                        // A currency map never equals a plain value; its JSON
                        // text is only what gets displayed as the old value.
                        let (old_value, changed) = match old_value {
                            Some(map @ FieldValue::CurrencyMap(_)) => (map.as_scalar(), true),
                            Some(FieldValue::Scalar(old)) => {
                                (old.clone(), !old.loosely_equals(new_value))
                            }
                            None => (Scalar::empty(), !empty.loosely_equals(new_value)),
                        };
                        if !changed {
                            continue;
                        }
                        records.push(ChangeRecord::new(
                            Section::ChannelLocaleSpecific,
                            base_path,
                            format!("{} - {}/{}", field, channel, locale),
                            &old_value,
                            new_value,
                        ));
                    }
                }
            }
        }
    }

    records
}
