//! Merge engine - applies partial updates onto an instance.
//!
//! An update is a document shaped like the instance document, holding only
//! the fields that changed:
//! - leaves are replaced wholesale; absent or `null` keeps the current value
//! - objects merge per supplied child
//! - dynamic collections merge per entry; an unseen key creates an entry
//!   from the template, a `null` entry asks for removal
//!
//! An unseen key whose fields were all rejected is not added.
//!
//! Merging never mutates its input. Problems are collected and the rest of
//! the update is still applied, unless the merger is strict.

mod policy;

pub use policy::*;

use serde_json::{Map, Value};
use tracing::{debug, trace, warn};
use tracker_schema::{
    describe_value, FieldKind, FieldNode, FieldPath, FieldShape, SchemaTree, SectionBody,
};

use crate::error::{EngineError, Mismatch, Problems, Result};
use crate::instance::{Entries, FieldValue, Instance, Record, SectionValue};
use crate::matching::match_names;
use crate::materialize::{materialize_node, materialize_record, materialize_section};

/// What a merge changed and what it refused.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    /// Leaves whose value changed.
    pub updated: Vec<FieldPath>,
    /// Collection entries created.
    pub added: Vec<FieldPath>,
    /// Collection entries removed.
    pub removed: Vec<FieldPath>,
    /// Parts of the update that were not applied.
    pub problems: Problems,
}

impl MergeReport {
    /// Check whether the update was applied in full.
    pub fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }

    /// Check whether the instance changed at all.
    pub fn changed(&self) -> bool {
        !(self.updated.is_empty() && self.added.is_empty() && self.removed.is_empty())
    }
}

/// The merged instance and its report.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub instance: Instance,
    pub report: MergeReport,
}

/// Merges updates into instances of one schema.
#[derive(Debug, Clone, Copy)]
pub struct Merger<'s> {
    schema: &'s SchemaTree,
    policy: MergePolicy,
    strict: bool,
}

impl<'s> Merger<'s> {
    /// Create a lenient merger with the default policies.
    pub fn new(schema: &'s SchemaTree) -> Self {
        Self {
            schema,
            policy: MergePolicy::default(),
            strict: false,
        }
    }

    pub fn with_policy(mut self, policy: MergePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// In strict mode any problem rejects the whole update.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Merge `update` into a copy of `instance`.
    ///
    /// Fails only in strict mode, with every problem the update had.
    pub fn merge(&self, instance: &Instance, update: &Value) -> Result<MergeOutcome> {
        let outcome = self.run(instance, update);
        if self.strict && !outcome.report.is_clean() {
            warn!(
                problems = outcome.report.problems.len(),
                "strict merge rejected update"
            );
            return Err(EngineError::Rejected(outcome.report.problems));
        }
        Ok(outcome)
    }

    fn run(&self, instance: &Instance, update: &Value) -> MergeOutcome {
        let mut next = instance.clone();
        let mut report = MergeReport::default();

        match update {
            Value::Null => {}
            Value::Object(map) => self.merge_sections(&mut next, map, &mut report),
            other => report.problems.push(
                FieldPath::root(),
                Mismatch::Shape {
                    expected: "an object",
                    found: describe_value(other),
                },
            ),
        }

        for problem in &report.problems {
            warn!(path = %problem.path, "rejected update field: {}", problem.kind);
        }
        debug!(
            updated = report.updated.len(),
            added = report.added.len(),
            removed = report.removed.len(),
            rejected = report.problems.len(),
            "merged update"
        );

        MergeOutcome {
            instance: next,
            report,
        }
    }

    fn merge_sections(
        &self,
        instance: &mut Instance,
        update: &Map<String, Value>,
        report: &mut MergeReport,
    ) {
        let sections = self.schema.sections();
        let slots = match_names(
            sections.iter().map(|s| &s.name),
            update,
            &FieldPath::root(),
            Mismatch::UnknownSection,
            &mut report.problems,
        );

        for (section, slot) in sections.iter().zip(slots) {
            let Some(value) = slot.filter(|v| !v.is_null()) else {
                continue;
            };
            let path = FieldPath::root().field(section.name.label());

            let target = instance
                .sections_mut()
                .entry(section.name.clone())
                .or_insert_with(|| materialize_section(section));
            let fits = matches!(
                (&section.body, &*target),
                (SectionBody::Field(_), SectionValue::Field(_))
                    | (SectionBody::Fields(_), SectionValue::Fields(_))
            );
            if !fits {
                trace!(%path, "replacing section of the wrong kind with defaults");
                *target = materialize_section(section);
            }

            match (&section.body, target) {
                (SectionBody::Field(node), SectionValue::Field(current)) => {
                    self.merge_field(node, current, value, &path, report)
                }
                (SectionBody::Fields(nodes), SectionValue::Fields(record)) => {
                    if let Some(map) = expect_object(value, &path, report) {
                        self.merge_record(nodes, record, map, &path, report);
                    }
                }
                _ => {}
            }
        }
    }

    fn merge_record(
        &self,
        nodes: &[FieldNode],
        record: &mut Record,
        update: &Map<String, Value>,
        path: &FieldPath,
        report: &mut MergeReport,
    ) {
        let slots = match_names(
            nodes.iter().map(|n| &n.name),
            update,
            path,
            Mismatch::UnknownField,
            &mut report.problems,
        );

        for (node, slot) in nodes.iter().zip(slots) {
            let Some(value) = slot.filter(|v| !v.is_null()) else {
                continue;
            };
            let current = record.get_or_insert_with(&node.name, || materialize_node(node));
            self.merge_field(node, current, value, &path.field(node.name.label()), report);
        }
    }

    fn merge_field(
        &self,
        node: &FieldNode,
        current: &mut FieldValue,
        value: &Value,
        path: &FieldPath,
        report: &mut MergeReport,
    ) {
        if value.is_null() {
            return;
        }
        if !current.fits(node.kind()) {
            trace!(%path, "replacing value of the wrong kind with defaults");
            *current = materialize_node(node);
        }

        match (&node.shape, current) {
            (FieldShape::Scalar(_) | FieldShape::List(_), FieldValue::Leaf(leaf)) => {
                self.merge_leaf(node.kind(), leaf, value, path, report)
            }
            (FieldShape::Object(children), FieldValue::Object(record)) => {
                if let Some(map) = expect_object(value, path, report) {
                    self.merge_record(children, record, map, path, report);
                }
            }
            (FieldShape::DynamicCollection(template), FieldValue::Collection(entries)) => {
                if let Some(map) = expect_object(value, path, report) {
                    self.merge_entries(template, entries, map, path, report);
                }
            }
            _ => {}
        }
    }

    fn merge_leaf(
        &self,
        kind: FieldKind,
        leaf: &mut Value,
        value: &Value,
        path: &FieldPath,
        report: &mut MergeReport,
    ) {
        if !kind.accepts(value) {
            report.problems.push(
                path.clone(),
                Mismatch::Shape {
                    expected: kind.describe(),
                    found: describe_value(value),
                },
            );
            return;
        }

        if kind == FieldKind::List && self.policy.list_merge == ListMergePolicy::Append {
            if let (Some(items), Some(extra)) = (leaf.as_array_mut(), value.as_array()) {
                if !extra.is_empty() {
                    items.extend(extra.iter().cloned());
                    report.updated.push(path.clone());
                }
                return;
            }
        }

        if *leaf != *value {
            *leaf = value.clone();
            report.updated.push(path.clone());
        }
    }

    fn merge_entries(
        &self,
        template: &[FieldNode],
        entries: &mut Entries,
        update: &Map<String, Value>,
        path: &FieldPath,
        report: &mut MergeReport,
    ) {
        for (key, value) in update {
            let entry_path = path.entry(key.as_str());

            if key.trim().is_empty() {
                report.problems.push(entry_path, Mismatch::EmptyKey);
                continue;
            }
            if value.is_null() {
                self.remove_entry(entries, key, entry_path, report);
                continue;
            }
            let Some(map) = expect_object(value, &entry_path, report) else {
                continue;
            };

            match entries.get_mut(key) {
                Some(record) => self.merge_record(template, record, map, &entry_path, report),
                None => {
                    let mut record = materialize_record(template);
                    let mut entry_report = MergeReport::default();
                    self.merge_record(template, &mut record, map, &entry_path, &mut entry_report);

                    let rejected = !entry_report.is_clean() && !entry_report.changed();
                    report.updated.append(&mut entry_report.updated);
                    report.added.append(&mut entry_report.added);
                    report.removed.append(&mut entry_report.removed);
                    report.problems.extend(entry_report.problems);
                    if rejected {
                        trace!(path = %entry_path, "dropped entry with nothing applied");
                        continue;
                    }

                    trace!(path = %entry_path, "added collection entry");
                    entries.insert(key.as_str(), record);
                    report.added.push(entry_path);
                }
            }
        }
    }

    fn remove_entry(
        &self,
        entries: &mut Entries,
        key: &str,
        path: FieldPath,
        report: &mut MergeReport,
    ) {
        if !entries.contains_key(key) {
            return;
        }
        match self.policy.collection_removal {
            RemovalPolicy::Forbid => report.problems.push(path, Mismatch::RemovalForbidden),
            RemovalPolicy::Allow => {
                entries.remove(key);
                trace!(%path, "removed collection entry");
                report.removed.push(path);
            }
            RemovalPolicy::Ignore => trace!(%path, "ignored entry removal"),
        }
    }
}

fn expect_object<'v>(
    value: &'v Value,
    path: &FieldPath,
    report: &mut MergeReport,
) -> Option<&'v Map<String, Value>> {
    let map = value.as_object();
    if map.is_none() {
        report.problems.push(
            path.clone(),
            Mismatch::Shape {
                expected: "an object",
                found: describe_value(value),
            },
        );
    }
    map
}

/// Merge `update` into a copy of `instance` with the default lenient merger.
pub fn merge(instance: &Instance, update: &Value, schema: &SchemaTree) -> MergeOutcome {
    Merger::new(schema).run(instance, update)
}
