//! Canonical labels for free-text organ, staining and task metadata.
//!
//! Each category is an ordered rule table evaluated first-match-wins against
//! the trimmed, lowercased input. Order matters: composite values such as
//! "multiple organs (breast, lung)" must hit `Multiple` before any single
//! organ rule sees them.

use crate::domain::{Dataset, DatasetRecord, RawTask, TaskCategory};
use crate::structure::infer_structure;

use Pattern::{Compact, Contains, ContainsUnless, Exact};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    Contains(&'static str),
    Exact(&'static str),
    /// Equal after removing all whitespace.
    Compact(&'static str),
    /// Contains the needle and none of the blockers.
    ContainsUnless(&'static str, &'static [&'static str]),
}

impl Pattern {
    fn matches(&self, lower: &str) -> bool {
        match self {
            Pattern::Contains(needle) => lower.contains(needle),
            Pattern::Exact(expected) => lower == *expected,
            Pattern::Compact(expected) => {
                lower.chars().filter(|ch| !ch.is_whitespace()).eq(expected.chars())
            }
            Pattern::ContainsUnless(needle, blockers) => {
                lower.contains(needle) && !blockers.iter().any(|blocker| lower.contains(blocker))
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Rule<L: 'static> {
    pub label: L,
    pub any_of: &'static [Pattern],
}

impl<L: Copy> Rule<L> {
    const fn new(label: L, any_of: &'static [Pattern]) -> Self {
        Self { label, any_of }
    }
}

pub const ORGAN_RULES: &[Rule<&str>] = &[
    Rule::new("Multiple", &[Contains("multiple")]),
    Rule::new("Colon", &[Contains("colon"), Contains("colorectal")]),
    Rule::new("Lymph node", &[Contains("lymph node")]),
    Rule::new("Breast", &[Contains("breast")]),
    Rule::new("Skin", &[Contains("skin")]),
    Rule::new("Lung", &[Contains("lung")]),
    Rule::new("Liver", &[Contains("liver")]),
    Rule::new("Brain", &[Contains("brain")]),
    Rule::new("Prostate", &[Contains("prostate")]),
    Rule::new("Melanoma", &[Contains("melanoma")]),
    Rule::new("Blood", &[Contains("blood")]),
    Rule::new("Lymphocyte", &[Contains("lymphocyte")]),
    Rule::new("Kidney", &[Contains("kidney")]),
    Rule::new("Pancreas", &[Contains("pancreas")]),
    Rule::new("Adrenal", &[Contains("adrenal")]),
    Rule::new("Stomach", &[Contains("stomach")]),
    Rule::new("Thyroid", &[Contains("thyroid")]),
    Rule::new("Bladder", &[Contains("bladder")]),
    Rule::new("Ovary", &[Contains("ovarian"), Contains("ovary")]),
    Rule::new("Uterus", &[Contains("uterus")]),
    Rule::new("Testis", &[Contains("testis"), Contains("testes")]),
    Rule::new("Cervix", &[Contains("cervix")]),
    Rule::new("Esophagus", &[Contains("esophagus")]),
    Rule::new("Bile-duct", &[Contains("bile-duct")]),
    Rule::new("Head & neck", &[Contains("headneck")]),
    Rule::new("Larynx", &[Contains("larynx")]),
    Rule::new("Pleura", &[Contains("pleura")]),
    Rule::new("Thymus", &[Contains("thymus")]),
    Rule::new("Mediastinum", &[Contains("mediastinum")]),
];

pub const STAINING_RULES: &[Rule<&str>] = &[
    Rule::new(
        "Multiple",
        &[Contains("multiple"), Contains("多种"), Contains("模态")],
    ),
    Rule::new(
        "H&E",
        &[
            Compact("h&e"),
            ContainsUnless("h&e", &["multiple", "ihc", "giemsa"]),
        ],
    ),
    Rule::new("IHC", &[ContainsUnless("ihc", &["multiple"])]),
    Rule::new(
        "Jenner-Giemsa",
        &[Contains("jenner-giemsa"), Contains("giemsa")],
    ),
    Rule::new("H&E", &[Contains("h&e")]),
];

pub const TASK_RULES: &[Rule<TaskCategory>] = &[
    Rule::new(
        TaskCategory::Segmentation,
        &[Exact("seg"), Contains("segmentation"), Contains("分割")],
    ),
    Rule::new(
        TaskCategory::Classification,
        &[Exact("classi"), Contains("classification"), Contains("分类")],
    ),
    Rule::new(
        TaskCategory::Detection,
        &[Exact("detection"), Contains("cell detection"), Contains("检测")],
    ),
    Rule::new(
        TaskCategory::Registration,
        &[Exact("registration"), Contains("配准")],
    ),
];

pub fn first_match<L: Copy>(rules: &[Rule<L>], lower: &str) -> Option<L> {
    rules
        .iter()
        .find(|rule| rule.any_of.iter().any(|pattern| pattern.matches(lower)))
        .map(|rule| rule.label)
}

pub fn normalize_organ(raw: Option<&str>) -> String {
    normalize_with(ORGAN_RULES, raw)
}

pub fn normalize_staining(raw: Option<&str>) -> String {
    normalize_with(STAINING_RULES, raw)
}

pub fn normalize_task(raw: &str) -> TaskCategory {
    let lower = raw.trim().to_lowercase();
    if lower.is_empty() {
        return TaskCategory::Other;
    }
    first_match(TASK_RULES, &lower).unwrap_or(TaskCategory::Other)
}

fn normalize_with(rules: &[Rule<&str>], raw: Option<&str>) -> String {
    let trimmed = raw.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return String::new();
    }
    match first_match(rules, &trimmed.to_lowercase()) {
        Some(label) => label.to_string(),
        None => fallback_label(trimmed),
    }
}

/// First whitespace-delimited token with its first character uppercased.
pub fn fallback_label(trimmed: &str) -> String {
    let token = trimmed.split_whitespace().next().unwrap_or(trimmed);
    if token.len() < trimmed.len() {
        tracing::debug!(raw = trimmed, label = token, "unmapped label truncated to first word");
    }
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Splits a raw task value into lowercased, trimmed, non-empty tokens.
pub fn parse_tasks(task: Option<&RawTask>) -> Vec<String> {
    let tokens: Vec<&str> = match task {
        None => return Vec::new(),
        Some(RawTask::One(value)) => value.split(['+', ',', '|']).collect(),
        Some(RawTask::Many(values)) => values.iter().map(String::as_str).collect(),
    };
    tokens
        .into_iter()
        .map(|token| token.trim().to_lowercase())
        .filter(|token| !token.is_empty())
        .collect()
}

/// Maps task tokens to categories, keeping first-seen order without duplicates.
pub fn canonical_tasks(tokens: &[String]) -> Vec<TaskCategory> {
    let mut canonical = Vec::new();
    for token in tokens {
        let category = normalize_task(token);
        if !canonical.contains(&category) {
            canonical.push(category);
        }
    }
    canonical
}

/// Decorates a raw record with its canonical fields. Returns `None` when the
/// record has no usable id.
pub fn decorate(record: DatasetRecord) -> Option<Dataset> {
    let id = record.id.clone().filter(|id| !id.is_empty())?;
    let tasks = parse_tasks(record.task.as_ref());
    let structure_canonical = infer_structure(&record, &tasks);

    Some(Dataset {
        id,
        name: record.name.clone().unwrap_or_default(),
        year: record.year.clone(),
        organs_canonical: normalize_organ(record.organs.as_deref()),
        staining_canonical: normalize_staining(record.staining.as_deref()),
        tasks_canonical: canonical_tasks(&tasks),
        structure_canonical,
        organs: record.organs,
        staining: record.staining,
        task: record.task.map(|task| task.join(" + ")),
        tasks,
        size: record.size,
        data: record.data,
        kind: record.kind,
        other: record.other,
        description: record.description,
        links: record.links.unwrap_or_default(),
    })
}
