use std::collections::BTreeSet;

use serde::Serialize;

use crate::catalog::compare_names;
use crate::domain::{Dataset, Structure, TaskCategory};

/// Current filter choices. Blank or empty criteria never exclude a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub organ: Option<String>,
    pub staining: Option<String>,
    pub structure: BTreeSet<Structure>,
    pub tasks: BTreeSet<TaskCategory>,
    pub year: Option<String>,
    pub name_query: Option<String>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        active(&self.organ).is_none()
            && active(&self.staining).is_none()
            && self.structure.is_empty()
            && self.tasks.is_empty()
            && active(&self.year).is_none()
            && active(&self.name_query).is_none()
    }

    pub fn matches(&self, dataset: &Dataset) -> bool {
        if let Some(organ) = active(&self.organ) {
            if dataset.organs_canonical != organ {
                return false;
            }
        }
        if let Some(staining) = active(&self.staining) {
            if dataset.staining_canonical != staining {
                return false;
            }
        }
        if !self
            .structure
            .iter()
            .all(|structure| dataset.structure_canonical.contains(structure))
        {
            return false;
        }
        if !self
            .tasks
            .iter()
            .all(|task| dataset.tasks_canonical.contains(task))
        {
            return false;
        }
        if let Some(year) = active(&self.year) {
            if dataset.year.as_deref() != Some(year) {
                return false;
            }
        }
        if let Some(query) = active(&self.name_query) {
            let query = query.to_lowercase();
            if !dataset.name.to_lowercase().contains(&query) {
                return false;
            }
        }
        true
    }

    pub fn structure_summary(&self) -> String {
        summarize(self.structure.iter().map(|structure| structure.label()))
    }

    pub fn task_summary(&self) -> String {
        summarize(self.tasks.iter().map(|task| task.label()))
    }
}

fn active(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// "All" for nothing selected, the label for one, a count otherwise.
pub fn summarize<'a>(labels: impl ExactSizeIterator<Item = &'a str>) -> String {
    let count = labels.len();
    let mut labels = labels;
    match count {
        0 => "All".to_string(),
        1 => labels.next().unwrap_or_default().to_string(),
        n => format!("{n} selected"),
    }
}

/// Visible subset of `datasets` for `selection`, sorted by name.
pub fn apply_filters<'a>(datasets: &'a [Dataset], selection: &Selection) -> Vec<&'a Dataset> {
    let mut filtered: Vec<&Dataset> = datasets
        .iter()
        .filter(|dataset| selection.matches(dataset))
        .collect();
    filtered.sort_by(|a, b| compare_names(&a.name, &b.name));
    filtered
}

/// Values offered by each filter control, derived from the loaded catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub organs: Vec<String>,
    pub staining: Vec<String>,
    pub structure: Vec<Structure>,
    pub tasks: Vec<TaskCategory>,
    pub years: Vec<String>,
}

impl FilterOptions {
    pub fn from_datasets(datasets: &[Dataset]) -> Self {
        let mut organs = BTreeSet::new();
        let mut staining = BTreeSet::new();
        let mut structure = BTreeSet::new();
        let mut tasks = BTreeSet::new();
        let mut years = BTreeSet::new();

        for dataset in datasets {
            if !dataset.organs_canonical.is_empty() {
                organs.insert(dataset.organs_canonical.clone());
            }
            if !dataset.staining_canonical.is_empty() {
                staining.insert(dataset.staining_canonical.clone());
            }
            structure.extend(dataset.structure_canonical.iter().copied());
            tasks.extend(dataset.tasks_canonical.iter().copied());
            if let Some(year) = &dataset.year {
                years.insert(year.clone());
            }
        }

        let mut structure: Vec<Structure> = structure.into_iter().collect();
        if structure.is_empty() {
            structure = Structure::ALL.to_vec();
        }

        Self {
            organs: multiple_last(organs),
            staining: multiple_last(staining),
            structure,
            tasks: tasks.into_iter().collect(),
            years: years.into_iter().rev().collect(),
        }
    }
}

fn multiple_last(values: BTreeSet<String>) -> Vec<String> {
    let mut values: Vec<String> = values.into_iter().collect();
    values.sort_by(|a, b| match (a == "Multiple", b == "Multiple") {
        (true, false) => std::cmp::Ordering::Greater,
        (false, true) => std::cmp::Ordering::Less,
        _ => compare_names(a, b),
    });
    values
}
