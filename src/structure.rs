use crate::domain::{DatasetRecord, Structure};

const CELL_KEYWORDS: &[&str] = &["nuclei", "nucleus", "cell"];
const TISSUE_KEYWORDS: &[&str] = &["tissue", "gland", "wsi", "segment"];

/// Decides whether a dataset covers cell-level entities, tissue-level
/// entities, or both. The result is never empty.
pub fn infer_structure(record: &DatasetRecord, tasks: &[String]) -> Vec<Structure> {
    if let Some(explicit) = record.structure.as_ref().filter(|values| !values.is_empty()) {
        return explicit
            .iter()
            .map(|value| {
                if value.to_lowercase() == "cell" {
                    Structure::Cell
                } else {
                    Structure::Tissue
                }
            })
            .collect();
    }

    let text = [
        record.description.as_deref(),
        record.size.as_deref(),
        record.data.as_deref(),
        record.kind.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase();

    let has_cell = CELL_KEYWORDS.iter().any(|keyword| text.contains(keyword))
        || tasks
            .iter()
            .any(|task| task == "detection" || task.contains("seg"));
    let has_tissue = TISSUE_KEYWORDS.iter().any(|keyword| text.contains(keyword))
        || tasks
            .iter()
            .any(|task| task.contains("classi") || task == "registration");

    match (has_cell, has_tissue) {
        (true, false) => vec![Structure::Cell],
        (false, true) => vec![Structure::Tissue],
        _ => vec![Structure::Cell, Structure::Tissue],
    }
}
