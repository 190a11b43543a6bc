// SPDX-License-Identifier: MPL-2.0
//! Graphviz description of the colorization pipeline.
//!
//! Only DOT source is produced; render it with `dot -Tpng`.

use crate::error::Result;
use std::path::Path;

pub const DEFAULT_OUTPUT: &str = "colorization_pipeline.dot";

/// Pipeline stages in order, as (node id, label).
pub const STAGES: [(&str, &str); 7] = [
    ("A", "Input Image (grayscale or color)"),
    ("B", "Lab Conversion"),
    ("C", "Lightness Resize 224x224, L - 50"),
    ("D", "Network Forward Pass (class logits)"),
    ("E", "Cluster Decoding (ab at 56x56)"),
    ("F", "Chrominance Upsampling + Original L"),
    ("G", "Colorized Image (sRGB, 8-bit)"),
];

/// DOT source with one node per stage and an edge between consecutive ones.
pub fn pipeline_dot() -> String {
    let mut dot = String::from("// Colorization Pipeline\ndigraph {\n");
    for (id, label) in STAGES {
        dot.push_str(&format!("\t{id} [label=\"{label}\"]\n"));
    }
    for pair in STAGES.windows(2) {
        dot.push_str(&format!("\t{} -> {}\n", pair[0].0, pair[1].0));
    }
    dot.push_str("}\n");
    dot
}

/// Writes [`pipeline_dot`] to `path`.
pub fn write_pipeline_dot(path: &Path) -> Result<()> {
    std::fs::write(path, pipeline_dot())?;
    Ok(())
}
