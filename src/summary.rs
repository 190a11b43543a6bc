// SPDX-License-Identifier: MPL-2.0
//! Grid table of the loaded model's layers.
//!
//! ```text
//! +-----------+------------+-------+---------------------------+
//! | Layer No. | Layer Name | Type  | No. of Parameters (Blobs) |
//! +===========+============+=======+===========================+
//! |         1 | input      | Input |                         0 |
//! +-----------+------------+-------+---------------------------+
//! ```

use crate::media::model::LayerInfo;

pub const HEADERS: [&str; 4] = ["Layer No.", "Layer Name", "Type", "No. of Parameters (Blobs)"];

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

const ALIGN: [Align; 4] = [Align::Right, Align::Left, Align::Left, Align::Right];

fn rule(widths: &[usize; 4], fill: char) -> String {
    let mut line = String::from("+");
    for width in widths {
        line.extend(std::iter::repeat_n(fill, width + 2));
        line.push('+');
    }
    line
}

fn row(cells: &[String; 4], widths: &[usize; 4]) -> String {
    let mut line = String::from("|");
    for ((cell, width), align) in cells.iter().zip(widths).zip(ALIGN) {
        let padded = match align {
            Align::Left => format!(" {cell:<width$} "),
            Align::Right => format!(" {cell:>width$} "),
        };
        line.push_str(&padded);
        line.push('|');
    }
    line
}

/// Renders `layers` as a grid table, one row per layer.
pub fn render_table(layers: &[LayerInfo]) -> String {
    let rows: Vec<[String; 4]> = layers
        .iter()
        .map(|layer| {
            [
                layer.index.to_string(),
                layer.name.clone(),
                layer.kind.clone(),
                layer.blobs.to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for cells in &rows {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let separator = rule(&widths, '-');
    let mut lines = vec![
        separator.clone(),
        row(&HEADERS.map(String::from), &widths),
        rule(&widths, '='),
    ];
    for cells in &rows {
        lines.push(row(cells, &widths));
        lines.push(separator.clone());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(index: usize, name: &str, kind: &str, blobs: usize) -> LayerInfo {
        LayerInfo {
            index,
            name: name.to_string(),
            kind: kind.to_string(),
            blobs,
        }
    }

    #[test]
    fn renders_grid_with_aligned_columns() {
        let table = render_table(&[
            layer(1, "input", "Input", 0),
            layer(2, "class8_ab", "Convolution", 1),
        ]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 7);
        assert_eq!(
            lines[1],
            "| Layer No. | Layer Name | Type        | No. of Parameters (Blobs) |"
        );
        assert!(lines[2].starts_with("+====="));
        assert_eq!(
            lines[3],
            "|         1 | input      | Input       |                         0 |"
        );
        assert_eq!(
            lines[5],
            "|         2 | class8_ab  | Convolution |                         1 |"
        );
        assert!(lines.iter().all(|l| l.chars().count() == lines[0].chars().count()));
    }

    #[test]
    fn long_names_widen_their_column() {
        let table = render_table(&[layer(1, "a_really_long_layer_name", "Scale", 1)]);
        assert!(table.contains("| a_really_long_layer_name |"));
    }

    #[test]
    fn empty_table_keeps_headers() {
        let table = render_table(&[]);
        assert_eq!(table.lines().count(), 3);
        assert!(table.contains("Layer Name"));
    }
}
