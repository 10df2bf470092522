// Render-row tree over coverage rows, with per-row expand/collapse state.

use std::collections::HashSet;

use crate::model::Row;

/// Address of a row in the tree: child indices from the root list down.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RowPath(Vec<usize>);

impl RowPath {
    pub fn root(index: usize) -> Self {
        RowPath(vec![index])
    }

    pub fn child(&self, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(index);
        RowPath(path)
    }

    pub fn depth(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

/// A row together with its expansion children.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderNode<'a> {
    pub row: &'a Row,
    pub path: RowPath,
    pub children: Vec<RenderNode<'a>>,
}

impl RenderNode<'_> {
    /// Leaves (rows without sub-rows) are never expandable.
    pub fn is_expandable(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Mirror the row tree, exposing each row's sub-rows as its children.
pub fn build_rows(rows: &[Row]) -> Vec<RenderNode<'_>> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| build_node(row, RowPath::root(i)))
        .collect()
}

fn build_node(row: &Row, path: RowPath) -> RenderNode<'_> {
    let children = row
        .sub_rows
        .iter()
        .enumerate()
        .map(|(i, child)| build_node(child, path.child(i)))
        .collect();
    RenderNode {
        row,
        path,
        children,
    }
}

/// Look up the row at `path`.
pub fn row_at<'a>(rows: &'a [Row], path: &RowPath) -> Option<&'a Row> {
    let (first, rest) = path.indices().split_first()?;
    let mut row = rows.get(*first)?;
    for &i in rest {
        row = row.sub_rows.get(i)?;
    }
    Some(row)
}

/// A row as it appears in the flattened, expansion-aware display order.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRow<'a> {
    pub row: &'a Row,
    pub path: RowPath,
    pub depth: usize,
    pub expandable: bool,
    pub expanded: bool,
}

/// Which rows are expanded. Everything starts collapsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: HashSet<RowPath>,
}

impl ExpansionState {
    pub fn is_expanded(&self, path: &RowPath) -> bool {
        self.expanded.contains(path)
    }

    /// Flip the row at `path`. Returns `false` (and does nothing) for leaves
    /// and unknown paths.
    pub fn toggle(&mut self, rows: &[Row], path: &RowPath) -> bool {
        let expand = !self.is_expanded(path);
        self.set(rows, path, expand)
    }

    /// Expand or collapse the row at `path`. Returns `false` for leaves and
    /// unknown paths.
    pub fn set(&mut self, rows: &[Row], path: &RowPath, expanded: bool) -> bool {
        match row_at(rows, path) {
            Some(row) if !row.sub_rows.is_empty() => {
                if expanded {
                    self.expanded.insert(path.clone());
                } else {
                    self.expanded.remove(path);
                }
                true
            }
            _ => false,
        }
    }

    /// Flatten `rows` depth-first, descending only into expanded rows.
    pub fn flatten<'a>(&self, rows: &'a [Row]) -> Vec<FlatRow<'a>> {
        let mut out = Vec::new();
        for node in build_rows(rows) {
            self.push_node(&node, &mut out);
        }
        out
    }

    fn push_node<'a>(&self, node: &RenderNode<'a>, out: &mut Vec<FlatRow<'a>>) {
        let expanded = node.is_expandable() && self.is_expanded(&node.path);
        out.push(FlatRow {
            row: node.row,
            path: node.path.clone(),
            depth: node.path.depth(),
            expandable: node.is_expandable(),
            expanded,
        });
        if expanded {
            for child in &node.children {
                self.push_node(child, out);
            }
        }
    }
}
