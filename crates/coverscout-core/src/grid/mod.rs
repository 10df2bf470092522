// Comparison grid model: per-package column schema, coverage classification,
// and the expandable row tree for one solver result.
//
// +-------------+---------------------------+---------------------------+
// | Competition | Package 0 (even band)     | Package 1 (odd band)      |
// |             | $X/mo yearly [$Y monthly] | $X/mo yearly [$Y monthly] |
// |             +--------------+------------+--------------+------------+
// |             | Live Coverage| Highlights | Live Coverage| Highlights |
// +-------------+--------------+------------+--------------+------------+

pub mod price;
pub mod rows;

use std::collections::HashSet;

use crate::model::{BillingInterval, CoverageFormat, CoverageLevel, Game, Package, Row, SolverResponse};

use price::PriceSummary;
use rows::{ExpansionState, FlatRow, RowPath};

/// Header of the row-key column.
pub const KEY_HEADER: &str = "Competition";

// ---------------------------------------------------------------------------
// Coverage classification
// ---------------------------------------------------------------------------

/// Which glyph a cell shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoverageClass {
    Full,
    Partial,
    None,
}

impl CoverageClass {
    pub fn as_str(self) -> &'static str {
        match self {
            CoverageClass::Full => "full",
            CoverageClass::Partial => "partial",
            CoverageClass::None => "none",
        }
    }
}

/// FULL -> full, PARTIAL -> partial, anything else (NONE or missing) -> none.
pub fn classify(level: Option<CoverageLevel>) -> CoverageClass {
    match level {
        Some(CoverageLevel::Full) => CoverageClass::Full,
        Some(CoverageLevel::Partial) => CoverageClass::Partial,
        _ => CoverageClass::None,
    }
}

// ---------------------------------------------------------------------------
// Column schema
// ---------------------------------------------------------------------------

/// Names of the packages to emphasize.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightSet(HashSet<String>);

impl HighlightSet {
    pub fn from_packages(packages: &[Package]) -> Self {
        HighlightSet(packages.iter().map(|p| p.name.clone()).collect())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for HighlightSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        HighlightSet(iter.into_iter().map(Into::into).collect())
    }
}

/// Background band of a package column, derived from its index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Even,
    Odd,
}

impl Band {
    pub fn for_index(index: usize) -> Self {
        if index % 2 == 0 {
            Band::Even
        } else {
            Band::Odd
        }
    }
}

/// One of the two coverage sub-columns under a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafColumn {
    pub id: String,
    pub header: &'static str,
    pub format: CoverageFormat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageColumn {
    pub index: usize,
    pub name: String,
    /// "$X.XX/mo yearly"
    pub yearly_price: String,
    /// "$Y.YY/mo monthly", only when the package offers monthly billing.
    pub monthly_price: Option<String>,
    pub is_highlighted: bool,
    pub band: Band,
    pub leaves: [LeafColumn; 2],
}

impl PackageColumn {
    /// Classified coverage of `row` in the given sub-column.
    pub fn cell(&self, row: &Row, format: CoverageFormat) -> CoverageClass {
        classify(row.coverage(&self.name, format))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    pub key_header: &'static str,
    pub columns: Vec<PackageColumn>,
}

/// One column per package, in input order, each with live and highlights
/// leaf columns.
pub fn build_columns(packages: &[Package], highlighted: &HighlightSet) -> ColumnSchema {
    let columns = packages
        .iter()
        .enumerate()
        .map(|(index, package)| PackageColumn {
            index,
            name: package.name.clone(),
            yearly_price: price::yearly_line(package),
            monthly_price: price::monthly_line(package),
            is_highlighted: highlighted.contains(&package.name),
            band: Band::for_index(index),
            leaves: [
                LeafColumn {
                    id: format!("{}-live-coverage", package.name),
                    header: "Live Coverage",
                    format: CoverageFormat::Live,
                },
                LeafColumn {
                    id: format!("{}-highlights", package.name),
                    header: "Highlights",
                    format: CoverageFormat::Highlights,
                },
            ],
        })
        .collect();
    ColumnSchema {
        key_header: KEY_HEADER,
        columns,
    }
}

// ---------------------------------------------------------------------------
// ComparisonGrid
// ---------------------------------------------------------------------------

/// Everything needed to display one solver result. Replaced wholesale when a
/// new result arrives; expansion state never triggers a refetch.
#[derive(Debug, Clone)]
pub struct ComparisonGrid {
    response: SolverResponse,
    schema: ColumnSchema,
    expansion: ExpansionState,
}

impl ComparisonGrid {
    pub fn new(response: SolverResponse) -> Self {
        let highlighted = HighlightSet::from_packages(&response.result);
        let schema = build_columns(&response.packages, &highlighted);
        ComparisonGrid {
            response,
            schema,
            expansion: ExpansionState::default(),
        }
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    pub fn rows(&self) -> &[Row] {
        &self.response.rows
    }

    pub fn packages(&self) -> &[Package] {
        &self.response.packages
    }

    /// The highlighted packages that together cover the selection.
    pub fn result(&self) -> &[Package] {
        &self.response.result
    }

    pub fn games_not_covered(&self) -> Option<&[Game]> {
        self.response.games_not_covered.as_deref()
    }

    /// Rows in display order, honoring expansion.
    pub fn visible_rows(&self) -> Vec<FlatRow<'_>> {
        self.expansion.flatten(&self.response.rows)
    }

    pub fn is_expanded(&self, path: &RowPath) -> bool {
        self.expansion.is_expanded(path)
    }

    pub fn toggle(&mut self, path: &RowPath) -> bool {
        self.expansion.toggle(&self.response.rows, path)
    }

    pub fn set_expanded(&mut self, path: &RowPath, expanded: bool) -> bool {
        self.expansion.set(&self.response.rows, path, expanded)
    }

    /// Total monthly cost of the result under `billing`.
    pub fn price_summary(&self, billing: BillingInterval) -> PriceSummary {
        PriceSummary::compute(&self.response.result, billing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pkg(id: u64, name: &str, monthly: Option<u32>, yearly: u32) -> Package {
        Package {
            id,
            name: name.into(),
            monthly_price_cents: monthly,
            monthly_price_yearly_subscription_in_cents: yearly,
        }
    }

    #[test]
    fn classify_is_total() {
        assert_eq!(classify(Some(CoverageLevel::Full)).as_str(), "full");
        assert_eq!(classify(Some(CoverageLevel::Partial)).as_str(), "partial");
        assert_eq!(classify(Some(CoverageLevel::None)).as_str(), "none");
        assert_eq!(classify(None).as_str(), "none");
    }

    #[test]
    fn columns_carry_prices_and_highlight() {
        let packages = vec![pkg(1, "A", None, 1000), pkg(2, "B", Some(500), 900)];
        let highlighted: HighlightSet = ["B"].into_iter().collect();
        let schema = build_columns(&packages, &highlighted);

        assert_eq!(schema.key_header, "Competition");
        assert_eq!(schema.columns.len(), 2);

        let a = &schema.columns[0];
        assert_eq!(a.yearly_price, "$10.00/mo yearly");
        assert_eq!(a.monthly_price, None);
        assert!(!a.is_highlighted);

        let b = &schema.columns[1];
        assert_eq!(b.yearly_price, "$9.00/mo yearly");
        assert_eq!(b.monthly_price.as_deref(), Some("$5.00/mo monthly"));
        assert!(b.is_highlighted);
    }

    #[test]
    fn columns_band_by_index_and_name_leaves() {
        let packages = vec![pkg(1, "A", None, 1), pkg(2, "B", None, 1), pkg(3, "C", None, 1)];
        let schema = build_columns(&packages, &HighlightSet::default());
        let bands: Vec<Band> = schema.columns.iter().map(|c| c.band).collect();
        assert_eq!(bands, vec![Band::Even, Band::Odd, Band::Even]);
        assert_eq!(schema.columns[2].index, 2);
        assert_eq!(schema.columns[0].leaves[0].id, "A-live-coverage");
        assert_eq!(schema.columns[0].leaves[1].id, "A-highlights");
        assert_eq!(schema.columns[0].leaves[0].header, "Live Coverage");
        assert_eq!(schema.columns[0].leaves[1].format, CoverageFormat::Highlights);
    }

    #[test]
    fn banding_is_stable_under_reordering() {
        let forward = build_columns(
            &[pkg(1, "A", None, 1), pkg(2, "B", None, 1)],
            &HighlightSet::default(),
        );
        let reversed = build_columns(
            &[pkg(2, "B", None, 1), pkg(1, "A", None, 1)],
            &HighlightSet::default(),
        );
        assert_eq!(forward.columns[0].band, reversed.columns[0].band);
        assert_eq!(reversed.columns[0].name, "B");
        assert_eq!(reversed.columns[0].band, Band::Even);
    }

    #[test]
    fn parent_and_child_cells() {
        let response = SolverResponse {
            packages: vec![pkg(1, "A", None, 1000), pkg(2, "B", Some(500), 900)],
            rows: vec![Row::new("EPL")
                .with_coverage("A", CoverageLevel::Full)
                .with_sub_row(Row::new("Match1").with_coverage("A", CoverageLevel::Partial))],
            result: vec![pkg(2, "B", Some(500), 900)],
            games_not_covered: None,
        };
        let mut grid = ComparisonGrid::new(response);
        let a = grid.schema().columns[0].clone();
        let b = grid.schema().columns[1].clone();

        let rows = grid.visible_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(a.cell(rows[0].row, CoverageFormat::Live), CoverageClass::Full);
        assert_eq!(a.cell(rows[0].row, CoverageFormat::Highlights), CoverageClass::None);

        assert!(grid.toggle(&RowPath::root(0)));
        let rows = grid.visible_rows();
        assert_eq!(rows.len(), 2);
        let child = rows[1].row;
        assert_eq!(child.key, "Match1");
        assert_eq!(a.cell(child, CoverageFormat::Live), CoverageClass::Partial);
        assert_eq!(b.cell(child, CoverageFormat::Live), CoverageClass::None);
        assert!(!grid.toggle(&RowPath::root(0).child(0)));
    }

    #[test]
    fn grid_summary_and_highlights() {
        let response = SolverResponse {
            packages: vec![pkg(1, "A", None, 1000), pkg(2, "B", Some(500), 900)],
            rows: vec![],
            result: vec![pkg(2, "B", Some(500), 900)],
            games_not_covered: Some(vec![]),
        };
        let grid = ComparisonGrid::new(response);
        assert_eq!(grid.price_summary(BillingInterval::Yearly).total_cents, 900);
        assert_eq!(grid.price_summary(BillingInterval::Monthly).total_cents, 500);
        assert_eq!(grid.games_not_covered().map(<[Game]>::len), Some(0));
        assert!(grid.visible_rows().is_empty());
    }
}
