//! Spatial clustering of positioned fragments into visual rows and columns.
//!
//! Both passes are linear scans over bucket representatives in creation
//! order, so the first bucket within tolerance always wins.

use super::GridOptions;
use crate::model::PositionedFragment;

/// A fragment with its assigned 1-based column within its visual row.
#[derive(Debug, Clone, Copy)]
pub struct ClusteredFragment<'a> {
    /// Column index inside the visual row
    pub column: u32,
    /// The source fragment
    pub fragment: &'a PositionedFragment,
}

/// Fragments judged to lie on the same rendered line, left to right.
#[derive(Debug, Clone)]
pub struct VisualRow<'a> {
    /// Normalized top of the row's representative fragment
    pub top: f64,
    /// Fragments sorted by `left`, each with its column
    pub fragments: Vec<ClusteredFragment<'a>>,
}

impl VisualRow<'_> {
    /// Number of distinct columns in the row.
    pub fn column_count(&self) -> u32 {
        self.fragments.iter().map(|f| f.column).max().unwrap_or(0)
    }

    /// Check if the row has no fragments.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// Groups fragments by Y then X tolerance.
#[derive(Debug, Clone)]
pub struct SpatialClusterer {
    row_bucket_size: f64,
    row_tolerance: f64,
    column_tolerance: f64,
}

impl SpatialClusterer {
    /// Create a clusterer from grid options.
    pub fn new(options: &GridOptions) -> Self {
        Self {
            row_bucket_size: options.row_bucket_size,
            row_tolerance: options.row_tolerance,
            column_tolerance: options.column_tolerance,
        }
    }

    /// Round a top coordinate to the nearest bucket multiple.
    pub fn normalize_top(&self, top: f64) -> f64 {
        (top / self.row_bucket_size).round() * self.row_bucket_size
    }

    /// Cluster fragments into visual rows, top to bottom.
    ///
    /// Fragments with blank text or non-finite coordinates are dropped.
    pub fn cluster<'a, I>(&self, fragments: I) -> Vec<VisualRow<'a>>
    where
        I: IntoIterator<Item = &'a PositionedFragment>,
    {
        let mut items: Vec<(f64, &'a PositionedFragment)> = fragments
            .into_iter()
            .filter(|f| {
                let usable =
                    !f.text.trim().is_empty() && f.top.is_finite() && f.left.is_finite();
                if !usable && !f.text.trim().is_empty() {
                    log::debug!("dropping fragment {:?} with non-finite position", f.text);
                }
                usable
            })
            .map(|f| (self.normalize_top(f.top), f))
            .collect();

        items.sort_by(|a, b| {
            a.0.total_cmp(&b.0)
                .then_with(|| a.1.left.total_cmp(&b.1.left))
        });

        let mut buckets: Vec<(f64, Vec<&'a PositionedFragment>)> = Vec::new();
        for (top, fragment) in items {
            match buckets
                .iter_mut()
                .find(|(rep, _)| (top - *rep).abs() <= self.row_tolerance)
            {
                Some((_, members)) => members.push(fragment),
                None => buckets.push((top, vec![fragment])),
            }
        }

        let rows: Vec<VisualRow<'a>> = buckets
            .into_iter()
            .map(|(top, members)| VisualRow {
                top,
                fragments: self.assign_columns(members),
            })
            .collect();

        log::debug!("SpatialClusterer: {} visual rows", rows.len());
        rows
    }

    /// Assign gap-free 1-based columns to the fragments of one row.
    pub fn assign_columns<'a>(
        &self,
        mut fragments: Vec<&'a PositionedFragment>,
    ) -> Vec<ClusteredFragment<'a>> {
        fragments.sort_by(|a, b| a.left.total_cmp(&b.left));

        let mut representatives: Vec<f64> = Vec::new();
        let mut membership: Vec<usize> = Vec::with_capacity(fragments.len());
        for fragment in &fragments {
            let found = representatives
                .iter()
                .position(|rep| (fragment.left - rep).abs() <= self.column_tolerance);
            let bucket = match found {
                Some(bucket) => bucket,
                None => {
                    representatives.push(fragment.left);
                    representatives.len() - 1
                }
            };
            membership.push(bucket);
        }

        let mut order: Vec<usize> = (0..representatives.len()).collect();
        order.sort_by(|a, b| representatives[*a].total_cmp(&representatives[*b]));
        let mut column_of = vec![0u32; representatives.len()];
        for (rank, bucket) in order.into_iter().enumerate() {
            column_of[bucket] = rank as u32 + 1;
        }

        fragments
            .into_iter()
            .zip(membership)
            .map(|(fragment, bucket)| ClusteredFragment {
                column: column_of[bucket],
                fragment,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(text: &str, top: f64, left: f64) -> PositionedFragment {
        PositionedFragment::new(text, top, left)
    }

    fn columns(row: &VisualRow<'_>) -> Vec<(String, u32)> {
        row.fragments
            .iter()
            .map(|f| (f.fragment.text.clone(), f.column))
            .collect()
    }

    #[test]
    fn test_normalize_top() {
        let clusterer = SpatialClusterer::new(&GridOptions::default());
        assert_eq!(clusterer.normalize_top(102.4), 100.0);
        assert_eq!(clusterer.normalize_top(102.5), 105.0);
        assert_eq!(clusterer.normalize_top(0.0), 0.0);
    }

    #[test]
    fn test_rows_absorb_jitter() {
        let clusterer = SpatialClusterer::new(&GridOptions::default());
        let frags = vec![
            frag("a", 100.0, 10.0),
            frag("b", 102.0, 100.0),
            frag("c", 111.0, 200.0),
            frag("d", 125.0, 10.0),
        ];
        let rows = clusterer.cluster(&frags);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].fragments.len(), 3);
        assert_eq!(rows[1].fragments.len(), 1);
        assert_eq!(rows[1].top, 125.0);
    }

    #[test]
    fn test_row_representative_is_first_member() {
        let clusterer = SpatialClusterer::new(&GridOptions::default());
        let frags = vec![
            frag("top", 0.0, 0.0),
            frag("low", 20.0, 0.0),
            frag("between", 10.0, 50.0),
            frag("edge", 12.0, 90.0),
        ];
        let rows = clusterer.cluster(&frags);

        assert_eq!(rows.len(), 2);
        let first: Vec<_> = rows[0].fragments.iter().map(|f| f.fragment.text.as_str()).collect();
        assert_eq!(first, vec!["top", "between", "edge"]);
    }

    #[test]
    fn test_close_lefts_share_a_column() {
        let clusterer = SpatialClusterer::new(&GridOptions::default());
        let frags = vec![
            frag("far", 50.0, 205.0),
            frag("start", 50.0, 10.0),
            frag("mid", 50.0, 200.0),
        ];
        let rows = clusterer.cluster(&frags);

        assert_eq!(
            columns(&rows[0]),
            vec![
                ("start".to_string(), 1),
                ("mid".to_string(), 2),
                ("far".to_string(), 2)
            ]
        );
        assert_eq!(rows[0].column_count(), 2);
    }

    #[test]
    fn test_spread_lefts_get_own_columns() {
        let clusterer = SpatialClusterer::new(&GridOptions::default());
        let frags: Vec<_> = [10.0, 100.0, 200.0, 300.0]
            .iter()
            .enumerate()
            .map(|(i, left)| frag(&format!("c{}", i), 40.0, *left))
            .collect();
        let rows = clusterer.cluster(&frags);

        let cols: Vec<u32> = rows[0].fragments.iter().map(|f| f.column).collect();
        assert_eq!(cols, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_blank_and_non_finite_fragments_dropped() {
        let clusterer = SpatialClusterer::new(&GridOptions::default());
        let frags = vec![
            frag("  ", 0.0, 0.0),
            frag("nan", f64::NAN, 0.0),
            frag("ok", 0.0, 0.0),
        ];
        let rows = clusterer.cluster(&frags);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].fragments.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        let clusterer = SpatialClusterer::new(&GridOptions::default());
        assert!(clusterer.cluster(&Vec::<PositionedFragment>::new()).is_empty());
    }
}
