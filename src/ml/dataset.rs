use burn::data::dataset::Dataset;
use ndarray::Array2;

/// One scaled feature row and its class index.
#[derive(Debug, Clone)]
pub struct TabularRow {
    pub features: Vec<f32>,
    pub label:    usize,
}

pub struct TabularDataset {
    rows: Vec<TabularRow>,
}

impl TabularDataset {
    /// Pairs matrix rows with `labels`; both must have the same length.
    pub fn labelled(matrix: &Array2<f32>, labels: &[usize]) -> Self {
        let rows = matrix
            .rows()
            .into_iter()
            .zip(labels)
            .map(|(row, &label)| TabularRow { features: row.to_vec(), label })
            .collect();
        Self { rows }
    }

    /// Rows for prediction. Every label is 0 and is never read.
    pub fn unlabelled(matrix: &Array2<f32>) -> Self {
        let rows = matrix
            .rows()
            .into_iter()
            .map(|row| TabularRow { features: row.to_vec(), label: 0 })
            .collect();
        Self { rows }
    }
}

impl Dataset<TabularRow> for TabularDataset {
    fn get(&self, index: usize) -> Option<TabularRow> {
        self.rows.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_rows_keep_matrix_order() {
        let x  = array![[1.0f32, 2.0], [3.0, 4.0]];
        let ds = TabularDataset::labelled(&x, &[1, 0]);
        assert_eq!(ds.len(), 2);

        let second = ds.get(1).unwrap();
        assert_eq!(second.features, vec![3.0, 4.0]);
        assert_eq!(second.label, 0);
        assert!(ds.get(2).is_none());
    }

    #[test]
    fn test_unlabelled_covers_every_row() {
        let x = array![[1.0f32], [2.0], [3.0]];
        assert_eq!(TabularDataset::unlabelled(&x).len(), 3);
    }
}
