use super::model::Cell;

/// Keep the (x, y) pairs that can be plotted: both present and y >= 0.
///
/// Negative readings are treated like missing ones, which is how the scan
/// sheets flag channels that were not read out. Order is preserved and the
/// two returned vectors always have the same length.
pub fn winnow(xs: &[Cell], ys: &[Cell]) -> (Vec<f64>, Vec<f64>) {
    xs.iter()
        .zip(ys)
        .filter_map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) if *y >= 0.0 => Some((*x, *y)),
            _ => None,
        })
        .unzip()
}

/// Present, non-negative values of a column.
pub fn non_negative(values: &[Cell]) -> impl Iterator<Item = f64> + '_ {
    values.iter().flatten().copied().filter(|v| *v >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_missing_and_negative_y_in_order() {
        let xs = [Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)];
        let ys = [Some(10.0), None, Some(-3.0), Some(0.0), Some(7.5)];

        let (x, y) = winnow(&xs, &ys);
        assert_eq!(x, vec![1.0, 4.0, 5.0]);
        assert_eq!(y, vec![10.0, 0.0, 7.5]);
    }

    #[test]
    fn retained_count_matches_non_negative_y() {
        let xs: Vec<Cell> = (0..50).map(|i| Some(i as f64)).collect();
        let ys: Vec<Cell> = (0..50)
            .map(|i| match i % 4 {
                0 => None,
                1 => Some(-(i as f64)),
                _ => Some(i as f64),
            })
            .collect();

        let (x, y) = winnow(&xs, &ys);
        let expected = non_negative(&ys).count();
        assert_eq!(x.len(), expected);
        assert_eq!(y.len(), expected);
        assert!(y.iter().all(|v| *v >= 0.0));
        assert!(x.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn missing_x_cannot_be_placed() {
        let (x, y) = winnow(&[None, Some(2.0)], &[Some(1.0), Some(1.0)]);
        assert_eq!(x, vec![2.0]);
        assert_eq!(y, vec![1.0]);
    }
}
