//! Component-wise aggregation of chunk vectors.

/// Arithmetic mean across all chunk vectors, dimension by dimension.
///
/// Callers guarantee a non-empty slice of equal-length vectors; the orchestrator only
/// reaches aggregation once at least one chunk exists.
pub(crate) fn mean_vector(vectors: &[&[f32]]) -> Vec<f32> {
    debug_assert!(!vectors.is_empty());
    let dimension = vectors[0].len();
    let count = vectors.len() as f64;

    let mut sums = vec![0.0_f64; dimension];
    for vector in vectors {
        debug_assert_eq!(vector.len(), dimension);
        for (slot, value) in sums.iter_mut().zip(vector.iter()) {
            *slot += f64::from(*value);
        }
    }

    sums.into_iter().map(|sum| (sum / count) as f32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_vector_is_identity() {
        let vector = vec![0.1_f32, -2.5, 3.75, 0.0];
        let result = mean_vector(&[&vector]);
        assert_eq!(result, vector);
    }

    #[test]
    fn duplicate_vectors_average_to_themselves() {
        let vector = vec![1.5_f32, -0.25, 8.0];
        let result = mean_vector(&[&vector, &vector]);
        assert_eq!(result, vector);
    }

    #[test]
    fn mean_is_computed_per_dimension() {
        let a = vec![1.0_f32, 0.0, -3.0];
        let b = vec![3.0_f32, 2.0, 3.0];
        let result = mean_vector(&[&a, &b]);
        assert_eq!(result, vec![2.0, 1.0, 0.0]);

        for (d, value) in result.iter().enumerate() {
            let expected = (f64::from(a[d]) + f64::from(b[d])) / 2.0;
            assert!((f64::from(*value) - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn zero_vectors_pull_the_mean_down() {
        let real = vec![1.0_f32, 2.0];
        let zero = vec![0.0_f32, 0.0];
        let result = mean_vector(&[&real, &zero]);
        assert_eq!(result, vec![0.5, 1.0]);
    }
}
