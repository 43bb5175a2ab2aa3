use rand::{distributions::Standard, Rng};

use crate::config::INPUT_SIZE;

pub type Vector = [f32; INPUT_SIZE];

/// A random vector labelled with the index of its largest component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub vector: Vector,
    pub label: usize,
}

/// Index of the largest value. Ties go to the first one, empty input to 0.
pub fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, value) in values.iter().enumerate() {
        if *value > values[best] {
            best = i;
        }
    }
    best
}

/// Draws every component uniformly from `[0, 1)`.
pub fn build_sample<R: Rng + ?Sized>(rng: &mut R) -> Sample {
    let mut vector = [0.0; INPUT_SIZE];
    for x in vector.iter_mut() {
        *x = rng.sample(Standard);
    }
    Sample {
        vector,
        label: argmax(&vector),
    }
}

/// Samples held as two parallel vectors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub vectors: Vec<Vector>,
    pub labels: Vec<usize>,
}

/// A borrowed run of consecutive samples.
#[derive(Debug, Clone, Copy)]
pub struct Batch<'a> {
    pub vectors: &'a [Vector],
    pub labels: &'a [usize],
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn push(&mut self, sample: Sample) {
        self.vectors.push(sample.vector);
        self.labels.push(sample.label);
    }

    /// Consecutive batches of exactly `batch_size` samples. The remainder is dropped.
    pub fn batches(&self, batch_size: usize) -> impl Iterator<Item = Batch<'_>> {
        // chunks_exact panics on 0
        let size = batch_size.max(1);
        let count = if batch_size == 0 {
            0
        } else {
            self.len() / size
        };
        self.vectors
            .chunks_exact(size)
            .zip(self.labels.chunks_exact(size))
            .take(count)
            .map(|(vectors, labels)| Batch { vectors, labels })
    }
}

impl FromIterator<Sample> for Dataset {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        let mut dataset = Dataset::default();
        for sample in iter {
            dataset.push(sample);
        }
        dataset
    }
}

pub fn build_dataset<R: Rng + ?Sized>(rng: &mut R, total_samples: usize) -> Dataset {
    (0..total_samples).map(|_| build_sample(rng)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_argmax() {
        assert_eq!(0, argmax(&[0.9, 0.1, 0.2]));
        assert_eq!(1, argmax(&[0.1, 0.9, 0.2]));
        assert_eq!(2, argmax(&[0.1, 0.2, 0.9]));
        assert_eq!(0, argmax(&[0.5, 0.5, 0.5]));
        assert_eq!(1, argmax(&[0.1, 0.7, 0.7]));
        assert_eq!(0, argmax(&[]));
    }

    #[test]
    fn test_build_sample_in_unit_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let sample = build_sample(&mut rng);
            for x in sample.vector {
                assert!((0.0..1.0).contains(&x));
            }
        }
    }

    #[test]
    fn test_build_dataset_lengths_match() {
        let mut rng = StdRng::seed_from_u64(1);
        for n in [0, 1, 17, 500] {
            let dataset = build_dataset(&mut rng, n);
            assert_eq!(n, dataset.len());
            assert_eq!(dataset.vectors.len(), dataset.labels.len());
        }
    }

    #[test]
    fn test_batches_drop_remainder() {
        let mut rng = StdRng::seed_from_u64(2);
        let dataset = build_dataset(&mut rng, 45);
        let batches: Vec<Batch> = dataset.batches(20).collect();
        assert_eq!(2, batches.len());
        for batch in batches.iter() {
            assert_eq!(20, batch.vectors.len());
            assert_eq!(20, batch.labels.len());
        }
        assert_eq!(dataset.vectors[20], batches[1].vectors[0]);
        assert_eq!(0, dataset.batches(0).count());
    }

    proptest! {
        #[test]
        fn label_is_index_of_largest(seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let sample = build_sample(&mut rng);
            let largest = sample.vector.iter().cloned().fold(f32::MIN, f32::max);
            prop_assert_eq!(largest, sample.vector[sample.label]);
            for x in sample.vector[..sample.label].iter() {
                prop_assert!(*x < largest);
            }
        }

        #[test]
        fn argmax_points_at_maximum(values in prop::collection::vec(-1.0e3f32..1.0e3, 1..10)) {
            let index = argmax(&values);
            for x in values.iter() {
                prop_assert!(*x <= values[index]);
            }
        }
    }
}
