use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform random pick over the active contacts.
#[derive(Debug)]
pub struct Selector<G> {
    rng: G,
}

impl<G: Rng> Selector<G> {
    pub fn new(rng: G) -> Self {
        Self { rng }
    }

    /// Returns one element of `candidates`, each index equally likely.
    ///
    /// Panics on an empty slice: the tracker only decides over a non-empty set,
    /// so an empty call means that invariant was bypassed.
    pub fn select_one<T: Copy>(&mut self, candidates: &[T]) -> T {
        assert!(
            !candidates.is_empty(),
            "select_one called with no candidates"
        );
        candidates[self.rng.gen_range(0..candidates.len())]
    }
}

impl Selector<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}
