use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use trivia_core::model::Question;

/// Picks the questions for one session out of a matching pool.
pub trait QuestionSampler: Send {
    /// Up to `count` distinct entries of `pool`, in random order.
    fn sample(&mut self, pool: Vec<Question>, count: usize) -> Vec<Question>;
}

/// Samples with the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSampler;

impl QuestionSampler for RandomSampler {
    fn sample(&mut self, pool: Vec<Question>, count: usize) -> Vec<Question> {
        draw(&mut rand::rng(), pool, count)
    }
}

/// Reproducible sampling for tests and replays.
#[derive(Debug, Clone)]
pub struct SeededSampler {
    rng: StdRng,
}

impl SeededSampler {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl QuestionSampler for SeededSampler {
    fn sample(&mut self, pool: Vec<Question>, count: usize) -> Vec<Question> {
        draw(&mut self.rng, pool, count)
    }
}

fn draw<R: rand::Rng + ?Sized>(rng: &mut R, mut pool: Vec<Question>, count: usize) -> Vec<Question> {
    let count = count.min(pool.len());
    let (chosen, _rest) = pool.partial_shuffle(rng, count);
    chosen.to_vec()
}
