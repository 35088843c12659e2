//! Random node ids.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::NodeId;

/// URL-safe id alphabet.
const ALPHABET: &[u8] = b"useandom-26T198340PX75pxJACKVERYMINDBUSHWOLF_GQZbfghjklqvwyzrict";

/// Length of generated ids.
pub const ID_LENGTH: usize = 21;

/// Generates 21-character URL-safe node ids.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    rng: StdRng,
}

impl IdGenerator {
    /// Seeded generators repeat the same id sequence; `None` draws from entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Produce the next id.
    pub fn next_id(&mut self) -> NodeId {
        let id: String = (0..ID_LENGTH)
            .map(|_| char::from(ALPHABET[self.rng.gen_range(0..ALPHABET.len())]))
            .collect();
        NodeId(id)
    }
}
