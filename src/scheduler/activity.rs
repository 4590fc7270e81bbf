use crate::store::{OpKind, BLOCK_COUNT};
use rand::Rng;

/// What a single tick does: one block, one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Activity {
    pub block: usize,
    pub kind: OpKind,
}

impl Activity {
    /// Draw a block uniformly from the file and a read or write with equal odds.
    pub(crate) fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let block = rng.gen_range(0..BLOCK_COUNT);
        let kind = if rng.gen_bool(0.5) { OpKind::Read } else { OpKind::Write };
        Self { block, kind }
    }
}
