//! Block types and dice-to-sequence derivation.

use serde::{Deserialize, Serialize};

/// The kind of block a sequence places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    Attack,
    Defense,
    Destroy,
}

impl BlockType {
    pub const fn name(self) -> &'static str {
        match self {
            BlockType::Attack => "attack",
            BlockType::Defense => "defense",
            BlockType::Destroy => "destroy",
        }
    }
}

impl std::fmt::Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// An ordered, mandatory group of same-type placements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sequence {
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub nb_blocks: u32,
}

impl Sequence {
    pub const fn new(block_type: BlockType, nb_blocks: u32) -> Self {
        Sequence {
            block_type,
            nb_blocks,
        }
    }
}

impl std::fmt::Display for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let plural = if self.nb_blocks > 1 { "s" } else { "" };
        write!(f, "{} {} block{}", self.nb_blocks, self.block_type, plural)
    }
}

/// Maps one die value (or a dice sum) to its placement obligations.
///
/// Values outside 1..=6 give nothing.
pub fn dice_value_to_blocks(value: u32) -> Option<Sequence> {
    let (block_type, nb_blocks) = match value {
        1 => (BlockType::Destroy, 1),
        2 => (BlockType::Defense, 1),
        3 => (BlockType::Defense, 2),
        4 => (BlockType::Defense, 3),
        5 => (BlockType::Attack, 1),
        6 => (BlockType::Attack, 2),
        _ => return None,
    };
    Some(Sequence::new(block_type, nb_blocks))
}

/// One aggregated sequence per value, in input order.
pub fn derive_sequences(values: &[u32]) -> Vec<Sequence> {
    values
        .iter()
        .filter_map(|&v| dice_value_to_blocks(v))
        .collect()
}

/// The same placements as `derive_sequences`, flattened into single-block
/// units. Used to display progress block by block.
pub fn explode_sequences(values: &[u32]) -> Vec<Sequence> {
    derive_sequences(values)
        .into_iter()
        .flat_map(|seq| (0..seq.nb_blocks).map(move |_| Sequence::new(seq.block_type, 1)))
        .collect()
}
