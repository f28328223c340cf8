//! Huffman code trees: greedy construction, header (de)serialization and
//! per-symbol encode/decode.

use std::collections::{BTreeMap, HashMap};

use crate::error::{CompressError, Result};
use crate::io::{BitReader, BitWriter};
use crate::priority_queue::{PriorityQueue, DEFAULT_CAPACITY};

/// Occurrence count per byte value. Symbols that never occur are absent.
pub type FrequencyTable = BTreeMap<u8, u64>;

/// Header marker preceding a leaf symbol.
const LEAF: bool = false;
/// Header marker preceding a left and a right subtree.
const PARENT: bool = true;

/// Codeword bit for descending to the left child.
const LEFT: bool = false;
/// Codeword bit for descending to the right child.
const RIGHT: bool = true;

/// Index of a node in a [`HuffmanCode`]'s arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Leaf(u8),
    Internal { left: NodeId, right: NodeId },
}

#[derive(Debug, Clone)]
pub struct HuffmanNode {
    kind: NodeKind,
    weight: u64,
    parent: Option<NodeId>,
}

impl HuffmanNode {
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn symbol(&self) -> Option<u8> {
        match self.kind {
            NodeKind::Leaf(symbol) => Some(symbol),
            NodeKind::Internal { .. } => None,
        }
    }

    pub fn children(&self) -> Option<(NodeId, NodeId)> {
        match self.kind {
            NodeKind::Leaf(_) => None,
            NodeKind::Internal { left, right } => Some((left, right)),
        }
    }

    /// Frequency for leaves, sum of the children for internal nodes. Trees
    /// read back from a header carry zero weights.
    pub fn weight(&self) -> u64 {
        self.weight
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

/// Node storage shared by both ways of building a tree. Children are linked
/// to their parent when the parent is created.
#[derive(Default)]
struct Arena {
    nodes: Vec<HuffmanNode>,
}

impl Arena {
    fn leaf(&mut self, symbol: u8, weight: u64) -> NodeId {
        self.push(NodeKind::Leaf(symbol), weight)
    }

    fn internal(&mut self, left: NodeId, right: NodeId) -> NodeId {
        let weight = self.nodes[left.0].weight + self.nodes[right.0].weight;
        let id = self.push(NodeKind::Internal { left, right }, weight);
        self.nodes[left.0].parent = Some(id);
        self.nodes[right.0].parent = Some(id);
        id
    }

    fn push(&mut self, kind: NodeKind, weight: u64) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(HuffmanNode {
            kind,
            weight,
            parent: None,
        });
        id
    }
}

/// A queued subtree during construction.
struct Subtree {
    weight: u64,
    id: NodeId,
}

/// An immutable prefix code over byte symbols.
#[derive(Debug, Clone)]
pub struct HuffmanCode {
    nodes: Vec<HuffmanNode>,
    root: NodeId,
    leaves: HashMap<u8, NodeId>,
    codewords: HashMap<u8, Vec<bool>>,
}

impl HuffmanCode {
    /// Builds a code with Huffman's greedy merge. Fails with
    /// `InvalidArgument` if `freqs` is empty.
    pub fn from_frequencies(freqs: &FrequencyTable) -> Result<Self> {
        Self::build(freqs, DEFAULT_CAPACITY)
    }

    pub(crate) fn build(freqs: &FrequencyTable, queue_capacity: usize) -> Result<Self> {
        if freqs.is_empty() {
            return Err(CompressError::invalid_argument(
                "cannot build a Huffman code from an empty frequency table",
            ));
        }

        let mut arena = Arena::default();
        let mut queue = PriorityQueue::with_capacity_and_comparator(
            queue_capacity,
            |a: &Subtree, b: &Subtree| a.weight.cmp(&b.weight),
        )?;

        for (&symbol, &weight) in freqs {
            let id = arena.leaf(symbol, weight);
            queue.offer(Subtree { weight, id });
        }

        while let Some(left) = queue.poll() {
            let Some(right) = queue.poll() else {
                return Ok(Self::from_arena(arena, left.id));
            };
            let id = arena.internal(left.id, right.id);
            let weight = arena.nodes[id.0].weight;
            queue.offer(Subtree { weight, id });
        }

        Err(CompressError::invalid_argument("no subtree left after merging"))
    }

    /// Reads a tree written by [`write_header`](Self::write_header).
    ///
    /// Parent markers push a placeholder; each leaf is pushed and the top of
    /// the stack is collapsed while it reads placeholder, child, child. The
    /// header ends once a single complete tree remains.
    pub fn read_header<R: BitReader + ?Sized>(reader: &mut R) -> Result<Self> {
        let mut arena = Arena::default();
        let mut stack: Vec<Option<NodeId>> = Vec::new();
        let mut seen = [false; 256];

        while let Some(bit) = reader.read_bit()? {
            if bit == PARENT {
                stack.push(None);
                continue;
            }

            let symbol = reader
                .read_byte()?
                .ok_or_else(|| CompressError::invalid_format("header ends before a leaf symbol"))?;
            if std::mem::replace(&mut seen[symbol as usize], true) {
                return Err(CompressError::invalid_format(format!(
                    "header holds symbol 0x{:02x} more than once",
                    symbol
                )));
            }
            stack.push(Some(arena.leaf(symbol, 0)));

            while let [.., None, Some(left), Some(right)] = stack[..] {
                stack.truncate(stack.len() - 3);
                stack.push(Some(arena.internal(left, right)));
            }

            if stack.len() == 1 {
                break;
            }
        }

        match stack[..] {
            [Some(root)] => Ok(Self::from_arena(arena, root)),
            _ => Err(CompressError::invalid_format(
                "header does not describe exactly one tree",
            )),
        }
    }

    fn from_arena(arena: Arena, root: NodeId) -> Self {
        let leaves: HashMap<u8, NodeId> = arena
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| node.symbol().map(|symbol| (symbol, NodeId(index))))
            .collect();
        let codewords = leaves
            .iter()
            .map(|(&symbol, &leaf)| (symbol, path_to_leaf(&arena.nodes, leaf)))
            .collect();
        Self {
            nodes: arena.nodes,
            root,
            leaves,
            codewords,
        }
    }

    /// Writes the tree in pre-order: `LEAF` then the symbol byte for a leaf,
    /// `PARENT` then the left and right subtrees for an internal node.
    pub fn write_header<W: BitWriter + ?Sized>(&self, writer: &mut W) -> Result<()> {
        self.write_subtree(self.root, writer)
    }

    fn write_subtree<W: BitWriter + ?Sized>(&self, id: NodeId, writer: &mut W) -> Result<()> {
        match self.node(id).kind {
            NodeKind::Leaf(symbol) => {
                writer.write_bit(LEAF)?;
                writer.write_byte(symbol)
            }
            NodeKind::Internal { left, right } => {
                writer.write_bit(PARENT)?;
                self.write_subtree(left, writer)?;
                self.write_subtree(right, writer)
            }
        }
    }

    /// Writes the codeword for `symbol`. A single-leaf tree writes nothing.
    pub fn encode<W: BitWriter + ?Sized>(&self, symbol: u8, writer: &mut W) -> Result<()> {
        let path = self.codeword(symbol).ok_or_else(|| {
            CompressError::invalid_argument(format!(
                "symbol 0x{:02x} is not part of this code",
                symbol
            ))
        })?;
        for &bit in path {
            writer.write_bit(bit)?;
        }
        Ok(())
    }

    /// Follows codeword bits from the root to a leaf and returns its symbol.
    pub fn decode<R: BitReader + ?Sized>(&self, reader: &mut R) -> Result<u8> {
        let mut id = self.root;
        loop {
            match self.node(id).kind {
                NodeKind::Leaf(symbol) => return Ok(symbol),
                NodeKind::Internal { left, right } => {
                    let bit = reader
                        .read_bit()?
                        .ok_or(CompressError::UnexpectedEof("Huffman codeword"))?;
                    id = if bit == RIGHT { right } else { left };
                }
            }
        }
    }

    /// Root-to-leaf path for `symbol`, or `None` if the code lacks it.
    pub fn codeword(&self, symbol: u8) -> Option<&[bool]> {
        self.codewords.get(&symbol).map(Vec::as_slice)
    }

    /// Every symbol paired with its codeword.
    pub fn codebook(&self) -> BTreeMap<u8, Vec<bool>> {
        self.codewords
            .iter()
            .map(|(&symbol, path)| (symbol, path.clone()))
            .collect()
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &HuffmanNode {
        &self.nodes[id.0]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn symbol_count(&self) -> usize {
        self.leaves.len()
    }

    pub fn contains(&self, symbol: u8) -> bool {
        self.leaves.contains_key(&symbol)
    }

    /// Arena index of a node, stable for the lifetime of the code.
    pub fn index(&self, id: NodeId) -> usize {
        id.0
    }
}

/// Walks parent links from `leaf` to the root, then reverses the turns.
fn path_to_leaf(nodes: &[HuffmanNode], leaf: NodeId) -> Vec<bool> {
    let mut current = leaf;
    let mut path = Vec::new();
    while let Some(parent) = nodes[current.0].parent {
        let is_left =
            matches!(nodes[parent.0].kind, NodeKind::Internal { left, .. } if left == current);
        path.push(if is_left { LEFT } else { RIGHT });
        current = parent;
    }
    path.reverse();
    path
}
