//! Graphviz rendering of a Huffman tree.

use std::fmt::Write;

use super::code::{HuffmanCode, NodeKind};

/// Renders `code` as a `digraph`. Edges are labelled with the codeword bit
/// they stand for.
pub fn render(code: &HuffmanCode) -> String {
    let mut out = String::from("digraph huffman {\n");
    let mut pending = vec![code.root()];

    while let Some(id) = pending.pop() {
        let node = code.node(id);
        let index = code.index(id);
        match node.kind() {
            NodeKind::Leaf(symbol) => {
                let _ = writeln!(
                    out,
                    "  n{} [shape=box, label=\"{}\\n{}\"];",
                    index,
                    symbol_label(symbol),
                    node.weight()
                );
            }
            NodeKind::Internal { left, right } => {
                let _ = writeln!(out, "  n{} [label=\"{}\"];", index, node.weight());
                let _ = writeln!(out, "  n{} -> n{} [label=\"0\"];", index, code.index(left));
                let _ = writeln!(out, "  n{} -> n{} [label=\"1\"];", index, code.index(right));
                pending.push(right);
                pending.push(left);
            }
        }
    }

    out.push_str("}\n");
    out
}

fn symbol_label(symbol: u8) -> String {
    match symbol {
        b'"' | b'\\' => format!("'\\{}'", symbol as char),
        0x21..=0x7e => format!("'{}'", symbol as char),
        _ => format!("0x{:02x}", symbol),
    }
}
