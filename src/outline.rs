//! Two-tier outline built from the flat heading list.
//!
//! h1 and h2 headings form the top level. Everything deeper nests under the
//! closest open h1/h2 heading, or is promoted to the top level when there is
//! none, so no heading is ever dropped.

use crate::headings::Heading;

/// A heading together with the headings nested beneath it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineNode {
    pub heading: Heading,
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    pub fn id(&self) -> &str {
        &self.heading.id
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Number of nodes in this subtree, including this one
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(OutlineNode::count).sum::<usize>()
    }
}

struct ArenaNode {
    heading: Heading,
    children: Vec<usize>,
}

/// Build the outline forest from headings in document order.
///
/// Open sections are tracked as a stack of arena indices. A heading closes
/// every open section at the same or a deeper level before it is placed.
pub fn build_outline(headings: &[Heading]) -> Vec<OutlineNode> {
    let mut arena: Vec<ArenaNode> = Vec::with_capacity(headings.len());
    let mut roots: Vec<usize> = Vec::new();
    let mut stack: Vec<usize> = Vec::new();

    for heading in headings {
        while let Some(&top) = stack.last() {
            if arena[top].heading.level >= heading.level {
                stack.pop();
            } else {
                break;
            }
        }

        let index = arena.len();
        arena.push(ArenaNode {
            heading: heading.clone(),
            children: Vec::new(),
        });

        match stack.last() {
            Some(&parent) if heading.level > 2 => arena[parent].children.push(index),
            _ => roots.push(index),
        }
        stack.push(index);
    }

    let mut slots: Vec<Option<ArenaNode>> = arena.into_iter().map(Some).collect();
    roots
        .into_iter()
        .filter_map(|index| take_node(&mut slots, index))
        .collect()
}

fn take_node(slots: &mut [Option<ArenaNode>], index: usize) -> Option<OutlineNode> {
    let node = slots.get_mut(index)?.take()?;
    let children = node
        .children
        .into_iter()
        .filter_map(|child| take_node(slots, child))
        .collect();
    Some(OutlineNode {
        heading: node.heading,
        children,
    })
}

/// All nodes of the forest in document order
pub fn flatten(outline: &[OutlineNode]) -> Vec<&OutlineNode> {
    let mut out = Vec::new();
    for node in outline {
        push_subtree(node, &mut out);
    }
    out
}

fn push_subtree<'a>(node: &'a OutlineNode, out: &mut Vec<&'a OutlineNode>) {
    out.push(node);
    for child in &node.children {
        push_subtree(child, out);
    }
}
