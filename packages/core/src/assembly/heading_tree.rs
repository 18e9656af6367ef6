//! Heading list to nested tree
//!
//! The parent of a heading is the nearest preceding heading with a strictly
//! smaller depth. A single stack pass assigns parents; a second pass builds
//! the nested nodes bottom-up.

use crate::models::{Heading, TocMenu, TocNode};

/// Nest a flat heading list
///
/// Nodes with children get `parent = true`, `expanded = true` and their
/// children sorted by `order`. Leaves get `parent = false` and neither
/// `items` nor `expanded`. In TOC mode every node links to `#<slug>`.
pub fn headings_to_tree(headings: &[Heading], is_toc: bool) -> Vec<TocNode> {
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); headings.len()];
    let mut roots: Vec<usize> = Vec::new();
    let mut stack: Vec<usize> = Vec::new();

    for (index, heading) in headings.iter().enumerate() {
        while let Some(&top) = stack.last() {
            if headings[top].depth >= heading.depth {
                stack.pop();
            } else {
                break;
            }
        }

        match stack.last() {
            Some(&parent) => children[parent].push(index),
            None => roots.push(index),
        }
        stack.push(index);
    }

    let mut built: Vec<Option<TocNode>> = vec![None; headings.len()];

    // Children always come after their parent, so build in reverse.
    for index in (0..headings.len()).rev() {
        let mut items: Vec<TocNode> = children[index]
            .iter()
            .filter_map(|&child| built[child].take())
            .collect();
        items.sort_by_key(|node| node.order);

        built[index] = Some(make_node(&headings[index], index, items, is_toc));
    }

    let mut tree: Vec<TocNode> = roots
        .iter()
        .filter_map(|&root| built[root].take())
        .collect();
    tree.sort_by_key(|node| node.order);
    tree
}

fn make_node(heading: &Heading, index: usize, items: Vec<TocNode>, is_toc: bool) -> TocNode {
    let has_children = !items.is_empty();
    TocNode {
        label: heading.label.clone(),
        slug: heading.slug.clone(),
        depth: heading.depth,
        link: if is_toc {
            format!("#{}", heading.slug)
        } else {
            String::new()
        },
        uid: heading.uid.clone(),
        order: if heading.line > 0 { heading.line } else { index + 1 },
        parent: has_children,
        expanded: has_children.then_some(true),
        items: has_children.then_some(items),
    }
}

/// Table of contents for a page; invisible when there are no headings
pub fn process_toc(headings: &[Heading]) -> TocMenu {
    if headings.is_empty() {
        return TocMenu::default();
    }
    TocMenu {
        items: headings_to_tree(headings, true),
        visible: true,
    }
}
