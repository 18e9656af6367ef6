//! Menu construction from document urls
//!
//! Pure functions over [`NavDocument`] rows. Every intermediate map is a
//! `BTreeMap` and every sort has a total tie-break on the url, so the same
//! rows and path always produce identical menus.

use crate::models::{MenuEntry, Menus, NavDocument, NavigationNode};
use std::collections::{BTreeMap, BTreeSet};

use super::section::{
    in_section, last_segment, normalize_url, parent_url, section_from_pathname, segments,
};

/// Both menus for `pathname`
pub fn build_menus_from(documents: &[NavDocument], pathname: &str) -> Menus {
    let current = normalize_url(pathname);
    let section = section_from_pathname(&current);

    Menus {
        top_level_menu: top_level_menu(documents, &section),
        section_tree: section_tree(documents, &section, &current),
        section,
    }
}

/// App bar entries: one per first segment, sorted by `(order, label)`
pub fn top_level_menu(documents: &[NavDocument], current_section: &str) -> Vec<MenuEntry> {
    let mut by_segment: BTreeMap<String, &NavDocument> = BTreeMap::new();

    for doc in documents {
        let url = normalize_url(&doc.url);
        let parts = segments(&url);
        if parts.len() > 1 {
            continue;
        }
        let key = parts.first().copied().unwrap_or("").to_string();

        let replace = match by_segment.get(&key) {
            None => true,
            // A section index page beats any other entry for the segment
            Some(existing) => normalize_url(&existing.url) != key && url == key,
        };
        if replace {
            by_segment.insert(key, doc);
        }
    }

    let mut entries: Vec<MenuEntry> = by_segment
        .values()
        .map(|doc| {
            let url = normalize_url(&doc.url);
            let section = section_from_pathname(&url);
            MenuEntry {
                label: label_for(doc, &url),
                order: doc.order,
                active: section == current_section,
                section,
                url,
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        (a.order, &a.label, &a.url).cmp(&(b.order, &b.label, &b.url))
    });
    entries
}

struct Seed {
    label: String,
    order: i64,
}

/// Sidebar tree of `section` with the path to `current` marked
pub fn section_tree(documents: &[NavDocument], section: &str, current: &str) -> Vec<NavigationNode> {
    let mut seeds: BTreeMap<String, Seed> = BTreeMap::new();

    for doc in documents {
        let url = normalize_url(&doc.url);
        if !in_section(&url, section) {
            continue;
        }
        let label = label_for(doc, &url);
        seeds.entry(url).or_insert(Seed {
            label,
            order: doc.order,
        });
    }

    // Synthetic ancestors for urls whose parents are not documents
    let urls: Vec<String> = seeds.keys().cloned().collect();
    for url in urls {
        let mut parent = parent_url(&url);
        while let Some(ancestor) = parent {
            parent = parent_url(&ancestor);
            seeds.entry(ancestor).or_insert_with_key(|key| Seed {
                label: last_segment(key).to_string(),
                order: 0,
            });
        }
    }

    let mut children: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut roots: Vec<String> = Vec::new();
    for url in seeds.keys() {
        match parent_url(url) {
            Some(parent) if seeds.contains_key(&parent) => {
                children.entry(parent).or_default().push(url.clone())
            }
            _ => roots.push(url.clone()),
        }
    }

    let mut on_path: BTreeSet<String> = BTreeSet::new();
    if seeds.contains_key(current) {
        let mut ancestor = parent_url(current);
        while let Some(url) = ancestor {
            ancestor = parent_url(&url);
            on_path.insert(url);
        }
    }

    let ctx = TreeContext {
        seeds: &seeds,
        children: &children,
        on_path: &on_path,
        current,
    };
    let mut tree: Vec<NavigationNode> = roots.iter().map(|url| ctx.build(url)).collect();
    sort_nodes(&mut tree);
    tree
}

struct TreeContext<'a> {
    seeds: &'a BTreeMap<String, Seed>,
    children: &'a BTreeMap<String, Vec<String>>,
    on_path: &'a BTreeSet<String>,
    current: &'a str,
}

impl TreeContext<'_> {
    fn build(&self, url: &str) -> NavigationNode {
        let (label, order) = self
            .seeds
            .get(url)
            .map(|seed| (seed.label.clone(), seed.order))
            .unwrap_or_else(|| (last_segment(url).to_string(), 0));

        let mut items: Vec<NavigationNode> = self
            .children
            .get(url)
            .map(|kids| kids.iter().map(|kid| self.build(kid)).collect())
            .unwrap_or_default();
        sort_nodes(&mut items);

        let has_children = !items.is_empty();
        NavigationNode {
            url: url.to_string(),
            label,
            order,
            active: url == self.current,
            expanded: has_children.then(|| self.on_path.contains(url)),
            parent: has_children,
            items: has_children.then_some(items),
        }
    }
}

fn sort_nodes(nodes: &mut [NavigationNode]) {
    nodes.sort_by(|a, b| (a.order, &a.label, &a.url).cmp(&(b.order, &b.label, &b.url)));
}

fn label_for(doc: &NavDocument, url: &str) -> String {
    if doc.title.trim().is_empty() {
        let segment = last_segment(url);
        if segment.is_empty() {
            super::section::HOME_SECTION.to_string()
        } else {
            segment.to_string()
        }
    } else {
        doc.title.clone()
    }
}
