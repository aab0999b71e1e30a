//! Shared helpers: snapshots and tree-pair generators

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use proptest::collection::vec;
use proptest::prelude::*;
use treealign::tree::ArenaBuilder;
use treealign::{NodeArena, NodeId, Side};

fn snapshot_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("snapshots")
}

pub fn assert_snapshot(name: &str, actual: &str) {
    let path = snapshot_root().join(name);
    if std::env::var("TREEALIGN_UPDATE_SNAPSHOTS").is_ok() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create snapshot directory");
        }
        fs::write(&path, actual).expect("write snapshot");
        return;
    }

    let expected =
        fs::read_to_string(&path).unwrap_or_else(|_| panic!("snapshot {:?} not found", path));
    if normalize(&expected) != normalize(actual) {
        panic!(
            "Snapshot mismatch for {:?}. Set TREEALIGN_UPDATE_SNAPSHOTS=1 to regenerate.\nExpected:\n{}\nActual:\n{}",
            path,
            expected,
            actual
        );
    }
}

fn normalize(input: &str) -> String {
    input.replace("\r\n", "\n")
}

/// Children lists for one side: ids `0..leaves` are leaves, internal nodes
/// follow in creation order.
///
/// Each choice groups a contiguous run (length ≥ 2) of the current top-level
/// nodes under a new parent; whatever is left on top gets a common root.
pub fn shape(leaves: usize, choices: &[(usize, usize)]) -> Vec<Vec<usize>> {
    let mut nodes: Vec<Vec<usize>> = vec![Vec::new(); leaves];
    let mut top: Vec<usize> = (0..leaves).collect();

    for &(start, len) in choices {
        if top.len() < 2 {
            break;
        }
        let len = 2 + len % (top.len() - 1);
        let start = start % (top.len() - len + 1);
        let group: Vec<usize> = top.drain(start..start + len).collect();
        let id = nodes.len();
        nodes.push(group);
        top.insert(start, id);
    }
    if top.len() > 1 {
        nodes.push(top);
    }

    nodes
}

/// Build a pair: left nodes take ids first, right nodes follow.
///
/// `links` are (left leaf, right leaf) indices, taken modulo leaf counts.
pub fn build_pair(
    left_leaves: usize,
    right_leaves: usize,
    left_choices: &[(usize, usize)],
    right_choices: &[(usize, usize)],
    links: &[(usize, usize)],
) -> NodeArena {
    let left = shape(left_leaves, left_choices);
    let right = shape(right_leaves, right_choices);
    let offset = left.len();

    let mut seeds: Vec<Vec<NodeId>> = vec![Vec::new(); left_leaves];
    for &(a, b) in links {
        seeds[a % left_leaves].push(offset + b % right_leaves);
    }

    let mut builder = ArenaBuilder::new(left.len() + right.len());
    for (id, children) in left.into_iter().enumerate() {
        let links = seeds.get(id).cloned().unwrap_or_default();
        builder
            .add_node(id, Side::Left, children, links)
            .expect("left node fits declared range");
    }
    for (i, children) in right.into_iter().enumerate() {
        let children = children.into_iter().map(|c| c + offset).collect();
        builder
            .add_node(offset + i, Side::Right, children, [])
            .expect("right node fits declared range");
    }
    builder.build().expect("generated pair is well formed")
}

prop_compose! {
    pub fn arb_pair()(
        left_leaves in 2usize..7,
        right_leaves in 2usize..7,
        left_choices in vec((0usize..16, 0usize..16), 0..6),
        right_choices in vec((0usize..16, 0usize..16), 0..6),
        links in vec((0usize..16, 0usize..16), 0..10),
    ) -> NodeArena {
        build_pair(left_leaves, right_leaves, &left_choices, &right_choices, &links)
    }
}
