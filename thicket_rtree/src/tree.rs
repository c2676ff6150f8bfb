// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The flat tree representation and its two read-only queries.

use alloc::collections::BinaryHeap;
use alloc::vec::Vec;
use core::cmp::Ordering;

use crate::types::Aabb;

/// A bulk-loaded, immutable 2D R-tree over `(i64, Aabb)` items.
///
/// The whole tree lives in two parallel arrays:
///
/// - `boxes` holds four `f64`s per node. The first `count` quadruples are the
///   item boxes in traversal order; the remaining quadruples are interior
///   node boxes, bottom-up, the root last.
/// - `refs` holds one `i64` per item (the caller's reference, same order as
///   the leaf boxes) followed by `interior + 1` offsets into `boxes`
///   delimiting each interior node's children as a half-open range.
///
/// A *node index* is an offset into `boxes`, always a multiple of four; its
/// *ref index* is `node_index / 4`. Ref indices below `count` are leaves.
///
/// There is no way to mutate a built tree. Construct one with
/// [`HilbertBuilder`](crate::HilbertBuilder),
/// [`OmtBuilder`](crate::OmtBuilder), or
/// [`deserialize`](crate::deserialize), and share it freely between threads
/// for reads; each query keeps its own traversal state.
#[derive(Clone, Default)]
pub struct Tree {
    pub(crate) count: usize,
    pub(crate) refs: Vec<i64>,
    pub(crate) boxes: Vec<f64>,
}

impl core::fmt::Debug for Tree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tree")
            .field("count", &self.count)
            .field("nodes", &(self.boxes.len() / 4))
            .finish_non_exhaustive()
    }
}

impl Tree {
    /// Number of items in the index.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Whether the index holds no items.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Visit every item whose box intersects `query`.
    ///
    /// Boxes that merely touch the query rectangle's edge count as
    /// intersecting. Each matching item is visited exactly once, in an
    /// unspecified order. Returning `false` from `visit` aborts the search
    /// immediately.
    pub fn search<V>(&self, query: Aabb, mut visit: V)
    where
        V: FnMut(i64) -> bool,
    {
        if self.count == 0 {
            return;
        }

        let root = self.boxes.len() - 4;
        if self.node_box(root).overlaps(&query) {
            self.search_node(root, &query, &mut visit);
        }
    }

    fn search_node<V>(&self, node_idx: usize, query: &Aabb, visit: &mut V) -> bool
    where
        V: FnMut(i64) -> bool,
    {
        for child_idx in self.child_range(node_idx / 4).step_by(4) {
            if !self.node_box(child_idx).overlaps(query) {
                continue;
            }
            let child_ref = child_idx / 4;
            if child_ref < self.count {
                if !visit(self.refs[child_ref]) {
                    return false;
                }
            } else if !self.search_node(child_idx, query, visit) {
                return false;
            }
        }

        true
    }

    /// Visit items in ascending order of distance from `(x, y)`.
    ///
    /// `box_dist` measures from the point to a node's bounding box. For the
    /// traversal to emit true nearest-first order it must be a lower bound on
    /// the distance to anything inside the box, as
    /// [`planar_box_dist`](crate::planar_box_dist) and
    /// `thicket_geo::geodetic_box_dist` are.
    ///
    /// `item_dist`, when supplied, replaces the box distance for items only,
    /// letting callers refine against exact geometry they keep outside the
    /// index. Take care that both functions return distances in the same
    /// units. A refined item is emitted only once it is nearer than every
    /// unexplored subtree's *box* lower bound, so refinement can reorder
    /// items relative to pure box distance.
    ///
    /// Items with equal distance are emitted in an unspecified relative
    /// order. Returning `false` from `visit` aborts the traversal
    /// immediately.
    pub fn neighbors<V, B>(
        &self,
        x: f64,
        y: f64,
        mut visit: V,
        box_dist: B,
        item_dist: Option<&dyn Fn(f64, f64, i64) -> f64>,
    ) where
        V: FnMut(i64, f64) -> bool,
        B: Fn(f64, f64, Aabb) -> f64,
    {
        if self.count == 0 {
            return;
        }

        let mut queue: BinaryHeap<Candidate> = BinaryHeap::new();
        queue.push(Candidate {
            dist: 0.0,
            ref_idx: self.refs.len() - 2,
        });

        // Each round expands one interior node, then drains every queued
        // leaf that outranks all remaining interior nodes.
        while let Some(node) = queue.pop() {
            for child_idx in self.child_range(node.ref_idx).step_by(4) {
                let child_ref = child_idx / 4;
                let dist = match item_dist {
                    Some(item_dist) if child_ref < self.count => {
                        item_dist(x, y, self.refs[child_ref])
                    }
                    _ => box_dist(x, y, self.node_box(child_idx)),
                };
                queue.push(Candidate {
                    dist,
                    ref_idx: child_ref,
                });
            }

            while let Some(&next) = queue.peek() {
                if next.ref_idx >= self.count {
                    break;
                }
                queue.pop();
                if !visit(self.refs[next.ref_idx], next.dist) {
                    return;
                }
            }
        }
    }

    /// Child node offsets of the interior node at `ref_idx`, as a half-open
    /// byte-style range into `boxes` (step by 4 to walk children).
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "the builders write child offsets as non-negative in-bounds indexes into `boxes`"
    )]
    #[inline]
    fn child_range(&self, ref_idx: usize) -> core::ops::Range<usize> {
        self.refs[ref_idx] as usize..self.refs[ref_idx + 1] as usize
    }

    #[inline]
    pub(crate) fn node_box(&self, node_idx: usize) -> Aabb {
        Aabb::new(
            self.boxes[node_idx],
            self.boxes[node_idx + 1],
            self.boxes[node_idx + 2],
            self.boxes[node_idx + 3],
        )
    }
}

/// Pending traversal step: either a leaf (`ref_idx < count`) with its
/// distance, or an interior node keyed by the lower bound of its subtree.
#[derive(Copy, Clone, Debug)]
struct Candidate {
    dist: f64,
    ref_idx: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: `BinaryHeap` is a max-heap and we want the nearest entry
        // on top. Distance ties fall back to the smaller ref index.
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.ref_idx.cmp(&self.ref_idx))
    }
}
