// Copyright 2025 the Quadtree Index Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core quadtree implementation: arena storage, growth, splits, and queries.

use alloc::{vec, vec::Vec};
use core::hash::Hash;

use hashbrown::HashMap;
use kurbo::{Point, Rect, Size};
use smallvec::SmallVec;

use crate::types::{DegenerateFlags, Extremes, InvalidBounds, Item, NodeId};
use crate::util::{is_finite_rect, rect_contains_rect, rects_approx_equal, rects_intersect};

// Quadrant numbering shared by splits, growth, and both classification
// helpers. It is internal; only its self-consistency is observable.
const NE: usize = 0;
const NW: usize = 1;
const SW: usize = 2;
const SE: usize = 3;

/// A quadrant of space: its bounds, its (non-owning) parent, its depth, up to
/// four children, the items stored directly at it, and its subtree count.
#[derive(Clone, Debug)]
struct Node<P> {
    generation: u32,
    bounds: Rect,
    parent: Option<NodeId>,
    level: usize,
    /// All four children or none; created together by a single split.
    children: Option<[NodeId; 4]>,
    /// Items that do not fit wholly inside one child quadrant, or that have
    /// not yet triggered a split.
    items: SmallVec<[Item<P>; 2]>,
    /// Number of items in the subtree rooted at this node.
    total: usize,
}

/// Adaptive quadtree index over 2D rectangles.
///
/// The tree indexes axis-aligned rectangles (including degenerate rectangles
/// standing in for points and segments) for intersection, containment, and
/// proximity queries. Its covered region starts empty, sizes itself lazily to
/// the first inserted object, and doubles outward whenever an out-of-bounds
/// object arrives, so callers never pre-declare a world extent.
///
/// Payloads are the caller's identity: they must be `Copy + Eq + Hash` and are
/// used as keys of an internal lookup map, so `remove`/`move_to`/`find` are
/// O(depth) rather than full scans.
///
/// Nodes live in a slot arena and are addressed by generational [`NodeId`]
/// handles; a handle goes stale when its node is collapsed away during
/// restructuring. Children are owned top-down, the parent link is lookup-only.
///
/// All operations are synchronous recursive walks. Queries take `&self` and
/// mutation takes `&mut self`; the structure has no interior mutability.
///
/// ## Example
///
/// ```rust
/// use kurbo::Rect;
/// use quadtree_index::Quadtree;
///
/// let mut tree: Quadtree<u32> = Quadtree::new();
/// tree.add(1, Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
/// // Far outside the current root; the tree grows to cover it.
/// tree.add(2, Rect::new(100.0, 100.0, 110.0, 110.0)).unwrap();
///
/// assert_eq!(tree.intersecting(Rect::new(0.0, 0.0, 10.0, 10.0)), vec![1]);
/// assert_eq!(tree.distance_squared(1, 2), Some(20000.0));
/// ```
pub struct Quadtree<P> {
    /// slots
    nodes: Vec<Option<Node<P>>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    root: NodeId,
    node_capacity: usize,
    max_depth: usize,
    /// payload identity -> stored bounds
    index: HashMap<P, Rect>,
    degenerate: DegenerateFlags,
}

impl<P> core::fmt::Debug for Quadtree<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("Quadtree")
            .field("len", &self.index.len())
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("node_capacity", &self.node_capacity)
            .field("max_depth", &self.max_depth)
            .field("root_bounds", &self.node(self.root).bounds)
            .field("degenerate", &self.degenerate)
            .finish_non_exhaustive()
    }
}

impl<P> Default for Quadtree<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Quadtree<P> {
    /// Create an empty tree with default settings: capacity 1 per node,
    /// unbounded depth, and empty bounds (the root sizes itself to the first
    /// inserted object).
    pub fn new() -> Self {
        Self::with_bounds(Rect::ZERO)
    }

    /// Create an empty tree with explicit starting bounds.
    pub fn with_bounds(bounds: Rect) -> Self {
        Self::with_settings(1, usize::MAX, bounds)
    }

    /// Create an empty tree with explicit settings.
    ///
    /// `node_capacity` is the number of items a node holds before a split is
    /// attempted (values below 1 are clamped to 1). `max_depth` is the deepest
    /// level at which splitting is still allowed; pass `usize::MAX` for
    /// unbounded depth.
    pub fn with_settings(node_capacity: usize, max_depth: usize, bounds: Rect) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            root: NodeId::new(0, 0),
            node_capacity: node_capacity.max(1),
            max_depth,
            index: HashMap::new(),
            degenerate: DegenerateFlags::empty(),
        };
        tree.root = tree.alloc_node(bounds.abs(), None, 0);
        tree
    }

    /// The current root node. Growth replaces the root, so this handle is only
    /// valid until the next mutation.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The region currently covered by the tree.
    pub fn root_bounds(&self) -> Rect {
        self.node(self.root).bounds
    }

    /// Number of stored payloads.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the tree holds no payloads.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns true if `id` refers to a live node.
    ///
    /// A `NodeId` is considered live if its slot exists and its generation
    /// matches the current generation stored in that slot.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .map(|n| n.generation == id.1)
            .unwrap_or(false)
    }

    /// Bounds of a live node, or `None` for stale identifiers.
    pub fn node_bounds(&self, id: NodeId) -> Option<Rect> {
        self.node_opt(id).map(|n| n.bounds)
    }

    /// Depth of a live node (root = 0), or `None` for stale identifiers.
    pub fn level(&self, id: NodeId) -> Option<usize> {
        self.node_opt(id).map(|n| n.level)
    }

    /// Parent of a live node, or `None` for the root or stale identifiers.
    ///
    /// The parent link is for upward traversal only; children are exclusively
    /// owned top-down.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id).and_then(|n| n.parent)
    }

    /// Children of a live node: four handles, or empty for leaves and stale
    /// identifiers (a node has all four children or none).
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.node_opt(id)
            .and_then(|n| n.children.as_ref())
            .map(|c| c.as_slice())
            .unwrap_or(&[])
    }

    /// Items stored directly at a live node (not the whole subtree), or empty
    /// for stale identifiers.
    pub fn items_of(&self, id: NodeId) -> &[Item<P>] {
        self.node_opt(id)
            .map(|n| n.items.as_slice())
            .unwrap_or(&[])
    }

    /// Number of items in the subtree rooted at a live node, or `None` for
    /// stale identifiers.
    pub fn subtree_count(&self, id: NodeId) -> Option<usize> {
        self.node_opt(id).map(|n| n.total)
    }

    /// Depth-first pre-order traversal over nodes.
    ///
    /// Mutating the tree from inside the callback is impossible: the tree is
    /// borrowed for the duration of the walk.
    pub fn walk<F: FnMut(NodeId)>(&self, include_root: bool, mut f: F) {
        if include_root {
            f(self.root);
        }
        self.walk_below(self.root, &mut f);
    }

    /// Discard all structure and stored payloads, keeping the root's current
    /// bounds (and the sticky degenerate markers).
    pub fn clear(&mut self) {
        let bounds = self.node(self.root).bounds;
        self.index.clear();
        self.free_list.clear();
        for (i, slot) in self.nodes.iter_mut().enumerate() {
            *slot = None;
            self.free_list.push(i);
        }
        self.root = self.alloc_node(bounds, None, 0);
    }

    // --- internals ---

    fn walk_below(&self, id: NodeId, f: &mut impl FnMut(NodeId)) {
        if let Some(children) = self.node(id).children {
            for c in children {
                f(c);
                self.walk_below(c, f);
            }
        }
    }

    fn node_opt(&self, id: NodeId) -> Option<&Node<P>> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    /// Access a node; panics if `id` is stale.
    fn node(&self, id: NodeId) -> &Node<P> {
        self.nodes[id.idx()].as_ref().expect("dangling NodeId")
    }

    /// Access a node mutably; panics if `id` is stale.
    fn node_mut(&mut self, id: NodeId) -> &mut Node<P> {
        self.nodes[id.idx()].as_mut().expect("dangling NodeId")
    }

    fn alloc_node(&mut self, bounds: Rect, parent: Option<NodeId>, level: usize) -> NodeId {
        let idx = if let Some(idx) = self.free_list.pop() {
            idx
        } else {
            self.nodes.push(None);
            self.generations.push(0);
            self.nodes.len() - 1
        };
        let generation = self.generations[idx].saturating_add(1);
        self.generations[idx] = generation;
        self.nodes[idx] = Some(Node {
            generation,
            bounds,
            parent,
            level,
            children: None,
            items: SmallVec::new(),
            total: 0,
        });
        #[allow(
            clippy::cast_possible_truncation,
            reason = "NodeId uses 32-bit indices by design."
        )]
        NodeId::new(idx as u32, generation)
    }

    /// Convert a leaf into four children quartering its bounds.
    fn split(&mut self, id: NodeId) {
        let bounds = self.node(id).bounds;
        let level = self.node(id).level;
        let mut children = [NodeId::new(0, 0); 4];
        for (q, slot) in children.iter_mut().enumerate() {
            *slot = self.alloc_node(quadrant_bounds(bounds, q), Some(id), level + 1);
        }
        self.node_mut(id).children = Some(children);
    }

    fn insert_into(&mut self, id: NodeId, item: Item<P>) {
        self.node_mut(id).total += 1;
        let node = self.node(id);
        if let Some(children) = node.children {
            if let Some(q) = quadrant_index(item.bounds, node.bounds) {
                self.insert_into(children[q], item);
                return;
            }
        }
        self.node_mut(id).items.push(item);
        self.maybe_split(id);
    }

    /// Split an over-capacity node (if depth allows) and push items down into
    /// whichever child quadrant wholly contains them.
    fn maybe_split(&mut self, id: NodeId) {
        let (len, level, has_children) = {
            let node = self.node(id);
            (node.items.len(), node.level, node.children.is_some())
        };
        if len <= self.node_capacity || level >= self.max_depth {
            return;
        }
        if !has_children {
            self.split(id);
        }
        let children = self.node(id).children.expect("node was just split");
        let bounds = self.node(id).bounds;
        // Degenerate items are never distributed into children so their
        // quadrant lookup stays deterministic.
        let mut i = 0;
        while i < self.node(id).items.len() {
            let b = self.node(id).items[i].bounds;
            if b.width() == 0.0 || b.height() == 0.0 {
                i += 1;
                continue;
            }
            match quadrant_index(b, bounds) {
                Some(q) => {
                    let item = self.node_mut(id).items.remove(i);
                    // The item stays in this subtree; this node's total is
                    // unchanged.
                    self.insert_into(children[q], item);
                }
                None => i += 1,
            }
        }
    }

    /// Size a still-degenerate root to its first object(s), then double the
    /// root outward until it covers `bounds`.
    fn ensure_root_covers(&mut self, bounds: Rect) {
        let rb = self.node(self.root).bounds;
        if rb.width() == 0.0 || rb.height() == 0.0 {
            let sized = if self.index.is_empty() {
                // First object: a square big enough for it, anchored at its
                // origin.
                let side = bounds.width().max(bounds.height());
                Rect::new(bounds.x0, bounds.y0, bounds.x0 + side, bounds.y0 + side)
            } else {
                // Everything so far was a point at the root origin; span a
                // square between it and the incoming object.
                let side = Point::new(rb.x0, rb.y0)
                    .distance(Point::new(bounds.x0, bounds.y0))
                    .max(bounds.width())
                    .max(bounds.height());
                let x0 = rb.x0.min(bounds.x0);
                let y0 = rb.y0.min(bounds.y0);
                Rect::new(x0, y0, x0 + side, y0 + side)
            };
            self.node_mut(self.root).bounds = sized;
        }
        while !rect_contains_rect(self.node(self.root).bounds, bounds) {
            self.grow(bounds);
        }
    }

    /// Double the root's bounds toward `target`. The old root keeps its bounds
    /// and becomes one quadrant of the new root; the other three start empty.
    fn grow(&mut self, target: Rect) {
        let old_root = self.root;
        let rb = self.node(old_root).bounds;
        let (w, h) = (rb.width(), rb.height());
        let expand_left = target.x0 < rb.x0;
        let expand_up = target.y0 < rb.y0;
        let x0 = if expand_left { rb.x0 - w } else { rb.x0 };
        let y0 = if expand_up { rb.y0 - h } else { rb.y0 };
        let new_bounds = Rect::new(x0, y0, x0 + 2.0 * w, y0 + 2.0 * h);
        let old_quadrant = match (expand_left, expand_up) {
            (true, true) => SE,
            (true, false) => NE,
            (false, true) => SW,
            (false, false) => NW,
        };
        // The root gained a level above everything.
        self.bump_levels(old_root);
        let new_root = self.alloc_node(new_bounds, None, 0);
        let mut children = [NodeId::new(0, 0); 4];
        for (q, slot) in children.iter_mut().enumerate() {
            *slot = if q == old_quadrant {
                old_root
            } else {
                self.alloc_node(quadrant_bounds(new_bounds, q), Some(new_root), 1)
            };
        }
        self.node_mut(old_root).parent = Some(new_root);
        let total = self.node(old_root).total;
        {
            let root = self.node_mut(new_root);
            root.children = Some(children);
            root.total = total;
        }
        self.root = new_root;

        // A zero-width item on its node's left edge (or a zero-height item on
        // a top edge) can now sit exactly on a fresh split line and would be
        // classified into the wrong sibling on lookup; relocate those items.
        if !self.degenerate.is_empty() {
            self.migrate_boundary_items(old_root);
        }
    }

    fn bump_levels(&mut self, from: NodeId) {
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            let node = self.node_mut(id);
            node.level += 1;
            if let Some(children) = node.children {
                stack.extend(children);
            }
        }
    }

    fn migrate_boundary_items(&mut self, from: NodeId) {
        let zero_w = self.degenerate.contains(DegenerateFlags::ZERO_WIDTH);
        let zero_h = self.degenerate.contains(DegenerateFlags::ZERO_HEIGHT);
        let mut moved: Vec<Item<P>> = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            let node_bounds = self.node(id).bounds;
            let node = self.node_mut(id);
            let before = node.items.len();
            let mut i = 0;
            while i < node.items.len() {
                let b = node.items[i].bounds;
                let on_left_edge = zero_w && b.width() == 0.0 && b.x0 == node_bounds.x0;
                let on_top_edge = zero_h && b.height() == 0.0 && b.y0 == node_bounds.y0;
                if on_left_edge || on_top_edge {
                    moved.push(node.items.remove(i));
                } else {
                    i += 1;
                }
            }
            let taken = before - node.items.len();
            if taken > 0 {
                self.subtract_counts(id, taken);
            }
            if let Some(children) = self.node(id).children {
                stack.extend(children);
            }
        }
        for item in moved {
            self.insert_into(self.root, item);
        }
    }

    /// Subtract `n` from the subtree count of `from` and every ancestor.
    fn subtract_counts(&mut self, from: NodeId, n: usize) {
        let mut cur = Some(from);
        while let Some(id) = cur {
            let node = self.node_mut(id);
            node.total -= n;
            cur = node.parent;
        }
    }

    /// Collapse sparse subtrees, walking from `start` up to the root.
    fn restructure(&mut self, start: NodeId) {
        let mut cur = Some(start);
        while let Some(id) = cur {
            cur = self.node(id).parent;
            if let Some(children) = self.node(id).children {
                let underfull = self.node(id).total <= self.node_capacity;
                // Also drop structure when all four children are empty, so an
                // absorbed subtree does not leave empty nodes behind.
                let all_empty = children.iter().all(|c| self.node(*c).total == 0);
                if underfull || all_empty {
                    self.collapse(id, children);
                }
            }
        }
    }

    /// Pull every descendant item up into this node and discard the children;
    /// the node becomes a leaf again.
    fn collapse(&mut self, id: NodeId, children: [NodeId; 4]) {
        let mut pulled: Vec<Item<P>> = Vec::new();
        let mut stack: Vec<NodeId> = Vec::from(children);
        while let Some(cid) = stack.pop() {
            let node = self.nodes[cid.idx()].take().expect("dangling child NodeId");
            self.free_list.push(cid.idx());
            pulled.extend(node.items);
            if let Some(grand) = node.children {
                stack.extend(grand);
            }
        }
        let node = self.node_mut(id);
        node.children = None;
        node.items.extend(pulled);
        debug_assert_eq!(
            node.total,
            node.items.len(),
            "a collapsed node must hold its whole subtree"
        );
    }
}

impl<P: Copy + Eq + Hash> Quadtree<P> {
    /// Insert `payload` under `bounds`.
    ///
    /// The rectangle is normalized (`Rect::abs`) first. If the payload is
    /// already present its bounds are replaced, so `add` doubles as an upsert.
    /// If `bounds` falls outside the covered region the root grows (doubling
    /// outward) until it fits; the very first inserts lazily size an empty
    /// root instead.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidBounds`] if any coordinate is NaN or infinite. No
    /// other operation reports this error.
    pub fn add(&mut self, payload: P, bounds: Rect) -> Result<(), InvalidBounds> {
        if !is_finite_rect(bounds) {
            return Err(InvalidBounds(bounds));
        }
        let bounds = bounds.abs();
        if self.index.contains_key(&payload) {
            let _ = self.remove(payload);
        }
        // Sticky: once a degenerate rectangle has been seen, growth must run
        // boundary migration forever after.
        if bounds.width() == 0.0 {
            self.degenerate |= DegenerateFlags::ZERO_WIDTH;
        }
        if bounds.height() == 0.0 {
            self.degenerate |= DegenerateFlags::ZERO_HEIGHT;
        }
        self.ensure_root_covers(bounds);
        self.index.insert(payload, bounds);
        self.insert_into(self.root, Item { payload, bounds });
        Ok(())
    }

    /// Remove `payload` from the tree. Returns `false` if it is not present.
    ///
    /// Removal retraces the path insertion took, then collapses any subtree
    /// (from the holding node up to the root) whose count has dropped to the
    /// node capacity.
    pub fn remove(&mut self, payload: P) -> bool {
        let Some(bounds) = self.index.remove(&payload) else {
            return false;
        };
        let Some(id) = self.locate(payload, bounds) else {
            debug_assert!(false, "indexed payload must be stored in the tree");
            return false;
        };
        let node = self.node_mut(id);
        let pos = node
            .items
            .iter()
            .position(|it| it.payload == payload)
            .expect("locate returned the holding node");
        let _ = node.items.remove(pos);
        self.subtract_counts(id, 1);
        self.restructure(id);
        true
    }

    /// Move `payload` so its origin is `position`, keeping its size.
    /// Returns `false` if it is not present or `position` is not finite.
    ///
    /// Implemented as remove-then-reinsert so the same growth and split
    /// machinery applies as for a fresh insert.
    pub fn move_to(&mut self, payload: P, position: Point) -> bool {
        let Some(old) = self.index.get(&payload).copied() else {
            return false;
        };
        let bounds = Rect::new(
            position.x,
            position.y,
            position.x + old.width(),
            position.y + old.height(),
        );
        self.reinsert(payload, bounds)
    }

    /// Resize `payload` in place, keeping its origin. Returns `false` if it
    /// is not present or `size` is not finite.
    pub fn resize(&mut self, payload: P, size: Size) -> bool {
        let Some(old) = self.index.get(&payload).copied() else {
            return false;
        };
        let bounds = Rect::new(old.x0, old.y0, old.x0 + size.width, old.y0 + size.height);
        self.reinsert(payload, bounds)
    }

    /// Replace `payload`'s bounds entirely. Returns `false` if it is not
    /// present or `bounds` is not finite.
    pub fn set_bounds(&mut self, payload: P, bounds: Rect) -> bool {
        if !self.index.contains_key(&payload) {
            return false;
        }
        self.reinsert(payload, bounds)
    }

    fn reinsert(&mut self, payload: P, bounds: Rect) -> bool {
        // Validate before removing so a bad rectangle leaves the tree intact.
        if !is_finite_rect(bounds) {
            return false;
        }
        let removed = self.remove(payload);
        debug_assert!(removed, "reinsert requires a stored payload");
        self.add(payload, bounds)
            .expect("bounds were validated before the remove");
        true
    }

    /// The node holding `payload`, or `None` if it is not present.
    pub fn find(&self, payload: P) -> Option<NodeId> {
        let bounds = *self.index.get(&payload)?;
        let id = self.locate(payload, bounds);
        debug_assert!(id.is_some(), "indexed payload must be stored in the tree");
        id
    }

    /// Whether `payload` is present.
    pub fn has(&self, payload: P) -> bool {
        self.index.contains_key(&payload)
    }

    /// A stored rectangle approximately equal to `bounds` (within 1e-7 per
    /// coordinate), or `None`.
    pub fn find_bounds(&self, bounds: Rect) -> Option<Rect> {
        self.index
            .values()
            .find(|b| rects_approx_equal(**b, bounds))
            .copied()
    }

    /// Payloads whose bounds intersect `rect`.
    ///
    /// Rectangles that merely touch at an edge, or overlap by no more than
    /// 1e-7 in either axis, are not reported. Result order is unspecified.
    pub fn intersecting(&self, rect: Rect) -> Vec<P> {
        let mut out = Vec::new();
        self.search(self.root, rect, rects_intersect, &mut out);
        out
    }

    /// Payloads whose bounds intersect the given point, treated as a
    /// zero-size rectangle.
    pub fn intersecting_point(&self, point: Point) -> Vec<P> {
        self.intersecting(Rect::new(point.x, point.y, point.x, point.y))
    }

    /// Payloads whose bounds fully contain `rect`, edges included (no
    /// tolerance). Result order is unspecified.
    pub fn containing(&self, rect: Rect) -> Vec<P> {
        let mut out = Vec::new();
        self.search(self.root, rect, rect_contains_rect, &mut out);
        out
    }

    /// Payloads whose bounds contain the given point, edges included.
    pub fn containing_point(&self, point: Point) -> Vec<P> {
        self.containing(Rect::new(point.x, point.y, point.x, point.y))
    }

    /// Squared Euclidean distance between the centers of two stored payloads'
    /// bounds, or `None` if either is absent.
    pub fn distance_squared(&self, a: P, b: P) -> Option<f64> {
        let ca = self.index.get(&a)?.center();
        let cb = self.index.get(&b)?.center();
        Some((ca - cb).hypot2())
    }

    /// Depth-first traversal over every stored payload.
    pub fn for_each<F: FnMut(P)>(&self, mut f: F) {
        self.visit_items(self.root, &mut |item| f(item.payload));
    }

    /// The stored payloads with minimum/maximum center-x and center-y, each
    /// independently, in a single pass. Ties go to the first item found.
    pub fn extremes(&self) -> Extremes<P> {
        let mut out = Extremes {
            min_x: None,
            max_x: None,
            min_y: None,
            max_y: None,
        };
        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        self.visit_items(self.root, &mut |item| {
            let c = item.bounds.center();
            if c.x < min_x {
                min_x = c.x;
                out.min_x = Some(item.payload);
            }
            if c.x > max_x {
                max_x = c.x;
                out.max_x = Some(item.payload);
            }
            if c.y < min_y {
                min_y = c.y;
                out.min_y = Some(item.payload);
            }
            if c.y > max_y {
                max_y = c.y;
                out.max_y = Some(item.payload);
            }
        });
        out
    }

    // --- internals ---

    /// Retrace the path insertion took for an item with these bounds, looking
    /// for the node whose own items hold the payload.
    fn locate(&self, payload: P, bounds: Rect) -> Option<NodeId> {
        let mut id = self.root;
        loop {
            let node = self.node(id);
            if node.items.iter().any(|it| it.payload == payload) {
                return Some(id);
            }
            let children = node.children?;
            id = children[quadrant_index(bounds, node.bounds)?];
        }
    }

    fn search(&self, id: NodeId, query: Rect, pred: fn(Rect, Rect) -> bool, out: &mut Vec<P>) {
        let node = self.node(id);
        for item in &node.items {
            if pred(item.bounds, query) {
                out.push(item.payload);
            }
        }
        if let Some(children) = node.children {
            match quadrant_index(query, node.bounds) {
                // The query fits wholly in one quadrant; anything stored in a
                // sibling can at most touch it, which never intersects.
                Some(q) => self.search(children[q], query, pred, out),
                None => {
                    for q in quadrant_overlaps(query, node.bounds) {
                        self.search(children[q], query, pred, out);
                    }
                }
            }
        }
    }

    fn visit_items(&self, id: NodeId, f: &mut impl FnMut(&Item<P>)) {
        let node = self.node(id);
        for item in &node.items {
            f(item);
        }
        if let Some(children) = node.children {
            for c in children {
                self.visit_items(c, f);
            }
        }
    }
}

fn quadrant_bounds(bounds: Rect, quadrant: usize) -> Rect {
    let mid = bounds.center();
    match quadrant {
        NE => Rect::new(mid.x, bounds.y0, bounds.x1, mid.y),
        NW => Rect::new(bounds.x0, bounds.y0, mid.x, mid.y),
        SW => Rect::new(bounds.x0, mid.y, mid.x, bounds.y1),
        SE => Rect::new(mid.x, mid.y, bounds.x1, bounds.y1),
        _ => unreachable!("quadrant index out of range"),
    }
}

/// The quadrant of `bounds` that `rect` fits wholly inside, or `None` if it
/// straddles a midpoint.
///
/// A far (bottom/right) edge lying exactly on the midpoint counts as the
/// upper/left quadrant, and left/top win when a degenerate rectangle sits
/// exactly on a midline, so no rectangle ever satisfies two quadrants. Splits,
/// lookups, and removals all rely on this determinism.
fn quadrant_index(rect: Rect, bounds: Rect) -> Option<usize> {
    let mid = bounds.center();
    let fits_left = rect.x1 <= mid.x;
    let fits_right = rect.x0 >= mid.x;
    let fits_top = rect.y1 <= mid.y;
    let fits_bottom = rect.y0 >= mid.y;
    if fits_left {
        if fits_top {
            Some(NW)
        } else if fits_bottom {
            Some(SW)
        } else {
            None
        }
    } else if fits_right {
        if fits_top {
            Some(NE)
        } else if fits_bottom {
            Some(SE)
        } else {
            None
        }
    } else {
        None
    }
}

/// Every quadrant of `bounds` whose half-planes `rect` overlaps at all,
/// boundaries included. Range queries must visit all of them.
fn quadrant_overlaps(rect: Rect, bounds: Rect) -> SmallVec<[usize; 4]> {
    let mid = bounds.center();
    let left = rect.x0 <= mid.x;
    let right = rect.x1 >= mid.x;
    let top = rect.y0 <= mid.y;
    let bottom = rect.y1 >= mid.y;
    let mut out = SmallVec::new();
    if right && top {
        out.push(NE);
    }
    if left && top {
        out.push(NW);
    }
    if left && bottom {
        out.push(SW);
    }
    if right && bottom {
        out.push(SE);
    }
    out
}
