// Copyright 2025 the Quadtree Index Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Basic quadtree usage: insert, query, move, and remove.
//!
//! Run:
//! - `cargo run -p quadtree_index --example basic_quadtree`

use kurbo::{Point, Rect};
use quadtree_index::Quadtree;

fn main() {
    let mut tree: Quadtree<u32> = Quadtree::new();

    // The tree sizes itself to the first object and grows for the second.
    tree.add(1, Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
    tree.add(2, Rect::new(100.0, 100.0, 110.0, 110.0)).unwrap();
    println!("root covers {:?}", tree.root_bounds());

    println!(
        "intersecting the first box: {:?}",
        tree.intersecting(Rect::new(0.0, 0.0, 10.0, 10.0))
    );
    println!("center distance^2: {:?}", tree.distance_squared(1, 2));

    // Move the first box next to the second.
    let _ = tree.move_to(1, Point::new(95.0, 95.0));
    println!(
        "after move: {:?}",
        tree.intersecting(Rect::new(90.0, 90.0, 120.0, 120.0))
    );

    // Walk the structure.
    tree.walk(true, |id| {
        println!(
            "node at level {:?}: {} items, {:?} in subtree",
            tree.level(id),
            tree.items_of(id).len(),
            tree.subtree_count(id)
        );
    });

    let _ = tree.remove(2);
    println!("len after remove: {}", tree.len());
}
