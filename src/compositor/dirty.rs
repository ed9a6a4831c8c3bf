//! Dirty rectangle coalescing.

use crate::layout::Rect;

/// Merge overlapping or edge-adjacent rectangles into their bounding boxes.
///
/// Two rectangles merge when one, grown by a cell on every side, intersects
/// the other. Merging repeats until no pair touches, so the result is a set
/// of pairwise separated rectangles covering every input cell. Empty inputs
/// are dropped.
pub fn coalesce(mut rects: Vec<Rect>) -> Vec<Rect> {
    rects.retain(|rect| !rect.is_empty());

    loop {
        let mut merged = false;
        let mut i = 0;
        while i < rects.len() {
            let mut j = i + 1;
            while j < rects.len() {
                if rects[i].touches(&rects[j]) {
                    let other = rects.swap_remove(j);
                    rects[i] = rects[i].union(&other);
                    merged = true;
                } else {
                    j += 1;
                }
            }
            i += 1;
        }
        if !merged {
            return rects;
        }
    }
}
