//! Multi-source BFS distance fields.
//!
//! Seeds the queue with every cell matching the target value and
//! expands through the 4-neighborhood, producing city-block distance
//! per cell. Backs `inflate`/`deflate`, gap filling, and
//! terrain-brush placement.

use std::collections::VecDeque;

use crate::mask::{BitMask, Mask, ScalarMask};

/// Distance assigned to cells unreachable from any source (an all-false
/// mask has no sources at all).
fn far_value(size: u32) -> f32 {
    (2 * size) as f32
}

impl BitMask {
    /// City-block distance from every cell to the nearest `true` cell,
    /// as a scalar mask over the same symmetry settings (no random
    /// source). `true` cells hold zero.
    pub fn distance_field(&self) -> ScalarMask {
        let mut field: ScalarMask = Mask::new(self.size(), None, self.symmetry().clone());
        field.data_mut().copy_from_slice(&self.distance_to(true));
        field
    }

    /// Raw distance values to the nearest cell equal to `target`.
    pub(crate) fn distance_to(&self, target: bool) -> Vec<f32> {
        let size = self.size() as usize;
        let n = size * size;
        let mut dist = vec![far_value(self.size()); n];
        let mut queue = VecDeque::new();
        for (i, &cell) in self.data().iter().enumerate() {
            if cell == target {
                dist[i] = 0.0;
                queue.push_back(i);
            }
        }
        while let Some(i) = queue.pop_front() {
            let d = dist[i] + 1.0;
            let (x, y) = (i / size, i % size);
            let mut visit = |j: usize| {
                if dist[j] > d {
                    dist[j] = d;
                    queue.push_back(j);
                }
            };
            if x > 0 {
                visit(i - size);
            }
            if x + 1 < size {
                visit(i + size);
            }
            if y > 0 {
                visit(i - 1);
            }
            if y + 1 < size {
                visit(i + 1);
            }
        }
        dist
    }
}
