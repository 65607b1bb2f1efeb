use std::collections::VecDeque;

use crate::stream::generator::synthetic_sample;

/// Fixed-capacity FIFO of the most recent stream samples.
///
/// The window is seeded to full capacity at creation and never changes
/// length afterwards: every `push` drops the head and appends at the tail.
pub struct SlidingWindow {
    data: VecDeque<f64>,
    capacity: usize,
}

impl SlidingWindow {
    /// Create a window pre-filled with `synthetic_sample(0..capacity)`.
    pub fn seeded(capacity: usize) -> Self {
        let data = (0..capacity).map(|i| synthetic_sample(i as f64)).collect();
        Self { data, capacity }
    }

    pub fn push(&mut self, value: f64) {
        if self.data.len() == self.capacity {
            self.data.pop_front();
        }
        self.data.push_back(value);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn latest(&self) -> Option<f64> {
        self.data.back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.data.iter()
    }

    /// `[index, value]` pairs ready for egui_plot.
    pub fn points(&self) -> Vec<[f64; 2]> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| [i as f64, *v])
            .collect()
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.data.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeding_fills_to_capacity() {
        for capacity in [1, 7, 40, 128] {
            let window = SlidingWindow::seeded(capacity);
            assert_eq!(window.len(), capacity);
            assert_eq!(window.capacity(), capacity);
        }
    }

    #[test]
    fn seed_matches_generator() {
        let window = SlidingWindow::seeded(40);
        let expected: Vec<f64> = (0..40).map(|i| synthetic_sample(i as f64)).collect();
        assert_eq!(window.to_vec(), expected);
    }

    #[test]
    fn push_shifts_head_and_appends_tail() {
        let mut window = SlidingWindow::seeded(5);
        let before = window.to_vec();
        window.push(77.0);
        let after = window.to_vec();

        assert_eq!(after.len(), before.len());
        assert_eq!(after.last(), Some(&77.0));
        assert_eq!(&after[..4], &before[1..]);
    }

    #[test]
    fn repeated_pushes_keep_arrival_order() {
        let mut window = SlidingWindow::seeded(3);
        for v in [1.0, 2.0, 3.0, 4.0] {
            window.push(v);
        }
        assert_eq!(window.to_vec(), vec![2.0, 3.0, 4.0]);
        assert_eq!(window.latest(), Some(4.0));
    }

    #[test]
    fn points_index_from_zero() {
        let window = SlidingWindow::seeded(4);
        let points = window.points();
        assert_eq!(points.len(), 4);
        assert_eq!(points[0][0], 0.0);
        assert_eq!(points[3][0], 3.0);
    }
}
