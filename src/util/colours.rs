//! Colour assignment for overlay drawing.

use std::collections::VecDeque;

/// Default palette, as RGB in [0, 1].
const PALETTE: [[f64; 3]; 10] = [
    [0.121, 0.466, 0.705],
    [1.0, 0.498, 0.054],
    [0.172, 0.627, 0.172],
    [0.829, 0.152, 0.156],
    [0.580, 0.403, 0.741],
    [0.549, 0.337, 0.294],
    [0.890, 0.466, 0.760],
    [0.498, 0.498, 0.498],
    [0.737, 0.741, 0.133],
    [0.09, 0.745, 0.811],
];

/// Hands out distinguishable colours for drawing calibration overlays.
///
/// Colours given back with [`queue_colour`](Self::queue_colour) are reused,
/// oldest first, before the palette position advances. The palette itself
/// wraps around once exhausted.
#[derive(Debug, Clone, Default)]
pub struct ColourCycle {
    returned: VecDeque<[f64; 3]>,
    next_index: usize,
}

impl ColourCycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next colour to draw with.
    pub fn next_colour(&mut self) -> [f64; 3] {
        if let Some(colour) = self.returned.pop_back() {
            return colour;
        }
        let colour = PALETTE[self.next_index];
        self.next_index = (self.next_index + 1) % PALETTE.len();
        colour
    }

    /// Hand a colour back, e.g. when its overlay is deleted.
    pub fn queue_colour(&mut self, colour: [f64; 3]) {
        self.returned.push_front(colour);
    }
}

impl Iterator for ColourCycle {
    type Item = [f64; 3];

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_colour())
    }
}
