use airlink_core::constants::{BITMAP_GROUPS, SEQUENCE_SPACE};

use crate::{
    block_ack_bitmap::BlockAckBitmap,
    sequence::{is_old_sequence, sequence_add, sequence_distance, sequence_sub, wrap, SequenceNumber},
};

const MAX_RENDERED: u16 = BITMAP_GROUPS as u16 * 16;

/// Recipient-side record of which MPDUs inside a sliding window were delivered.
///
/// The tracker keeps one slot per sequence number of the 12-bit space. Only
/// the slots inside `[window_start, window_start + window_size)` are
/// meaningful; slots are cleared as the window end advances over them, so
/// stale marks behind the window never leak back in.
#[derive(Debug, Clone)]
pub struct BlockAckWindow {
    window_start: SequenceNumber,
    window_size: u16,
    window_end: SequenceNumber,
    slots: Box<[bool]>,
}

impl BlockAckWindow {
    /// Creates a tracker whose window starts at `window_start` and spans `window_size` sequence numbers.
    pub fn new(window_start: SequenceNumber, window_size: u16) -> Self {
        let mut window = Self {
            window_start: 0,
            window_size: 0,
            window_end: 0,
            slots: vec![false; SEQUENCE_SPACE as usize].into_boxed_slice(),
        };
        window.initialize(window_start, window_size);
        window
    }

    /// Resets every slot to "not delivered" and places the window.
    ///
    /// `window_size` must not exceed the sequence space.
    pub fn initialize(&mut self, window_start: SequenceNumber, window_size: u16) {
        debug_assert!(window_size <= SEQUENCE_SPACE, "window size {} exceeds sequence space", window_size);
        self.window_start = wrap(window_start);
        self.window_size = window_size.min(SEQUENCE_SPACE);
        self.window_end = sequence_sub(sequence_add(self.window_start, self.window_size), 1);
        self.slots.fill(false);
    }

    /// First sequence number of the window.
    pub fn window_start(&self) -> SequenceNumber {
        self.window_start
    }

    /// Last sequence number of the window.
    pub fn window_end(&self) -> SequenceNumber {
        self.window_end
    }

    /// Number of sequence numbers the window spans.
    pub fn window_size(&self) -> u16 {
        self.window_size
    }

    /// Returns whether `seq` lies inside the window.
    pub fn in_window(&self, seq: SequenceNumber) -> bool {
        sequence_distance(self.window_start, wrap(seq)) < self.window_size
    }

    /// Returns whether `seq` lies inside the window and was delivered.
    pub fn is_delivered(&self, seq: SequenceNumber) -> bool {
        let seq = wrap(seq);
        self.in_window(seq) && self.slots[seq as usize]
    }

    /// Records delivery of the MPDU carrying `seq`.
    ///
    /// A sequence number ahead of the window slides the window forward so
    /// `seq` becomes its last slot. A sequence number behind the window is
    /// ignored. Returns whether the delivery was recorded.
    ///
    /// Windows wider than half the sequence space have no room for an
    /// "ahead" region: anything outside them counts as behind.
    pub fn record_delivery(&mut self, seq: SequenceNumber) -> bool {
        let seq = wrap(seq);
        if self.window_size == 0 {
            return false;
        }
        if !self.in_window(seq) {
            if is_old_sequence(self.window_start, seq) {
                return false;
            }
            let delta = sequence_distance(self.window_end, seq);
            if delta > 1 {
                self.clear_range(sequence_add(self.window_end, 1), sequence_sub(seq, 1));
            }
            self.window_start = sequence_add(self.window_start, delta);
            self.window_end = seq;
            tracing::trace!(
                "block-ack window slid by {} to [{}, {}]",
                delta,
                self.window_start,
                self.window_end
            );
        }
        self.slots[seq as usize] = true;
        true
    }

    /// Moves the window to begin at `starting_sequence`, as requested by a block-ack request.
    ///
    /// Requests behind the window are ignored.
    pub fn record_block_ack_request(&mut self, starting_sequence: SequenceNumber) {
        let starting_sequence = wrap(starting_sequence);
        if self.window_size == 0 {
            return;
        }
        if self.in_window(starting_sequence) {
            if starting_sequence != self.window_start {
                let new_end = sequence_sub(sequence_add(starting_sequence, self.window_size), 1);
                self.clear_range(sequence_add(self.window_end, 1), new_end);
                self.window_start = starting_sequence;
                self.window_end = new_end;
            }
        } else if !is_old_sequence(self.window_start, starting_sequence) {
            self.window_start = starting_sequence;
            self.window_end = sequence_sub(sequence_add(starting_sequence, self.window_size), 1);
            self.clear_range(self.window_start, self.window_end);
        }
    }

    /// Writes the delivery state of the window into `bitmap`.
    ///
    /// The bitmap starts at the window start; bits beyond the window size stay zero.
    pub fn render_bitmap(&self, bitmap: &mut BlockAckBitmap) {
        bitmap.reset(self.window_start);
        for offset in 0..self.window_size.min(MAX_RENDERED) {
            let seq = sequence_add(self.window_start, offset);
            if self.slots[seq as usize] {
                bitmap.set_received(seq);
            }
        }
    }

    /// Clears slots from `start` through `end` inclusive, wrapping.
    fn clear_range(&mut self, start: SequenceNumber, end: SequenceNumber) {
        let mut seq = start;
        loop {
            self.slots[seq as usize] = false;
            if seq == end {
                break;
            }
            seq = sequence_add(seq, 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_inside_window() {
        let mut window = BlockAckWindow::new(0, 64);
        assert!(window.record_delivery(5));
        assert!(window.is_delivered(5));
        assert!(!window.is_delivered(6));
        assert_eq!(window.window_start(), 0);
        assert_eq!(window.window_end(), 63);
    }

    #[test]
    fn test_delivery_ahead_slides_and_clears() {
        let mut window = BlockAckWindow::new(0, 64);
        window.record_delivery(5);
        window.record_delivery(100);

        assert_eq!(window.window_start(), 100 - 64 + 1);
        assert_eq!(window.window_end(), 100);
        assert!(!window.is_delivered(5));
        assert!(window.is_delivered(100));
    }

    #[test]
    fn test_stale_marks_do_not_reappear_after_wrap() {
        let mut window = BlockAckWindow::new(0, 64);
        window.record_delivery(10);
        assert!(window.record_delivery(2000));
        assert!(window.record_delivery(3900));
        assert!(window.record_delivery(50));

        assert_eq!(window.window_start(), 4083);
        assert!(window.in_window(10));
        assert!(!window.is_delivered(10));
        assert!(window.is_delivered(50));
    }

    #[test]
    fn test_old_delivery_is_ignored() {
        let mut window = BlockAckWindow::new(2000, 64);
        assert!(!window.record_delivery(1999));
        assert!(!window.record_delivery(10));
        assert_eq!(window.window_start(), 2000);
    }

    #[test]
    fn test_window_wraps_sequence_space() {
        let mut window = BlockAckWindow::new(4080, 32);
        assert_eq!(window.window_end(), 15);
        assert!(window.record_delivery(4095));
        assert!(window.record_delivery(3));
        assert!(window.record_delivery(20));
        assert_eq!(window.window_start(), 4085);
        assert!(window.is_delivered(4095));
        assert!(window.is_delivered(3));
    }

    #[test]
    fn test_block_ack_request_inside_window() {
        let mut window = BlockAckWindow::new(0, 16);
        window.record_delivery(3);
        window.record_delivery(12);
        window.record_block_ack_request(8);

        assert_eq!(window.window_start(), 8);
        assert_eq!(window.window_end(), 23);
        assert!(window.is_delivered(12));
        assert!(!window.is_delivered(3));
        assert!(!window.is_delivered(20));
    }

    #[test]
    fn test_block_ack_request_outside_window_restarts() {
        let mut window = BlockAckWindow::new(0, 16);
        window.record_delivery(3);
        window.record_block_ack_request(500);

        assert_eq!(window.window_start(), 500);
        assert_eq!(window.window_end(), 515);
        for seq in 500..516 {
            assert!(!window.is_delivered(seq));
        }
    }

    #[test]
    fn test_old_block_ack_request_is_ignored() {
        let mut window = BlockAckWindow::new(100, 16);
        window.record_block_ack_request(50);
        assert_eq!(window.window_start(), 100);
    }

    #[test]
    fn test_render_bitmap() {
        let mut window = BlockAckWindow::new(10, 64);
        for seq in [10u16, 11, 26, 73] {
            window.record_delivery(seq);
        }
        let mut bitmap = BlockAckBitmap::default();
        window.render_bitmap(&mut bitmap);

        assert_eq!(bitmap.starting_sequence(), 10);
        assert_eq!(bitmap.groups()[0], 0b11);
        assert_eq!(bitmap.groups()[1], 0b1);
        assert_eq!(bitmap.groups()[3], 0x8000);
        assert!(bitmap.groups()[4..].iter().all(|g| *g == 0));
    }

    #[test]
    fn test_render_small_window_leaves_upper_bits_zero() {
        let mut window = BlockAckWindow::new(0, 8);
        for seq in 0..8 {
            window.record_delivery(seq);
        }
        let mut bitmap = BlockAckBitmap::new(1234);
        bitmap.set_received(1300);
        window.render_bitmap(&mut bitmap);

        assert_eq!(bitmap.starting_sequence(), 0);
        assert_eq!(bitmap.groups()[0], 0x00ff);
        assert_eq!(bitmap.received_count(), 8);
    }

    #[test]
    fn test_initialize_clears_everything() {
        let mut window = BlockAckWindow::new(0, 64);
        window.record_delivery(1);
        window.initialize(0, 64);
        assert!(!window.is_delivered(1));
    }

    #[test]
    fn test_full_sequence_space_window() {
        let mut window = BlockAckWindow::new(0, 4096);
        assert!(window.in_window(3000));
        assert!(window.record_delivery(3000));
        assert!(window.is_delivered(3000));
        assert_eq!(window.window_start(), 0);

        window.record_block_ack_request(3000);
        assert_eq!(window.window_start(), 3000);
        assert_eq!(window.window_end(), 2999);
        assert!(window.is_delivered(3000));
    }

    #[test]
    fn test_wide_window_records_far_half() {
        let mut window = BlockAckWindow::new(100, 3000);
        assert!(window.record_delivery(2500));
        assert!(window.is_delivered(2500));
        assert!(!window.record_delivery(3500));
        assert_eq!(window.window_start(), 100);
    }

    #[test]
    fn test_zero_sized_window_tracks_nothing() {
        let mut window = BlockAckWindow::new(0, 0);
        assert!(!window.record_delivery(0));
        assert!(!window.is_delivered(0));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn delivered_implies_in_window(
                start in 0u16..4096,
                size_groups in 1u16..=64,
                deliveries in proptest::collection::vec(0u16..4096, 0..200),
            ) {
                let mut window = BlockAckWindow::new(start, size_groups * 16);
                for seq in deliveries {
                    window.record_delivery(seq);
                    prop_assert!(window.in_window(window.window_end()));
                    prop_assert_eq!(
                        sequence_distance(window.window_start(), window.window_end()),
                        window.window_size() - 1
                    );
                }
                let mut bitmap = BlockAckBitmap::default();
                window.render_bitmap(&mut bitmap);
                for seq in 0..4096u16 {
                    prop_assert_eq!(bitmap.is_received(seq), window.is_delivered(seq));
                }
            }
        }
    }
}
