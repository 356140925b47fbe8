use airlink_core::constants::{SEQUENCE_HALF_SPACE, SEQUENCE_SPACE};

/// 12-bit sequence number carried in a `u16`.
pub type SequenceNumber = u16;

/// Reduces `seq` into the 12-bit sequence space.
#[inline]
pub fn wrap(seq: u16) -> SequenceNumber {
    seq % SEQUENCE_SPACE
}

/// Returns `seq + n` in the 12-bit sequence space.
#[inline]
pub fn sequence_add(seq: SequenceNumber, n: u16) -> SequenceNumber {
    ((u32::from(seq) + u32::from(n)) % u32::from(SEQUENCE_SPACE)) as SequenceNumber
}

/// Returns `seq - n` in the 12-bit sequence space.
#[inline]
pub fn sequence_sub(seq: SequenceNumber, n: u16) -> SequenceNumber {
    let space = u32::from(SEQUENCE_SPACE);
    ((u32::from(seq) + space - u32::from(n) % space) % space) as SequenceNumber
}

/// Forward distance from `from` to `to` in the 12-bit sequence space.
#[inline]
pub fn sequence_distance(from: SequenceNumber, to: SequenceNumber) -> u16 {
    sequence_sub(to, from)
}

/// Returns whether `seq` lies behind `start`, i.e. at least half the
/// sequence space ahead of it, which modulo arithmetic means it has already
/// been passed.
#[inline]
pub fn is_old_sequence(start: SequenceNumber, seq: SequenceNumber) -> bool {
    sequence_distance(start, seq) >= SEQUENCE_HALF_SPACE
}
