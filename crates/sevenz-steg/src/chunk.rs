//! Payload chunking across the files of a carrier

/// Split `payload` into `count` contiguous chunks of near-equal size.
///
/// Each chunk takes `remaining_length / remaining_chunks` bytes, so the
/// lengths sum exactly to the payload length and differ from each other by
/// at most one byte, with the last file absorbing any remainder.
pub fn split_payload(payload: &[u8], count: usize) -> Vec<&[u8]> {
    let mut chunks = Vec::with_capacity(count);
    let mut rest = payload;
    for remaining in (1..=count).rev() {
        let take = rest.len() / remaining;
        let (head, tail) = rest.split_at(take);
        chunks.push(head);
        rest = tail;
    }
    chunks
}
