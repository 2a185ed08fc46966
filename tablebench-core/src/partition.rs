use std::ops::Range;

/// Splits `[0, total)` into `parts` contiguous ranges of `total / parts` items each.
///
/// The remainder goes to the last range only, so sizes are reproducible: `split(10, 3)`
/// is always `[0..3, 3..6, 6..10]`. Zero parts yields no ranges.
pub fn split(total: u64, parts: usize) -> Vec<Range<u64>> {
    if parts == 0 {
        return Vec::new();
    }

    let parts_u64 = parts as u64;
    let per_part = total / parts_u64;

    (1..=parts_u64)
        .map(|idx| {
            let start = per_part * (idx - 1);
            let end = total - per_part * (parts_u64 - idx);
            start..end
        })
        .collect()
}

/// Splits `range` into consecutive chunks of `size` items; the final chunk may be short.
pub fn chunks(range: Range<u64>, size: usize) -> impl Iterator<Item = Range<u64>> {
    let size = size.max(1) as u64;
    let end = range.end;
    (range.start..end)
        .step_by(size as usize)
        .map(move |start| start..(start.saturating_add(size)).min(end))
}
