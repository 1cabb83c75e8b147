//! Ratcliff/Obershelp similarity ratio.
//!
//! Matching blocks are found recursively: take the longest common contiguous
//! block (earliest in `a`, then earliest in `b`), then recurse on the pieces
//! to its left and right. No junk heuristics are applied.

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]` as `(i, j, len)`.
fn longest_match(
    a: &[char],
    b: &[char],
    (alo, ahi): (usize, usize),
    (blo, bhi): (usize, usize),
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_len) = (alo, blo, 0);
    // lengths[j - blo + 1] = length of the common suffix ending at a[i - 1], b[j]
    let mut prev = vec![0usize; bhi - blo + 1];
    let mut next = vec![0usize; bhi - blo + 1];

    for i in alo..ahi {
        for j in blo..bhi {
            let slot = j - blo + 1;
            if a[i] == b[j] {
                let k = prev[slot - 1] + 1;
                next[slot] = k;
                if k > best_len {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_len = k;
                }
            } else {
                next[slot] = 0;
            }
        }
        std::mem::swap(&mut prev, &mut next);
    }

    (best_i, best_j, best_len)
}

/// Total size of all matching blocks between `a` and `b`.
pub fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut pending = vec![((0, a.len()), (0, b.len()))];

    while let Some((ra, rb)) = pending.pop() {
        let (i, j, k) = longest_match(a, b, ra, rb);
        if k == 0 {
            continue;
        }
        total += k;
        if ra.0 < i && rb.0 < j {
            pending.push(((ra.0, i), (rb.0, j)));
        }
        if i + k < ra.1 && j + k < rb.1 {
            pending.push(((i + k, ra.1), (j + k, rb.1)));
        }
    }

    total
}

/// `2·M / T` where `M` is [`matching_chars`] and `T` the combined length.
///
/// Two empty sequences are identical.
pub fn ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(a, b) as f64 / total as f64
}
