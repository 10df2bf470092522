// Row-height prefix sums backed by a Fenwick tree.
//
// Row `i` has a height; `offset_of(i)` is the sum of heights of rows
// `[0, i)`, i.e. the y-coordinate where row `i` starts. Point updates and
// offset queries are O(log n). `rows_within` descends the tree to answer
// "how many leading rows end at or before this offset" without a scan.

/// Fenwick tree over row heights with sums kept in `u64`.
#[derive(Debug, Clone, Default)]
pub struct PrefixHeights {
    /// 1-indexed partial sums; `tree[0]` is unused.
    tree: Vec<u64>,
    /// Raw per-row heights, for O(1) reads and delta computation.
    heights: Vec<u32>,
}

impl PrefixHeights {
    /// Build from initial heights in O(n).
    pub fn from_heights(heights: &[u32]) -> Self {
        let n = heights.len();
        let mut tree = vec![0u64; n + 1];
        for (i, &h) in heights.iter().enumerate() {
            tree[i + 1] = u64::from(h);
        }
        for i in 1..=n {
            let parent = i + lowbit(i);
            if parent <= n {
                tree[parent] += tree[i];
            }
        }
        PrefixHeights {
            tree,
            heights: heights.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Height of row `i`, or `None` past the end.
    pub fn get(&self, i: usize) -> Option<u32> {
        self.heights.get(i).copied()
    }

    /// Set the height of row `i`. Returns `false` when `i` is out of range
    /// or the height is unchanged.
    pub fn set(&mut self, i: usize, height: u32) -> bool {
        let Some(&current) = self.heights.get(i) else {
            return false;
        };
        if current == height {
            return false;
        }
        self.heights[i] = height;

        let n = self.heights.len();
        let mut idx = i + 1;
        if height > current {
            let delta = u64::from(height - current);
            while idx <= n {
                self.tree[idx] += delta;
                idx += lowbit(idx);
            }
        } else {
            let delta = u64::from(current - height);
            while idx <= n {
                self.tree[idx] -= delta;
                idx += lowbit(idx);
            }
        }
        true
    }

    /// Sum of heights of rows `[0, i)`. `i` is clamped to `len()`.
    pub fn offset_of(&self, i: usize) -> u64 {
        let mut idx = i.min(self.heights.len());
        let mut sum = 0u64;
        while idx > 0 {
            sum += self.tree[idx];
            idx -= lowbit(idx);
        }
        sum
    }

    /// Sum of all heights.
    pub fn total(&self) -> u64 {
        self.offset_of(self.heights.len())
    }

    /// Largest `k` such that rows `[0, k)` fit within `offset`, i.e.
    /// `offset_of(k) <= offset`. Zero-height rows at the boundary are
    /// included.
    pub fn rows_within(&self, offset: u64) -> usize {
        let n = self.heights.len();
        let mut pos = 0usize;
        let mut remaining = offset;
        let mut mask = highest_power_of_two(n);
        while mask > 0 {
            let next = pos + mask;
            if next <= n && self.tree[next] <= remaining {
                remaining -= self.tree[next];
                pos = next;
            }
            mask >>= 1;
        }
        pos
    }
}

#[inline]
fn lowbit(x: usize) -> usize {
    x & x.wrapping_neg()
}

/// Largest power of two `<= n` (0 for 0).
#[inline]
fn highest_power_of_two(n: usize) -> usize {
    if n == 0 {
        0
    } else {
        1 << (usize::BITS - 1 - n.leading_zeros())
    }
}
