//! Ratcliff/Obershelp sequence matching
//!
//! Finds the longest contiguous matching block, then recurses on the
//! unmatched slices to its left and right. The matching blocks yield both a
//! similarity ratio and an opcode script that turns one sequence into the
//! other. Works on any element type: characters for scoring, normalized
//! words for alignment.
//!
//! Ties between equally long blocks resolve to the block starting earliest
//! in the first sequence, then earliest in the second.

use ahash::AHashMap;
use core::hash::Hash;
use core::ops::Range;

/// Contiguous run of equal elements shared by both sequences
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchBlock {
    /// Start in the source sequence
    pub source: usize,
    /// Start in the target sequence
    pub target: usize,
    /// Number of matching elements
    pub size: usize,
}

/// One step of the script turning the source sequence into the target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlignmentOpcode {
    /// `source` and `target` hold equal elements
    Equal {
        source: Range<usize>,
        target: Range<usize>,
    },
    /// `source` is replaced by `target`
    Replace {
        source: Range<usize>,
        target: Range<usize>,
    },
    /// `target` is inserted at `source.start`; `source` is empty
    Insert {
        source: Range<usize>,
        target: Range<usize>,
    },
    /// `source` is removed; `target` is empty
    Delete {
        source: Range<usize>,
        target: Range<usize>,
    },
}

impl AlignmentOpcode {
    /// Affected range of the source sequence
    #[must_use]
    pub fn source(&self) -> Range<usize> {
        match self {
            Self::Equal { source, .. }
            | Self::Replace { source, .. }
            | Self::Insert { source, .. }
            | Self::Delete { source, .. } => source.clone(),
        }
    }

    /// Affected range of the target sequence
    #[must_use]
    pub fn target(&self) -> Range<usize> {
        match self {
            Self::Equal { target, .. }
            | Self::Replace { target, .. }
            | Self::Insert { target, .. }
            | Self::Delete { target, .. } => target.clone(),
        }
    }

    /// Short lowercase tag
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Equal { .. } => "equal",
            Self::Replace { .. } => "replace",
            Self::Insert { .. } => "insert",
            Self::Delete { .. } => "delete",
        }
    }
}

/// Matcher over a source and a target sequence
///
/// Builds an index of target element positions once; every query reuses it.
#[derive(Debug)]
pub struct SequenceMatcher<'a, T> {
    source: &'a [T],
    target: &'a [T],
    target_index: AHashMap<&'a T, Vec<usize>>,
}

impl<'a, T: Eq + Hash> SequenceMatcher<'a, T> {
    /// Index `target` for matching against `source`
    pub fn new(source: &'a [T], target: &'a [T]) -> Self {
        let mut target_index: AHashMap<&'a T, Vec<usize>> = AHashMap::new();
        for (position, element) in target.iter().enumerate() {
            target_index.entry(element).or_default().push(position);
        }
        Self {
            source,
            target,
            target_index,
        }
    }

    /// Longest matching block inside `source[a]` and `target[b]`
    ///
    /// Returns a block of size 0 at `(a.start, b.start)` when nothing matches.
    #[must_use]
    pub fn find_longest_match(&self, a: Range<usize>, b: Range<usize>) -> MatchBlock {
        let mut best = MatchBlock {
            source: a.start,
            target: b.start,
            size: 0,
        };
        // run length of the match ending at each target position, previous row
        let mut lengths: AHashMap<usize, usize> = AHashMap::new();
        let mut next_lengths: AHashMap<usize, usize> = AHashMap::new();

        for i in a.clone() {
            next_lengths.clear();
            if let Some(positions) = self.target_index.get(&self.source[i]) {
                for &j in positions {
                    if j < b.start {
                        continue;
                    }
                    if j >= b.end {
                        break;
                    }
                    let run = j
                        .checked_sub(1)
                        .and_then(|previous| lengths.get(&previous))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next_lengths.insert(j, run);
                    if run > best.size {
                        best = MatchBlock {
                            source: i + 1 - run,
                            target: j + 1 - run,
                            size: run,
                        };
                    }
                }
            }
            core::mem::swap(&mut lengths, &mut next_lengths);
        }

        best
    }

    /// All matching blocks in increasing order, adjacent blocks merged
    #[must_use]
    pub fn matching_blocks(&self) -> Vec<MatchBlock> {
        let mut pending = vec![(0..self.source.len(), 0..self.target.len())];
        let mut blocks = Vec::new();

        while let Some((a, b)) = pending.pop() {
            let block = self.find_longest_match(a.clone(), b.clone());
            if block.size == 0 {
                continue;
            }
            if a.start < block.source && b.start < block.target {
                pending.push((a.start..block.source, b.start..block.target));
            }
            let a_after = block.source + block.size;
            let b_after = block.target + block.size;
            if a_after < a.end && b_after < b.end {
                pending.push((a_after..a.end, b_after..b.end));
            }
            blocks.push(block);
        }

        blocks.sort_by_key(|block| (block.source, block.target));

        let mut merged: Vec<MatchBlock> = Vec::with_capacity(blocks.len());
        for block in blocks {
            match merged.last_mut() {
                Some(last)
                    if last.source + last.size == block.source
                        && last.target + last.size == block.target =>
                {
                    last.size += block.size;
                }
                _ => merged.push(block),
            }
        }
        merged
    }

    /// Opcode script turning the source into the target
    ///
    /// Ranges tile both sequences completely and in order.
    #[must_use]
    pub fn opcodes(&self) -> Vec<AlignmentOpcode> {
        let mut blocks = self.matching_blocks();
        blocks.push(MatchBlock {
            source: self.source.len(),
            target: self.target.len(),
            size: 0,
        });

        let mut opcodes = Vec::new();
        let (mut i, mut j) = (0, 0);
        for block in blocks {
            let source = i..block.source;
            let target = j..block.target;
            if i < block.source && j < block.target {
                opcodes.push(AlignmentOpcode::Replace { source, target });
            } else if i < block.source {
                opcodes.push(AlignmentOpcode::Delete { source, target });
            } else if j < block.target {
                opcodes.push(AlignmentOpcode::Insert { source, target });
            }

            i = block.source + block.size;
            j = block.target + block.size;
            if block.size > 0 {
                opcodes.push(AlignmentOpcode::Equal {
                    source: block.source..i,
                    target: block.target..j,
                });
            }
        }
        opcodes
    }

    /// `2 * matched / (len(source) + len(target))`, `1.0` for two empty sequences
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self) -> f64 {
        let total = self.source.len() + self.target.len();
        if total == 0 {
            return 1.0;
        }
        let matched: usize = self.matching_blocks().iter().map(|block| block.size).sum();
        (2 * matched) as f64 / total as f64
    }
}

/// Order-independent similarity of two strings, by character
///
/// Ratcliff/Obershelp is not symmetric when blocks tie, so the pair is put in
/// a canonical order before matching. The result is always the exact ratio of
/// one of the two directions.
#[must_use]
pub fn similarity(a: &str, b: &str) -> f64 {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    let first: Vec<char> = first.chars().collect();
    let second: Vec<char> = second.chars().collect();
    SequenceMatcher::new(&first, &second).ratio()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chars(text: &str) -> Vec<char> {
        text.chars().collect()
    }

    #[test]
    fn longest_match_prefers_earliest() {
        let a = chars(" abcd");
        let b = chars("abcd abcd");
        let matcher = SequenceMatcher::new(&a, &b);
        let block = matcher.find_longest_match(0..5, 0..9);
        assert_eq!(
            block,
            MatchBlock {
                source: 0,
                target: 4,
                size: 5
            }
        );
    }

    #[test]
    fn matching_blocks_cover_common_runs() {
        let a = chars("abxcd");
        let b = chars("abcd");
        let blocks = SequenceMatcher::new(&a, &b).matching_blocks();
        assert_eq!(
            blocks,
            vec![
                MatchBlock {
                    source: 0,
                    target: 0,
                    size: 2
                },
                MatchBlock {
                    source: 3,
                    target: 2,
                    size: 2
                },
            ]
        );
    }

    #[test]
    fn ratio_of_known_pair() {
        let a = chars("abcd");
        let b = chars("bcde");
        let ratio = SequenceMatcher::new(&a, &b).ratio();
        assert!((ratio - 0.75).abs() < 1e-12);
    }

    #[test]
    fn ratio_edge_cases() {
        let empty: Vec<char> = Vec::new();
        let word = chars("word");
        assert_eq!(SequenceMatcher::new(&empty, &empty).ratio(), 1.0);
        assert_eq!(SequenceMatcher::new(&word, &empty).ratio(), 0.0);
        assert_eq!(SequenceMatcher::new(&word, &word).ratio(), 1.0);
    }

    #[test]
    fn opcodes_for_word_sequences() {
        let source = vec!["hello", "wurld", "foo"];
        let target = vec!["hello", "world", "foo", "bar"];
        let opcodes = SequenceMatcher::new(&source, &target).opcodes();
        assert_eq!(
            opcodes,
            vec![
                AlignmentOpcode::Equal {
                    source: 0..1,
                    target: 0..1
                },
                AlignmentOpcode::Replace {
                    source: 1..2,
                    target: 1..2
                },
                AlignmentOpcode::Equal {
                    source: 2..3,
                    target: 2..3
                },
                AlignmentOpcode::Insert {
                    source: 3..3,
                    target: 3..4
                },
            ]
        );
    }

    #[test]
    fn opcodes_with_deletion() {
        let source = vec!["a", "extra", "b"];
        let target = vec!["a", "b"];
        let opcodes = SequenceMatcher::new(&source, &target).opcodes();
        let tags: Vec<&str> = opcodes.iter().map(AlignmentOpcode::tag).collect();
        assert_eq!(tags, vec!["equal", "delete", "equal"]);
        assert_eq!(opcodes[1].source(), 1..2);
        assert_eq!(opcodes[1].target(), 1..1);
    }

    #[test]
    fn opcodes_for_empty_sequences() {
        let empty: Vec<&str> = Vec::new();
        let words = vec!["x", "y"];
        assert!(SequenceMatcher::new(&empty, &empty).opcodes().is_empty());
        assert_eq!(
            SequenceMatcher::new(&empty, &words).opcodes(),
            vec![AlignmentOpcode::Insert {
                source: 0..0,
                target: 0..2
            }]
        );
    }

    #[test]
    fn similarity_is_order_independent() {
        // directional ratios differ for this pair
        let forward = SequenceMatcher::new(&chars("tide"), &chars("diet")).ratio();
        let backward = SequenceMatcher::new(&chars("diet"), &chars("tide")).ratio();
        assert!((forward - backward).abs() > 1e-9);
        assert_eq!(similarity("tide", "diet"), similarity("diet", "tide"));
        assert_eq!(similarity("same", "same"), 1.0);
    }
}
