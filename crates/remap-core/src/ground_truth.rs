//! Ground truth: the externally known correct vertex correspondence.
//!
//! Used only to score algorithm output — the propagation algorithms never
//! consult it. Two ingredients: the set of vertices common to both graphs
//! (matched by identity) and an optional extended mapping for graph pairs
//! whose vertex ids are not directly comparable.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use tracing::warn;

use crate::matches::Matches;
use crate::records;

/// Verdict for a single proposed pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchScore {
    Correct,
    Incorrect,
    /// The source vertex is not covered by ground truth.
    Unknown,
}

impl MatchScore {
    /// Conventional numeric form: +1 / −1 / 0.
    #[must_use]
    pub fn value(self) -> i32 {
        match self {
            Self::Correct => 1,
            Self::Incorrect => -1,
            Self::Unknown => 0,
        }
    }
}

/// Accuracy tallies for a whole [`Matches`] set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Accuracy {
    pub correct: usize,
    pub incorrect: usize,
    pub unknown: usize,
}

impl Accuracy {
    /// Fraction of scoreable pairs that were correct; 0.0 when nothing was
    /// scoreable.
    #[must_use]
    pub fn rate(&self) -> f64 {
        let scoreable = self.correct + self.incorrect;
        if scoreable == 0 {
            return 0.0;
        }
        self.correct as f64 / scoreable as f64
    }
}

#[derive(Debug, Clone, Default)]
pub struct GroundTruth {
    common: BTreeSet<u32>,
    mappings: BTreeMap<u32, BTreeSet<u32>>,
}

impl GroundTruth {
    #[must_use]
    pub fn new(common: BTreeSet<u32>, mappings: BTreeMap<u32, BTreeSet<u32>>) -> Self {
        Self { common, mappings }
    }

    #[must_use]
    pub fn from_common(common: impl IntoIterator<Item = u32>) -> Self {
        Self {
            common: common.into_iter().collect(),
            mappings: BTreeMap::new(),
        }
    }

    /// Load ground truth from the vertex-overlap cache and an optional
    /// extended-mapping file. A missing file yields the corresponding empty
    /// part with a warning (scoring then reports `Unknown`), matching the
    /// best-effort cache discipline.
    ///
    /// # Errors
    ///
    /// Returns an I/O error only for files that exist but cannot be read.
    pub fn load(overlap: &Path, mapping: Option<&Path>) -> std::io::Result<Self> {
        let common: BTreeSet<u32> = if overlap.exists() {
            records::read_id_list(overlap)?.into_iter().collect()
        } else {
            warn!(path = %overlap.display(), "vertex-overlap cache missing; ground truth is empty");
            BTreeSet::new()
        };

        let mut mappings: BTreeMap<u32, BTreeSet<u32>> = BTreeMap::new();
        if let Some(mapping) = mapping {
            if mapping.exists() {
                for (src, tgt) in records::read_id_pairs(mapping)? {
                    mappings.entry(src).or_default().insert(tgt);
                }
            } else {
                warn!(path = %mapping.display(), "mapping cache missing; extended ground truth is empty");
            }
        }

        Ok(Self { common, mappings })
    }

    #[must_use]
    pub fn common_vertices(&self) -> &BTreeSet<u32> {
        &self.common
    }

    /// Whether ground truth can score pairs rooted at `source`.
    #[must_use]
    pub fn knows(&self, source: u32) -> bool {
        self.common.contains(&source) || self.mappings.contains_key(&source)
    }

    /// Score one proposed pair. Identity wins for common vertices; the
    /// extended mapping covers renumbered graph pairs; anything else is
    /// unscoreable.
    #[must_use]
    pub fn score(&self, source: u32, target: u32) -> MatchScore {
        if self.common.contains(&source) {
            if source == target {
                return MatchScore::Correct;
            }
            return MatchScore::Incorrect;
        }
        if let Some(targets) = self.mappings.get(&source) {
            if targets.contains(&target) {
                return MatchScore::Correct;
            }
            return MatchScore::Incorrect;
        }
        MatchScore::Unknown
    }

    /// Tally a whole matches set.
    #[must_use]
    pub fn accuracy(&self, matches: &Matches) -> Accuracy {
        let mut acc = Accuracy::default();
        for (s, t) in matches.iter() {
            match self.score(s, t) {
                MatchScore::Correct => acc.correct += 1,
                MatchScore::Incorrect => acc.incorrect += 1,
                MatchScore::Unknown => acc.unknown += 1,
            }
        }
        acc
    }

    /// The subset of pairs ground truth can score, in ascending source order
    /// (the payload of the restricted matches file).
    #[must_use]
    pub fn restricted_pairs(&self, matches: &Matches) -> Vec<(u32, u32)> {
        matches.iter().filter(|&(s, _)| self.knows(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> GroundTruth {
        let mut mappings = BTreeMap::new();
        mappings.insert(100, BTreeSet::from([200, 201]));
        GroundTruth::new(BTreeSet::from([1, 2, 3]), mappings)
    }

    #[test]
    fn identity_scoring_for_common_vertices() {
        let gt = fixture();
        assert_eq!(gt.score(1, 1), MatchScore::Correct);
        assert_eq!(gt.score(1, 2), MatchScore::Incorrect);
    }

    #[test]
    fn extended_mapping_scoring() {
        let gt = fixture();
        assert_eq!(gt.score(100, 201), MatchScore::Correct);
        assert_eq!(gt.score(100, 999), MatchScore::Incorrect);
    }

    #[test]
    fn uncovered_sources_are_unknown() {
        let gt = fixture();
        assert_eq!(gt.score(42, 42), MatchScore::Unknown);
        assert_eq!(gt.score(42, 42).value(), 0);
    }

    #[test]
    fn accuracy_tallies_and_rate() {
        let gt = fixture();
        let mut m = Matches::new();
        m.add(1, 1); // correct
        m.add(2, 3); // incorrect
        m.add(100, 200); // correct via mapping
        m.add(42, 7); // unknown

        let acc = gt.accuracy(&m);
        assert_eq!(
            acc,
            Accuracy {
                correct: 2,
                incorrect: 1,
                unknown: 1
            }
        );
        assert!((acc.rate() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn restricted_pairs_drop_unknowns() {
        let gt = fixture();
        let mut m = Matches::new();
        m.add(2, 2);
        m.add(42, 7);
        assert_eq!(gt.restricted_pairs(&m), vec![(2, 2)]);
    }

    #[test]
    fn load_missing_files_yields_empty() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        let gt = GroundTruth::load(
            &tmp.path().join("absent.ovl"),
            Some(&tmp.path().join("absent.map")),
        )
        .expect("load tolerates missing files");
        assert!(gt.common_vertices().is_empty());
        assert_eq!(gt.score(1, 1), MatchScore::Unknown);
    }

    #[test]
    fn load_round_trips_written_caches() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        let overlap = tmp.path().join("pair.ovl");
        let mapping = tmp.path().join("pair.map");
        crate::records::write_id_list(&overlap, &[3, 1, 2]).expect("write overlap");
        crate::records::write_id_pairs(&mapping, &[(100, 200), (100, 201)]).expect("write mapping");

        let gt = GroundTruth::load(&overlap, Some(&mapping)).expect("load");
        assert_eq!(gt.common_vertices(), &BTreeSet::from([1, 2, 3]));
        assert_eq!(gt.score(100, 200), MatchScore::Correct);
    }
}
