//! Fixed pitch catalog per clef.
//!
//! Each clef offers 17 natural pitches, from two ledger lines below the
//! staff to two ledger lines above it. The catalog is stateless.

use crate::core::pitch::{Clef, Letter, Pitch, PitchRange};

/// Number of pitches offered for every clef.
pub const PITCHES_PER_CLEF: usize = 17;

/// Lowest catalog pitch for a clef.
fn lowest(clef: Clef) -> (Letter, i32) {
    match clef {
        Clef::Treble => (Letter::C, 4),
        Clef::Bass => (Letter::E, 2),
    }
}

/// All pitches for a clef, ordered from lowest to highest.
pub fn pitches(clef: Clef) -> Vec<Pitch> {
    let (start, mut octave) = lowest(clef);
    let letters = Letter::all();
    let mut index = start.step() as usize;

    let mut result = Vec::with_capacity(PITCHES_PER_CLEF);
    while result.len() < PITCHES_PER_CLEF {
        result.push(Pitch::new(letters[index], octave, clef));
        index += 1;
        if index == letters.len() {
            index = 0;
            octave += 1;
        }
    }
    result
}

/// Pitches of `clef` whose height lies within `range`, bounds included.
///
/// If either bound is not a valid label, every pitch of the clef is
/// returned. A bad range in a config file should degrade to full practice,
/// not lock the user out.
pub fn filter_range(clef: Clef, range: &PitchRange) -> Vec<Pitch> {
    let all = pitches(clef);
    match range.bounds() {
        Ok((low, high)) => all
            .into_iter()
            .filter(|p| (low..=high).contains(&p.value()))
            .collect(),
        Err(err) => {
            tracing::debug!(%clef, %range, error = %err, "unparsable range, using all pitches");
            all
        }
    }
}

/// Default practice range for a clef: the whole catalog.
pub fn default_range(clef: Clef) -> PitchRange {
    match clef {
        Clef::Treble => PitchRange::new(clef, "C4", "E6"),
        Clef::Bass => PitchRange::new(clef, "E2", "G4"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pitches: &[Pitch]) -> Vec<String> {
        pitches.iter().map(|p| p.label()).collect()
    }

    #[test]
    fn test_treble_catalog() {
        let treble = pitches(Clef::Treble);
        assert_eq!(treble.len(), PITCHES_PER_CLEF);
        assert_eq!(treble[0].label(), "C4");
        assert_eq!(treble[16].label(), "E6");
        assert!(treble.iter().all(|p| p.clef == Clef::Treble));
    }

    #[test]
    fn test_bass_catalog() {
        let bass = pitches(Clef::Bass);
        assert_eq!(bass.len(), PITCHES_PER_CLEF);
        assert_eq!(bass[0].label(), "E2");
        assert_eq!(bass[16].label(), "G4");
        assert!(bass.iter().all(|p| p.clef == Clef::Bass));
    }

    #[test]
    fn test_catalog_is_strictly_ascending() {
        for &clef in Clef::all() {
            let list = pitches(clef);
            assert!(list.windows(2).all(|w| w[0].value() < w[1].value()));
        }
    }

    #[test]
    fn test_catalog_spans_two_ledger_lines() {
        for &clef in Clef::all() {
            let list = pitches(clef);
            assert_eq!(list[0].staff_step(), -2);
            assert_eq!(list[16].staff_step(), 14);
        }
    }

    #[test]
    fn test_filter_range_inclusive() {
        let range = PitchRange::new(Clef::Treble, "C4", "G4");
        let filtered = filter_range(Clef::Treble, &range);
        assert_eq!(labels(&filtered), vec!["C4", "D4", "E4", "F4", "G4"]);
    }

    #[test]
    fn test_filter_default_bass_is_full_catalog() {
        let filtered = filter_range(Clef::Bass, &default_range(Clef::Bass));
        assert_eq!(filtered, pitches(Clef::Bass));
    }

    #[test]
    fn test_filter_default_treble_is_full_catalog() {
        let filtered = filter_range(Clef::Treble, &default_range(Clef::Treble));
        assert_eq!(filtered.len(), PITCHES_PER_CLEF);
    }

    #[test]
    fn test_filter_is_clef_scoped() {
        // Same labels, different staff: only bass pitches come back.
        let range = PitchRange::new(Clef::Bass, "C4", "G4");
        let filtered = filter_range(Clef::Bass, &range);
        assert_eq!(labels(&filtered), vec!["C4", "D4", "E4", "F4", "G4"]);
        assert!(filtered.iter().all(|p| p.clef == Clef::Bass));
    }

    #[test]
    fn test_filter_bounds_outside_catalog() {
        let range = PitchRange::new(Clef::Bass, "C2", "C4");
        let filtered = filter_range(Clef::Bass, &range);
        assert_eq!(filtered.first().unwrap().label(), "E2");
        assert_eq!(filtered.last().unwrap().label(), "C4");
        assert_eq!(filtered.len(), 13);
    }

    #[test]
    fn test_filter_inverted_range_is_empty() {
        let range = PitchRange::new(Clef::Treble, "G4", "C4");
        assert!(filter_range(Clef::Treble, &range).is_empty());
    }

    #[test]
    fn test_filter_unparsable_falls_back_to_all() {
        let bad_start = PitchRange::new(Clef::Treble, "middle C", "G4");
        assert_eq!(filter_range(Clef::Treble, &bad_start).len(), PITCHES_PER_CLEF);

        let bad_end = PitchRange::new(Clef::Bass, "E2", "");
        assert_eq!(filter_range(Clef::Bass, &bad_end).len(), PITCHES_PER_CLEF);
    }

    #[test]
    fn test_filter_huge_octave_falls_back_to_all() {
        let range = PitchRange::new(Clef::Treble, "C4", "C999999999");
        assert_eq!(filter_range(Clef::Treble, &range).len(), PITCHES_PER_CLEF);
    }
}
