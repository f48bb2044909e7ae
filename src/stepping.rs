//! Rotor stepping: carry, the pawl rule and the double-step anomaly.
//!
//! Rotors are indexed left to right; the last index is the fast rotor next
//! to the entry wheel. Before every enciphered symbol:
//!
//! 1. the rightmost rotor advances;
//! 2. for each adjacent pair `(i, i + 1)` among the rightmost three rotors,
//!    if rotor `i + 1` sits at one of its notches, the pawl between them
//!    drops into the notch and pushes both rotors: rotor `i` advances
//!    (carry) and rotor `i + 1` advances too.
//!
//! Rule 2 is what makes a middle rotor that has just been carried onto its
//! notch advance again on the very next key press, the double step. The
//! leftmost of the three pawl rotors has no pawl on its own left and is only
//! ever carried. There are only three pawls, so with four or more rotors
//! the extra rotors on the left (the M4 Greek wheel) never move.
//!
//! All notch tests use the positions from before the step.

use tracing::trace;

use crate::rotor::RotorInstance;

/// Number of rotors, counted from the right, that the pawls can move.
pub const PAWL_ROTORS: usize = 3;

/// Returns true if rotor `index` of `len` advances on this step.
#[inline]
fn advances(index: usize, len: usize, at_notch: impl Fn(usize) -> bool) -> bool {
    let first = len.saturating_sub(PAWL_ROTORS);
    if index < first {
        return false;
    }
    index + 1 == len || at_notch(index + 1) || (index > first && at_notch(index))
}

/// Computes the rotor positions after one key press.
///
/// `positions` and `notches` are given left to right. The input is not
/// modified, so the function can be driven directly to produce a position
/// trace.
///
/// # Examples
///
/// Rotors I, II, III (notches Q, E, V) starting at `ADU`:
///
/// ```
/// use bitnigma::stepping::step;
///
/// let notches = [vec![16], vec![4], vec![21]];
/// let mut positions = vec![0, 3, 20]; // A D U
/// positions = step(&positions, &notches, 26);
/// assert_eq!(positions, vec![0, 3, 21]); // A D V
/// positions = step(&positions, &notches, 26);
/// assert_eq!(positions, vec![0, 4, 22]); // A E W
/// positions = step(&positions, &notches, 26);
/// assert_eq!(positions, vec![1, 5, 23]); // B F X  (double step)
/// ```
pub fn step<N: AsRef<[usize]>>(
    positions: &[usize],
    notches: &[N],
    alphabet_size: usize,
) -> Vec<usize> {
    let len = positions.len();
    let at_notch = |k: usize| notches[k].as_ref().contains(&positions[k]);
    positions
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            if advances(i, len, at_notch) {
                (p + 1) % alphabet_size
            } else {
                p
            }
        })
        .collect()
}

/// Applies the stepping rule to live rotors.
///
/// The controller is the only component that moves rotors; it also counts
/// the key presses it has applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SteppingController {
    steps: u64,
}

impl SteppingController {
    /// Creates a controller that has not stepped yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances `rotors` (left to right) by one key press.
    ///
    /// Equivalent to [`step`] over the rotors' positions and notches, done
    /// in place: each rotor's decision only reads its own and its right
    /// neighbour's position, neither of which has moved yet when rotors are
    /// visited left to right.
    pub fn advance(&mut self, rotors: &mut [RotorInstance]) {
        let len = rotors.len();
        for i in 0..len {
            if advances(i, len, |k| rotors[k].at_notch()) {
                let next = rotors[i].position() + 1;
                rotors[i].set_position(next);
            }
        }
        self.steps += 1;
        trace!(
            step = self.steps,
            positions = ?rotors.iter().map(RotorInstance::position).collect::<Vec<_>>(),
            "rotors stepped"
        );
    }

    /// Number of key presses applied since creation or the last reset.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Zeroes the key press counter.
    pub fn reset(&mut self) {
        self.steps = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wiring::RotorWiring;
    use std::sync::Arc;

    const I_II_III_NOTCHES: [[usize; 1]; 3] = [[16], [4], [21]];

    fn letters(positions: &[usize]) -> String {
        positions.iter().map(|&p| (b'A' + p as u8) as char).collect()
    }

    #[test]
    fn test_fast_rotor_always_steps() {
        let notches: [Vec<usize>; 3] = [vec![], vec![], vec![]];
        let next = step(&[0, 0, 25], &notches, 26);
        assert_eq!(next, vec![0, 0, 0]);
    }

    #[test]
    fn test_double_step_trace() {
        let mut positions = vec![0, 3, 20];
        let mut trace = vec![letters(&positions)];
        for _ in 0..4 {
            positions = step(&positions, &I_II_III_NOTCHES, 26);
            trace.push(letters(&positions));
        }
        assert_eq!(trace, vec!["ADU", "ADV", "AEW", "BFX", "BFY"]);
    }

    #[test]
    fn test_single_carry_without_double_step() {
        // Fast rotor at its notch carries the middle rotor once.
        let next = step(&[0, 0, 21], &I_II_III_NOTCHES, 26);
        assert_eq!(letters(&next), "ABW");
        let next = step(&next, &I_II_III_NOTCHES, 26);
        assert_eq!(letters(&next), "ABX");
    }

    #[test]
    fn test_leftmost_notch_has_no_effect() {
        // Left rotor at its own notch Q: nothing pushes it.
        let next = step(&[16, 0, 0], &I_II_III_NOTCHES, 26);
        assert_eq!(letters(&next), "QAB");
    }

    #[test]
    fn test_four_rotors_leftmost_is_fixed() {
        // Rotor 1 sits at a notch, but no pawl reaches the rotor to its left.
        let notches = [vec![], vec![12, 25], vec![16], vec![21]];
        let next = step(&[0, 25, 0, 0], &notches, 26);
        assert_eq!(next, vec![0, 25, 0, 1]);
    }

    #[test]
    fn test_four_rotors_double_step_behind_fixed_wheel() {
        let notches = [vec![], vec![16], vec![4], vec![21]];
        let mut positions = vec![0, 0, 3, 20];
        let mut trace = vec![letters(&positions)];
        for _ in 0..4 {
            positions = step(&positions, &notches, 26);
            trace.push(letters(&positions));
        }
        assert_eq!(trace, vec!["AADU", "AADV", "AAEW", "ABFX", "ABFY"]);
    }

    #[test]
    fn test_four_rotors_leftmost_never_moves() {
        let notches = [vec![0], vec![16], vec![4], vec![21]];
        let mut positions = vec![7, 0, 0, 0];
        for _ in 0..(26 * 25 * 26) {
            positions = step(&positions, &notches, 26);
            assert_eq!(positions[0], 7);
        }
        assert_eq!(positions, vec![7, 0, 0, 0]);
    }

    #[test]
    fn test_two_rotors_both_pawls_apply() {
        let notches = [vec![3], vec![5]];
        let next = step(&[3, 5], &notches, 26);
        assert_eq!(next, vec![4, 6]);
    }

    #[test]
    fn test_positions_wrap() {
        let notches = [vec![25], vec![25], vec![25]];
        let next = step(&[25, 24, 25], &notches, 26);
        assert_eq!(next, vec![25, 25, 0]);
        let next = step(&next, &notches, 26);
        assert_eq!(next, vec![0, 0, 1]);
    }

    #[test]
    fn test_input_untouched() {
        let positions = vec![0, 3, 20];
        let _ = step(&positions, &I_II_III_NOTCHES, 26);
        assert_eq!(positions, vec![0, 3, 20]);
    }

    #[test]
    fn test_controller_matches_pure_step() {
        let wiring = Arc::new(RotorWiring::new("id", (0..26).collect(), vec![], 26).unwrap());
        let mut rotors: Vec<RotorInstance> = [(0, 16), (3, 4), (20, 21)]
            .iter()
            .map(|&(pos, notch)| {
                RotorInstance::new(Arc::clone(&wiring), 0, pos, Some(vec![notch])).unwrap()
            })
            .collect();
        let mut positions = vec![0, 3, 20];
        let mut controller = SteppingController::new();
        for _ in 0..2000 {
            positions = step(&positions, &I_II_III_NOTCHES, 26);
            controller.advance(&mut rotors);
            let live: Vec<usize> = rotors.iter().map(|r| r.position()).collect();
            assert_eq!(live, positions);
        }
        assert_eq!(controller.steps(), 2000);
        controller.reset();
        assert_eq!(controller.steps(), 0);
    }

    #[test]
    fn test_full_period_of_three_rotors() {
        // With the double step the three-rotor period is 26 * 25 * 26.
        let start = vec![0, 0, 0];
        let mut positions = start.clone();
        let mut count = 0u32;
        loop {
            positions = step(&positions, &I_II_III_NOTCHES, 26);
            count += 1;
            if positions == start || count > 26 * 26 * 26 {
                break;
            }
        }
        assert_eq!(count, 26 * 25 * 26);
    }
}
