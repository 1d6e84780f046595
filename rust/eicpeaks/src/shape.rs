//! Per-observation shape codes and the symmetry score built on them.
//!
//! A shape code has one symbol per observation inside a peak:
//! `0` at or below the baseline, `+` when the intensity rose compared to the
//! previous observation, `-` when it fell. Exact ties repeat the previous
//! symbol (or `0` when there is none yet).

pub const AT_BASELINE: char = '0';
pub const RISING: char = '+';
pub const FALLING: char = '-';

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapeCode(String);

impl ShapeCode {
    pub fn with_capacity(capacity: usize) -> Self {
        Self(String::with_capacity(capacity))
    }

    pub fn push_observation(&mut self, intensity: f32, baseline: f32, last_intensity: f32) {
        let symbol = if intensity <= baseline {
            AT_BASELINE
        } else if intensity > last_intensity {
            RISING
        } else if intensity < last_intensity {
            FALLING
        } else {
            self.0.chars().last().unwrap_or(AT_BASELINE)
        };
        self.0.push(symbol);
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Longest stretch where a run of `rise` mirrors a run of `fall` around a
    /// common center, e.g. `"++x--"` or `"++--"` both score 2.
    pub fn longest_symmetry(&self, rise: char, fall: char) -> usize {
        let symbols: Vec<char> = self.0.chars().collect();
        let n = symbols.len();
        let mut best = 0;

        // Odd centers sit on a symbol, even centers between two symbols.
        for center in 0..n {
            let mut span = 0;
            while span < center
                && center + span + 1 < n
                && symbols[center - span - 1] == rise
                && symbols[center + span + 1] == fall
            {
                span += 1;
            }
            best = best.max(span);

            let mut span = 0;
            while span <= center
                && center + span + 1 < n
                && symbols[center - span] == rise
                && symbols[center + span + 1] == fall
            {
                span += 1;
            }
            best = best.max(span);
        }
        best
    }
}

impl From<&str> for ShapeCode {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
