//! Stepped walk through musical time.
//!
//! [`TimeSteps`] advances by a fixed exact step (any rational, so tuplets
//! line up) and reports where each step lands as a [`TimeSection`]. Bounded
//! walks stop at a limit and clip the last step so the steps exactly tile the
//! span; unbounded walks never end and are pulled lazily.

use super::duration::Duration;
use super::time_section::TimeSection;
use super::time_signature::TimeSignature;
use crate::error::{GrilleError, Result};

/// One step of a [`TimeSteps`] walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Where the step starts, under the walk's time signature
    pub section: TimeSection,
    /// Time since the walk started
    pub elapsed: Duration,
    /// Length of this step (the last step of a bounded walk may be shorter)
    pub length: Duration,
}

#[derive(Debug, Clone)]
pub struct TimeSteps {
    time_signature: TimeSignature,
    step: Duration,
    /// Position of the first step, measured from the time-signature origin
    offset: Duration,
    limit: Option<Duration>,
    elapsed: Duration,
}

impl TimeSteps {
    /// Unbounded walk from the time-signature origin.
    pub fn new(time_signature: TimeSignature, step: Duration) -> Result<Self> {
        if !step.is_positive() {
            return Err(GrilleError::InvalidStep(step.to_string()));
        }
        Ok(Self {
            time_signature,
            step,
            offset: Duration::ZERO,
            limit: None,
            elapsed: Duration::ZERO,
        })
    }

    /// Start the walk `offset` after the time-signature origin.
    pub fn offset(mut self, offset: Duration) -> Result<Self> {
        if offset.is_negative() {
            return Err(GrilleError::NegativePosition(offset.to_string()));
        }
        self.offset = offset;
        Ok(self)
    }

    /// Start the walk at a bar/beat coordinate.
    pub fn from_section(mut self, section: TimeSection) -> Self {
        self.offset = section.to_duration(&self.time_signature);
        self
    }

    /// Stop after `span` of elapsed time; the final step is clipped to fit.
    pub fn limit(mut self, span: Duration) -> Self {
        self.limit = Some(span);
        self
    }

    pub fn is_bounded(&self) -> bool {
        self.limit.is_some()
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    pub fn time_signature(&self) -> &TimeSignature {
        &self.time_signature
    }
}

impl Iterator for TimeSteps {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        let length = match self.limit {
            Some(limit) if self.elapsed >= limit => return None,
            Some(limit) => self.step.min(limit - self.elapsed),
            None => self.step,
        };

        // offset and elapsed are never negative, so this cannot fail
        let section =
            TimeSection::from_duration(&self.time_signature, self.offset + self.elapsed).ok()?;
        let step = Step {
            section,
            elapsed: self.elapsed,
            length,
        };
        self.elapsed += length;
        Some(step)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.limit {
            Some(limit) if self.elapsed >= limit => (0, Some(0)),
            Some(limit) => {
                let whole = (limit - self.elapsed).ratio_to(self.step).ceil().to_integer();
                let n = usize::try_from(whole).unwrap_or(usize::MAX);
                (n, Some(n))
            }
            None => (usize::MAX, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_rational::Rational64;

    #[test]
    fn bounded_walk_tiles_the_span() {
        let steps: Vec<Step> = TimeSteps::new(TimeSignature::FOUR_FOUR, Duration::QUARTER)
            .unwrap()
            .limit(Duration::WHOLE)
            .collect();

        assert_eq!(steps.len(), 4);
        assert_eq!(steps[3].elapsed, Duration::DOTTED_HALF);
        assert_eq!(steps[3].section.beat(), 3);
        assert!(steps.iter().all(|s| s.length == Duration::QUARTER));
    }

    #[test]
    fn last_step_is_clipped() {
        let steps: Vec<Step> = TimeSteps::new(TimeSignature::FOUR_FOUR, Duration::DOTTED_QUARTER)
            .unwrap()
            .limit(Duration::WHOLE)
            .collect();

        // 3/2 + 3/2 + 1 = 4
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[2].length, Duration::QUARTER);
        let total: Duration = steps.iter().map(|s| s.length).sum();
        assert_eq!(total, Duration::WHOLE);
    }

    #[test]
    fn tuplet_steps_stay_exact() {
        let quintuplet = Duration::new(1, 5).unwrap();
        let walk = TimeSteps::new(TimeSignature::THREE_FOUR, quintuplet)
            .unwrap()
            .limit(Duration::DOTTED_HALF);
        assert_eq!(walk.size_hint(), (15, Some(15)));

        let steps: Vec<Step> = walk.collect();
        assert_eq!(steps.len(), 15);
        assert_eq!(steps[5].section.beat(), 1);
        assert_eq!(steps[5].section.remainder(), Rational64::new(0, 1));
        assert_eq!(steps[7].section.remainder(), Rational64::new(2, 5));
    }

    #[test]
    fn offset_moves_sections_not_elapsed() {
        let section = TimeSection::new(1, 2, Rational64::new(0, 1)).unwrap();
        let mut walk = TimeSteps::new(TimeSignature::FOUR_FOUR, Duration::QUARTER)
            .unwrap()
            .from_section(section)
            .limit(Duration::HALF);

        let first = walk.next().unwrap();
        assert_eq!(first.elapsed, Duration::ZERO);
        assert_eq!(first.section, section);
        let second = walk.next().unwrap();
        assert_eq!(second.section.beat(), 3);
        assert!(walk.next().is_none());
    }

    #[test]
    fn unbounded_walk_keeps_going() {
        let mut walk = TimeSteps::new(TimeSignature::SIX_EIGHT, Duration::EIGHTH)
            .unwrap()
            .offset(Duration::QUARTER)
            .unwrap();
        assert!(!walk.is_bounded());

        let step = walk.nth(1000).unwrap();
        assert_eq!(step.elapsed, Duration::from_quarters(500));
        // 1/4 + 500 quarters; 6/8 bar = 3 quarters, beat = 1/2 quarter
        assert_eq!(step.section.bar(), 166);
        assert_eq!(step.section.beat(), 4);
        assert_eq!(step.section.remainder(), Rational64::new(1, 2));
    }

    #[test]
    fn rejects_non_positive_steps() {
        assert!(TimeSteps::new(TimeSignature::FOUR_FOUR, Duration::ZERO).is_err());
        assert!(TimeSteps::new(TimeSignature::FOUR_FOUR, -Duration::QUARTER).is_err());
        assert!(TimeSteps::new(TimeSignature::FOUR_FOUR, Duration::QUARTER)
            .unwrap()
            .offset(-Duration::QUARTER)
            .is_err());
    }

    #[test]
    fn empty_limit_yields_nothing() {
        let mut walk = TimeSteps::new(TimeSignature::FOUR_FOUR, Duration::QUARTER)
            .unwrap()
            .limit(Duration::ZERO);
        assert!(walk.next().is_none());
    }
}
