use serde::{Deserialize, Serialize};

/// Which half of an inning is being played. The visitors bat in the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InningHalf {
    Top,
    Bottom,
}

impl InningHalf {
    pub fn flipped(self) -> Self {
        match self {
            InningHalf::Top => InningHalf::Bottom,
            InningHalf::Bottom => InningHalf::Top,
        }
    }
}

impl core::fmt::Display for InningHalf {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            InningHalf::Top => "top",
            InningHalf::Bottom => "bottom",
        })
    }
}

/// Runs by side in one inning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InningScore {
    pub inning: u8,
    pub away: u32,
    pub home: u32,
}

/// Running score with an inning-by-inning breakdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    away: u32,
    home: u32,
    innings: Vec<InningScore>,
}

impl Score {
    pub fn away(&self) -> u32 {
        self.away
    }

    pub fn home(&self) -> u32 {
        self.home
    }

    pub fn innings(&self) -> &[InningScore] {
        &self.innings
    }

    pub fn inning(&self, inning: u8) -> Option<&InningScore> {
        self.innings.iter().find(|i| i.inning == inning)
    }

    /// Credit `runs` to the side batting in `half` of `inning`.
    pub(crate) fn add(&mut self, inning: u8, half: InningHalf, runs: u32) {
        let idx = match self.innings.binary_search_by_key(&inning, |i| i.inning) {
            Ok(idx) => idx,
            Err(idx) => {
                self.innings.insert(
                    idx,
                    InningScore {
                        inning,
                        away: 0,
                        home: 0,
                    },
                );
                idx
            }
        };

        let line = &mut self.innings[idx];
        match half {
            InningHalf::Top => {
                line.away += runs;
                self.away += runs;
            }
            InningHalf::Bottom => {
                line.home += runs;
                self.home += runs;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_are_credited_to_the_batting_side() {
        let mut score = Score::default();
        score.add(1, InningHalf::Top, 2);
        score.add(1, InningHalf::Bottom, 1);
        score.add(3, InningHalf::Top, 4);

        assert_eq!(score.away(), 6);
        assert_eq!(score.home(), 1);
        assert_eq!(
            score.inning(1),
            Some(&InningScore {
                inning: 1,
                away: 2,
                home: 1
            })
        );
        assert_eq!(score.innings().len(), 2);
    }

    #[test]
    fn halves_flip() {
        assert_eq!(InningHalf::Top.flipped(), InningHalf::Bottom);
        assert_eq!(InningHalf::Bottom.flipped(), InningHalf::Top);
    }
}
