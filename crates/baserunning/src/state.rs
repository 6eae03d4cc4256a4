//! Base occupancy.

use serde::{Deserialize, Serialize};

use slowpitch_core::{PlayerId, ValueObject};

use crate::error::BaserunningError;

/// One of the three bases a runner can occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Base {
    First,
    Second,
    Third,
}

impl Base {
    pub const ALL: [Base; 3] = [Base::First, Base::Second, Base::Third];

    /// 1 for first, 2 for second, 3 for third.
    pub fn number(self) -> u8 {
        match self {
            Base::First => 1,
            Base::Second => 2,
            Base::Third => 3,
        }
    }

    pub fn from_number(number: u8) -> Option<Base> {
        match number {
            1 => Some(Base::First),
            2 => Some(Base::Second),
            3 => Some(Base::Third),
            _ => None,
        }
    }

    /// The next base, or `None` when the runner would reach home.
    pub fn next(self) -> Option<Base> {
        Base::from_number(self.number() + 1)
    }

    fn index(self) -> usize {
        usize::from(self.number() - 1)
    }
}

impl core::fmt::Display for Base {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Base::First => "first",
            Base::Second => "second",
            Base::Third => "third",
        })
    }
}

/// Unvalidated base occupancy as handed over by persistence or the UI.
///
/// Convert with `BaserunnerState::try_from` to enforce the one-base-per-runner
/// invariant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseSnapshot {
    pub first: Option<PlayerId>,
    pub second: Option<PlayerId>,
    pub third: Option<PlayerId>,
}

impl BaseSnapshot {
    pub fn occupant(&self, base: Base) -> Option<&PlayerId> {
        match base {
            Base::First => self.first.as_ref(),
            Base::Second => self.second.as_ref(),
            Base::Third => self.third.as_ref(),
        }
    }

    /// Occupied bases with their runners, first to third.
    pub fn runners(&self) -> impl Iterator<Item = (Base, &PlayerId)> {
        Base::ALL
            .into_iter()
            .filter_map(|base| self.occupant(base).map(|p| (base, p)))
    }

    pub fn occupancy(&self) -> [bool; 3] {
        [self.first.is_some(), self.second.is_some(), self.third.is_some()]
    }

    /// First runner found on more than one base, if any.
    pub fn duplicate_runner(&self) -> Option<&PlayerId> {
        let runners: Vec<&PlayerId> = self.runners().map(|(_, p)| p).collect();
        for (i, player) in runners.iter().enumerate() {
            if runners[i + 1..].contains(player) {
                return Some(*player);
            }
        }
        None
    }
}

/// Result of moving runners: the new state plus the runners who crossed home,
/// lead runner first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advancement {
    pub state: BaserunnerState,
    pub runs_scored: Vec<PlayerId>,
}

/// Immutable occupancy of first, second and third base.
///
/// A runner can never be on two bases at once; every constructor and
/// transformation enforces this and fails instead of overwriting a runner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BaseSnapshot", into = "BaseSnapshot")]
pub struct BaserunnerState {
    bases: [Option<PlayerId>; 3],
}

impl ValueObject for BaserunnerState {}

impl BaserunnerState {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(
        first: Option<PlayerId>,
        second: Option<PlayerId>,
        third: Option<PlayerId>,
    ) -> Result<Self, BaserunningError> {
        Self::from_bases([first, second, third])
    }

    fn from_bases(bases: [Option<PlayerId>; 3]) -> Result<Self, BaserunningError> {
        for (i, runner) in bases.iter().enumerate() {
            if let Some(player) = runner {
                if bases[i + 1..].iter().flatten().any(|other| other == player) {
                    return Err(BaserunningError::DuplicateRunner {
                        player: player.clone(),
                    });
                }
            }
        }
        Ok(Self { bases })
    }

    pub fn runner_on(&self, base: Base) -> Option<&PlayerId> {
        self.bases[base.index()].as_ref()
    }

    pub fn first(&self) -> Option<&PlayerId> {
        self.runner_on(Base::First)
    }

    pub fn second(&self) -> Option<&PlayerId> {
        self.runner_on(Base::Second)
    }

    pub fn third(&self) -> Option<&PlayerId> {
        self.runner_on(Base::Third)
    }

    pub fn is_occupied(&self, base: Base) -> bool {
        self.runner_on(base).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.iter().all(Option::is_none)
    }

    pub fn runner_count(&self) -> usize {
        self.bases.iter().flatten().count()
    }

    pub fn occupancy(&self) -> [bool; 3] {
        [
            self.is_occupied(Base::First),
            self.is_occupied(Base::Second),
            self.is_occupied(Base::Third),
        ]
    }

    pub fn has_runner(&self, player: &PlayerId) -> bool {
        self.runner_base(player).is_some()
    }

    pub fn runner_base(&self, player: &PlayerId) -> Option<Base> {
        Base::ALL
            .into_iter()
            .find(|base| self.runner_on(*base) == Some(player))
    }

    /// Runner ids on occupied bases, first to third.
    pub fn runners(&self) -> Vec<&PlayerId> {
        self.bases.iter().flatten().collect()
    }

    /// Occupied bases with their runners, first to third.
    pub fn runners_with_bases(&self) -> impl Iterator<Item = (Base, &PlayerId)> {
        Base::ALL
            .into_iter()
            .filter_map(|base| self.runner_on(base).map(|p| (base, p)))
    }

    /// Whether the runner on `base` must advance when the batter takes first.
    pub fn is_forced(&self, base: Base) -> bool {
        Base::ALL
            .into_iter()
            .take_while(|b| *b <= base)
            .all(|b| self.is_occupied(b))
    }

    pub fn add_runner_to_first(&self, player: PlayerId) -> Result<Self, BaserunningError> {
        if self.is_occupied(Base::First) {
            return Err(BaserunningError::OccupiedBase { base: Base::First });
        }
        let mut bases = self.bases.clone();
        bases[Base::First.index()] = Some(player);
        Self::from_bases(bases)
    }

    /// Every runner moves up exactly one base; the runner on third scores.
    pub fn advance_all(&self) -> Advancement {
        let [first, second, third] = self.bases.clone();
        Advancement {
            state: Self {
                bases: [None, first, second],
            },
            runs_scored: third.into_iter().collect(),
        }
    }

    /// Only forced runners move up one base, leaving first open for the batter.
    ///
    /// A runner on second with first open stays put.
    pub fn advance_forced(&self) -> Advancement {
        let mut bases = self.bases.clone();
        let mut runs_scored = Vec::new();

        if self.is_forced(Base::Third) {
            runs_scored.extend(bases[2].take());
        }
        if self.is_forced(Base::Second) {
            bases[2] = bases[1].take();
        }
        if self.is_forced(Base::First) {
            bases[1] = bases[0].take();
        }

        Advancement {
            state: Self { bases },
            runs_scored,
        }
    }

    /// Advance the selected runners one base each; a selected runner on third
    /// scores. Flags for empty bases are ignored.
    ///
    /// Fails with `OccupiedBase` if a runner would move onto a base held by a
    /// runner who is not also advancing.
    pub fn with_advancement(
        &self,
        advance_first: bool,
        advance_second: bool,
        advance_third: bool,
    ) -> Result<Advancement, BaserunningError> {
        let flags = [advance_first, advance_second, advance_third];
        let mut bases = self.bases.clone();
        let mut runs_scored = Vec::new();

        for base in Base::ALL.into_iter().rev() {
            let idx = base.index();
            if !flags[idx] || self.bases[idx].is_none() {
                continue;
            }
            match base.next() {
                None => runs_scored.extend(bases[idx].take()),
                Some(target) => {
                    let t = target.index();
                    let target_stays = self.bases[t].is_some() && !flags[t];
                    if target_stays {
                        return Err(BaserunningError::OccupiedBase { base: target });
                    }
                    bases[t] = bases[idx].take();
                }
            }
        }

        Ok(Advancement {
            state: Self { bases },
            runs_scored,
        })
    }

    pub fn to_snapshot(&self) -> BaseSnapshot {
        let [first, second, third] = self.bases.clone();
        BaseSnapshot {
            first,
            second,
            third,
        }
    }
}

impl TryFrom<BaseSnapshot> for BaserunnerState {
    type Error = BaserunningError;

    fn try_from(value: BaseSnapshot) -> Result<Self, Self::Error> {
        Self::new(value.first, value.second, value.third)
    }
}

impl From<BaserunnerState> for BaseSnapshot {
    fn from(value: BaserunnerState) -> Self {
        value.to_snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn p(id: &str) -> PlayerId {
        PlayerId::new(id).unwrap()
    }

    fn state(first: Option<&str>, second: Option<&str>, third: Option<&str>) -> BaserunnerState {
        BaserunnerState::new(first.map(p), second.map(p), third.map(p)).unwrap()
    }

    #[test]
    fn empty_state_has_no_runners() {
        let s = BaserunnerState::empty();
        assert!(s.is_empty());
        assert!(s.runners().is_empty());
        assert_eq!(s.runner_base(&p("R1")), None);
    }

    #[test]
    fn duplicate_runner_is_rejected() {
        let err = BaserunnerState::new(Some(p("R1")), None, Some(p("R1"))).unwrap_err();
        assert_eq!(err, BaserunningError::DuplicateRunner { player: p("R1") });
    }

    #[test]
    fn lookups_report_bases_in_order() {
        let s = state(Some("R1"), None, Some("R3"));
        assert!(s.has_runner(&p("R3")));
        assert_eq!(s.runner_base(&p("R3")), Some(Base::Third));
        assert_eq!(s.runners(), vec![&p("R1"), &p("R3")]);
    }

    #[test]
    fn add_runner_to_occupied_first_fails() {
        let s = state(Some("R1"), None, None);
        let err = s.add_runner_to_first(p("B1")).unwrap_err();
        assert_eq!(err, BaserunningError::OccupiedBase { base: Base::First });
    }

    #[test]
    fn add_runner_already_on_base_fails() {
        let s = state(None, Some("R2"), None);
        let err = s.add_runner_to_first(p("R2")).unwrap_err();
        assert_eq!(err, BaserunningError::DuplicateRunner { player: p("R2") });
    }

    #[test]
    fn advance_all_scores_runner_from_third() {
        let adv = state(Some("R1"), None, Some("R3")).advance_all();
        assert_eq!(adv.state, state(None, Some("R1"), None));
        assert_eq!(adv.runs_scored, vec![p("R3")]);
    }

    #[test]
    fn advance_forced_leaves_unforced_runner_on_second() {
        let adv = state(None, Some("R2"), None).advance_forced();
        assert_eq!(adv.state, state(None, Some("R2"), None));
        assert!(adv.runs_scored.is_empty());
    }

    #[test]
    fn advance_forced_with_bases_loaded_forces_in_a_run() {
        let adv = state(Some("R1"), Some("R2"), Some("R3")).advance_forced();
        assert_eq!(adv.state, state(None, Some("R1"), Some("R2")));
        assert_eq!(adv.runs_scored, vec![p("R3")]);
    }

    #[test]
    fn advance_forced_first_and_third_holds_third() {
        let adv = state(Some("R1"), None, Some("R3")).advance_forced();
        assert_eq!(adv.state, state(None, Some("R1"), Some("R3")));
        assert!(adv.runs_scored.is_empty());
    }

    #[test]
    fn with_advancement_moves_only_selected_runners() {
        let adv = state(Some("R1"), None, Some("R3"))
            .with_advancement(false, false, true)
            .unwrap();
        assert_eq!(adv.state, state(Some("R1"), None, None));
        assert_eq!(adv.runs_scored, vec![p("R3")]);
    }

    #[test]
    fn with_advancement_collision_names_destination_base() {
        let err = state(Some("R1"), Some("R2"), None)
            .with_advancement(true, false, false)
            .unwrap_err();
        assert_eq!(err, BaserunningError::OccupiedBase { base: Base::Second });
    }

    #[test]
    fn with_advancement_chain_is_allowed() {
        let adv = state(Some("R1"), Some("R2"), None)
            .with_advancement(true, true, false)
            .unwrap();
        assert_eq!(adv.state, state(None, Some("R1"), Some("R2")));
    }

    #[test]
    fn serde_rejects_duplicate_snapshot() {
        let json = r#"{"first":"R1","second":"R1","third":null}"#;
        assert!(serde_json::from_str::<BaserunnerState>(json).is_err());

        let ok: BaserunnerState =
            serde_json::from_str(r#"{"first":"R1","second":null,"third":"R3"}"#).unwrap();
        assert_eq!(ok, state(Some("R1"), None, Some("R3")));
    }

    #[test]
    fn snapshot_detects_duplicates() {
        let snap = BaseSnapshot {
            first: Some(p("R1")),
            second: None,
            third: Some(p("R1")),
        };
        assert_eq!(snap.duplicate_runner(), Some(&p("R1")));
        assert!(BaserunnerState::try_from(snap).is_err());
    }

    fn arb_state() -> impl Strategy<Value = BaserunnerState> {
        (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(|(a, b, c)| {
            BaserunnerState::new(
                a.then(|| p("R1")),
                b.then(|| p("R2")),
                c.then(|| p("R3")),
            )
            .unwrap()
        })
    }

    fn assert_conserved(before: &BaserunnerState, adv: &Advancement) {
        for runner in before.runners() {
            let on_base = adv.state.has_runner(runner) as usize;
            let scored = adv.runs_scored.iter().filter(|r| *r == runner).count();
            assert_eq!(on_base + scored, 1, "runner {runner} lost or duplicated");
        }
        assert_eq!(
            adv.state.runner_count() + adv.runs_scored.len(),
            before.runner_count()
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: no transformation puts a runner on two bases, and no runner
        /// is dropped along the way.
        #[test]
        fn transformations_never_collide(
            before in arb_state(),
            flags in (any::<bool>(), any::<bool>(), any::<bool>())
        ) {
            let all = before.advance_all();
            prop_assert!(all.state.to_snapshot().duplicate_runner().is_none());
            assert_conserved(&before, &all);

            let forced = before.advance_forced();
            prop_assert!(!forced.state.is_occupied(Base::First));
            assert_conserved(&before, &forced);

            if let Ok(adv) = before.with_advancement(flags.0, flags.1, flags.2) {
                prop_assert!(adv.state.to_snapshot().duplicate_runner().is_none());
                assert_conserved(&before, &adv);
            }
        }
    }
}
