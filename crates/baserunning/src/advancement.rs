//! Baserunner advancement for a completed at-bat.
//!
//! Every outcome is computed the same way: each runner (and the batter) gets a
//! destination, either from the standard rule table or from the scorer's
//! overrides, and the destinations are then resolved into a new
//! `BaserunnerState`. Resolution is where collisions are caught, so manual
//! overrides go through exactly the same occupancy checks as the defaults.

use core::str::FromStr;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use slowpitch_core::{DomainError, PlayerId};

use crate::batting_result::BattingResult;
use crate::error::BaserunningError;
use crate::state::{Base, BaserunnerState};

/// Where the scorer sends a runner (or the batter) on a play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunnerDestination {
    Stay,
    First,
    Second,
    Third,
    Home,
    Out,
}

impl RunnerDestination {
    fn from_base(base: Base) -> Self {
        match base {
            Base::First => RunnerDestination::First,
            Base::Second => RunnerDestination::Second,
            Base::Third => RunnerDestination::Third,
        }
    }

    fn base(self) -> Option<Base> {
        match self {
            RunnerDestination::First => Some(Base::First),
            RunnerDestination::Second => Some(Base::Second),
            RunnerDestination::Third => Some(Base::Third),
            RunnerDestination::Stay | RunnerDestination::Home | RunnerDestination::Out => None,
        }
    }

    /// `n` bases beyond `from` (`None` = the batter's box).
    fn advanced(from: Option<Base>, n: u8) -> Self {
        let start = from.map(Base::number).unwrap_or(0);
        Base::from_number(start + n)
            .map(Self::from_base)
            .unwrap_or(RunnerDestination::Home)
    }
}

impl core::fmt::Display for RunnerDestination {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            RunnerDestination::Stay => "stay",
            RunnerDestination::First => "first",
            RunnerDestination::Second => "second",
            RunnerDestination::Third => "third",
            RunnerDestination::Home => "home",
            RunnerDestination::Out => "out",
        })
    }
}

impl FromStr for RunnerDestination {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stay" => Ok(RunnerDestination::Stay),
            "first" => Ok(RunnerDestination::First),
            "second" => Ok(RunnerDestination::Second),
            "third" => Ok(RunnerDestination::Third),
            "home" => Ok(RunnerDestination::Home),
            "out" => Ok(RunnerDestination::Out),
            other => Err(DomainError::validation(format!(
                "unknown runner destination '{other}'"
            ))),
        }
    }
}

/// Scorer-supplied destinations keyed by runner (or batter) id.
pub type ManualOverrides = BTreeMap<PlayerId, RunnerDestination>;

/// Resolved effect of an at-bat on the bases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvancementOutcome {
    pub final_baserunners: BaserunnerState,
    /// Runners who crossed home, lead runner first.
    pub scoring_runners: Vec<PlayerId>,
    pub rbis: u32,
    /// Players put out on the play, batter included.
    pub put_out: Vec<PlayerId>,
}

impl AdvancementOutcome {
    pub fn runs_scored(&self) -> u32 {
        self.scoring_runners.len() as u32
    }

    pub fn outs_recorded(&self) -> u8 {
        self.put_out.len() as u8
    }

    /// Whether runs on a play that also makes the third out still count.
    ///
    /// No run scores when that out is the batter or a runner forced by the
    /// batter. Runs stand when only an unforced runner is retired, since the
    /// scorer has already placed that out after the runs crossed.
    pub fn runs_stand_on_third_out(&self, before: &BaserunnerState, batter: &PlayerId) -> bool {
        if self.put_out.contains(batter) {
            return false;
        }
        !self.put_out.iter().any(|player| {
            before
                .runner_base(player)
                .is_some_and(|base| before.is_forced(base))
        })
    }

    /// Take back every run on the play along with its RBIs. Returns the
    /// runners whose runs were cancelled.
    pub fn void_runs(&mut self) -> Vec<PlayerId> {
        self.rbis = 0;
        std::mem::take(&mut self.scoring_runners)
    }
}

/// A runner's origin (`None` for the batter) and where they end up.
#[derive(Debug, Clone)]
struct Movement {
    player: PlayerId,
    from: Option<Base>,
    to: RunnerDestination,
}

/// Computes runner movement, runs and RBIs for an at-bat.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaserunnerAdvancementService;

impl BaserunnerAdvancementService {
    pub fn new() -> Self {
        Self
    }

    /// Apply the standard rule table for `result`.
    ///
    /// Singles move every runner one base, doubles two; triples and home runs
    /// clear the bases. Walks, errors and fielder's choices only move forced
    /// runners. Outs leave the runners where they are, except that a sacrifice
    /// fly scores the runner from third and a double play also retires the
    /// trailing runner.
    pub fn calculate_standard_advancement(
        &self,
        before: &BaserunnerState,
        result: BattingResult,
        batter: &PlayerId,
    ) -> Result<AdvancementOutcome, BaserunningError> {
        let plan = standard_plan(before, result, batter)?;
        resolve(result, plan)
    }

    /// Apply the standard table, then replace destinations for every player
    /// named in `overrides`.
    ///
    /// Keys must be current baserunners or the batter. Runners cannot be sent
    /// backwards, and the batter cannot "stay". The resolved state still has to
    /// satisfy the one-runner-per-base invariant.
    pub fn apply_manual_overrides(
        &self,
        before: &BaserunnerState,
        result: BattingResult,
        batter: &PlayerId,
        overrides: &ManualOverrides,
    ) -> Result<AdvancementOutcome, BaserunningError> {
        let mut plan = standard_plan(before, result, batter)?;

        for (player, destination) in overrides {
            let movement = plan
                .iter_mut()
                .find(|m| &m.player == player)
                .ok_or_else(|| BaserunningError::UnknownRunner {
                    player: player.clone(),
                })?;
            check_override(movement, *destination)?;
            movement.to = *destination;
        }

        resolve(result, plan)
    }

    /// RBIs credited for `scoring_runners` on a play of kind `result`.
    pub fn rbis_for(result: BattingResult, scoring_runners: &[PlayerId]) -> u32 {
        if result.credits_rbi() {
            scoring_runners.len() as u32
        } else {
            0
        }
    }
}

fn standard_plan(
    before: &BaserunnerState,
    result: BattingResult,
    batter: &PlayerId,
) -> Result<Vec<Movement>, BaserunningError> {
    if before.has_runner(batter) {
        return Err(BaserunningError::DuplicateRunner {
            player: batter.clone(),
        });
    }

    let double_play_victim = Base::ALL
        .into_iter()
        .find(|base| before.is_occupied(*base));

    // Lead runner first, batter last: resolution order doubles as scoring order.
    let mut plan: Vec<Movement> = before
        .runners_with_bases()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .map(|(base, player)| {
            let to = match result {
                BattingResult::Single => RunnerDestination::advanced(Some(base), 1),
                BattingResult::Double => RunnerDestination::advanced(Some(base), 2),
                BattingResult::Triple | BattingResult::HomeRun => RunnerDestination::Home,
                BattingResult::Walk
                | BattingResult::IntentionalWalk
                | BattingResult::ReachedOnError
                | BattingResult::FieldersChoice => {
                    if before.is_forced(base) {
                        RunnerDestination::advanced(Some(base), 1)
                    } else {
                        RunnerDestination::Stay
                    }
                }
                BattingResult::SacrificeFly if base == Base::Third => RunnerDestination::Home,
                BattingResult::DoublePlay if Some(base) == double_play_victim => {
                    RunnerDestination::Out
                }
                BattingResult::SacrificeFly
                | BattingResult::DoublePlay
                | BattingResult::Strikeout
                | BattingResult::GroundOut
                | BattingResult::AirOut => RunnerDestination::Stay,
            };
            Movement {
                player: player.clone(),
                from: Some(base),
                to,
            }
        })
        .collect();

    let batter_to = match result {
        BattingResult::HomeRun => RunnerDestination::Home,
        BattingResult::Triple => RunnerDestination::Third,
        BattingResult::Double => RunnerDestination::Second,
        BattingResult::Single
        | BattingResult::Walk
        | BattingResult::IntentionalWalk
        | BattingResult::ReachedOnError
        | BattingResult::FieldersChoice => RunnerDestination::First,
        BattingResult::SacrificeFly
        | BattingResult::Strikeout
        | BattingResult::GroundOut
        | BattingResult::AirOut
        | BattingResult::DoublePlay => RunnerDestination::Out,
    };
    plan.push(Movement {
        player: batter.clone(),
        from: None,
        to: batter_to,
    });

    Ok(plan)
}

fn check_override(
    movement: &Movement,
    destination: RunnerDestination,
) -> Result<(), BaserunningError> {
    let invalid = |reason: String| BaserunningError::InvalidDestination {
        player: movement.player.clone(),
        reason,
    };

    match (movement.from, destination.base()) {
        (None, _) if destination == RunnerDestination::Stay => Err(invalid(
            "the batter must reach base, score, or be put out".to_string(),
        )),
        (Some(from), Some(to)) if to < from => Err(invalid(format!(
            "a runner cannot move back from {from} to {to}"
        ))),
        _ => Ok(()),
    }
}

fn resolve(
    result: BattingResult,
    plan: Vec<Movement>,
) -> Result<AdvancementOutcome, BaserunningError> {
    let mut bases: [Option<PlayerId>; 3] = [None, None, None];
    let mut scoring_runners = Vec::new();
    let mut put_out = Vec::new();

    for movement in plan {
        let target = match movement.to {
            RunnerDestination::Home => {
                scoring_runners.push(movement.player);
                continue;
            }
            RunnerDestination::Out => {
                put_out.push(movement.player);
                continue;
            }
            RunnerDestination::Stay => movement.from,
            other => other.base(),
        };
        let Some(base) = target else {
            return Err(BaserunningError::InvalidDestination {
                player: movement.player,
                reason: "no base to stay on".to_string(),
            });
        };

        let slot = &mut bases[usize::from(base.number() - 1)];
        if slot.is_some() {
            return Err(BaserunningError::OccupiedBase { base });
        }
        *slot = Some(movement.player);
    }

    let [first, second, third] = bases;
    let final_baserunners = BaserunnerState::new(first, second, third)?;
    let rbis = BaserunnerAdvancementService::rbis_for(result, &scoring_runners);

    Ok(AdvancementOutcome {
        final_baserunners,
        scoring_runners,
        rbis,
        put_out,
    })
}
