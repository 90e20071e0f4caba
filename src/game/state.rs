//! Per-battle progress tracking
//!
//! A stage seen twice in a row means the handler that ran for it did not
//! clear it. The second visit goes to the fallback handler instead.

/// Which handler a round runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Primary,
    Fallback,
}

/// Round counter and last observed stage of one battle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BattleProgress {
    rounds: u32,
    /// 0 until the first stage is seen
    last_stage: u32,
}

impl BattleProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a round at `stage` and pick its handler
    pub fn begin_round(&mut self, stage: u32) -> Dispatch {
        self.rounds += 1;
        if stage == self.last_stage {
            Dispatch::Fallback
        } else {
            self.last_stage = stage;
            Dispatch::Primary
        }
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn last_stage(&self) -> Option<u32> {
        (self.last_stage != 0).then_some(self.last_stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_round_is_primary() {
        let mut progress = BattleProgress::new();
        assert_eq!(progress.last_stage(), None);
        assert_eq!(progress.begin_round(1), Dispatch::Primary);
        assert_eq!(progress.last_stage(), Some(1));
        assert_eq!(progress.rounds(), 1);
    }

    #[test]
    fn test_stall_goes_to_fallback() {
        let mut progress = BattleProgress::new();
        progress.begin_round(1);
        assert_eq!(progress.begin_round(1), Dispatch::Fallback);
        assert_eq!(progress.begin_round(1), Dispatch::Fallback);
        assert_eq!(progress.last_stage(), Some(1));
        assert_eq!(progress.rounds(), 3);
    }

    #[test]
    fn test_new_stage_updates_last_stage() {
        let mut progress = BattleProgress::new();
        progress.begin_round(1);
        progress.begin_round(1);
        assert_eq!(progress.begin_round(2), Dispatch::Primary);
        assert_eq!(progress.last_stage(), Some(2));
        assert_eq!(progress.begin_round(3), Dispatch::Primary);
        assert_eq!(progress.rounds(), 4);
    }
}
