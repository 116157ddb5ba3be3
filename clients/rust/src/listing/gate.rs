use basecamp_api_model::EntityId;
use thiserror::Error;

/// What has to be typed before a delete goes through. Compared ignoring
/// case and surrounding whitespace.
pub const CONFIRMATION_WORD: &str = "confirm";

pub fn is_confirmation(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case(CONFIRMATION_WORD)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GateState {
    #[default]
    Closed,
    Awaiting {
        target: EntityId,
        input: String,
    },
    Deleting {
        target: EntityId,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("no delete is pending")]
    NotOpen,
    #[error("type '{CONFIRMATION_WORD}' to enable deletion")]
    NotConfirmed,
    #[error("a delete is already in progress")]
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Deleted; the list should be fetched again.
    Refresh { target: EntityId },
    /// Delete failed; surface this to the user.
    Toast(String),
}

/// Typed-confirmation friction in front of a destructive action.
///
/// `Closed -> Awaiting -> Deleting -> Closed`. This is a UX guard only;
/// authorization is the server's business.
#[derive(Debug, Clone, Default)]
pub struct DeleteGate {
    state: GateState,
}

impl DeleteGate {
    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub fn target(&self) -> Option<&EntityId> {
        match self.state {
            | GateState::Closed => None,
            | GateState::Awaiting { ref target, .. }
            | GateState::Deleting { ref target } => Some(target),
        }
    }

    /// Opens the gate for `target`, replacing a not yet confirmed one.
    pub fn open(&mut self, target: EntityId) -> Result<(), GateError> {
        if matches!(self.state, GateState::Deleting { .. }) {
            return Err(GateError::Busy);
        }
        self.state = GateState::Awaiting {
            target,
            input: String::new(),
        };
        Ok(())
    }

    pub fn input(&mut self, text: &str) -> Result<(), GateError> {
        match self.state {
            | GateState::Awaiting { ref mut input, .. } => {
                text.clone_into(input);
                Ok(())
            }
            | GateState::Deleting { .. } => Err(GateError::Busy),
            | GateState::Closed => Err(GateError::NotOpen),
        }
    }

    /// Whether the delete button is enabled.
    pub fn can_confirm(&self) -> bool {
        match self.state {
            | GateState::Awaiting { ref input, .. } => is_confirmation(input),
            | _ => false,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, GateState::Deleting { .. })
    }

    /// Moves to `Deleting` and hands out the id to delete.
    pub fn begin(&mut self) -> Result<EntityId, GateError> {
        match self.state {
            | GateState::Closed => Err(GateError::NotOpen),
            | GateState::Deleting { .. } => Err(GateError::Busy),
            | GateState::Awaiting { .. } if !self.can_confirm() => {
                Err(GateError::NotConfirmed)
            }
            | GateState::Awaiting { ref target, .. } => {
                let target = target.clone();
                self.state = GateState::Deleting {
                    target: target.clone(),
                };
                Ok(target)
            }
        }
    }

    /// Closes the gate whatever the result was.
    pub fn finish(&mut self, result: Result<(), String>) -> GateOutcome {
        let state = std::mem::take(&mut self.state);
        let target = match state {
            | GateState::Deleting { target } | GateState::Awaiting { target, .. } => {
                Some(target)
            }
            | GateState::Closed => None,
        };
        match (result, target) {
            | (Ok(()), Some(target)) => GateOutcome::Refresh { target },
            | (Ok(()), None) => {
                GateOutcome::Toast(GateError::NotOpen.to_string())
            }
            | (Err(message), _) => {
                GateOutcome::Toast(format!("Failed to delete: {message}"))
            }
        }
    }

    /// Backs out before deleting. A delete already in flight can't be
    /// recalled.
    pub fn cancel(&mut self) -> Result<(), GateError> {
        match self.state {
            | GateState::Deleting { .. } => Err(GateError::Busy),
            | _ => {
                self.state = GateState::Closed;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn awaiting(input: &str) -> DeleteGate {
        let mut gate = DeleteGate::default();
        gate.open(EntityId::from("1")).unwrap();
        gate.input(input).unwrap();
        gate
    }

    #[test]
    fn test_confirmation_matching() {
        for accepted in ["confirm", "Confirm", "CONFIRM", " confirm "] {
            assert!(awaiting(accepted).can_confirm(), "{accepted:?}");
        }
        for rejected in ["", "delete", "confirmed", "conf", "yes"] {
            assert!(!awaiting(rejected).can_confirm(), "{rejected:?}");
        }
    }

    #[test]
    fn test_happy_path() {
        let mut gate = DeleteGate::default();
        assert_eq!(&GateState::Closed, gate.state());
        assert!(!gate.can_confirm());

        gate.open(EntityId::from("1")).unwrap();
        assert_eq!(Some(&EntityId::from("1")), gate.target());
        assert_eq!(Err(GateError::NotConfirmed), gate.begin());

        gate.input("CONFIRM").unwrap();
        assert!(gate.can_confirm());
        assert_eq!(Ok(EntityId::from("1")), gate.begin());
        assert!(gate.is_busy());
        assert!(!gate.can_confirm());

        // can't re-target or type while deleting
        assert_eq!(Err(GateError::Busy), gate.open(EntityId::from("2")));
        assert_eq!(Err(GateError::Busy), gate.input("confirm"));
        assert_eq!(Err(GateError::Busy), gate.cancel());

        assert_eq!(
            GateOutcome::Refresh {
                target: EntityId::from("1")
            },
            gate.finish(Ok(()))
        );
        assert_eq!(&GateState::Closed, gate.state());
    }

    #[test]
    fn test_failure_closes_with_toast() {
        let mut gate = awaiting("confirm");
        gate.begin().unwrap();
        assert_eq!(
            GateOutcome::Toast("Failed to delete: (500) boom".to_owned()),
            gate.finish(Err("(500) boom".to_owned()))
        );
        assert_eq!(&GateState::Closed, gate.state());
    }

    #[test]
    fn test_cancel_and_closed_errors() {
        let mut gate = awaiting("conf");
        gate.cancel().unwrap();
        assert_eq!(&GateState::Closed, gate.state());
        assert_eq!(Err(GateError::NotOpen), gate.begin());
        assert_eq!(Err(GateError::NotOpen), gate.input("confirm"));
    }

    #[test]
    fn test_reopen_resets_input() {
        let mut gate = awaiting("confirm");
        gate.open(EntityId::from("2")).unwrap();
        assert!(!gate.can_confirm());
        assert_eq!(Some(&EntityId::from("2")), gate.target());
    }
}
