//! Request lifecycle shared by registration, sale and purchase requests.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Request status lifecycle.
///
/// `Pending -> {Accepted, Rejected}`. Both outcomes are terminal; nothing goes
/// back to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

/// Administrator decision on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accept,
    Reject,
}

impl RequestStatus {
    /// Ledger wire encoding (contract enum ordinal).
    pub fn code(self) -> u64 {
        match self {
            RequestStatus::Pending => 0,
            RequestStatus::Accepted => 1,
            RequestStatus::Rejected => 2,
        }
    }

    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(RequestStatus::Pending),
            1 => Some(RequestStatus::Accepted),
            2 => Some(RequestStatus::Rejected),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }

    /// Apply a decision. Only `Pending` requests can be decided.
    pub fn transition(self, decision: Decision) -> DomainResult<RequestStatus> {
        if self.is_terminal() {
            return Err(DomainError::invalid_transition(format!(
                "request is already {self:?}; cannot {decision:?}"
            )));
        }
        Ok(match decision {
            Decision::Accept => RequestStatus::Accepted,
            Decision::Reject => RequestStatus::Rejected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_be_accepted_or_rejected() {
        assert_eq!(
            RequestStatus::Pending.transition(Decision::Accept),
            Ok(RequestStatus::Accepted)
        );
        assert_eq!(
            RequestStatus::Pending.transition(Decision::Reject),
            Ok(RequestStatus::Rejected)
        );
    }

    #[test]
    fn terminal_states_refuse_every_decision() {
        for status in [RequestStatus::Accepted, RequestStatus::Rejected] {
            for decision in [Decision::Accept, Decision::Reject] {
                match status.transition(decision) {
                    Err(DomainError::InvalidTransition(_)) => {}
                    other => panic!("expected InvalidTransition, got {other:?}"),
                }
            }
        }
    }

    #[test]
    fn wire_codes_round_trip() {
        for status in [RequestStatus::Pending, RequestStatus::Accepted, RequestStatus::Rejected] {
            assert_eq!(RequestStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(RequestStatus::from_code(3), None);
    }
}
