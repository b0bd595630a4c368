use crate::model::role::Role;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Status of a gallon request. A request only ever moves forward through
/// `pending -> approved -> verified_stock -> completed`, with `rejected` as
/// the single side exit out of `pending`. Both `completed` and `rejected`
/// are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    VerifiedStock,
    Completed,
    Rejected,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Completed | RequestStatus::Rejected)
    }
}

/// A transition attempted against a request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter, ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum RequestAction {
    Approve,
    Reject,
    VerifyStock,
    Pickup,
}

impl RequestAction {
    /// The only status this action may fire from.
    pub fn required_status(&self) -> RequestStatus {
        match self {
            RequestAction::Approve | RequestAction::Reject => RequestStatus::Pending,
            RequestAction::VerifyStock => RequestStatus::Approved,
            RequestAction::Pickup => RequestStatus::VerifiedStock,
        }
    }

    /// The status this action moves the request to.
    pub fn next_status(&self) -> RequestStatus {
        match self {
            RequestAction::Approve => RequestStatus::Approved,
            RequestAction::Reject => RequestStatus::Rejected,
            RequestAction::VerifyStock => RequestStatus::VerifiedStock,
            RequestAction::Pickup => RequestStatus::Completed,
        }
    }

    /// Role an actor must hold to fire this action. `Pickup` belongs to the
    /// employee-facing flow and carries no role requirement.
    pub fn required_role(&self) -> Option<Role> {
        match self {
            RequestAction::Approve | RequestAction::Reject => Some(Role::Administrator),
            RequestAction::VerifyStock => Some(Role::Warehouse),
            RequestAction::Pickup => None,
        }
    }
}

/// Transition attempted from a status it is not allowed from. The record is
/// left untouched and the caller gets an actionable message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardViolation {
    pub current: RequestStatus,
    pub action: RequestAction,
}

impl std::fmt::Display for GuardViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.action {
            RequestAction::Approve => write!(f, "This request cannot be approved."),
            RequestAction::Reject => write!(f, "This request cannot be rejected."),
            RequestAction::VerifyStock => write!(f, "Stock cannot be verified for this request."),
            RequestAction::Pickup => write!(f, "This request cannot be completed."),
        }
    }
}

/// Check an action against the current status and return the status the
/// request moves to. This is the whole transition table; every persisted
/// transition goes through here before the status-guarded UPDATE.
pub fn transition(
    current: RequestStatus,
    action: RequestAction,
) -> Result<RequestStatus, GuardViolation> {
    if current == action.required_status() {
        Ok(action.next_status())
    } else {
        Err(GuardViolation { current, action })
    }
}

/// Rejection notes are mandatory and bounded.
pub const MAX_NOTES_LEN: usize = 500;

pub fn validate_rejection_notes(notes: Option<&str>) -> Result<&str, &'static str> {
    match notes.map(str::trim) {
        None | Some("") => Err("Rejection notes are required."),
        Some(n) if n.len() > MAX_NOTES_LEN => Err("Notes must be at most 500 characters."),
        Some(n) => Ok(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn only_the_four_listed_transitions_are_allowed() {
        for status in RequestStatus::iter() {
            for action in RequestAction::iter() {
                let allowed = matches!(
                    (status, action),
                    (RequestStatus::Pending, RequestAction::Approve)
                        | (RequestStatus::Pending, RequestAction::Reject)
                        | (RequestStatus::Approved, RequestAction::VerifyStock)
                        | (RequestStatus::VerifiedStock, RequestAction::Pickup)
                );
                match transition(status, action) {
                    Ok(next) => {
                        assert!(allowed, "{status:?} must not accept {action:?}");
                        assert_eq!(next, action.next_status());
                    }
                    Err(violation) => {
                        assert!(!allowed, "{status:?} must accept {action:?}");
                        assert_eq!(violation.current, status);
                        assert_eq!(violation.action, action);
                    }
                }
            }
        }
    }

    #[test]
    fn terminal_statuses_accept_nothing() {
        for status in [RequestStatus::Completed, RequestStatus::Rejected] {
            assert!(status.is_terminal());
            for action in RequestAction::iter() {
                assert!(transition(status, action).is_err());
            }
        }
    }

    #[test]
    fn full_workflow_reaches_completed() {
        let mut status = RequestStatus::Pending;
        status = transition(status, RequestAction::Approve).unwrap();
        assert_eq!(status, RequestStatus::Approved);
        status = transition(status, RequestAction::VerifyStock).unwrap();
        assert_eq!(status, RequestStatus::VerifiedStock);
        status = transition(status, RequestAction::Pickup).unwrap();
        assert_eq!(status, RequestStatus::Completed);
    }

    #[test]
    fn rejection_is_mutually_exclusive_with_completion() {
        // Once rejected from pending, the approval track is closed for good.
        let status = transition(RequestStatus::Pending, RequestAction::Reject).unwrap();
        assert_eq!(status, RequestStatus::Rejected);
        assert!(transition(status, RequestAction::Approve).is_err());
        assert!(transition(status, RequestAction::Pickup).is_err());
        // And an approved request can no longer be rejected.
        let status = transition(RequestStatus::Pending, RequestAction::Approve).unwrap();
        assert!(transition(status, RequestAction::Reject).is_err());
    }

    #[test]
    fn verify_stock_cannot_skip_approval() {
        let err = transition(RequestStatus::Pending, RequestAction::VerifyStock).unwrap_err();
        assert_eq!(err.current, RequestStatus::Pending);
        assert_eq!(err.to_string(), "Stock cannot be verified for this request.");
    }

    #[test]
    fn wire_names_use_snake_and_kebab_case() {
        assert_eq!(RequestStatus::VerifiedStock.to_string(), "verified_stock");
        assert_eq!("verified_stock".parse::<RequestStatus>().unwrap(), RequestStatus::VerifiedStock);
        assert_eq!(RequestAction::VerifyStock.to_string(), "verify-stock");
        assert_eq!("verify-stock".parse::<RequestAction>().unwrap(), RequestAction::VerifyStock);
    }

    #[test]
    fn admin_actions_map_to_their_roles() {
        assert_eq!(RequestAction::Approve.required_role(), Some(Role::Administrator));
        assert_eq!(RequestAction::Reject.required_role(), Some(Role::Administrator));
        assert_eq!(RequestAction::VerifyStock.required_role(), Some(Role::Warehouse));
        assert_eq!(RequestAction::Pickup.required_role(), None);
    }

    #[test]
    fn rejection_notes_are_required_and_bounded() {
        assert!(validate_rejection_notes(None).is_err());
        assert!(validate_rejection_notes(Some("")).is_err());
        assert!(validate_rejection_notes(Some("   ")).is_err());
        assert_eq!(validate_rejection_notes(Some("out of stock")), Ok("out of stock"));
        let long = "x".repeat(MAX_NOTES_LEN + 1);
        assert!(validate_rejection_notes(Some(long.as_str())).is_err());
        let max = "x".repeat(MAX_NOTES_LEN);
        assert!(validate_rejection_notes(Some(max.as_str())).is_ok());
    }
}
