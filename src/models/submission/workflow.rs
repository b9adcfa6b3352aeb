//! Workflow actions for submissions.
//!
//! The backend owns the state machine; this module only answers "which
//! actions should the console offer" and "is this request well-formed
//! enough to send". Gating here is UX, never a security boundary.
//!
//! ```text
//! Draft     --enviar---------> Submitted
//! Submitted --colocarAnalise-> InReview
//! Submitted|InReview --aprovar--> Approved
//! Submitted|InReview --rejeitar-> Rejected   (motivo required)
//! Draft|Submitted|InReview --cancelar--> Cancelled (motivo required)
//! ```

use serde::Serialize;

use super::types::SubmissionStatus;
use crate::models::user::Actor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WorkflowAction {
    View,
    Edit,
    Enviar,
    ColocarAnalise,
    Aprovar,
    Rejeitar,
    Cancelar,
}

/// Whether an action takes free text, and whether it must be non-blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justification {
    None,
    Optional,
    Required,
}

impl WorkflowAction {
    pub const ALL: [WorkflowAction; 7] = [
        WorkflowAction::View,
        WorkflowAction::Edit,
        WorkflowAction::Enviar,
        WorkflowAction::ColocarAnalise,
        WorkflowAction::Aprovar,
        WorkflowAction::Rejeitar,
        WorkflowAction::Cancelar,
    ];

    pub fn token(self) -> &'static str {
        match self {
            WorkflowAction::View => "view",
            WorkflowAction::Edit => "edit",
            WorkflowAction::Enviar => "enviar",
            WorkflowAction::ColocarAnalise => "colocarAnalise",
            WorkflowAction::Aprovar => "aprovar",
            WorkflowAction::Rejeitar => "rejeitar",
            WorkflowAction::Cancelar => "cancelar",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.token() == token)
    }

    pub fn label(self) -> &'static str {
        match self {
            WorkflowAction::View => "Visualizar",
            WorkflowAction::Edit => "Editar",
            WorkflowAction::Enviar => "Enviar",
            WorkflowAction::ColocarAnalise => "Colocar em análise",
            WorkflowAction::Aprovar => "Aprovar",
            WorkflowAction::Rejeitar => "Rejeitar",
            WorkflowAction::Cancelar => "Cancelar",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            WorkflowAction::View => "eye",
            WorkflowAction::Edit => "pencil",
            WorkflowAction::Enviar => "send",
            WorkflowAction::ColocarAnalise => "search",
            WorkflowAction::Aprovar => "check",
            WorkflowAction::Rejeitar => "x",
            WorkflowAction::Cancelar => "ban",
        }
    }

    pub fn justification(self) -> Justification {
        match self {
            WorkflowAction::View | WorkflowAction::Edit | WorkflowAction::Enviar => Justification::None,
            WorkflowAction::ColocarAnalise | WorkflowAction::Aprovar => Justification::Optional,
            WorkflowAction::Rejeitar | WorkflowAction::Cancelar => Justification::Required,
        }
    }

    /// Status the backend is asked to move to; `None` for non-transitions.
    pub fn target_status(self) -> Option<SubmissionStatus> {
        match self {
            WorkflowAction::View | WorkflowAction::Edit => None,
            WorkflowAction::Enviar => Some(SubmissionStatus::Submitted),
            WorkflowAction::ColocarAnalise => Some(SubmissionStatus::InReview),
            WorkflowAction::Aprovar => Some(SubmissionStatus::Approved),
            WorkflowAction::Rejeitar => Some(SubmissionStatus::Rejected),
            WorkflowAction::Cancelar => Some(SubmissionStatus::Cancelled),
        }
    }

    pub fn is_transition(self) -> bool {
        self.target_status().is_some()
    }

    fn requires_elevated_role(self) -> bool {
        matches!(
            self,
            WorkflowAction::ColocarAnalise | WorkflowAction::Aprovar | WorkflowAction::Rejeitar
        )
    }
}

/// Every action the state machine allows from `status`, ignoring who asks.
pub fn permitted_actions(status: SubmissionStatus) -> &'static [WorkflowAction] {
    use WorkflowAction::*;
    match status {
        SubmissionStatus::Draft => &[View, Edit, Enviar, Cancelar],
        SubmissionStatus::Submitted => &[View, ColocarAnalise, Aprovar, Rejeitar, Cancelar],
        SubmissionStatus::InReview => &[View, Aprovar, Rejeitar, Cancelar],
        SubmissionStatus::Approved | SubmissionStatus::Rejected | SubmissionStatus::Cancelled => &[View],
    }
}

/// Actions to offer `actor` on a submission in `status` owned by `owner_id`.
/// Ordered as [`WorkflowAction::ALL`]; always starts with `View`.
pub fn available_actions(
    status: SubmissionStatus,
    actor: &Actor,
    owner_id: Option<i64>,
) -> Vec<WorkflowAction> {
    let elevated = actor.role.is_elevated();
    let owner_or_elevated = elevated || actor.owns(owner_id);

    permitted_actions(status)
        .iter()
        .copied()
        .filter(|action| match action {
            WorkflowAction::View => true,
            WorkflowAction::Edit | WorkflowAction::Enviar | WorkflowAction::Cancelar => owner_or_elevated,
            a if a.requires_elevated_role() => elevated,
            _ => false,
        })
        .collect()
}

/// A transition request that has passed client-side validation. Holding
/// one means required justifications are non-blank.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionRequest {
    Enviar { versao: i64, comentario: Option<String> },
    ColocarAnalise { versao: i64, comentario: Option<String> },
    Aprovar { versao: i64, comentario: Option<String> },
    Rejeitar { versao: i64, motivo: String },
    Cancelar { versao: i64, motivo: String },
}

impl TransitionRequest {
    /// Validate user input for `action`. Blank required input is refused
    /// here, before anything is sent.
    pub fn build(action: WorkflowAction, versao: i64, input: Option<&str>) -> Result<Self, String> {
        let text = input.map(str::trim).filter(|s| !s.is_empty()).map(String::from);
        match action {
            WorkflowAction::Enviar => Ok(TransitionRequest::Enviar { versao, comentario: text }),
            WorkflowAction::ColocarAnalise => Ok(TransitionRequest::ColocarAnalise { versao, comentario: text }),
            WorkflowAction::Aprovar => Ok(TransitionRequest::Aprovar { versao, comentario: text }),
            WorkflowAction::Rejeitar => text
                .map(|motivo| TransitionRequest::Rejeitar { versao, motivo })
                .ok_or_else(|| MISSING_REJECTION_REASON.to_string()),
            WorkflowAction::Cancelar => text
                .map(|motivo| TransitionRequest::Cancelar { versao, motivo })
                .ok_or_else(|| MISSING_CANCEL_REASON.to_string()),
            WorkflowAction::View | WorkflowAction::Edit => {
                Err(format!("'{}' não é uma transição de status", action.token()))
            }
        }
    }

    pub fn action(&self) -> WorkflowAction {
        match self {
            TransitionRequest::Enviar { .. } => WorkflowAction::Enviar,
            TransitionRequest::ColocarAnalise { .. } => WorkflowAction::ColocarAnalise,
            TransitionRequest::Aprovar { .. } => WorkflowAction::Aprovar,
            TransitionRequest::Rejeitar { .. } => WorkflowAction::Rejeitar,
            TransitionRequest::Cancelar { .. } => WorkflowAction::Cancelar,
        }
    }
}

pub const MISSING_REJECTION_REASON: &str = "O motivo da rejeição é obrigatório.";
pub const MISSING_CANCEL_REASON: &str = "O motivo do cancelamento é obrigatório.";
pub const MISSING_DELETE_REASON: &str = "O motivo da exclusão é obrigatório.";

/// Action rendering data for templates.
#[derive(Debug, Clone, Serialize)]
pub struct ActionLink {
    pub token: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub is_transition: bool,
    pub needs_text: bool,
    pub text_required: bool,
}

impl From<WorkflowAction> for ActionLink {
    fn from(action: WorkflowAction) -> Self {
        let justification = action.justification();
        ActionLink {
            token: action.token(),
            label: action.label(),
            icon: action.icon(),
            is_transition: action.is_transition(),
            needs_text: justification != Justification::None,
            text_required: justification == Justification::Required,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;

    fn actor(role: Role) -> Actor {
        Actor { user_id: 1, role }
    }

    #[test]
    fn tokens_roundtrip() {
        for action in WorkflowAction::ALL {
            assert_eq!(WorkflowAction::from_token(action.token()), Some(action));
        }
        assert_eq!(WorkflowAction::from_token("delete"), None);
    }

    #[test]
    fn owner_can_edit_and_send_draft() {
        let actions = available_actions(SubmissionStatus::Draft, &actor(Role::User), Some(1));
        assert_eq!(
            actions,
            vec![WorkflowAction::View, WorkflowAction::Edit, WorkflowAction::Enviar, WorkflowAction::Cancelar]
        );
    }

    #[test]
    fn stranger_only_views_draft() {
        let actions = available_actions(SubmissionStatus::Draft, &actor(Role::User), Some(2));
        assert_eq!(actions, vec![WorkflowAction::View]);
    }

    #[test]
    fn manager_reviews_submitted() {
        let actions = available_actions(SubmissionStatus::Submitted, &actor(Role::Manager), Some(2));
        assert_eq!(
            actions,
            vec![
                WorkflowAction::View,
                WorkflowAction::ColocarAnalise,
                WorkflowAction::Aprovar,
                WorkflowAction::Rejeitar,
                WorkflowAction::Cancelar
            ]
        );
    }

    #[test]
    fn owner_without_role_cannot_approve_own_submission() {
        let actions = available_actions(SubmissionStatus::InReview, &actor(Role::User), Some(1));
        assert_eq!(actions, vec![WorkflowAction::View, WorkflowAction::Cancelar]);
    }

    #[test]
    fn rejection_requires_reason() {
        assert_eq!(
            TransitionRequest::build(WorkflowAction::Rejeitar, 3, Some("   ")),
            Err(MISSING_REJECTION_REASON.to_string())
        );
        assert_eq!(
            TransitionRequest::build(WorkflowAction::Rejeitar, 3, Some(" incompleto ")),
            Ok(TransitionRequest::Rejeitar { versao: 3, motivo: "incompleto".into() })
        );
    }

    #[test]
    fn approval_comment_is_optional() {
        assert_eq!(
            TransitionRequest::build(WorkflowAction::Aprovar, 1, None),
            Ok(TransitionRequest::Aprovar { versao: 1, comentario: None })
        );
    }

    #[test]
    fn view_is_not_a_transition() {
        assert!(TransitionRequest::build(WorkflowAction::View, 1, None).is_err());
    }

    #[test]
    fn action_link_flags() {
        let link = ActionLink::from(WorkflowAction::Cancelar);
        assert!(link.is_transition && link.needs_text && link.text_required);
        let link = ActionLink::from(WorkflowAction::Edit);
        assert!(!link.is_transition && !link.needs_text);
    }
}
