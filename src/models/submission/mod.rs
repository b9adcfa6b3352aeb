pub mod filter;
pub mod queries;
pub mod types;
pub mod workflow;

pub use filter::SubmissionFilter;
pub use queries::*;
pub use types::*;
pub use workflow::{ActionLink, Justification, TransitionRequest, WorkflowAction, available_actions, permitted_actions};

use crate::models::user::Actor;

impl Submission {
    pub fn available_actions(&self, actor: &Actor) -> Vec<WorkflowAction> {
        available_actions(self.status, actor, self.user_id)
    }
}
