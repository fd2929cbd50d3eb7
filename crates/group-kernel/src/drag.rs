//! Drag-and-drop transfer protocol.
//!
//! ```text
//! begin_drag(student) ──► DragGuard          payload = Some(student)
//!   ├─ permits(target)                       is this a valid drop target?
//!   ├─ drop_on(target) ──► MoveStudent       consumes the guard
//!   └─ (guard dropped)                       payload = None, always
//! ```
//!
//! The payload is cleared by the guard's `Drop`, so a successful drop, a
//! rejected drop and a cancelled drag all end with no transient state.

use tracing::debug;

use crate::group::GroupId;
use crate::roster::StudentId;
use crate::session::{AssignmentSession, Command, MoveStudentCommand, Outcome};

/// Where a dragged student can be released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    Group(GroupId),
    Pool,
}

impl DropTarget {
    fn into_group(self) -> Option<GroupId> {
        match self {
            DropTarget::Group(id) => Some(id),
            DropTarget::Pool => None,
        }
    }
}

/// An in-progress drag. Ending it in any way clears the payload.
#[derive(Debug)]
pub struct DragGuard<'a> {
    session: &'a mut AssignmentSession,
}

impl AssignmentSession {
    /// Start dragging a student.
    pub fn begin_drag(&mut self, student_id: impl Into<StudentId>) -> DragGuard<'_> {
        let student_id = student_id.into();
        debug!(student = %student_id, "Drag started");
        self.dragged = Some(student_id);
        DragGuard { session: self }
    }
}

impl DragGuard<'_> {
    /// The student being dragged.
    pub fn student_id(&self) -> Option<&str> {
        self.session.dragged.as_deref()
    }

    /// Whether hovering over `target` may accept a drop.
    pub fn permits(&self, target: &DropTarget) -> bool {
        match target {
            DropTarget::Group(id) => self.session.registry.get(id).is_some(),
            DropTarget::Pool => true,
        }
    }

    /// Release over `target`, moving the student if the target accepts.
    pub fn drop_on(mut self, target: DropTarget) -> Outcome {
        let Some(student_id) = self.session.dragged.take() else {
            return Outcome::Ignored("no student is being dragged".to_string());
        };
        if !self.permits(&target) {
            debug!(student = %student_id, ?target, "Drop rejected by target");
            return Outcome::Ignored("drop target does not accept students".to_string());
        }
        self.session.apply(Command::MoveStudent(MoveStudentCommand {
            student_id,
            to_group: target.into_group(),
        }))
    }

    /// Abandon the drag without moving anyone.
    pub fn cancel(self) {
        debug!("Drag cancelled");
    }
}

impl Drop for DragGuard<'_> {
    fn drop(&mut self) {
        self.session.dragged = None;
    }
}
