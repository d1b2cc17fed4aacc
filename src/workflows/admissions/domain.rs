use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for directory users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Identifier wrapper for published interview slots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotId(pub String);

/// Identifier wrapper for reservations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReservationId(pub String);

/// Identifier wrapper for admin-initiated interview requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

/// Identifier wrapper for evaluations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvaluationId(pub String);

/// Directory role. Mutated only by the decision engine (candidate to
/// student, once per admission cycle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Interviewer,
    Candidate,
    Student,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Interviewer => "interviewer",
            Role::Candidate => "candidate",
            Role::Student => "student",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "interviewer" => Some(Role::Interviewer),
            "candidate" => Some(Role::Candidate),
            "student" => Some(Role::Student),
            _ => None,
        }
    }
}

/// Directory entry for a user known to the admissions workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub role: Role,
    pub display_name: String,
    pub email: String,
}

/// Authenticated actor handed to every operation by the session layer.
/// The engines perform role and ownership checks against it; session
/// issuance itself lives outside this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
}

/// An interviewer-published, bookable time window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub id: SlotId,
    pub interviewer_id: UserId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Terminal verdict on an admission cycle. The same variant pair carries a
/// completed interview's result and the evaluation decision so there is a
/// single outcome vocabulary with a single writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionOutcome {
    Accept,
    Reject,
}

impl AdmissionOutcome {
    pub const fn label(self) -> &'static str {
        match self {
            AdmissionOutcome::Accept => "accept",
            AdmissionOutcome::Reject => "reject",
        }
    }
}

/// Reservation lifecycle as a tagged union so a meeting link only exists
/// once confirmed and a result only exists once completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum ReservationStage {
    Pending,
    Confirmed {
        meeting_link: String,
    },
    Completed {
        meeting_link: String,
        result: AdmissionOutcome,
        acknowledged: bool,
    },
    Cancelled,
}

impl ReservationStage {
    pub const fn label(&self) -> &'static str {
        match self {
            ReservationStage::Pending => "pending",
            ReservationStage::Confirmed { .. } => "confirmed",
            ReservationStage::Completed { .. } => "completed",
            ReservationStage::Cancelled => "cancelled",
        }
    }

    /// A reservation counts against its slot unless it was cancelled.
    pub const fn is_active(&self) -> bool {
        !matches!(self, ReservationStage::Cancelled)
    }

    pub fn meeting_link(&self) -> Option<&str> {
        match self {
            ReservationStage::Confirmed { meeting_link }
            | ReservationStage::Completed { meeting_link, .. } => Some(meeting_link),
            _ => None,
        }
    }
}

/// A candidate's claim on a slot, carrying its own lifecycle independent of
/// the slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub slot_id: SlotId,
    pub candidate_id: UserId,
    pub stage: ReservationStage,
}

impl Reservation {
    pub const fn is_active(&self) -> bool {
        self.stage.is_active()
    }
}

/// Status of an admin-initiated pairing; accepted and rejected are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl RequestStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Rejected => "rejected",
        }
    }
}

/// Admin-mediated pairing of a candidate and an interviewer that bypasses
/// self-service slot browsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewRequest {
    pub id: RequestId,
    pub admin_id: UserId,
    pub candidate_id: UserId,
    pub interviewer_id: UserId,
    pub status: RequestStatus,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub meeting_link: Option<String>,
}

/// Subscores collected uniformly for every completed interview, 0 through
/// 10 each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewScores {
    pub technical: u8,
    pub communication: u8,
    pub problem_solving: u8,
    pub culture_add: u8,
}

/// Factors permitted in the scoring rubric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    Technical,
    Communication,
    ProblemSolving,
    CultureAdd,
}

/// Discrete contribution to a total score, allowing transparent audits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: ScoreFactor,
    pub score: i16,
    pub notes: String,
}

/// Interviewer-submitted assessment with the server-side recomputed total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scorecard {
    pub scores: InterviewScores,
    pub components: Vec<ScoreComponent>,
    pub total_score: i16,
    pub observation: Option<String>,
}

/// Admission decision recorded on an evaluation; pending until the decision
/// engine finalizes it exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl EvaluationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            EvaluationStatus::Pending => "pending",
            EvaluationStatus::Accepted => "accepted",
            EvaluationStatus::Rejected => "rejected",
        }
    }

    pub const fn is_final(self) -> bool {
        !matches!(self, EvaluationStatus::Pending)
    }
}

/// The scored assessment of one completed interview, one per reservation.
/// `scorecard` is absent for evaluations synthesized from a reservation
/// result acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: EvaluationId,
    pub reservation_id: ReservationId,
    pub interviewer_id: UserId,
    pub candidate_id: UserId,
    pub scorecard: Option<Scorecard>,
    pub status: EvaluationStatus,
}

/// Classifies in-app notifications for rendering and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    SlotBooked,
    ReservationConfirmed,
    ReservationCancelled,
    InterviewCompleted,
    InterviewRequested,
    RequestAccepted,
    RequestRejected,
    AdmissionDecided,
}

/// In-app notification row; owned by the dispatcher implementation, not the
/// admissions store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub message: String,
    pub link: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
