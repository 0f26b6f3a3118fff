pub mod course;
pub mod program;
pub mod recommendation;
pub mod student;
pub mod term;

pub use course::{Course, CourseCategory, CourseId, MeetingWindow, Section, SectionId};
pub use program::{ClusterId, GenEdCluster, TemplateSlot};
pub use recommendation::{Recommendation, RecommendationResult, SlotKind, MODEL_VERSION};
pub use student::{CompletionStatus, Standing, Student, StudentId, TimePreference};
pub use term::{Semester, Term};
