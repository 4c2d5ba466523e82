//! Entity module - Contains all SeaORM entity definitions for the database.
//! Every table carries an `owner_id` column so that each operator's roster
//! stays isolated from every other operator's.

pub mod assessment_score;
pub mod attendance;
pub mod course;
pub mod enrollment;
pub mod payment;
pub mod student;

// Re-export specific types to avoid conflicts
pub use assessment_score::{
    Column as AssessmentScoreColumn, Entity as AssessmentScore, Model as AssessmentScoreModel,
};
pub use attendance::{
    AttendanceStatus, Column as AttendanceColumn, Entity as Attendance, Model as AttendanceModel,
};
pub use course::{Column as CourseColumn, Entity as Course, Model as CourseModel};
pub use enrollment::{Column as EnrollmentColumn, Entity as Enrollment, Model as EnrollmentModel};
pub use payment::{Column as PaymentColumn, Entity as Payment, Model as PaymentModel};
pub use student::{Column as StudentColumn, Entity as Student, Model as StudentModel, StudentStatus};
