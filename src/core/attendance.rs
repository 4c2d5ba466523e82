//! Attendance tracking and summaries.
//!
//! Marking is an upsert keyed by (course, student, day): marking the same
//! session again replaces the status instead of adding a row, and the whole
//! thing is a single `INSERT .. ON CONFLICT DO UPDATE` statement.

use crate::{
    core::{course, student, tenant::OwnerId},
    entities::{Attendance, AttendanceStatus, attendance},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::OnConflict};
use tracing::debug;

/// Per-status counts for one student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttendanceSummary {
    /// Sessions marked present
    pub present: usize,
    /// Sessions marked absent
    pub absent: usize,
    /// Sessions marked late
    pub late: usize,
    /// Sessions marked excused
    pub excused: usize,
}

impl AttendanceSummary {
    /// Count for a single status.
    #[must_use]
    pub const fn count(&self, status: AttendanceStatus) -> usize {
        match status {
            AttendanceStatus::Present => self.present,
            AttendanceStatus::Absent => self.absent,
            AttendanceStatus::Late => self.late,
            AttendanceStatus::Excused => self.excused,
        }
    }

    /// All four statuses with their counts, in a fixed order.
    #[must_use]
    pub const fn counts(&self) -> [(AttendanceStatus, usize); 4] {
        [
            (AttendanceStatus::Present, self.present),
            (AttendanceStatus::Absent, self.absent),
            (AttendanceStatus::Late, self.late),
            (AttendanceStatus::Excused, self.excused),
        ]
    }

    /// Number of recorded sessions.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.present + self.absent + self.late + self.excused
    }

    /// Fraction of sessions marked present; 1.0 when nothing is recorded yet.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // session counts are far below 2^52
    pub fn present_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 1.0;
        }
        self.present as f64 / total as f64
    }
}

/// Folds statuses into counts. Order does not matter.
pub fn summarize<I>(statuses: I) -> AttendanceSummary
where
    I: IntoIterator<Item = AttendanceStatus>,
{
    statuses
        .into_iter()
        .fold(AttendanceSummary::default(), |mut summary, status| {
            match status {
                AttendanceStatus::Present => summary.present += 1,
                AttendanceStatus::Absent => summary.absent += 1,
                AttendanceStatus::Late => summary.late += 1,
                AttendanceStatus::Excused => summary.excused += 1,
            }
            summary
        })
}

/// Marks one session, replacing any earlier mark for the same day.
pub async fn mark_attendance(
    db: &DatabaseConnection,
    owner: &OwnerId,
    course_id: i64,
    student_id: i64,
    date: NaiveDate,
    status: AttendanceStatus,
) -> Result<attendance::Model> {
    course::get_course_by_id(db, owner, course_id)
        .await?
        .ok_or_else(|| Error::CourseNotFound {
            id: course_id.to_string(),
        })?;
    student::require_student(db, owner, student_id).await?;

    let record = attendance::ActiveModel {
        owner_id: Set(owner.as_str().to_string()),
        course_id: Set(course_id),
        student_id: Set(student_id),
        date: Set(date),
        status: Set(status),
        ..Default::default()
    };

    Attendance::insert(record)
        .on_conflict(
            OnConflict::columns([
                attendance::Column::CourseId,
                attendance::Column::StudentId,
                attendance::Column::Date,
            ])
            .update_column(attendance::Column::Status)
            .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    debug!(owner = %owner, course_id, student_id, %date, %status, "Marked attendance");

    Attendance::find()
        .filter(attendance::Column::OwnerId.eq(owner.as_str()))
        .filter(attendance::Column::CourseId.eq(course_id))
        .filter(attendance::Column::StudentId.eq(student_id))
        .filter(attendance::Column::Date.eq(date))
        .one(db)
        .await?
        .ok_or_else(|| Error::Validation {
            message: "Attendance record vanished after upsert".to_string(),
        })
}

/// Attendance records of a student, optionally limited to one course, oldest first.
pub async fn get_attendance_for_student(
    db: &DatabaseConnection,
    owner: &OwnerId,
    student_id: i64,
    course_id: Option<i64>,
) -> Result<Vec<attendance::Model>> {
    let mut query = Attendance::find()
        .filter(attendance::Column::OwnerId.eq(owner.as_str()))
        .filter(attendance::Column::StudentId.eq(student_id));
    if let Some(course_id) = course_id {
        query = query.filter(attendance::Column::CourseId.eq(course_id));
    }

    query
        .order_by_asc(attendance::Column::Date)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Summary of a student's attendance, optionally limited to one course.
pub async fn get_attendance_summary(
    db: &DatabaseConnection,
    owner: &OwnerId,
    student_id: i64,
    course_id: Option<i64>,
) -> Result<AttendanceSummary> {
    let records = get_attendance_for_student(db, owner, student_id, course_id).await?;
    Ok(summarize(records.into_iter().map(|r| r.status)))
}
