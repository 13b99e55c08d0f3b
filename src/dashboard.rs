use serde::Serialize;
use std::collections::BTreeMap;

use crate::calc::{
    aggregate_grades, count_attendance, count_grade_bands, detail_attendance, group_by_subject,
    AttendanceCounts, AttendanceDetail, GradeBands, GradeStats, SubjectScoped, WorkTypeWeights,
};
use crate::store::{AttendanceRecord, GradeRecord, RecordSource, Subject};

/// One grades-dashboard cell: the subject, its record list and the
/// computed statistics, flattened into a single object for the
/// presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectGrades {
    pub subject: Subject,
    pub grades: Vec<GradeRecord>,
    #[serde(flatten)]
    pub stats: GradeStats,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectAttendance {
    pub subject: Subject,
    pub attendances: Vec<AttendanceRecord>,
    #[serde(flatten)]
    pub counts: AttendanceCounts,
}

/// Grade detail page payload for a single subject. Superset of the
/// dashboard cell: adds band counts on top of the full statistics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeSubjectDetails {
    pub subject: Subject,
    pub grades: Vec<GradeRecord>,
    #[serde(flatten)]
    pub stats: GradeStats,
    #[serde(flatten)]
    pub bands: GradeBands,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSubjectDetails {
    pub subject: Subject,
    pub attendances: Vec<AttendanceRecord>,
    #[serde(flatten)]
    pub detail: AttendanceDetail,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryData {
    pub grades_data: BTreeMap<i64, SubjectGrades>,
    pub attendance_data: BTreeMap<i64, SubjectAttendance>,
    pub overall_avg_grade: f64,
    pub overall_attendance: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendData {
    pub semesters: Vec<i32>,
    pub grades: Vec<f64>,
    pub attendance: Vec<f64>,
}

/// The academic year is a fixed two-semester model.
pub const TREND_SEMESTERS: [i32; 2] = [1, 2];

/// Resolves every subject referenced by the records, dropping ids that no
/// longer map to a known subject. Downstream dashboards skip those groups
/// rather than failing the whole request.
fn resolve_subjects<R: SubjectScoped>(
    store: &dyn RecordSource,
    records: &[R],
) -> BTreeMap<i64, Subject> {
    let mut subjects = BTreeMap::new();
    for record in records {
        let Some(subject_id) = record.subject_id() else {
            continue;
        };
        if subjects.contains_key(&subject_id) {
            continue;
        }
        if let Some(subject) = store.subject_by_id(subject_id) {
            subjects.insert(subject_id, subject);
        }
    }
    subjects
}

pub fn build_grades_dashboard(
    store: &dyn RecordSource,
    weights: &WorkTypeWeights,
    student_id: i64,
    semester: Option<i32>,
) -> BTreeMap<i64, SubjectGrades> {
    let records = store.grades_by_student(student_id);
    let subjects = resolve_subjects(store, &records);
    group_by_subject(&records, &subjects, semester)
        .into_iter()
        .filter_map(|(subject_id, grades)| {
            let subject = subjects.get(&subject_id)?.clone();
            let stats = aggregate_grades(&grades, weights);
            Some((
                subject_id,
                SubjectGrades {
                    subject,
                    grades,
                    stats,
                },
            ))
        })
        .collect()
}

pub fn build_attendance_dashboard(
    store: &dyn RecordSource,
    student_id: i64,
    semester: Option<i32>,
) -> BTreeMap<i64, SubjectAttendance> {
    let records = store.attendance_by_student(student_id);
    let subjects = resolve_subjects(store, &records);
    group_by_subject(&records, &subjects, semester)
        .into_iter()
        .filter_map(|(subject_id, attendances)| {
            let subject = subjects.get(&subject_id)?.clone();
            let counts = count_attendance(&attendances);
            Some((
                subject_id,
                SubjectAttendance {
                    subject,
                    attendances,
                    counts,
                },
            ))
        })
        .collect()
}

/// Detail lookup for one subject. `None` when the subject id is unknown,
/// so the caller can redirect instead of failing. A semester filter that
/// does not match the subject's semester empties the record list but still
/// returns the shape.
pub fn grade_subject_details(
    store: &dyn RecordSource,
    weights: &WorkTypeWeights,
    student_id: i64,
    subject_id: i64,
    semester: Option<i32>,
) -> Option<GradeSubjectDetails> {
    let subject = store.subject_by_id(subject_id)?;
    let mut grades = store.grades_by_student_and_subject(student_id, subject_id);
    if let Some(sem) = semester {
        if sem != subject.semester {
            grades.clear();
        }
    }
    let stats = aggregate_grades(&grades, weights);
    let bands = count_grade_bands(&grades);
    Some(GradeSubjectDetails {
        subject,
        grades,
        stats,
        bands,
    })
}

pub fn attendance_subject_details(
    store: &dyn RecordSource,
    student_id: i64,
    subject_id: i64,
    semester: Option<i32>,
) -> Option<AttendanceSubjectDetails> {
    let subject = store.subject_by_id(subject_id)?;
    let mut attendances = store.attendance_by_student_and_subject(student_id, subject_id);
    if let Some(sem) = semester {
        if sem != subject.semester {
            attendances.clear();
        }
    }
    let detail = detail_attendance(&attendances);
    Some(AttendanceSubjectDetails {
        subject,
        attendances,
        detail,
    })
}

pub fn build_summary(
    store: &dyn RecordSource,
    weights: &WorkTypeWeights,
    student_id: i64,
    semester: Option<i32>,
) -> SummaryData {
    let grades_data = build_grades_dashboard(store, weights, student_id, semester);
    let attendance_data = build_attendance_dashboard(store, student_id, semester);
    let overall_avg_grade = overall_avg_grade(&grades_data);
    let overall_attendance = overall_attendance(&attendance_data);
    SummaryData {
        grades_data,
        attendance_data,
        overall_avg_grade,
        overall_attendance,
    }
}

/// Mean of the per-subject weighted averages, counting only subjects whose
/// average is present and strictly positive. 0.0 when none qualify.
fn overall_avg_grade(grades_data: &BTreeMap<i64, SubjectGrades>) -> f64 {
    let mut sum = 0.0_f64;
    let mut count = 0_u32;
    for entry in grades_data.values() {
        if let Some(avg) = entry.stats.avg_grade {
            if avg > 0.0 {
                sum += avg;
                count += 1;
            }
        }
    }
    if count > 0 {
        sum / f64::from(count)
    } else {
        0.0
    }
}

/// Presence summed across all subjects before dividing, so subjects with
/// more classes weigh more. 0.0 when the student has no classes at all.
fn overall_attendance(attendance_data: &BTreeMap<i64, SubjectAttendance>) -> f64 {
    let mut total_present = 0_i64;
    let mut total_classes = 0_i64;
    for entry in attendance_data.values() {
        total_present += entry.counts.present;
        total_classes += entry.counts.total as i64;
    }
    if total_classes == 0 {
        return 0.0;
    }
    total_present as f64 / total_classes as f64 * 100.0
}

pub fn semester_trend(
    store: &dyn RecordSource,
    weights: &WorkTypeWeights,
    student_id: i64,
) -> TrendData {
    let mut grades = Vec::with_capacity(TREND_SEMESTERS.len());
    let mut attendance = Vec::with_capacity(TREND_SEMESTERS.len());
    for semester in TREND_SEMESTERS {
        let summary = build_summary(store, weights, student_id, Some(semester));
        grades.push(summary.overall_avg_grade);
        attendance.push(summary.overall_attendance);
    }
    TrendData {
        semesters: TREND_SEMESTERS.to_vec(),
        grades,
        attendance,
    }
}
