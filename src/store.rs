use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const SNAPSHOT_FILE: &str = "records.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub subject_id: i64,
    pub name: String,
    pub semester: i32,
    #[serde(default)]
    pub max_study_load: Option<i32>,
    #[serde(default)]
    pub assessment_form: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRecord {
    pub performance_id: i64,
    pub student_id: i64,
    #[serde(default)]
    pub subject_id: Option<i64>,
    #[serde(default)]
    pub grade: Option<i32>,
    pub work_type: String,
    #[serde(default)]
    pub assessment_date: Option<NaiveDate>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub attendance_id: i64,
    pub student_id: i64,
    #[serde(default)]
    pub subject_id: Option<i64>,
    pub attendance_date: NaiveDate,
    #[serde(default)]
    pub is_present: Option<bool>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub special_condition: Option<String>,
    #[serde(default)]
    pub color_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherLink {
    pub subject_id: i64,
    pub teacher_name: String,
}

/// Read-side record access the engine computes over. Implementations own
/// all loading concerns; the engine never performs I/O itself.
pub trait RecordSource {
    fn grades_by_student(&self, student_id: i64) -> Vec<GradeRecord>;
    fn grades_by_student_and_subject(&self, student_id: i64, subject_id: i64) -> Vec<GradeRecord>;
    fn attendance_by_student(&self, student_id: i64) -> Vec<AttendanceRecord>;
    /// Ordered by attendance date, newest first.
    fn attendance_by_student_and_subject(
        &self,
        student_id: i64,
        subject_id: i64,
    ) -> Vec<AttendanceRecord>;
    fn subject_by_id(&self, subject_id: i64) -> Option<Subject>;
    fn teachers_by_subject(&self, subject_id: i64) -> Vec<String>;
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkspaceSnapshot {
    #[serde(default)]
    subjects: Vec<Subject>,
    #[serde(default)]
    grades: Vec<GradeRecord>,
    #[serde(default)]
    attendance: Vec<AttendanceRecord>,
    #[serde(default)]
    teacher_links: Vec<TeacherLink>,
}

/// In-memory record store behind the IPC surface, filled from one
/// workspace snapshot at selection time and immutable afterwards.
#[derive(Debug)]
pub struct MemoryStore {
    subjects: BTreeMap<i64, Subject>,
    grades: Vec<GradeRecord>,
    attendance: Vec<AttendanceRecord>,
    teacher_links: Vec<TeacherLink>,
}

impl MemoryStore {
    pub fn new(
        subjects: Vec<Subject>,
        grades: Vec<GradeRecord>,
        attendance: Vec<AttendanceRecord>,
        teacher_links: Vec<TeacherLink>,
    ) -> Self {
        let subjects = subjects
            .into_iter()
            .map(|s| (s.subject_id, s))
            .collect();
        Self {
            subjects,
            grades,
            attendance,
            teacher_links,
        }
    }
}

pub fn open_store(workspace: &Path) -> anyhow::Result<MemoryStore> {
    let snapshot_path = workspace.join(SNAPSHOT_FILE);
    let raw = std::fs::read_to_string(&snapshot_path)
        .with_context(|| format!("read {}", snapshot_path.display()))?;
    let snapshot: WorkspaceSnapshot = serde_json::from_str(&raw)
        .with_context(|| format!("parse {}", snapshot_path.display()))?;
    Ok(MemoryStore::new(
        snapshot.subjects,
        snapshot.grades,
        snapshot.attendance,
        snapshot.teacher_links,
    ))
}

impl RecordSource for MemoryStore {
    fn grades_by_student(&self, student_id: i64) -> Vec<GradeRecord> {
        self.grades
            .iter()
            .filter(|g| g.student_id == student_id)
            .cloned()
            .collect()
    }

    fn grades_by_student_and_subject(&self, student_id: i64, subject_id: i64) -> Vec<GradeRecord> {
        self.grades
            .iter()
            .filter(|g| g.student_id == student_id && g.subject_id == Some(subject_id))
            .cloned()
            .collect()
    }

    fn attendance_by_student(&self, student_id: i64) -> Vec<AttendanceRecord> {
        self.attendance
            .iter()
            .filter(|a| a.student_id == student_id)
            .cloned()
            .collect()
    }

    fn attendance_by_student_and_subject(
        &self,
        student_id: i64,
        subject_id: i64,
    ) -> Vec<AttendanceRecord> {
        let mut records: Vec<AttendanceRecord> = self
            .attendance
            .iter()
            .filter(|a| a.student_id == student_id && a.subject_id == Some(subject_id))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.attendance_date.cmp(&a.attendance_date));
        records
    }

    fn subject_by_id(&self, subject_id: i64) -> Option<Subject> {
        self.subjects.get(&subject_id).cloned()
    }

    fn teachers_by_subject(&self, subject_id: i64) -> Vec<String> {
        self.teacher_links
            .iter()
            .filter(|link| link.subject_id == subject_id)
            .map(|link| link.teacher_name.clone())
            .collect()
    }
}
