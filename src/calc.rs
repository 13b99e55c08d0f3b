use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::store::{AttendanceRecord, GradeRecord, Subject};

/// Portal-wide rounding: half-up at 2 decimals,
/// `Int(100*x + 0.5) / 100`.
pub fn round_2dp(x: f64) -> f64 {
    ((100.0 * x) + 0.5).floor() / 100.0
}

/// Work-type weight table. Built once at startup and passed by reference;
/// lookups of unknown labels fall back to the default weight, never error.
#[derive(Debug, Clone)]
pub struct WorkTypeWeights {
    weights: HashMap<String, f64>,
    default_weight: f64,
}

impl WorkTypeWeights {
    pub fn standard() -> Self {
        let mut weights = HashMap::new();
        weights.insert("Экзамен".to_string(), 3.0);
        weights.insert("Контрольная работа".to_string(), 2.0);
        weights.insert("Урок".to_string(), 1.0);
        weights.insert("Домашнее задание".to_string(), 1.0);
        Self {
            weights,
            default_weight: 1.0,
        }
    }

    pub fn weight_for(&self, work_type: &str) -> f64 {
        self.weights
            .get(work_type)
            .copied()
            .unwrap_or(self.default_weight)
    }
}

impl Default for WorkTypeWeights {
    fn default() -> Self {
        Self::standard()
    }
}

/// Per-subject grade statistics. `avg_grade` is absent when no record has a
/// usable grade; `max_grade`/`min_grade` report 0 in the same situation.
/// Call sites rely on that asymmetry, so it stays.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeStats {
    pub avg_grade: Option<f64>,
    pub max_grade: i32,
    pub min_grade: i32,
    pub last_grade: Option<i32>,
    pub grade_counts: BTreeMap<i32, i64>,
    pub total_grades: usize,
}

pub fn aggregate_grades(grades: &[GradeRecord], weights: &WorkTypeWeights) -> GradeStats {
    let mut weighted_sum = 0.0_f64;
    let mut total_weight = 0.0_f64;
    let mut max_grade: Option<i32> = None;
    let mut min_grade: Option<i32> = None;
    let mut last: Option<(NaiveDate, i32)> = None;
    let mut grade_counts: BTreeMap<i32, i64> = (1..=5).map(|v| (v, 0)).collect();

    for record in grades {
        let Some(grade) = record.grade else {
            continue;
        };

        let weight = weights.weight_for(&record.work_type);
        weighted_sum += f64::from(grade) * weight;
        total_weight += weight;

        max_grade = Some(max_grade.map_or(grade, |m| m.max(grade)));
        min_grade = Some(min_grade.map_or(grade, |m| m.min(grade)));

        if (1..=5).contains(&grade) {
            *grade_counts.entry(grade).or_insert(0) += 1;
        }

        if let Some(date) = record.assessment_date {
            // Strictly-after comparison: the first record seen at the
            // maximum date wins a tie.
            let newer = match last {
                Some((best, _)) => date > best,
                None => true,
            };
            if newer {
                last = Some((date, grade));
            }
        }
    }

    let avg_grade = if total_weight > 0.0 {
        Some(round_2dp(weighted_sum / total_weight))
    } else {
        None
    };

    GradeStats {
        avg_grade,
        max_grade: max_grade.unwrap_or(0),
        min_grade: min_grade.unwrap_or(0),
        last_grade: last.map(|(_, grade)| grade),
        grade_counts,
        total_grades: grades.len(),
    }
}

/// Qualitative band counts over present grades, used by the per-subject
/// grade detail view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeBands {
    pub excellent_count: i64,
    pub good_count: i64,
    pub satisfactory_count: i64,
    pub unsatisfactory_count: i64,
}

pub fn count_grade_bands(grades: &[GradeRecord]) -> GradeBands {
    let mut bands = GradeBands::default();
    for record in grades {
        let Some(grade) = record.grade else {
            continue;
        };
        let value = f64::from(grade);
        if value >= 4.5 {
            bands.excellent_count += 1;
        } else if value >= 3.5 {
            bands.good_count += 1;
        } else if value >= 2.5 {
            bands.satisfactory_count += 1;
        } else {
            bands.unsatisfactory_count += 1;
        }
    }
    bands
}

/// Tri-state presence flag. An unmarked row reads as "late" in detailed
/// views and is excluded from the present/absent dichotomy of the compact
/// view, while still counting toward totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Present,
    Absent,
    Unmarked,
}

impl Presence {
    pub fn from_flag(flag: Option<bool>) -> Self {
        match flag {
            Some(true) => Presence::Present,
            Some(false) => Presence::Absent,
            None => Presence::Unmarked,
        }
    }
}

/// Compact attendance statistics for dashboards. `total` is the full record
/// count, so `present + absent` may fall short of it when unmarked rows
/// exist.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceCounts {
    pub present: i64,
    pub absent: i64,
    pub total: usize,
}

pub fn count_attendance(records: &[AttendanceRecord]) -> AttendanceCounts {
    let mut present = 0_i64;
    let mut absent = 0_i64;
    for record in records {
        match Presence::from_flag(record.is_present) {
            Presence::Present => present += 1,
            Presence::Absent => absent += 1,
            Presence::Unmarked => {}
        }
    }
    AttendanceCounts {
        present,
        absent,
        total: records.len(),
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceDetail {
    pub present_count: i64,
    pub absent_count: i64,
    pub late_count: i64,
    pub total_classes: usize,
    pub attendance_percentage: f64,
    pub present_percentage: f64,
    pub absent_percentage: f64,
    pub late_percentage: f64,
}

pub fn detail_attendance(records: &[AttendanceRecord]) -> AttendanceDetail {
    let mut present_count = 0_i64;
    let mut absent_count = 0_i64;
    let mut late_count = 0_i64;
    for record in records {
        match Presence::from_flag(record.is_present) {
            Presence::Present => present_count += 1,
            Presence::Absent => absent_count += 1,
            Presence::Unmarked => late_count += 1,
        }
    }
    let total_classes = records.len();
    let present_percentage = percentage(present_count, total_classes);
    AttendanceDetail {
        present_count,
        absent_count,
        late_count,
        total_classes,
        attendance_percentage: present_percentage,
        present_percentage,
        absent_percentage: percentage(absent_count, total_classes),
        late_percentage: percentage(late_count, total_classes),
    }
}

/// part/total as a percentage, half-up at 2 decimals. A zero total yields
/// 0.0 instead of dividing.
pub fn percentage(part: i64, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_2dp(part as f64 / total as f64 * 100.0)
}

/// Records that reference a subject and can be grouped by it.
pub trait SubjectScoped {
    fn subject_id(&self) -> Option<i64>;
}

impl SubjectScoped for GradeRecord {
    fn subject_id(&self) -> Option<i64> {
        self.subject_id
    }
}

impl SubjectScoped for AttendanceRecord {
    fn subject_id(&self) -> Option<i64> {
        self.subject_id
    }
}

/// Partitions records by subject id. Records without a subject reference
/// are dropped. With a semester filter, a record survives only when its
/// subject resolves in `subjects` and sits in that semester; a filter that
/// excludes everything yields an empty map.
pub fn group_by_subject<R: SubjectScoped + Clone>(
    records: &[R],
    subjects: &BTreeMap<i64, Subject>,
    semester: Option<i32>,
) -> BTreeMap<i64, Vec<R>> {
    records
        .iter()
        .filter_map(|record| record.subject_id().map(|id| (id, record)))
        .filter(|(id, _)| match semester {
            None => true,
            Some(sem) => subjects.get(id).map(|s| s.semester == sem).unwrap_or(false),
        })
        .fold(BTreeMap::new(), |mut grouped, (id, record)| {
            grouped.entry(id).or_insert_with(Vec::new).push(record.clone());
            grouped
        })
}

/// Academic calendar rule: February through July is semester 2, the rest
/// of the year is semester 1.
pub fn current_semester(today: NaiveDate) -> i32 {
    if (2..=7).contains(&today.month()) {
        2
    } else {
        1
    }
}
