use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};
use utoipa::ToSchema;

use crate::viewmodel::filter::Filterable;

/// Category selector keys understood by [`GradeRecord`].
pub const SEMESTER: &str = "semester";
pub const PELAJARAN: &str = "pelajaran";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MataPelajaran {
    #[serde(default, deserialize_with = "super::nullable")]
    pub nama: String,
    #[serde(default, deserialize_with = "super::nullable")]
    pub kode: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Semester {
    /// Semester number, normalized to its string form.
    #[serde(default, deserialize_with = "super::string_or_number")]
    pub semester: String,
    #[serde(default, deserialize_with = "super::string_or_number")]
    pub replid: String,
}

/// One row of `nauByNis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeRecord {
    #[serde(deserialize_with = "super::string_or_number")]
    pub replid: String,
    #[serde(default, deserialize_with = "super::string_or_number")]
    pub nis: String,
    #[serde(rename = "nilaiAU", default, deserialize_with = "super::nullable")]
    pub nilai_au: f64,
    #[serde(default, deserialize_with = "super::nullable")]
    pub grade: String,
    #[serde(default, deserialize_with = "super::nullable")]
    pub komentar: String,
    #[serde(default, deserialize_with = "super::nullable")]
    pub pelajaran: MataPelajaran,
    #[serde(default, deserialize_with = "super::nullable")]
    pub semester: Semester,
}

impl GradeRecord {
    pub fn grade_class(&self) -> Grade {
        Grade::from_letter(&self.grade)
    }
}

impl Filterable for GradeRecord {
    fn search_text(&self) -> Vec<&str> {
        vec![
            self.pelajaran.nama.as_str(),
            self.pelajaran.kode.as_str(),
            self.grade.as_str(),
        ]
    }

    fn category(&self, key: &str) -> Option<String> {
        match key {
            SEMESTER => Some(self.semester.semester.clone()),
            PELAJARAN => Some(self.pelajaran.nama.clone()),
            _ => None,
        }
    }
}

/// Letter grade. Free text the school may send outside A-D is `Unknown`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Display,
    EnumIter,
    ToSchema,
)]
pub enum Grade {
    A,
    B,
    C,
    D,
    Unknown,
}

impl Grade {
    pub fn from_letter(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "A" => Grade::A,
            "B" => Grade::B,
            "C" => Grade::C,
            "D" => Grade::D,
            _ => Grade::Unknown,
        }
    }
}

/// Distinct semesters, numerically ascending; non-numeric values sort last.
pub fn semester_options(records: &[GradeRecord]) -> Vec<String> {
    let mut options: Vec<String> = records
        .iter()
        .map(|r| r.semester.semester.clone())
        .filter(|s| !s.is_empty())
        .collect();
    options.sort_by(|a, b| {
        match (a.parse::<i64>(), b.parse::<i64>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            (Ok(_), Err(_)) => std::cmp::Ordering::Less,
            (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
            (Err(_), Err(_)) => a.cmp(b),
        }
    });
    options.dedup();
    options
}

/// Distinct subject names, alphabetical.
pub fn subject_options(records: &[GradeRecord]) -> Vec<String> {
    let mut options: Vec<String> = records
        .iter()
        .map(|r| r.pelajaran.nama.clone())
        .filter(|s| !s.is_empty())
        .collect();
    options.sort();
    options.dedup();
    options
}
