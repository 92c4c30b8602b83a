use chrono::{FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};
use utoipa::ToSchema;

use crate::viewmodel::filter::{Filterable, parse_timestamp};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Kelas {
    #[serde(default, deserialize_with = "super::nullable")]
    pub kelas: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pelajaran {
    #[serde(default, deserialize_with = "super::nullable")]
    pub nama: String,
}

/// One row of `presensiPelajaranByNis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    #[serde(deserialize_with = "super::string_or_number")]
    pub replid: String,
    /// Date string or epoch millis; anything else reads as blank.
    #[serde(default, deserialize_with = "super::string_or_number")]
    pub tanggal: String,
    #[serde(default, deserialize_with = "super::nullable")]
    pub jam: String,
    #[serde(default, deserialize_with = "super::nullable")]
    pub gurupelajaran: String,
    #[serde(default, deserialize_with = "super::nullable")]
    pub materi: String,
    /// Raw status code; see [`StatusHadir::from_code`].
    #[serde(default = "unknown_code", deserialize_with = "status_code")]
    pub statushadir: i64,
    #[serde(default, deserialize_with = "super::nullable")]
    pub kelas: Kelas,
    #[serde(default, deserialize_with = "super::nullable")]
    pub pelajaran: Pelajaran,
}

impl AttendanceRecord {
    pub fn status(&self) -> StatusHadir {
        StatusHadir::from_code(self.statushadir)
    }
}

fn unknown_code() -> i64 {
    -1
}

fn status_code<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = super::string_or_number(deserializer)?;
    Ok(raw.trim().parse().unwrap_or(-1))
}

impl Filterable for AttendanceRecord {
    fn search_text(&self) -> Vec<&str> {
        vec![
            self.pelajaran.nama.as_str(),
            self.gurupelajaran.as_str(),
            self.materi.as_str(),
        ]
    }

    fn timestamp(&self, offset: FixedOffset) -> Option<NaiveDateTime> {
        parse_timestamp(&self.tanggal, offset)
    }
}

/// Attendance status. Codes outside 0..=4 land on `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumIter, ToSchema)]
pub enum StatusHadir {
    Hadir,
    Sakit,
    Ijin,
    Alpha,
    Cuti,
    Unknown,
}

impl StatusHadir {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => StatusHadir::Hadir,
            1 => StatusHadir::Sakit,
            2 => StatusHadir::Ijin,
            3 => StatusHadir::Alpha,
            4 => StatusHadir::Cuti,
            _ => StatusHadir::Unknown,
        }
    }

    pub fn code(&self) -> Option<i64> {
        match self {
            StatusHadir::Hadir => Some(0),
            StatusHadir::Sakit => Some(1),
            StatusHadir::Ijin => Some(2),
            StatusHadir::Alpha => Some(3),
            StatusHadir::Cuti => Some(4),
            StatusHadir::Unknown => None,
        }
    }
}
