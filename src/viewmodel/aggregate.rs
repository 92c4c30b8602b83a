use std::collections::HashMap;

use serde::Serialize;
use strum::IntoEnumIterator;
use utoipa::ToSchema;

use crate::model::attendance::{AttendanceRecord, StatusHadir};
use crate::model::finance::LaporanKeuangan;
use crate::model::grade::{Grade, GradeRecord};
use crate::viewmodel::format::format_rupiah;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct AttendanceStats {
    pub hadir: usize,
    pub sakit: usize,
    pub izin: usize,
    pub alpha: usize,
    pub cuti: usize,
    pub unknown: usize,
    pub total: usize,
}

pub fn attendance_stats<'a, I>(records: I) -> AttendanceStats
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    let mut stats = AttendanceStats::default();
    for record in records {
        let counter = match record.status() {
            StatusHadir::Hadir => &mut stats.hadir,
            StatusHadir::Sakit => &mut stats.sakit,
            StatusHadir::Ijin => &mut stats.izin,
            StatusHadir::Alpha => &mut stats.alpha,
            StatusHadir::Cuti => &mut stats.cuti,
            StatusHadir::Unknown => &mut stats.unknown,
        };
        *counter += 1;
        stats.total += 1;
    }
    stats
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct GradeBucket {
    pub grade: Grade,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct GradeStats {
    /// Mean score, two decimals.
    #[serde(rename = "rataRata")]
    #[schema(example = "80.00")]
    pub rata_rata: String,
    pub tertinggi: f64,
    pub terendah: f64,
    pub total: usize,
    /// Count per letter grade, every letter present, in A..Unknown order.
    pub distribution: Vec<GradeBucket>,
}

pub fn grade_stats<'a, I>(records: I) -> GradeStats
where
    I: IntoIterator<Item = &'a GradeRecord>,
{
    let mut sum = 0.0;
    let mut total = 0usize;
    let mut highest = f64::NEG_INFINITY;
    let mut lowest = f64::INFINITY;
    let mut letters: HashMap<Grade, usize> = HashMap::new();

    for record in records {
        sum += record.nilai_au;
        total += 1;
        highest = highest.max(record.nilai_au);
        lowest = lowest.min(record.nilai_au);
        *letters.entry(record.grade_class()).or_default() += 1;
    }

    let mean = if total == 0 { 0.0 } else { sum / total as f64 };

    GradeStats {
        rata_rata: format!("{:.2}", round2(mean)),
        tertinggi: if total == 0 { 0.0 } else { highest },
        terendah: if total == 0 { 0.0 } else { lowest },
        total,
        distribution: Grade::iter()
            .map(|grade| GradeBucket {
                grade,
                count: letters.get(&grade).copied().unwrap_or(0),
            })
            .collect(),
    }
}

/// Half away from zero, which is what "standard rounding" means to a reader.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct FinanceTotals {
    pub total_besar: f64,
    pub total_cicilan: f64,
    pub total_lunas: f64,
    /// Outstanding balance, `besar - cicilan`.
    pub total_sisa: f64,
}

/// Rupiah renderings of [`FinanceTotals`].
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FinanceTotalLabels {
    #[schema(example = "Rp3.000.000")]
    pub total_besar: String,
    pub total_cicilan: String,
    pub total_lunas: String,
    pub total_sisa: String,
}

/// Server totals win when present; missing ones are summed from the rows.
pub fn finance_totals(laporan: &LaporanKeuangan) -> FinanceTotals {
    let (besar, cicilan, lunas) = laporan.besar_jtt_list.iter().fold(
        (0.0, 0.0, 0.0),
        |(besar, cicilan, lunas), item| {
            (besar + item.besar, cicilan + item.cicilan, lunas + item.lunas)
        },
    );

    let total_besar = laporan.total_besar.unwrap_or(besar);
    let total_cicilan = laporan.total_cicilan.unwrap_or(cicilan);

    FinanceTotals {
        total_besar,
        total_cicilan,
        total_lunas: laporan.total_lunas.unwrap_or(lunas),
        total_sisa: laporan.total_sisa.unwrap_or(total_besar - total_cicilan),
    }
}

impl FinanceTotals {
    pub fn labels(&self) -> FinanceTotalLabels {
        FinanceTotalLabels {
            total_besar: format_rupiah(self.total_besar),
            total_cicilan: format_rupiah(self.total_cicilan),
            total_lunas: format_rupiah(self.total_lunas),
            total_sisa: format_rupiah(self.total_sisa),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attendance(statuses: &[i64]) -> Vec<AttendanceRecord> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, code)| {
                serde_json::from_value(json!({
                    "replid": i.to_string(),
                    "tanggal": "2024-01-10",
                    "statushadir": code
                }))
                .expect("attendance")
            })
            .collect()
    }

    fn grades(scores: &[(f64, &str)]) -> Vec<GradeRecord> {
        scores
            .iter()
            .enumerate()
            .map(|(i, (score, letter))| {
                serde_json::from_value(json!({
                    "replid": i.to_string(),
                    "nilaiAU": score,
                    "grade": letter
                }))
                .expect("grade")
            })
            .collect()
    }

    #[test]
    fn attendance_counts_per_status() {
        let stats = attendance_stats(&attendance(&[0, 0, 2, 3]));
        assert_eq!(stats.hadir, 2);
        assert_eq!(stats.izin, 1);
        assert_eq!(stats.alpha, 1);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.sakit + stats.cuti + stats.unknown, 0);
    }

    #[test]
    fn unknown_codes_are_counted_separately() {
        let stats = attendance_stats(&attendance(&[1, 4, 7]));
        assert_eq!(stats.sakit, 1);
        assert_eq!(stats.cuti, 1);
        assert_eq!(stats.unknown, 1);
        assert_eq!(stats.total, 3);
    }

    #[test]
    fn grade_mean_min_max() {
        let stats = grade_stats(&grades(&[(80.0, "B"), (90.0, "A"), (70.0, "C")]));
        assert_eq!(stats.rata_rata, "80.00");
        assert_eq!(stats.tertinggi, 90.0);
        assert_eq!(stats.terendah, 70.0);
        assert_eq!(stats.total, 3);

        let a = stats.distribution.iter().find(|b| b.grade == Grade::A).unwrap();
        assert_eq!(a.count, 1);
        assert_eq!(stats.distribution.len(), 5);
    }

    #[test]
    fn grade_mean_rounds_half_away_from_zero() {
        let stats = grade_stats(&grades(&[(80.0, "B"), (80.25, "B")]));
        assert_eq!(stats.rata_rata, "80.13");
    }

    #[test]
    fn empty_lists_aggregate_to_zero() {
        assert_eq!(attendance_stats(&Vec::new()), AttendanceStats::default());

        let stats = grade_stats(&Vec::new());
        assert_eq!(stats.rata_rata, "0.00");
        assert_eq!(stats.tertinggi, 0.0);
        assert_eq!(stats.terendah, 0.0);
        assert_eq!(stats.total, 0);
        assert!(stats.distribution.iter().all(|b| b.count == 0));

        assert_eq!(finance_totals(&LaporanKeuangan::default()), FinanceTotals::default());
    }

    #[test]
    fn same_input_gives_same_summary() {
        let records = grades(&[(60.5, "C"), (99.0, "A")]);
        assert_eq!(grade_stats(&records), grade_stats(&records));
    }

    #[test]
    fn finance_prefers_server_totals_and_sums_the_rest() {
        let laporan: LaporanKeuangan = serde_json::from_value(json!({
            "totalBesar": 5000000,
            "besarJttList": [
                { "replid": 1, "besar": 1500000, "cicilan": 500000, "lunas": 0 },
                { "replid": 2, "besar": 1000000, "cicilan": 1000000, "lunas": 1 }
            ]
        }))
        .expect("laporan");

        let totals = finance_totals(&laporan);
        assert_eq!(totals.total_besar, 5_000_000.0);
        assert_eq!(totals.total_cicilan, 1_500_000.0);
        assert_eq!(totals.total_lunas, 1.0);
        assert_eq!(totals.total_sisa, 3_500_000.0);
        assert_eq!(totals.labels().total_sisa, "Rp3.500.000");
    }
}
