use chrono::{Datelike, NaiveDate};

const HARI: [&str; 7] = ["Minggu", "Senin", "Selasa", "Rabu", "Kamis", "Jumat", "Sabtu"];

const BULAN: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// `Rabu, 10 Januari 2024`
pub fn format_long_date(date: NaiveDate) -> String {
    format!(
        "{}, {} {} {}",
        HARI[date.weekday().num_days_from_sunday() as usize],
        date.day(),
        BULAN[date.month0() as usize],
        date.year()
    )
}

/// `Rp1.500.000`; rounded to whole rupiah, dot-grouped thousands.
pub fn format_rupiah(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-Rp{grouped}")
    } else {
        format!("Rp{grouped}")
    }
}
