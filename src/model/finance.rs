use std::collections::HashMap;

use chrono::{FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::viewmodel::filter::{Filterable, parse_timestamp};

/// A billing item (`besarJtt`): what the student owes for one fee.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BesarJtt {
    #[serde(deserialize_with = "super::string_or_number")]
    pub replid: String,
    #[serde(default, deserialize_with = "super::string_or_number")]
    pub nis: String,
    #[serde(default, deserialize_with = "super::nullable")]
    pub besar: f64,
    #[serde(default, deserialize_with = "super::nullable")]
    pub cicilan: f64,
    #[serde(default, deserialize_with = "super::nullable")]
    pub lunas: f64,
    #[serde(default, deserialize_with = "super::nullable")]
    pub keterangan: String,
    /// Join key shared with journal entries and receipts.
    #[serde(default, deserialize_with = "super::string_or_number")]
    pub idpenerimaan: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JurnalTransaksi {
    #[serde(deserialize_with = "super::string_or_number")]
    pub replid: String,
    /// Date string or epoch millis; anything else reads as blank.
    #[serde(default, deserialize_with = "super::string_or_number")]
    pub tanggal: String,
    #[serde(default, deserialize_with = "super::nullable")]
    pub transaksi: String,
    #[serde(default, deserialize_with = "super::string_or_number")]
    pub idpenerimaan: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Penerimaan {
    #[serde(deserialize_with = "super::string_or_number")]
    pub replid: String,
    /// Date string or epoch millis; anything else reads as blank.
    #[serde(default, deserialize_with = "super::string_or_number")]
    pub tanggal: String,
    #[serde(default, deserialize_with = "super::nullable")]
    pub petugas: String,
}

/// Response of `laporanKeuanganSiswa`. Totals are optional because the
/// server may leave them out; rows are summed instead in that case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaporanKeuangan {
    #[serde(default, deserialize_with = "super::string_or_number")]
    pub nis: String,
    #[serde(rename = "totalBesar", default)]
    pub total_besar: Option<f64>,
    #[serde(rename = "totalCicilan", default)]
    pub total_cicilan: Option<f64>,
    #[serde(rename = "totalLunas", default)]
    pub total_lunas: Option<f64>,
    #[serde(rename = "totalSisa", default)]
    pub total_sisa: Option<f64>,
    #[serde(rename = "besarJttList", default, deserialize_with = "super::nullable")]
    pub besar_jtt_list: Vec<BesarJtt>,
    #[serde(rename = "jurnalList", default, deserialize_with = "super::nullable")]
    pub jurnal_list: Vec<JurnalTransaksi>,
    #[serde(rename = "penerimaanList", default, deserialize_with = "super::nullable")]
    pub penerimaan_list: Vec<Penerimaan>,
}

/// A billing item with the journal entry and receipt that share its key.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerPair {
    pub tagihan: BesarJtt,
    pub jurnal: Option<JurnalTransaksi>,
    pub penerimaan: Option<Penerimaan>,
}

impl LaporanKeuangan {
    /// Joins billing items to journal entries and receipts by `idpenerimaan`.
    ///
    /// List order is irrelevant. A billing item with a blank key, or a key no
    /// journal entry carries, is paired with nothing. When several journal
    /// entries share a key the first one wins.
    pub fn ledger_pairs(&self) -> Vec<LedgerPair> {
        let mut journals: HashMap<&str, &JurnalTransaksi> = HashMap::new();
        for entry in &self.jurnal_list {
            if !entry.idpenerimaan.is_empty() {
                journals.entry(entry.idpenerimaan.as_str()).or_insert(entry);
            }
        }

        let receipts: HashMap<&str, &Penerimaan> = self
            .penerimaan_list
            .iter()
            .rev()
            .map(|p| (p.replid.as_str(), p))
            .collect();

        self.besar_jtt_list
            .iter()
            .map(|item| {
                let key = item.idpenerimaan.as_str();
                let linked = !key.is_empty();
                LedgerPair {
                    tagihan: item.clone(),
                    jurnal: journals.get(key).filter(|_| linked).map(|j| (*j).clone()),
                    penerimaan: receipts.get(key).filter(|_| linked).map(|p| (*p).clone()),
                }
            })
            .collect()
    }
}

impl LedgerPair {
    pub fn transaksi(&self) -> &str {
        self.jurnal.as_ref().map_or("", |j| j.transaksi.as_str())
    }

    pub fn tanggal(&self) -> &str {
        self.jurnal.as_ref().map_or("", |j| j.tanggal.as_str())
    }

    pub fn sisa(&self) -> f64 {
        self.tagihan.besar - self.tagihan.cicilan
    }
}

impl Filterable for LedgerPair {
    fn search_text(&self) -> Vec<&str> {
        vec![self.transaksi(), self.tagihan.keterangan.as_str()]
    }

    fn timestamp(&self, offset: FixedOffset) -> Option<NaiveDateTime> {
        parse_timestamp(self.tanggal(), offset)
    }
}
