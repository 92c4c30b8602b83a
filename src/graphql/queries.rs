//! Query documents, each asking for exactly the fields its page shows.

pub const ATTENDANCE_ROOT: &str = "presensiPelajaranByNis";
pub const ATTENDANCE: &str = r#"
query($nis: String!) {
  presensiPelajaranByNis(nis: $nis) {
    replid
    tanggal
    jam
    gurupelajaran
    materi
    statushadir
    kelas {
      kelas
    }
    pelajaran {
      nama
    }
  }
}
"#;

pub const GRADES_ROOT: &str = "nauByNis";
pub const GRADES: &str = r#"
query($nis: String!) {
  nauByNis(nis: $nis) {
    replid
    nis
    nilaiAU
    grade
    komentar
    pelajaran {
      nama
      kode
    }
    semester {
      semester
      replid
    }
  }
}
"#;

pub const FINANCE_ROOT: &str = "laporanKeuanganSiswa";
pub const FINANCE: &str = r#"
query LaporanKeuanganSiswa($nis: String!) {
  laporanKeuanganSiswa(nis: $nis) {
    nis
    totalBesar
    totalCicilan
    totalLunas
    totalSisa
    besarJttList {
      replid
      nis
      besar
      cicilan
      lunas
      keterangan
      idpenerimaan
    }
    jurnalList {
      replid
      tanggal
      transaksi
      idpenerimaan
    }
    penerimaanList {
      replid
      tanggal
      petugas
    }
  }
}
"#;

pub const LOGIN_ROOT: &str = "login";
pub const LOGIN: &str = r#"
query Login($nis: String!, $pin: String!) {
  login(nis: $nis, pin: $pin) {
    success
    message
    data {
      nis
      nama
    }
  }
}
"#;
