#![allow(dead_code)]

use rust_xlsxwriter::Workbook;

/// One data row of the fixture: rep id, name, supervisor, balance, coverage.
pub type Row = (
    Option<f64>,
    &'static str,
    Option<&'static str>,
    Option<f64>,
    Option<f64>,
);

pub const HEADERS: [&str; 5] = [" Rep ", "Nome Rep.", "Supervisor", "Saldo de Carteira ", " cobertura"];

/// Rows as they appear in the published sheet, unsorted and with gaps.
pub fn sample_rows() -> Vec<Row> {
    vec![
        (Some(101.0), "Ana", Some("Carlos"), Some(100.0), Some(30.0)),
        (Some(102.0), "Bruno", Some("Carlos"), Some(200.0), Some(70.0)),
        (Some(103.0), "Clara", Some("Dora"), Some(50.0), Some(25.0)),
        (None, "Sem rep", Some("Dora"), Some(80.0), Some(10.0)),
        (Some(104.0), "Davi", None, Some(0.0), Some(0.0)),
        (Some(105.0), "Eva", Some("Dora"), None, Some(5.0)),
    ]
}

pub struct Fixture {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Row>,
    pub banner: bool,
    /// `(row, column, value)` written to a `Meta` sheet when present.
    pub target: Option<(u32, u16, f64)>,
}

impl Default for Fixture {
    fn default() -> Self {
        Self {
            headers: HEADERS.to_vec(),
            rows: sample_rows(),
            banner: true,
            target: Some((1, 1, 0.45)),
        }
    }
}

impl Fixture {
    /// Serialises the fixture as an in-memory xlsx payload with the table
    /// header on physical row 7.
    pub fn bytes(&self) -> Vec<u8> {
        let mut workbook = Workbook::new();

        let sheet = workbook.add_worksheet();
        sheet.set_name("Base").expect("sheet named");
        if self.banner {
            sheet
                .write_string(0, 0, "Cobertura de Carteira")
                .expect("banner written");
            sheet
                .write_string(2, 0, "Atualizado em 01/10")
                .expect("banner written");
        }
        for (col, header) in self.headers.iter().enumerate() {
            sheet
                .write_string(7, col as u16, *header)
                .expect("header written");
        }
        for (idx, (rep, name, supervisor, balance, covered)) in self.rows.iter().enumerate() {
            let row = 8 + idx as u32;
            if let Some(rep) = rep {
                sheet.write_number(row, 0, *rep).expect("rep written");
            }
            sheet.write_string(row, 1, *name).expect("name written");
            if let Some(supervisor) = supervisor {
                sheet
                    .write_string(row, 2, *supervisor)
                    .expect("supervisor written");
            }
            if let Some(balance) = balance {
                sheet.write_number(row, 3, *balance).expect("balance written");
            }
            if let Some(covered) = covered {
                sheet.write_number(row, 4, *covered).expect("coverage written");
            }
        }

        if let Some((row, col, value)) = self.target {
            let meta = workbook.add_worksheet();
            meta.set_name("Meta").expect("sheet named");
            meta.write_string(0, 0, "Indicador").expect("label written");
            meta.write_string(1, 0, "Cobertura ideal").expect("label written");
            meta.write_number(row, col, value).expect("target written");
        }

        workbook.save_to_buffer().expect("workbook serialised")
    }
}
