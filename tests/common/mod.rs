use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_xlsxwriter::{Format, Workbook};
use tempfile::TempDir;

use sheetqa::config::EngineConfig;
use sheetqa::providers::{CompletionResponse, Message, Provider};
use sheetqa::{Engine, SessionStore};

/// A cell written into a fixture workbook
#[allow(dead_code)]
pub enum Cell<'a> {
    Text(&'a str),
    Number(f64),
    Date(f64),
}

/// Write a workbook with the given sheets into a fresh temp dir
///
/// Each sheet is `(name, rows)`; the first row is the header.
#[allow(dead_code)]
pub fn write_workbook(file_name: &str, sheets: &[(&str, Vec<Vec<Cell>>)]) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let path = tmp.path().join(file_name);
    let date_format = Format::new().set_num_format("yyyy-mm-dd");

    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name).expect("valid sheet name");
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                match cell {
                    Cell::Text(s) => worksheet.write_string(r, c, *s).map(|_| ()),
                    Cell::Number(n) => worksheet.write_number(r, c, *n).map(|_| ()),
                    Cell::Date(serial) => worksheet
                        .write_number_with_format(r, c, *serial, &date_format)
                        .map(|_| ()),
                }
                .expect("failed to write cell");
            }
        }
    }
    workbook.save(&path).expect("failed to save workbook");
    (tmp, path)
}

/// Two sheets: `Sales` (Year/Revenue) and `Costs` (Year/Cost)
#[allow(dead_code)]
pub fn sales_workbook() -> (TempDir, PathBuf) {
    use Cell::*;
    write_workbook(
        "sales.xlsx",
        &[
            (
                "Sales",
                vec![
                    vec![Text("Year"), Text("Revenue")],
                    vec![Number(2023.0), Number(100.0)],
                    vec![Number(2024.0), Number(150.0)],
                ],
            ),
            (
                "Costs",
                vec![
                    vec![Text("Year"), Text("Cost")],
                    vec![Number(2023.0), Number(40.0)],
                    vec![Number(2024.0), Number(30.0)],
                ],
            ),
        ],
    )
}

/// Provider double that records prompts and replies with fixed text
#[allow(dead_code)]
pub struct StubProvider {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl StubProvider {
    pub fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl Provider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn complete(&self, messages: &[Message]) -> sheetqa::Result<CompletionResponse> {
        if let Some(last) = messages.last() {
            self.prompts.lock().unwrap().push(last.content.clone());
        }
        Ok(CompletionResponse::new(Message::assistant(self.reply.clone())))
    }
}

/// Engine over `provider` with default settings
#[allow(dead_code)]
pub fn engine_with(provider: Arc<dyn Provider>) -> Engine {
    Engine::new(
        provider,
        Arc::new(SessionStore::new()),
        EngineConfig::default(),
    )
}
