use std::io::{self, Write};

use serde::Serialize;

use crate::app::{FetchResult, ImportReport, InventoryResult, ProgressEvent, ProgressSink};

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Text,
    Json,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_inventory(result: &InventoryResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_fetch(result: &FetchResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_import(result: &ImportReport) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}

pub struct ConsoleOutput {
    pub show_timings: bool,
}

impl ProgressSink for ConsoleOutput {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) if self.show_timings => {
                println!("{} ({} ms)", event.message, elapsed.as_millis())
            }
            _ => println!("{}", event.message),
        }
    }
}

impl ConsoleOutput {
    pub fn print_inventory(result: &InventoryResult) {
        for part in &result.parts {
            println!("{part}");
        }
    }

    pub fn print_fetch(result: &FetchResult) {
        for part in &result.retrieved {
            println!("{part}");
        }
    }
}
