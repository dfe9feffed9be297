use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Read, Write};

use bio::io::fasta;
use camino::Utf8Path;
use gb_io::reader::SeqReader;
use gb_io::seq::Seq;

use crate::error::PartsError;

pub fn read_fasta_ids(path: &Utf8Path) -> Result<Vec<String>, PartsError> {
    let file = File::open(path).map_err(|err| PartsError::parse(path, err))?;
    fasta_ids(BufReader::new(file)).map_err(|err| PartsError::parse(path, err))
}

pub fn fasta_ids<R: Read>(reader: R) -> io::Result<Vec<String>> {
    fasta::Reader::new(reader)
        .records()
        .map(|record| record.map(|record| record.id().to_string()))
        .collect()
}

pub fn read_genbank_ids(path: &Utf8Path) -> Result<Vec<String>, PartsError> {
    let file = File::open(path).map_err(|err| PartsError::parse(path, err))?;
    let records =
        parse_genbank(BufReader::new(file)).map_err(|err| PartsError::parse(path, err))?;
    Ok(records.iter().filter_map(genbank_record_id).collect())
}

pub fn parse_genbank<R: Read>(reader: R) -> Result<Vec<Seq>, gb_io::reader::GbParserError> {
    SeqReader::new(reader).collect()
}

pub fn genbank_record_id(record: &Seq) -> Option<String> {
    record
        .version
        .as_deref()
        .or(record.accession.as_deref())
        .or(record.name.as_deref())
        .and_then(|value| value.split_whitespace().next())
        .map(|value| value.to_string())
}

pub fn append_genbank(path: &Utf8Path, records: &[Seq]) -> Result<(), PartsError> {
    let mut file = open_append(path)?;
    for record in records {
        gb_io::writer::write(&mut file, record)
            .map_err(|err| PartsError::Filesystem(format!("write {path}: {err}")))?;
    }
    Ok(())
}

pub fn append_text(path: &Utf8Path, text: &str) -> Result<(), PartsError> {
    let mut file = open_append(path)?;
    file.write_all(text.as_bytes())
        .map_err(|err| PartsError::Filesystem(format!("write {path}: {err}")))?;
    if !text.is_empty() && !text.ends_with('\n') {
        file.write_all(b"\n")
            .map_err(|err| PartsError::Filesystem(format!("write {path}: {err}")))?;
    }
    Ok(())
}

fn open_append(path: &Utf8Path) -> Result<File, PartsError> {
    if let Some(parent) = path.parent() {
        if !parent.as_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| PartsError::Filesystem(err.to_string()))?;
        }
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| PartsError::Filesystem(format!("open {path}: {err}")))
}
