use std::fs;
use std::io::{BufRead, BufReader};

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;

use crate::error::GenarcError;

pub const MAX_SEQUENCES: usize = 1_500_000;

/// One record of a `.fai` index: sequence length plus the layout facts
/// needed to seek into the fasta (`offset` of the first base, bases per
/// line, bytes per line including the terminator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaiRecord {
    pub length: u64,
    pub offset: u64,
    pub line_bases: u64,
    pub line_width: u64,
}

/// Order-preserving map of sequence name to index record. Iteration
/// yields sequences in the order the index file reports them.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FastaIndex {
    records: IndexMap<String, FaiRecord>,
}

impl FastaIndex {
    /// The index lives next to the fasta as `<fasta>.fai`.
    pub fn sibling_path(fasta: &Utf8Path) -> Utf8PathBuf {
        Utf8PathBuf::from(format!("{fasta}.fai"))
    }

    pub fn load(path: &Utf8Path) -> Result<Self, GenarcError> {
        let content = fs::read_to_string(path.as_std_path())
            .map_err(|err| GenarcError::Filesystem(format!("read index {path}: {err}")))?;
        Self::parse(path, &content)
    }

    fn parse(path: &Utf8Path, content: &str) -> Result<Self, GenarcError> {
        let mut records = IndexMap::new();
        for (lineno, line) in content.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 5 {
                return Err(GenarcError::IndexParse {
                    path: path.to_owned(),
                    line: lineno + 1,
                    reason: "expected 5 tab-separated fields".to_string(),
                });
            }
            let parse_field = |label: &str, value: &str| {
                value.parse::<u64>().map_err(|_| GenarcError::IndexParse {
                    path: path.to_owned(),
                    line: lineno + 1,
                    reason: format!("invalid {label}: {value}"),
                })
            };
            let record = FaiRecord {
                length: parse_field("length", fields[1])?,
                offset: parse_field("offset", fields[2])?,
                line_bases: parse_field("line bases", fields[3])?,
                line_width: parse_field("line width", fields[4])?,
            };
            if records.insert(fields[0].to_string(), record).is_some() {
                return Err(GenarcError::IndexParse {
                    path: path.to_owned(),
                    line: lineno + 1,
                    reason: format!("duplicate sequence name: {}", fields[0]),
                });
            }
        }
        Ok(Self { records })
    }

    /// Scans an uncompressed fasta and writes the standard five-column
    /// index at `fai_path`, returning the in-memory index as well.
    pub fn build(fasta: &Utf8Path, fai_path: &Utf8Path) -> Result<Self, GenarcError> {
        let file = fs::File::open(fasta.as_std_path())
            .map_err(|err| GenarcError::Filesystem(format!("open fasta {fasta}: {err}")))?;
        let mut reader = BufReader::new(file);

        let mut records: IndexMap<String, FaiRecord> = IndexMap::new();
        let mut current: Option<(String, FaiRecord)> = None;
        // Set once a short or blank body line is seen; any further data
        // line for the same sequence means the fasta is ragged.
        let mut at_record_tail = false;
        let mut offset: u64 = 0;
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|err| GenarcError::Filesystem(format!("read fasta {fasta}: {err}")))?;
            if read == 0 {
                break;
            }
            offset += read as u64;

            let mut content_len = buf.len();
            if content_len > 0 && buf[content_len - 1] == b'\n' {
                content_len -= 1;
            }
            if content_len > 0 && buf[content_len - 1] == b'\r' {
                content_len -= 1;
            }

            if content_len > 0 && buf[0] == b'>' {
                finish_record(fasta, &mut records, current.take())?;
                let header = std::str::from_utf8(&buf[1..content_len]).map_err(|_| {
                    GenarcError::FastaParse {
                        path: fasta.to_owned(),
                        reason: "header is not valid UTF-8".to_string(),
                    }
                })?;
                let name = header.split_whitespace().next().ok_or_else(|| {
                    GenarcError::FastaParse {
                        path: fasta.to_owned(),
                        reason: "header has an empty sequence name".to_string(),
                    }
                })?;
                current = Some((
                    name.to_string(),
                    FaiRecord {
                        length: 0,
                        offset,
                        line_bases: 0,
                        line_width: 0,
                    },
                ));
                at_record_tail = false;
                continue;
            }

            let Some((name, record)) = current.as_mut() else {
                if content_len == 0 {
                    continue;
                }
                return Err(GenarcError::FastaParse {
                    path: fasta.to_owned(),
                    reason: "sequence data before first header".to_string(),
                });
            };

            if content_len == 0 {
                at_record_tail = true;
                continue;
            }
            if at_record_tail {
                return Err(GenarcError::FastaParse {
                    path: fasta.to_owned(),
                    reason: format!("inconsistent line length in sequence {name}"),
                });
            }

            if record.line_bases == 0 {
                record.line_bases = content_len as u64;
                record.line_width = buf.len() as u64;
            } else if content_len as u64 > record.line_bases {
                return Err(GenarcError::FastaParse {
                    path: fasta.to_owned(),
                    reason: format!("inconsistent line length in sequence {name}"),
                });
            } else if (content_len as u64) < record.line_bases
                || buf.len() as u64 != record.line_width
            {
                // Shorter (or unterminated) line: legal only as the last
                // line of the record.
                at_record_tail = true;
            }
            record.length += content_len as u64;
        }
        finish_record(fasta, &mut records, current.take())?;

        let index = Self { records };
        index.write(fai_path)?;
        Ok(index)
    }

    fn write(&self, path: &Utf8Path) -> Result<(), GenarcError> {
        let mut text = String::new();
        for (name, record) in &self.records {
            text.push_str(&format!(
                "{name}\t{}\t{}\t{}\t{}\n",
                record.length, record.offset, record.line_bases, record.line_width
            ));
        }
        fs::write(path.as_std_path(), text)
            .map_err(|err| GenarcError::Filesystem(format!("write index {path}: {err}")))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &FaiRecord)> {
        self.records.iter().map(|(name, rec)| (name.as_str(), rec))
    }

    pub fn length(&self, name: &str) -> Option<u64> {
        self.records.get(name).map(|rec| rec.length)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn finish_record(
    fasta: &Utf8Path,
    records: &mut IndexMap<String, FaiRecord>,
    current: Option<(String, FaiRecord)>,
) -> Result<(), GenarcError> {
    let Some((name, record)) = current else {
        return Ok(());
    };
    if records.len() >= MAX_SEQUENCES {
        return Err(GenarcError::TooManyContigs {
            path: fasta.to_owned(),
            limit: MAX_SEQUENCES,
        });
    }
    if records.insert(name.clone(), record).is_some() {
        return Err(GenarcError::FastaParse {
            path: fasta.to_owned(),
            reason: format!("duplicate sequence name: {name}"),
        });
    }
    Ok(())
}
