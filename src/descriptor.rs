use std::fs;

use camino::Utf8Path;

use crate::domain::{GenomeId, normalize_location};
use crate::error::GenarcError;

pub const KEY_ORDERED: &str = "ordered";
pub const KEY_ID: &str = "id";
pub const KEY_NAME: &str = "name";
pub const KEY_CYTOBAND_FILE: &str = "cytobandFile";
pub const KEY_GENE_FILE: &str = "geneFile";
pub const KEY_CHR_ALIAS_FILE: &str = "chrAliasFile";
pub const KEY_SEQUENCE_LOCATION: &str = "sequenceLocation";

/// The `property.txt` record: ordered key/value pairs describing the
/// archive members. Older readers require `ordered=true` as the first
/// line, so the sentinel is part of the record itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pairs: Vec<(String, String)>,
}

impl Descriptor {
    pub fn build(
        genome_id: &GenomeId,
        display_name: &str,
        cytoband_file: Option<&str>,
        gene_file: Option<&str>,
        chr_alias_file: Option<&str>,
        sequence_location: Option<&str>,
    ) -> Self {
        let mut pairs = vec![(KEY_ORDERED.to_string(), "true".to_string())];
        pairs.push((KEY_ID.to_string(), genome_id.as_str().to_string()));
        pairs.push((KEY_NAME.to_string(), display_name.to_string()));
        if let Some(file) = cytoband_file {
            pairs.push((KEY_CYTOBAND_FILE.to_string(), file.to_string()));
        }
        if let Some(file) = gene_file {
            pairs.push((KEY_GENE_FILE.to_string(), file.to_string()));
        }
        if let Some(file) = chr_alias_file {
            pairs.push((KEY_CHR_ALIAS_FILE.to_string(), file.to_string()));
        }
        if let Some(location) = sequence_location {
            pairs.push((
                KEY_SEQUENCE_LOCATION.to_string(),
                normalize_location(location),
            ));
        }
        Self { pairs }
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for (key, value) in &self.pairs {
            text.push_str(key);
            text.push('=');
            text.push_str(value);
            text.push('\n');
        }
        text
    }

    pub fn write(&self, path: &Utf8Path) -> Result<(), GenarcError> {
        fs::write(path.as_std_path(), self.to_text())
            .map_err(|err| GenarcError::Filesystem(format!("write descriptor {path}: {err}")))
    }

    pub fn parse(text: &str) -> Result<Self, GenarcError> {
        let mut pairs = Vec::new();
        for line in text.lines() {
            if line.is_empty() {
                continue;
            }
            let (key, value) = line.split_once('=').ok_or_else(|| {
                GenarcError::DescriptorParse(format!("line has no '=' separator: {line}"))
            })?;
            pairs.push((key.to_string(), value.to_string()));
        }
        Ok(Self { pairs })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn id(value: &str) -> GenomeId {
        value.parse().unwrap()
    }

    #[test]
    fn sentinel_is_first_line() {
        let descriptor = Descriptor::build(&id("hg18"), "Human 18", None, None, None, None);
        let text = descriptor.to_text();
        assert_eq!(text.lines().next(), Some("ordered=true"));
    }

    #[test]
    fn minimal_record_has_three_lines() {
        let descriptor = Descriptor::build(&id("hg18"), "Human 18", None, None, None, None);
        assert_eq!(
            descriptor.to_text(),
            "ordered=true\nid=hg18\nname=Human 18\n"
        );
    }

    #[test]
    fn absent_members_are_omitted() {
        let descriptor = Descriptor::build(
            &id("hg18"),
            "Human 18",
            Some("hg18_cytoband.txt"),
            None,
            Some("alias.tab"),
            None,
        );
        assert_eq!(descriptor.get(KEY_CYTOBAND_FILE), Some("hg18_cytoband.txt"));
        assert_eq!(descriptor.get(KEY_GENE_FILE), None);
        assert_eq!(descriptor.get(KEY_CHR_ALIAS_FILE), Some("alias.tab"));
    }

    #[test]
    fn path_location_is_normalized() {
        let descriptor = Descriptor::build(
            &id("hg18"),
            "Human 18",
            None,
            None,
            None,
            Some("C:\\data\\genome.fa"),
        );
        assert_eq!(
            descriptor.get(KEY_SEQUENCE_LOCATION),
            Some("C:/data/genome.fa")
        );
    }

    #[test]
    fn url_location_is_untouched() {
        let descriptor = Descriptor::build(
            &id("hg18"),
            "Human 18",
            None,
            None,
            None,
            Some("http://example.org/genomes/hg18.fa"),
        );
        assert_eq!(
            descriptor.get(KEY_SEQUENCE_LOCATION),
            Some("http://example.org/genomes/hg18.fa")
        );
    }

    #[test]
    fn round_trip() {
        let descriptor = Descriptor::build(
            &id("hg18"),
            "Human 18",
            Some("hg18_cytoband.txt"),
            Some("genes.refflat"),
            Some("alias.tab"),
            Some("/data/genome.fa"),
        );
        let parsed = Descriptor::parse(&descriptor.to_text()).unwrap();
        assert_eq!(parsed, descriptor);
    }

    #[test]
    fn parse_rejects_bare_line() {
        let err = Descriptor::parse("ordered=true\ngarbage\n").unwrap_err();
        assert_matches!(err, GenarcError::DescriptorParse(_));
    }
}
