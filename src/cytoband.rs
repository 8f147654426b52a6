use std::fs;

use camino::Utf8Path;

use crate::error::GenarcError;
use crate::fai::FastaIndex;

/// Writes the compatibility cytoband table: one band per sequence
/// spanning its full extent, in index order.
pub fn write_cytoband(index: &FastaIndex, path: &Utf8Path) -> Result<(), GenarcError> {
    let mut text = String::new();
    for (name, record) in index.entries() {
        text.push_str(&format!("{name}\t0\t{}\n", record.length));
    }
    fs::write(path.as_std_path(), text)
        .map_err(|err| GenarcError::Filesystem(format!("write cytoband {path}: {err}")))
}

#[cfg(test)]
mod tests {
    use camino::Utf8PathBuf;

    use super::*;

    #[test]
    fn one_band_per_sequence_in_index_order() {
        let dir = tempfile::tempdir().unwrap();
        let fai_path = Utf8PathBuf::from_path_buf(dir.path().join("genome.fa.fai")).unwrap();
        fs::write(
            fai_path.as_std_path(),
            "chr1\t500\t6\t60\t61\nchr2\t300\t520\t60\t61\n",
        )
        .unwrap();
        let index = FastaIndex::load(&fai_path).unwrap();

        let out = Utf8PathBuf::from_path_buf(dir.path().join("bands.txt")).unwrap();
        write_cytoband(&index, &out).unwrap();

        let content = fs::read_to_string(out.as_std_path()).unwrap();
        assert_eq!(content, "chr1\t0\t500\nchr2\t0\t300\n");
    }
}
