//! Extraction and merging of per-sample archives
//!
//! A GEO supplementary archive (`GSE..._RAW.tar`) holds one two-column file
//! per sample. [`read_raw`] unpacks it next to the archive and merges the
//! samples into one table keyed by feature ID.

use std::fs::{self, File};
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use log::{debug, info};
use tar::Archive;

use super::sample::{read_sample_file, resolve_sample_key};
use super::ReadOptions;
use crate::data::ExpressionTable;
use crate::error::{PrepError, Result};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Directory an archive is extracted into
///
/// The archive's sibling named after its file name up to the first `.`:
/// `data/GSE1_RAW.tar.gz` extracts into `data/GSE1_RAW`. Dots in parent
/// directories are not considered.
pub fn extraction_dir(archive: &Path) -> Result<PathBuf> {
    let name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name.split('.').next().unwrap_or_default();

    if stem.is_empty() {
        return Err(PrepError::InvalidInput {
            reason: format!(
                "Cannot derive an extraction directory from '{}'",
                archive.display()
            ),
        });
    }

    Ok(archive.with_file_name(stem))
}

/// Unpack a tar archive (optionally gzip-compressed) into `dir`
///
/// `dir` is removed again if unpacking fails, so a later call does not pick
/// up a half-extracted directory.
pub fn extract_archive(archive: &Path, dir: &Path) -> Result<()> {
    let mut file = File::open(archive)?;
    let mut magic = [0u8; 2];
    let n = file.read(&mut magic)?;
    file.seek(SeekFrom::Start(0))?;

    let reader = BufReader::new(file);
    fs::create_dir_all(dir)?;

    let unpacked = if n == 2 && magic == GZIP_MAGIC {
        Archive::new(MultiGzDecoder::new(reader)).unpack(dir)
    } else {
        Archive::new(reader).unpack(dir)
    };

    if let Err(e) = unpacked {
        let _ = fs::remove_dir_all(dir);
        return Err(e.into());
    }

    Ok(())
}

/// Regular files in `dir`, ordered by file name
fn sample_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        } else {
            debug!("Skipping non-file entry {}", path.display());
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Read an archive of per-sample files into one expression table
///
/// The archive is extracted only if its extraction directory (see
/// [`extraction_dir`]) does not exist yet; an existing directory is reused
/// as is. Each file's sample key is the first `GSM` accession in its name.
/// Samples are inner-joined on feature ID, so only IDs present in every file
/// survive.
pub fn read_raw<P: AsRef<Path>>(archive: P, options: &ReadOptions) -> Result<ExpressionTable> {
    let archive = archive.as_ref();
    let dir = extraction_dir(archive)?;

    if dir.exists() {
        info!("Reusing extracted files in {}", dir.display());
    } else {
        info!("Extracting {} into {}", archive.display(), dir.display());
        extract_archive(archive, &dir)?;
    }

    let files = sample_files(&dir)?;
    info!("Merging {} sample files", files.len());

    let mut merged: Option<ExpressionTable> = None;

    for path in &files {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let key = resolve_sample_key(&file_name, options.strict_sample_keys)?;
        let sample = read_sample_file(path, &key, options)?;

        merged = Some(match merged {
            None => sample,
            Some(acc) => {
                let joined = acc.inner_join(&sample)?;
                debug!(
                    "Merged {}: {} shared features remain",
                    key,
                    joined.n_rows()
                );
                joined
            }
        });
    }

    let merged = merged.ok_or_else(|| PrepError::EmptyData {
        reason: format!("No sample files found in {}", dir.display()),
    })?;

    info!(
        "  {} features, {} samples",
        merged.n_rows(),
        merged.n_samples()
    );

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::tempdir;

    fn append_members<W: Write>(builder: &mut tar::Builder<W>, members: &[(&str, Vec<u8>)]) {
        for (name, content) in members {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, content.as_slice()).unwrap();
        }
    }

    fn write_tar(path: &Path, members: &[(&str, Vec<u8>)]) {
        let mut builder = tar::Builder::new(File::create(path).unwrap());
        append_members(&mut builder, members);
        builder.finish().unwrap();
    }

    fn write_tar_gz(path: &Path, members: &[(&str, Vec<u8>)]) {
        let encoder = GzEncoder::new(File::create(path).unwrap(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        append_members(&mut builder, members);
        builder.into_inner().unwrap().finish().unwrap();
    }

    fn gzip(text: &str) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(text.as_bytes()).unwrap();
        encoder.finish().unwrap()
    }

    fn text(s: &str) -> Vec<u8> {
        s.as_bytes().to_vec()
    }

    #[test]
    fn test_extraction_dir() {
        assert_eq!(
            extraction_dir(Path::new("data/GSE1_RAW.tar.gz")).unwrap(),
            PathBuf::from("data/GSE1_RAW")
        );
        assert_eq!(
            extraction_dir(Path::new("GSE2_RAW.tar")).unwrap(),
            PathBuf::from("GSE2_RAW")
        );
        assert_eq!(
            extraction_dir(Path::new("/home/u.name/GSE3.tar")).unwrap(),
            PathBuf::from("/home/u.name/GSE3")
        );
        assert!(extraction_dir(Path::new("data/.tar")).is_err());
    }

    #[test]
    fn test_read_raw_intersects_samples() {
        let tmp = tempdir().unwrap();
        let archive = tmp.path().join("GSE100_RAW.tar");
        write_tar(
            &archive,
            &[
                ("GSM1_liver.txt", text("ID\tcount\ng1\t1\ng2\t2\ng3\t3\ng4\t4\n")),
                ("GSM2_liver.txt", text("ID\tcount\ng2\t20\ng3\t30\ng4\t40\ng5\t50\n")),
                ("GSM3_liver.txt", text("ID\tcount\ng4\t400\ng3\t300\ng9\t900\n")),
            ],
        );

        let table = read_raw(&archive, &ReadOptions::default()).unwrap();

        assert!(tmp.path().join("GSE100_RAW").is_dir());
        assert_eq!(table.n_samples(), 3);
        assert_eq!(
            table.sample_ids(),
            &["GSM1".to_string(), "GSM2".to_string(), "GSM3".to_string()]
        );
        assert_eq!(table.row_index().names(), &["ID".to_string()]);
        assert_eq!(table.row_index().innermost(), vec![Some("g3"), Some("g4")]);
        assert_eq!(table.get("g3", "GSM2"), Some(30.0));
        assert_eq!(table.get("g4", "GSM3"), Some(400.0));
    }

    #[test]
    fn test_existing_directory_is_reused() {
        let tmp = tempdir().unwrap();
        let archive = tmp.path().join("GSE200_RAW.tar");
        write_tar(
            &archive,
            &[
                ("GSM10.txt", text("ID\tv\na\t1\nb\t2\n")),
                ("GSM11.txt", text("ID\tv\na\t3\nb\t4\n")),
            ],
        );

        let first = read_raw(&archive, &ReadOptions::default()).unwrap();
        fs::remove_file(&archive).unwrap();
        let second = read_raw(&archive, &ReadOptions::default()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_malformed_member_aborts_load() {
        let tmp = tempdir().unwrap();
        let archive = tmp.path().join("GSE300_RAW.tar");
        write_tar(
            &archive,
            &[
                ("GSM1.txt", text("ID\tv\na\t1\n")),
                ("GSM2.txt", text("ID\tv\textra\na\t1\t2\n")),
            ],
        );

        let result = read_raw(&archive, &ReadOptions::default());
        assert!(matches!(result, Err(PrepError::MalformedSample { columns: 3, .. })));
    }

    #[test]
    fn test_unmatched_file_name_used_as_key() {
        let tmp = tempdir().unwrap();
        let archive = tmp.path().join("GSE400_RAW.tar");
        write_tar(
            &archive,
            &[
                ("GSM7_a.txt", text("ID\tv\nx\t1\n")),
                ("control.txt", text("ID\tv\nx\t2\n")),
            ],
        );

        let table = read_raw(&archive, &ReadOptions::default()).unwrap();
        assert_eq!(
            table.sample_ids(),
            &["GSM7".to_string(), "control.txt".to_string()]
        );

        let strict = ReadOptions::default().with_strict_sample_keys(true);
        let result = read_raw(&archive, &strict);
        assert!(matches!(result, Err(PrepError::MissingSampleKey { .. })));
    }

    #[test]
    fn test_gzip_archive_with_gzip_members() {
        let tmp = tempdir().unwrap();
        let archive = tmp.path().join("GSE500_RAW.tar.gz");
        write_tar_gz(
            &archive,
            &[
                ("GSM1_counts.csv.gz", gzip("ID,v\ng1,5\ng2,6\n")),
                ("GSM2_counts.csv.gz", gzip("ID,v\ng2,7\ng1,8\n")),
            ],
        );

        let opts = ReadOptions::default().with_delimiter(b',');
        let table = read_raw(&archive, &opts).unwrap();

        assert!(tmp.path().join("GSE500_RAW").is_dir());
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.get("g1", "GSM2"), Some(8.0));
        assert_eq!(table.get("g2", "GSM1"), Some(6.0));
    }

    #[test]
    fn test_multi_member_gzip_archive() {
        let mut builder = tar::Builder::new(Vec::new());
        append_members(
            &mut builder,
            &[
                ("GSM1.txt", text("ID\tv\na\t1\nb\t2\n")),
                ("GSM2.txt", text("ID\tv\na\t3\nb\t4\n")),
            ],
        );
        let tar_bytes = builder.into_inner().unwrap();

        // Split the tar stream across two gzip members
        let (head, tail) = tar_bytes.split_at(tar_bytes.len() / 2);
        let mut bytes = Vec::new();
        for part in [head, tail] {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(part).unwrap();
            bytes.extend(encoder.finish().unwrap());
        }

        let tmp = tempdir().unwrap();
        let archive = tmp.path().join("GSE800_RAW.tar.gz");
        fs::write(&archive, bytes).unwrap();

        let table = read_raw(&archive, &ReadOptions::default()).unwrap();
        assert_eq!(table.n_samples(), 2);
        assert_eq!(table.get("b", "GSM2"), Some(4.0));
    }

    #[test]
    fn test_empty_archive() {
        let tmp = tempdir().unwrap();
        let archive = tmp.path().join("GSE600_RAW.tar");
        write_tar(&archive, &[]);

        let result = read_raw(&archive, &ReadOptions::default());
        assert!(matches!(result, Err(PrepError::EmptyData { .. })));
    }

    #[test]
    fn test_missing_archive_creates_nothing() {
        let tmp = tempdir().unwrap();
        let archive = tmp.path().join("GSE700_RAW.tar");

        let result = read_raw(&archive, &ReadOptions::default());
        assert!(matches!(result, Err(PrepError::IoError(_))));
        assert!(!tmp.path().join("GSE700_RAW").exists());
    }
}
