//! Command-line interface for rust_geoprep

use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::io::{parse_separator, ReadOptions};

#[derive(Parser)]
#[command(name = "rust_geoprep")]
#[command(version)]
#[command(about = "Preprocess GEO expression archives: merge, normalize, annotate")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Per-sample parsing flags shared by `read-raw` and `run`
#[derive(clap::Args, Debug, Clone)]
pub struct ReadArgs {
    /// JSON file with parsing options
    #[arg(long, value_name = "JSON",
        long_help = "JSON file with per-sample parsing options.\n\
            Fields: delimiter, has_header, comment, skip_rows, strict_sample_keys.\n\
            Flags given on the command line override values from this file.")]
    pub options: Option<String>,

    /// Field separator of the sample files [default: tab]
    #[arg(long, value_parser = parse_separator)]
    pub sep: Option<u8>,

    /// Sample files start with a header line [default]
    #[arg(long, overrides_with = "no_header")]
    pub header: bool,

    /// Sample files have no header line
    #[arg(long, overrides_with = "header")]
    pub no_header: bool,

    /// Skip lines starting with this character
    #[arg(long, value_parser = parse_separator)]
    pub comment: Option<u8>,

    /// Number of leading lines to skip in each sample file
    #[arg(long)]
    pub skip_rows: Option<usize>,

    /// Fail if a file name has no GSM accession
    #[arg(long,
        long_help = "Fail if a sample file name has no GSM accession.\n\
            Without this flag the whole file name becomes the sample column name.")]
    pub strict_sample_keys: bool,
}

impl ReadArgs {
    /// Options from the JSON file (or defaults), overridden by explicit flags
    pub fn to_options(&self) -> Result<ReadOptions> {
        let mut opts = match &self.options {
            Some(path) => ReadOptions::from_json_file(path)?,
            None => ReadOptions::default(),
        };

        if let Some(sep) = self.sep {
            opts.delimiter = sep;
        }
        if self.header {
            opts.has_header = true;
        } else if self.no_header {
            opts.has_header = false;
        }
        if self.comment.is_some() {
            opts.comment = self.comment;
        }
        if let Some(skip_rows) = self.skip_rows {
            opts.skip_rows = skip_rows;
        }
        if self.strict_sample_keys {
            opts.strict_sample_keys = true;
        }

        Ok(opts)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract an archive and merge its samples
    #[command(
        name = "read-raw",
        long_about = "Extract a tar archive of per-sample files and merge them into one table.\n\n\
            The archive is unpacked next to itself into a directory named after its\n\
            file name up to the first '.'. An existing directory is reused as is.\n\
            Only feature IDs present in every sample are kept.",
        after_long_help = "\
Examples:
  rust_geoprep read-raw -a GSE12345_RAW.tar -o merged.tsv
  rust_geoprep read-raw -a GSE12345_RAW.tar -o merged.tsv --sep , --skip-rows 1"
    )]
    ReadRaw {
        /// Path to the tar archive
        #[arg(short, long)]
        archive: String,

        /// Output TSV path
        #[arg(short, long)]
        output: String,

        #[command(flatten)]
        read: ReadArgs,
    },

    /// Normalize an expression table
    #[command(
        long_about = "Normalize an expression table to counts per million.\n\n\
            CPM values are log-transformed with log1p base 2. --log2 applies an\n\
            additional log2(x + 1) on top.",
        after_long_help = "\
Examples:
  rust_geoprep normalize -i merged.tsv -o cpm.tsv
  rust_geoprep normalize -i merged.tsv -o cpm.tsv --log2"
    )]
    Normalize {
        /// Input TSV path
        #[arg(short, long)]
        input: String,

        /// Output TSV path
        #[arg(short, long)]
        output: String,

        /// Normalization method [default: cpm]
        #[arg(short, long, default_value = "cpm")]
        method: String,

        /// Apply an extra log2(x + 1) after normalization
        #[arg(long)]
        log2: bool,

        /// Number of leading row index columns in the input
        #[arg(long, default_value_t = 1)]
        index_cols: usize,
    },

    /// Apply log2(x + 1) to every value
    Log2 {
        /// Input TSV path
        #[arg(short, long)]
        input: String,

        /// Output TSV path
        #[arg(short, long)]
        output: String,

        /// Number of leading row index columns in the input
        #[arg(long, default_value_t = 1)]
        index_cols: usize,
    },

    /// Add a ProbeID index level from the reference tables
    #[command(
        long_about = "Add a ProbeID index level looked up from the reference tables.\n\n\
            Probe types: ENST, ENSG (human), ENSMUST, ENSMUSG (mouse).\n\
            Rows without a match are kept with an empty ProbeID.",
        after_long_help = "\
Examples:
  rust_geoprep annotate -i cpm.tsv -o annotated.tsv -p ENSG
  rust_geoprep annotate -i cpm.tsv -o annotated.tsv -p ensmusg --references refs/"
    )]
    Annotate {
        /// Input TSV path
        #[arg(short, long)]
        input: String,

        /// Output TSV path
        #[arg(short, long)]
        output: String,

        /// Probe type (ENST, ENSG, ENSMUST, ENSMUSG)
        #[arg(short, long)]
        probe_type: String,

        /// Directory with homo_sapiens.csv and mus_musculus.csv [default: bundled]
        #[arg(long)]
        references: Option<String>,

        /// Number of leading row index columns in the input
        #[arg(long, default_value_t = 1)]
        index_cols: usize,
    },

    /// Run read-raw, normalize and (optionally) annotate in one go
    #[command(after_long_help = "\
Examples:
  rust_geoprep run -a GSE12345_RAW.tar -o GSE12345_cpm.tsv
  rust_geoprep run -a GSE12345_RAW.tar -o GSE12345_cpm.tsv -p ENSG")]
    Run {
        /// Path to the tar archive
        #[arg(short, long)]
        archive: String,

        /// Output TSV path
        #[arg(short, long)]
        output: String,

        /// Normalization method [default: cpm]
        #[arg(short, long, default_value = "cpm")]
        method: String,

        /// Apply an extra log2(x + 1) after normalization
        #[arg(long)]
        log2: bool,

        /// Probe type for annotation; skipped when absent
        #[arg(short, long)]
        probe_type: Option<String>,

        #[command(flatten)]
        read: ReadArgs,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_command() {
        let cli = Cli::parse_from([
            "rust_geoprep", "run", "-a", "GSE1_RAW.tar", "-o", "out.tsv", "--sep", ",", "-p", "ensg", "-v",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Some(Commands::Run { archive, read, probe_type, method, log2, .. }) => {
                assert_eq!(archive, "GSE1_RAW.tar");
                assert_eq!(read.sep, Some(b','));
                assert_eq!(probe_type.as_deref(), Some("ensg"));
                assert_eq!(method, "cpm");
                assert!(!log2);
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from([
            "rust_geoprep", "read-raw", "-a", "x.tar", "-o", "y.tsv", "--no-header", "--skip-rows", "3",
        ]);
        match cli.command {
            Some(Commands::ReadRaw { read, .. }) => {
                let opts = read.to_options().unwrap();
                assert_eq!(opts.delimiter, b'\t');
                assert!(!opts.has_header);
                assert_eq!(opts.skip_rows, 3);
                assert!(!opts.strict_sample_keys);
            }
            _ => panic!("expected read-raw command"),
        }
    }

    #[test]
    fn test_header_flag_overrides_options_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"has_header": false}}"#).unwrap();
        let options = file.path().to_str().unwrap();

        let parse = |extra: &[&str]| {
            let mut args = vec!["rust_geoprep", "read-raw", "-a", "x.tar", "-o", "y.tsv", "--options", options];
            args.extend_from_slice(extra);
            match Cli::parse_from(args).command {
                Some(Commands::ReadRaw { read, .. }) => read.to_options().unwrap(),
                _ => panic!("expected read-raw command"),
            }
        };

        assert!(!parse(&[]).has_header);
        assert!(parse(&["--header"]).has_header);
        assert!(!parse(&["--header", "--no-header"]).has_header);
    }

    #[test]
    fn test_parse_normalize_defaults() {
        let cli = Cli::parse_from(["rust_geoprep", "normalize", "-i", "in.tsv", "-o", "out.tsv"]);
        match cli.command {
            Some(Commands::Normalize { index_cols, method, .. }) => {
                assert_eq!(index_cols, 1);
                assert_eq!(method, "cpm");
            }
            _ => panic!("expected normalize command"),
        }
    }
}
