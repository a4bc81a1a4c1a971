//! The packing pipeline: classify, extract, assemble, write

use std::fs;
use std::path::{Path, PathBuf};

use crate::builder::BundleBuilder;
use crate::error::{PackError, Result};
use crate::extract::{self, ExtractOptions};
use crate::format::InputFormat;
use crate::header::{DEFAULT_VERSION, PackedHeader};

/// Inputs of one packing run
#[derive(Debug, Clone)]
pub struct PackOptions {
    pub input: PathBuf,
    /// Defaults to `<input-stem>_packed.bin` next to the input
    pub output: Option<PathBuf>,
    /// Decimal or `0x` hex
    pub version: String,
    pub extract: ExtractOptions,
}

impl PackOptions {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: None,
            version: DEFAULT_VERSION.to_string(),
            extract: ExtractOptions::default(),
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_path(&self.input))
    }
}

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct PackReport {
    pub format: InputFormat,
    pub output: PathBuf,
    pub header: PackedHeader,
}

/// `dir/app.elf` -> `dir/app_packed.bin`
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}_packed.bin"))
}

/// Pack `options.input` into a firmware bundle.
///
/// Everything is validated before the output file is opened, so a failed
/// run leaves no output behind unless the write itself fails.
pub fn pack_firmware(options: &PackOptions) -> Result<PackReport> {
    let format = InputFormat::from_path(&options.input)?;
    let data = fs::read(&options.input).map_err(|e| PackError::io(&options.input, e))?;
    debug!(
        "Read {} ({} bytes) as {format}",
        options.input.display(),
        data.len()
    );

    let image = extract::extract(format, &data, &options.extract)?;
    let builder = BundleBuilder::from_image(image)?.version_str(&options.version)?;

    for line in builder.header().summary_lines() {
        info!("{line}");
    }

    let output = options.output_path();
    builder.build_to_file(&output)?;
    info!("Packed firmware saved to: {}", output.display());

    Ok(PackReport {
        format,
        output,
        header: builder.header().clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc::calculate_crc32;
    use crate::header::FW_HEADER_SIZE;

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("build/rtthread.elf")),
            PathBuf::from("build/rtthread_packed.bin")
        );
        assert_eq!(
            default_output_path(Path::new("fw.v2.hex")),
            PathBuf::from("fw.v2_packed.bin")
        );
    }

    #[test]
    fn test_pack_bin() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("app.bin");
        fs::write(&input, [0x00, 0x01, 0x02, 0x03]).unwrap();

        let mut options = PackOptions::new(&input);
        options.extract = ExtractOptions::with_addresses(0x0800_0000, 0x0800_0000);

        let report = pack_firmware(&options).unwrap();
        assert_eq!(report.format, InputFormat::Bin);
        assert_eq!(report.output, dir.path().join("app_packed.bin"));
        assert_eq!(report.header.version, 0x0001_0001);

        let bundle = fs::read(&report.output).unwrap();
        assert_eq!(bundle.len(), FW_HEADER_SIZE + 4);
        assert_eq!(
            &bundle[8..12],
            &calculate_crc32(&[0, 1, 2, 3]).to_le_bytes()
        );
        assert_eq!(&bundle[FW_HEADER_SIZE..], &[0, 1, 2, 3]);
    }

    #[test]
    fn test_failures_leave_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("app.bin");
        fs::write(&input, [1, 2, 3]).unwrap();
        let output = dir.path().join("out.bin");

        let mut options = PackOptions::new(&input);
        options.output = Some(output.clone());
        assert!(matches!(
            pack_firmware(&options).unwrap_err(),
            PackError::MissingAddress { .. }
        ));
        assert!(!output.exists());

        options.extract = ExtractOptions::with_addresses(0, 0);
        options.version = "one".to_string();
        assert!(matches!(
            pack_firmware(&options).unwrap_err(),
            PackError::InvalidVersion { .. }
        ));
        assert!(!output.exists());
    }

    #[test]
    fn test_unsupported_input() {
        let options = PackOptions::new("firmware.srec");
        assert!(matches!(
            pack_firmware(&options).unwrap_err(),
            PackError::UnsupportedFormat { .. }
        ));
    }

    #[test]
    fn test_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let options = PackOptions::new(dir.path().join("nothing.bin"));
        assert!(matches!(
            pack_firmware(&options).unwrap_err(),
            PackError::IoFailure { .. }
        ));
    }
}
