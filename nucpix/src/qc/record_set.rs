use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use log::info;

use crate::checksum::md5_hex_file;
use crate::fasta::writer::{FastaWriter, FastaWriterParams};
use crate::qc::report::ItemStatus;
use crate::qc::{checksum_status, QcResult};
use crate::sequence::Record;

/// Writes the records to `path` and compares the checksum of the file with
/// `checksum`.
///
/// On mismatch, a single trailing newline is stripped from the file and the
/// checksum is compared once more.
pub(super) fn check_record_set(
    records: &[Record],
    path: &Path,
    checksum: &str,
    line_width: usize,
) -> QcResult<ItemStatus> {
    write_records(records, path, line_width)?;

    let status = checksum_status(checksum, &md5_hex_file(path)?);
    if status.is_passed() || !strip_trailing_newline(path)? {
        return Ok(status);
    }

    info!("Stripped the trailing newline of {}", path.display());
    Ok(match checksum_status(checksum, &md5_hex_file(path)?) {
        ItemStatus::Passed => ItemStatus::Repaired,
        status => status,
    })
}

fn write_records(records: &[Record], path: &Path, line_width: usize) -> QcResult<()> {
    let file = BufWriter::new(File::create(path)?);
    let params = FastaWriterParams::builder().line_width(line_width).build();

    let mut writer = FastaWriter::with_params(file, params);
    writer.write_records(records)?;
    writer.flush()?;

    info!(
        "Wrote {} records to {} (line width {})",
        records.len(),
        path.display(),
        line_width
    );
    Ok(())
}

/// Removes the last byte of the file if it is a newline. Returns whether the
/// file changed.
fn strip_trailing_newline(path: &Path) -> QcResult<bool> {
    let mut contents = std::fs::read(path)?;
    if contents.last() != Some(&b'\n') {
        return Ok(false);
    }

    contents.pop();
    std::fs::write(path, contents)?;
    Ok(true)
}
