use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;

use crate::carrier::extract::extract_window;
use crate::carrier::image_store::load_rgba;
use crate::carrier::layout::FrameWindow;
use crate::frame::parse_frame;
use crate::progress::ProgressNotifier;
use crate::qc::pool::WorkerPool;
use crate::qc::report::{ItemReport, ItemStatus, Stage, StageReport};
use crate::qc::{checksum_status, QcError, QcResult};

/// Differences every still against the baseline and compares the checksum
/// carried by its frame with `checksum`.
///
/// Stills are numbered from 1, the baseline being still 0.
pub(super) fn check_stills(
    pool: &WorkerPool<QcError>,
    baseline: Arc<RgbaImage>,
    stills: Vec<(PathBuf, FrameWindow)>,
    checksum: Arc<str>,
    notifier: Arc<dyn ProgressNotifier>,
) -> QcResult<StageReport> {
    let items = pool.map_indexed(stills, move |index, (path, window)| {
        let status = check_still(&baseline, &path, window, &checksum)?;
        notifier.inc_iter();

        Ok(ItemReport::new(index + 1, path, status))
    })?;

    Ok(StageReport::new(Stage::StillImage, items))
}

fn check_still(
    baseline: &RgbaImage,
    path: &Path,
    window: FrameWindow,
    checksum: &str,
) -> QcResult<ItemStatus> {
    let still = load_rgba(path)?;
    let bits = extract_window(baseline, &still, window)?;

    Ok(match parse_frame(&bits) {
        Ok(frame) => checksum_status(checksum, frame.checksum()),
        Err(e) => ItemStatus::Unreadable(e),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::tempdir;

    use crate::_internal_test_data::{test_image, MULTI_RECORD_FASTA};
    use crate::carrier::embed::embed_in_window;
    use crate::carrier::image_store::save_rgba;
    use crate::carrier::layout::FrameWindow;
    use crate::frame::encode_record;
    use crate::progress::DummyProgressNotifier;
    use crate::qc::pool::WorkerPool;
    use crate::qc::report::ItemStatus;
    use crate::qc::still::check_stills;

    const CHECKSUM: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_check_stills() {
        let dir = tempdir().unwrap();
        let baseline = test_image(40, 40);

        let mut stills = Vec::new();
        for (index, (record, checksum)) in MULTI_RECORD_FASTA
            .iter()
            .zip([CHECKSUM, CHECKSUM, "ffffffffffffffffffffffffffffffff"])
            .enumerate()
        {
            let bits = encode_record(record, checksum).unwrap();
            let window = FrameWindow::new(bits.len(), 40, 40).unwrap();
            let path = dir.path().join(format!("still_{}.png", index + 1));
            save_rgba(&embed_in_window(&baseline, window, &bits).unwrap(), &path).unwrap();
            stills.push((path, window));
        }
        // a still with no frame in it
        let empty_path = dir.path().join("still_4.png");
        save_rgba(&baseline, &empty_path).unwrap();
        stills.push((empty_path, FrameWindow::with_side(10, 40, 40)));

        let pool = WorkerPool::new(2, "test");
        let report = check_stills(
            &pool,
            Arc::new(baseline),
            stills,
            Arc::from(CHECKSUM),
            Arc::new(DummyProgressNotifier),
        )
        .unwrap();

        let statuses: Vec<_> = report.items().iter().map(|item| &item.status).collect();
        assert_eq!(statuses[0], &ItemStatus::Passed);
        assert_eq!(statuses[1], &ItemStatus::Passed);
        assert!(matches!(statuses[2], ItemStatus::ChecksumMismatch { .. }));
        assert!(matches!(statuses[3], ItemStatus::Unreadable(_)));
        assert_eq!(report.items()[0].index, 1);
        assert_eq!(report.items()[0].path, dir.path().join("still_1.png"));
        assert_eq!(report.failed_count(), 2);
    }

    #[test]
    fn test_check_stills_missing_file() {
        let dir = tempdir().unwrap();

        let pool = WorkerPool::new(0, "test");
        let result = check_stills(
            &pool,
            Arc::new(test_image(10, 10)),
            vec![(dir.path().join("missing.png"), FrameWindow::with_side(10, 10, 10))],
            Arc::from(CHECKSUM),
            Arc::new(DummyProgressNotifier),
        );

        assert!(result.is_err());
    }
}
