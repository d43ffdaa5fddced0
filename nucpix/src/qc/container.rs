use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;
use log::{debug, warn};

use crate::carrier::container::split_container;
use crate::carrier::extract::extract_window;
use crate::carrier::image_store::load_rgba;
use crate::carrier::layout::{frame_side, FrameWindow};
use crate::frame::{parse_frame, strip_zero_groups, Frame, FrameError, FrameResult};
use crate::progress::ProgressNotifier;
use crate::qc::pool::WorkerPool;
use crate::qc::report::{ItemReport, ItemStatus, Stage, StageReport};
use crate::qc::{checksum_status, QcError, QcResult};
use crate::sequence::Record;

/// A container frame with the result of decoding it.
pub(super) type RecoveredFrame = (PathBuf, FrameResult<Frame>);

/// Splits the container into `examination_dir` and decodes every frame
/// against frame 0.
///
/// With `windows`, frame `i` is read from `windows[i - 1]`. Without them, or
/// when their number does not match the container, the window of each frame
/// is located from its differences.
pub(super) fn recover_frames(
    pool: &WorkerPool<QcError>,
    container_path: &Path,
    examination_dir: &Path,
    windows: Option<Vec<FrameWindow>>,
    notifier: Arc<dyn ProgressNotifier>,
) -> QcResult<Vec<RecoveredFrame>> {
    let mut paths = split_container(container_path, examination_dir)?;
    let frame_paths = paths.split_off(1);
    let baseline = Arc::new(load_rgba(&paths[0])?);

    let windows: Vec<Option<FrameWindow>> = match windows {
        Some(windows) if windows.len() == frame_paths.len() => {
            windows.into_iter().map(Some).collect()
        }
        Some(windows) => {
            warn!(
                "Container has {} frames, expected {}; locating frame windows",
                frame_paths.len(),
                windows.len()
            );
            vec![None; frame_paths.len()]
        }
        None => {
            notifier.set_iter_num(frame_paths.len() as u64);
            vec![None; frame_paths.len()]
        }
    };

    let items: Vec<_> = frame_paths.into_iter().zip(windows).collect();
    pool.map_indexed(items, move |_, (path, window)| {
        let encoded = load_rgba(&path)?;
        let frame = decode_frame(&baseline, &encoded, window)?;
        notifier.inc_iter();

        Ok((path, frame))
    })
}

fn decode_frame(
    baseline: &RgbaImage,
    encoded: &RgbaImage,
    window: Option<FrameWindow>,
) -> QcResult<FrameResult<Frame>> {
    let candidates = match window {
        Some(window) => vec![window],
        None => FrameWindow::locate(baseline, encoded)?,
    };

    let mut result = Err(FrameError::FrameTruncated { parts: 0 });
    for window in candidates {
        let bits = strip_zero_groups(&extract_window(baseline, encoded, window)?);
        debug!("Window {}x{}: {} frame bits", window.side(), window.side(), bits.len());

        result = parse_frame(&bits).and_then(|frame| check_window(frame, window));
        if result.is_ok() {
            break;
        }
    }

    Ok(result)
}

/// Accepts the frame only if it fills `window` exactly.
///
/// A window one pixel wider than the real one can share its corner. Reading
/// through it inserts a padding symbol after every row, which can still
/// parse.
fn check_window(frame: Frame, window: FrameWindow) -> FrameResult<Frame> {
    frame.check_payload()?;

    let side = frame_side(frame.encoded_len());
    if side != window.side() {
        return Err(FrameError::WindowMismatch {
            window_side: window.side(),
            frame_side: side,
        });
    }

    Ok(frame)
}

/// Compares the checksum of every recovered frame with `checksum`.
///
/// Returns the stage report and, for every frame, the record it holds if it
/// passed.
pub(super) fn verify_frames(
    frames: Vec<RecoveredFrame>,
    checksum: &str,
) -> (StageReport, Vec<Option<Record>>) {
    let (items, records): (Vec<_>, Vec<_>) = frames
        .into_iter()
        .enumerate()
        .map(|(index, (path, frame))| match frame {
            Ok(frame) => {
                let status = checksum_status(checksum, frame.checksum());
                let record = status.is_passed().then(|| frame.into_record());
                (ItemReport::new(index + 1, path, status), record)
            }
            Err(e) => (ItemReport::new(index + 1, path, ItemStatus::Unreadable(e)), None),
        })
        .unzip();

    (StageReport::new(Stage::ContainerFrame, items), records)
}
