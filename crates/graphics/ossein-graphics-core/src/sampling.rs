//! Keyframe lookup primitives shared by the sampler tree.

use crate::animation::Keyframe;

/// Finds the pair of frame indices bracketing `time` on a sorted track.
///
/// Returns `None` for an empty track. A single-frame track and times before
/// the first key both pin to `(0, 0)`; times past the last key pin to
/// `(last, last)`. A time landing exactly on a key resolves to the pair
/// *starting* at that key, so interpolation at the boundary yields the key's
/// value with zero fraction.
///
/// `cursor` is a scan hint carried between calls; it bounds a second pass
/// and never changes which pair is found.
pub fn frame_pair<T>(
    frames: &[Keyframe<T>],
    time: f32,
    start_time: f32,
    cursor: usize,
) -> Option<(usize, usize)> {
    if frames.is_empty() {
        return None;
    }
    let last = frames.len() - 1;
    if last == 0 {
        return Some((0, 0));
    }
    if time > start_time + frames[last].time {
        return Some((last, last));
    }
    if time < start_time + frames[0].time {
        return Some((0, 0));
    }

    for i in 0..last {
        if time < start_time + frames[i + 1].time {
            return Some((i, i + 1));
        }
    }
    for i in 0..last.min(cursor) {
        if time < start_time + frames[i + 1].time {
            return Some((i, i + 1));
        }
    }

    Some((last, last))
}

/// Samples a scalar weight curve at `time`, falling back to
/// `default_weight` when the curve is empty. Advances `cursor` to the
/// lower frame of the resolved pair.
pub fn sample_weight(
    frames: &[Keyframe<f32>],
    time: f32,
    start_time: f32,
    default_weight: f32,
    cursor: &mut usize,
) -> f32 {
    match frame_pair(frames, time, start_time, *cursor) {
        None => default_weight,
        Some((i0, i1)) => {
            *cursor = i0;
            if i0 == i1 {
                frames[i0].value
            } else {
                let t0 = start_time + frames[i0].time;
                let t1 = start_time + frames[i1].time;
                let fraction = (time - t0) / (t1 - t0);
                frames[i0].value + (frames[i1].value - frames[i0].value) * fraction
            }
        }
    }
}

/// Interpolation fraction between the two frames of a resolved pair.
pub(crate) fn pair_fraction<T>(
    frames: &[Keyframe<T>],
    pair: (usize, usize),
    time: f32,
    start_time: f32,
) -> f32 {
    let t0 = start_time + frames[pair.0].time;
    let t1 = start_time + frames[pair.1].time;
    (time - t0) / (t1 - t0)
}
