/// One decoded time slice of media: a fixed number of channels, each holding
/// the same run of samples.
///
/// Frames are immutable snapshots shared between the reader's cache and the
/// source via `Arc<Frame>`; the source replaces its handle, never the
/// contents.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    channels: Vec<Vec<f32>>,
    sample_count: usize,
}

impl Frame {
    /// Build a frame from planar channel data. Every channel must carry the
    /// same number of samples.
    pub fn new(channels: Vec<Vec<f32>>) -> Self {
        let sample_count = channels.first().map_or(0, Vec::len);
        debug_assert!(
            channels.iter().all(|ch| ch.len() == sample_count),
            "all channels of a frame must be the same length"
        );
        Self {
            channels,
            sample_count,
        }
    }

    /// An all-zero frame, used by readers that must produce a time slice with
    /// no decoded content.
    pub fn silent(channel_count: usize, sample_count: usize) -> Self {
        Self {
            channels: vec![vec![0.0; sample_count]; channel_count],
            sample_count,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel actually present. For the last frame of a stream
    /// this may be shorter than the reader's nominal frame length.
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_reports_planar_dimensions() {
        let frame = Frame::new(vec![vec![0.1, 0.2, 0.3], vec![0.4, 0.5, 0.6]]);
        assert_eq!(frame.channel_count(), 2);
        assert_eq!(frame.sample_count(), 3);
        assert_eq!(frame.channel(1), &[0.4, 0.5, 0.6]);
    }

    #[test]
    fn silent_frame_is_all_zeros() {
        let frame = Frame::silent(2, 4);
        assert_eq!(frame.sample_count(), 4);
        assert!(frame.channel(0).iter().all(|&s| s == 0.0));
        assert!(frame.channel(1).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn empty_frame_has_zero_samples() {
        let frame = Frame::new(Vec::new());
        assert_eq!(frame.channel_count(), 0);
        assert_eq!(frame.sample_count(), 0);
    }
}
