/// Planar, fixed-shape `f32` sample storage.
///
/// Serves two roles: the destination buffer a host hands to
/// [`ReaderSource::fill_next_samples`](crate::source::ReaderSource::fill_next_samples)
/// each callback, and the source's own replaceable staging buffer. Capacity is
/// per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
    capacity: usize,
}

impl AudioBuffer {
    pub fn new(channel_count: usize, capacity: usize) -> Self {
        Self {
            channels: vec![vec![0.0; capacity]; channel_count],
            capacity,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel this buffer can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        &mut self.channels[index]
    }

    /// Zero every channel.
    pub fn clear(&mut self) {
        for channel in &mut self.channels {
            channel.fill(0.0);
        }
    }

    /// Zero `[from, to)` on every channel.
    pub fn clear_range(&mut self, from: usize, to: usize) {
        for channel in &mut self.channels {
            channel[from..to].fill(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_silent() {
        let buffer = AudioBuffer::new(2, 8);
        assert_eq!(buffer.channel_count(), 2);
        assert_eq!(buffer.capacity(), 8);
        assert!(buffer.channel(0).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn clear_range_only_touches_the_range() {
        let mut buffer = AudioBuffer::new(1, 4);
        buffer.channel_mut(0).copy_from_slice(&[1.0, 2.0, 3.0, 4.0]);
        buffer.clear_range(1, 3);
        assert_eq!(buffer.channel(0), &[1.0, 0.0, 0.0, 4.0]);
    }

    #[test]
    fn clear_silences_every_channel() {
        let mut buffer = AudioBuffer::new(2, 2);
        buffer.channel_mut(0).fill(0.5);
        buffer.channel_mut(1).fill(-0.5);
        buffer.clear();
        assert!(buffer.channel(0).iter().chain(buffer.channel(1)).all(|&s| s == 0.0));
    }
}
