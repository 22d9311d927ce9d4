//! Ping-pong echo applied to a finished channel buffer.
//!
//! The echo runs in place over the whole interleaved stereo buffer, front to
//! back. Because later frames read values that earlier iterations already
//! fed back into, one pass produces a decaying train of echoes that bounce
//! between the left and right channels.

/// Echo configuration for one instrument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Echo {
    /// Delay in interleaved words. Always even so channels stay aligned.
    pub delay_words: usize,
    /// Feedback gain in [0, 1].
    pub amount: f64,
}

impl Echo {
    /// Echo for an instrument's `fx_delay_time` / `fx_delay_amt` settings.
    pub fn new(delay_time: u8, delay_amt: u8, row_len: u32) -> Self {
        let words = delay_time as usize * row_len as usize;
        Echo {
            delay_words: (words >> 1) * 2,
            amount: delay_amt as f64 / 255.0,
        }
    }

    pub fn is_silent(&self) -> bool {
        self.amount == 0.0
    }

    /// Cross-feed `buf` into itself: left gets delayed right, right gets delayed left.
    pub fn apply(&self, buf: &mut [i32]) {
        let p = self.delay_words;
        let end = buf.len().saturating_sub(p);
        for b in (0..end).step_by(2) {
            let k = b + p;
            if k + 1 >= buf.len() {
                break;
            }
            buf[k] = buf[k].saturating_add((buf[b + 1] as f64 * self.amount) as i32);
            buf[k + 1] = buf[k + 1].saturating_add((buf[b] as f64 * self.amount) as i32);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_is_even() {
        assert_eq!(Echo::new(3, 100, 5513).delay_words, 16538);
        assert_eq!(Echo::new(2, 100, 5513).delay_words, 11026);
        assert_eq!(Echo::new(0, 100, 5513).delay_words, 0);
    }

    #[test]
    fn zero_amount_leaves_buffer_untouched() {
        let echo = Echo::new(1, 0, 4);
        assert!(echo.is_silent());
        let mut buf = vec![100, -50, 30, 7, 0, 0, 0, 0];
        let before = buf.clone();
        echo.apply(&mut buf);
        assert_eq!(buf, before);
    }

    #[test]
    fn impulse_bounces_between_channels() {
        // 2 frames of delay, full feedback.
        let echo = Echo {
            delay_words: 4,
            amount: 1.0,
        };
        let mut buf = vec![0i32; 20];
        buf[0] = 1000; // left impulse at frame 0
        echo.apply(&mut buf);

        // frame 2: right gets the delayed left
        assert_eq!(buf[4], 0);
        assert_eq!(buf[5], 1000);
        // frame 4: left gets the delayed right
        assert_eq!(buf[8], 1000);
        assert_eq!(buf[9], 0);
        // frame 6: right again
        assert_eq!(buf[13], 1000);
    }

    #[test]
    fn feedback_decays() {
        let echo = Echo {
            delay_words: 2,
            amount: 0.5,
        };
        let mut buf = vec![0i32; 10];
        buf[1] = 800; // right impulse at frame 0
        echo.apply(&mut buf);
        assert_eq!(buf[2], 400);
        assert_eq!(buf[5], 200);
        assert_eq!(buf[6], 100);
        assert_eq!(buf[9], 50);
    }

    #[test]
    fn delay_longer_than_buffer_is_noop() {
        let echo = Echo {
            delay_words: 100,
            amount: 1.0,
        };
        let mut buf = vec![5i32; 10];
        echo.apply(&mut buf);
        assert!(buf.iter().all(|&s| s == 5));
    }
}
