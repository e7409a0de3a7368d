use crate::tech::HOURS_PER_YEAR;

/// An hour counter over a fixed horizon.
///
/// Hours are handed out strictly in order; storage state carried from hour
/// `h` to `h + 1` relies on that.
///
/// # Examples
///
/// ```
/// use merit_sim::sim::clock::Clock;
///
/// let mut clock = Clock::new(3);
/// let mut hours = Vec::new();
///
/// while let Some(hour) = clock.tick() {
///     hours.push(hour);
/// }
/// assert_eq!(hours, vec![0, 1, 2]);
/// ```
pub struct Clock {
    /// Next hour to hand out
    current: usize,
    /// Number of hours in the horizon
    total: usize,
}

impl Clock {
    /// Creates a clock over `total` hours.
    pub fn new(total: usize) -> Self {
        Self { current: 0, total }
    }

    /// A clock over one simulated year.
    pub fn year() -> Self {
        Self::new(HOURS_PER_YEAR)
    }

    /// Advances by one hour.
    ///
    /// # Returns
    ///
    /// * `Some(hour)` - The hour just reached (starting from 0)
    /// * `None` - If the horizon is exhausted
    pub fn tick(&mut self) -> Option<usize> {
        if self.current < self.total {
            let hour = self.current;
            self.current += 1;
            Some(hour)
        } else {
            None
        }
    }
}
