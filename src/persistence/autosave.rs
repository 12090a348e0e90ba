use bevy::prelude::*;

/// Debounced autosave state.
///
/// Every mutation pushes the save back by `delay`. At most one save is in flight;
/// mutations that land during it cause one more save once it finishes.
#[derive(Resource, Debug)]
pub struct Autosave {
    delay: f64,
    last_mutation: Option<f64>,
    in_flight: bool,
}

impl Autosave {
    pub fn new(delay: f64) -> Self {
        Self {
            delay: delay.max(0.0),
            last_mutation: None,
            in_flight: false,
        }
    }

    pub fn mark_dirty(&mut self, now: f64) {
        self.last_mutation = Some(now);
    }

    pub fn is_dirty(&self) -> bool {
        self.last_mutation.is_some()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Edits not yet known to be on disk
    pub fn has_unsaved_work(&self) -> bool {
        self.is_dirty() || self.in_flight
    }

    /// Returns true when a save should start now
    pub fn poll(&mut self, now: f64) -> bool {
        match self.last_mutation {
            Some(at) if !self.in_flight && now - at >= self.delay => {
                self.last_mutation = None;
                self.in_flight = true;
                true
            }
            _ => false,
        }
    }

    /// The in-flight save finished, successfully or not
    pub fn finish(&mut self) {
        self.in_flight = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_to_save_when_clean() {
        let mut autosave = Autosave::new(1.0);
        assert!(!autosave.poll(100.0));
    }

    #[test]
    fn burst_of_edits_coalesces() {
        let mut autosave = Autosave::new(1.0);
        autosave.mark_dirty(0.0);
        autosave.mark_dirty(0.5);
        autosave.mark_dirty(0.9);
        assert!(!autosave.poll(1.5));
        assert!(autosave.poll(1.9));
        assert!(!autosave.poll(5.0));
    }

    #[test]
    fn mutation_during_save_schedules_another() {
        let mut autosave = Autosave::new(1.0);
        autosave.mark_dirty(0.0);
        assert!(autosave.poll(1.0));
        assert!(autosave.is_in_flight());

        autosave.mark_dirty(1.2);
        assert!(!autosave.poll(3.0));
        assert!(autosave.has_unsaved_work());
        autosave.finish();
        assert!(autosave.poll(3.0));
        autosave.finish();
        assert!(!autosave.is_dirty());
        assert!(!autosave.has_unsaved_work());
    }

    #[test]
    fn in_flight_save_counts_as_unsaved() {
        let mut autosave = Autosave::new(1.0);
        assert!(!autosave.has_unsaved_work());
        autosave.mark_dirty(0.0);
        assert!(autosave.poll(1.0));
        assert!(!autosave.is_dirty());
        assert!(autosave.has_unsaved_work());
    }

    #[test]
    fn failed_save_waits_for_next_mutation() {
        let mut autosave = Autosave::new(0.5);
        autosave.mark_dirty(0.0);
        assert!(autosave.poll(1.0));
        autosave.finish();
        assert!(!autosave.poll(2.0));
        autosave.mark_dirty(2.0);
        assert!(autosave.poll(2.5));
    }
}
