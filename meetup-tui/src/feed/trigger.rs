/// Watches how much of the end-of-list sentinel is on screen and reports
/// the moment it becomes visible.
///
/// Re-arming forgets the last observation, so a sentinel that is still on
/// screen after a re-render fires again, like a freshly attached observer
/// would. Once disconnected the trigger never fires.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityTrigger {
    threshold: f32,
    visible: bool,
    connected: bool,
}

impl ProximityTrigger {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            visible: false,
            connected: true,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Record the sentinel's visible fraction; `true` on a transition into view
    pub fn observe(&mut self, visible_ratio: f32) -> bool {
        if !self.connected {
            return false;
        }
        let now_visible = visible_ratio >= self.threshold && visible_ratio > 0.0;
        let entered = now_visible && !self.visible;
        self.visible = now_visible;
        entered
    }

    pub fn rearm(&mut self) {
        self.visible = false;
    }

    pub fn disconnect(&mut self) {
        self.connected = false;
        self.visible = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_only_on_entering_view() {
        let mut trigger = ProximityTrigger::new(0.1);
        assert!(!trigger.observe(0.0));
        assert!(!trigger.observe(0.05));
        assert!(trigger.observe(0.1));
        assert!(!trigger.observe(0.5));
        assert!(!trigger.observe(1.0));
        assert!(!trigger.observe(0.0));
        assert!(trigger.observe(0.3));
    }

    #[test]
    fn test_rearm_fires_again_while_still_visible() {
        let mut trigger = ProximityTrigger::new(0.1);
        assert!(trigger.observe(1.0));
        assert!(!trigger.observe(1.0));
        trigger.rearm();
        assert!(trigger.observe(1.0));
    }

    #[test]
    fn test_disconnected_trigger_is_silent() {
        let mut trigger = ProximityTrigger::new(0.1);
        trigger.disconnect();
        assert!(!trigger.is_connected());
        assert!(!trigger.observe(1.0));
        trigger.rearm();
        assert!(!trigger.observe(1.0));
    }

    #[test]
    fn test_zero_threshold_still_needs_some_visibility() {
        let mut trigger = ProximityTrigger::new(0.0);
        assert!(!trigger.observe(0.0));
        assert!(trigger.observe(0.01));
    }
}
