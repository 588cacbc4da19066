use crate::application::events::CheckoutObserver;
use crate::application::pipeline::CheckoutPipeline;
use crate::domain::checkout::CheckoutOutcome;
use crate::domain::selection::SelectionState;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// The pay button: enabled only when the selection is complete and no
/// checkout started from it is still running.
#[derive(Debug, Default)]
pub struct PayTrigger {
    in_flight: AtomicBool,
}

/// Marks a run as in flight until dropped.
#[derive(Debug)]
pub struct InFlight<'a> {
    trigger: &'a PayTrigger,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.trigger.in_flight.store(false, Ordering::Release);
    }
}

impl PayTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn is_enabled(&self, selection: &SelectionState) -> bool {
        selection.is_ready_to_pay() && !self.is_in_flight()
    }

    /// Claims the trigger, or returns `None` when a run is already in flight.
    pub fn try_begin(&self) -> Option<InFlight<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight { trigger: self })
    }

    /// Handles one press: runs the checkout unless one is already running.
    pub async fn press(
        &self,
        pipeline: &CheckoutPipeline,
        selection: &SelectionState,
        observer: &dyn CheckoutObserver,
    ) -> Option<CheckoutOutcome> {
        let Some(_guard) = self.try_begin() else {
            debug!("Pay pressed while a checkout is in flight; ignored");
            return None;
        };
        Some(pipeline.checkout(selection, observer).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::package::Catalog;
    use crate::domain::package::PackageType;
    use crate::domain::payment::PaymentMethod;

    #[test]
    fn test_second_begin_refused_until_guard_dropped() {
        let trigger = PayTrigger::new();
        let guard = trigger.try_begin();
        assert!(guard.is_some());
        assert!(trigger.is_in_flight());
        assert!(trigger.try_begin().is_none());

        drop(guard);
        assert!(!trigger.is_in_flight());
        assert!(trigger.try_begin().is_some());
    }

    #[test]
    fn test_enabled_requires_ready_selection_and_idle_trigger() {
        let trigger = PayTrigger::new();
        let mut selection = SelectionState::new();
        assert!(!trigger.is_enabled(&selection));

        let catalog = Catalog::standard();
        selection.set_package(catalog.get(PackageType::OneHour).unwrap().clone());
        selection.set_method(PaymentMethod::MtnMoney);
        selection.set_phone_digits("770123456");
        assert!(trigger.is_enabled(&selection));

        let _guard = trigger.try_begin().unwrap();
        assert!(!trigger.is_enabled(&selection));
    }
}
