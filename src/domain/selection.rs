use super::checkout::{CheckoutFailure, CheckoutRequest, SelectionField};
use super::package::PackageSelection;
use super::payment::PaymentMethod;
use super::phone::{PHONE_DIGITS, PhoneNumber, normalize_phone_digits};

const IDLE_TRIGGER_LABEL: &str = "Select Package & Payment Method";

/// The customer's in-progress choices.
///
/// Owned by the presentation layer and mutated from its input handlers. The
/// pipeline only ever sees it through [`SelectionState::snapshot`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SelectionState {
    package: Option<PackageSelection>,
    method: Option<PaymentMethod>,
    phone_digits: String,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any previous package choice.
    pub fn set_package(&mut self, package: PackageSelection) {
        self.package = Some(package);
    }

    /// Replaces any previous payment method.
    pub fn set_method(&mut self, method: PaymentMethod) {
        self.method = Some(method);
    }

    /// Stores the digits of `raw` (at most nine) and returns them so the
    /// caller can reflect the normalized value back into its input field.
    pub fn set_phone_digits(&mut self, raw: &str) -> &str {
        self.phone_digits = normalize_phone_digits(raw);
        &self.phone_digits
    }

    pub fn clear_package(&mut self) {
        self.package = None;
    }

    pub fn clear_method(&mut self) {
        self.method = None;
    }

    pub fn package(&self) -> Option<&PackageSelection> {
        self.package.as_ref()
    }

    pub fn method(&self) -> Option<PaymentMethod> {
        self.method
    }

    pub fn phone_digits(&self) -> &str {
        &self.phone_digits
    }

    pub fn is_ready_to_pay(&self) -> bool {
        self.phone_digits.len() == PHONE_DIGITS && self.package.is_some() && self.method.is_some()
    }

    pub fn missing_fields(&self) -> Vec<SelectionField> {
        let mut missing = Vec::new();
        if self.phone_digits.len() != PHONE_DIGITS {
            missing.push(SelectionField::Phone);
        }
        if self.package.is_none() {
            missing.push(SelectionField::Package);
        }
        if self.method.is_none() {
            missing.push(SelectionField::Method);
        }
        missing
    }

    /// Captures the current choices as an immutable checkout request.
    pub fn snapshot(&self) -> Result<CheckoutRequest, CheckoutFailure> {
        let phone = PhoneNumber::new(&self.phone_digits).ok();
        CheckoutRequest::new(phone, self.package.clone(), self.method)
    }

    /// Text for the pay trigger: the amount when ready, a prompt otherwise.
    pub fn trigger_label(&self) -> String {
        match &self.package {
            Some(package) if self.is_ready_to_pay() => format!("Pay {}", package.price_label()),
            _ => IDLE_TRIGGER_LABEL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::package::PackageType;

    fn day_package() -> PackageSelection {
        PackageSelection::new(PackageType::OneDay, 5000, "1 Day").unwrap()
    }

    #[test]
    fn test_set_phone_digits_returns_normalized() {
        let mut state = SelectionState::new();
        assert_eq!(state.set_phone_digits("12-34a-56b-7890123"), "123456789");
        assert_eq!(state.phone_digits(), "123456789");
        assert_eq!(state.set_phone_digits("0770 12"), "077012");
    }

    #[test]
    fn test_ready_only_with_all_three() {
        let mut state = SelectionState::new();
        assert!(!state.is_ready_to_pay());
        state.set_phone_digits("770123456");
        assert!(!state.is_ready_to_pay());
        state.set_package(day_package());
        assert!(!state.is_ready_to_pay());
        state.set_method(PaymentMethod::MtnMoney);
        assert!(state.is_ready_to_pay());

        state.set_phone_digits("77012345");
        assert!(!state.is_ready_to_pay());
    }

    #[test]
    fn test_set_package_replaces_previous() {
        let mut state = SelectionState::new();
        state.set_package(day_package());
        let week = PackageSelection::new(PackageType::OneWeek, 25000, "1 Week").unwrap();
        state.set_package(week.clone());
        assert_eq!(state.package(), Some(&week));
    }

    #[test]
    fn test_snapshot_reports_missing_fields() {
        let mut state = SelectionState::new();
        state.set_method(PaymentMethod::AirtelMoney);
        state.set_phone_digits("770123456");
        assert_eq!(
            state.snapshot(),
            Err(CheckoutFailure::IncompleteSelection {
                missing: vec![SelectionField::Package]
            })
        );
        assert_eq!(state.missing_fields(), vec![SelectionField::Package]);
    }

    #[test]
    fn test_snapshot_is_detached_from_state() {
        let mut state = SelectionState::new();
        state.set_package(day_package());
        state.set_method(PaymentMethod::MtnMoney);
        state.set_phone_digits("770123456");
        let request = state.snapshot().unwrap();

        state.clear_package();
        state.set_phone_digits("");
        assert_eq!(request.package().price(), 5000);
        assert_eq!(request.phone().digits(), "770123456");
    }

    #[test]
    fn test_trigger_label() {
        let mut state = SelectionState::new();
        state.set_package(day_package());
        assert_eq!(state.trigger_label(), "Select Package & Payment Method");
        state.set_method(PaymentMethod::MtnMoney);
        state.set_phone_digits("770123456");
        assert_eq!(state.trigger_label(), "Pay UGX 5,000");
    }
}
