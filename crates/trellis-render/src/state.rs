/// The interaction state bits a drawable can respond to.
///
/// A set doubles as a match pattern: a drawable entry "matches" when its
/// required bits are all present in the view's current set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StateSet(u8);

impl StateSet {
    pub const EMPTY: StateSet = StateSet(0);
    pub const ENABLED: StateSet = StateSet(1 << 0);
    pub const PRESSED: StateSet = StateSet(1 << 1);
    pub const FOCUSED: StateSet = StateSet(1 << 2);
    pub const SELECTED: StateSet = StateSet(1 << 3);
    pub const CHECKED: StateSet = StateSet(1 << 4);
    pub const WINDOW_FOCUSED: StateSet = StateSet(1 << 5);

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, other: StateSet) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: StateSet) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: StateSet) {
        self.0 &= !other.0;
    }

    pub fn with(self, other: StateSet) -> StateSet {
        StateSet(self.0 | other.0)
    }

    pub fn without(self, other: StateSet) -> StateSet {
        StateSet(self.0 & !other.0)
    }

    pub fn set(&mut self, other: StateSet, on: bool) {
        if on {
            self.insert(other);
        } else {
            self.remove(other);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_requires_all_bits() {
        let state = StateSet::ENABLED.with(StateSet::PRESSED);
        assert!(state.contains(StateSet::PRESSED));
        assert!(state.contains(StateSet::ENABLED.with(StateSet::PRESSED)));
        assert!(!state.contains(StateSet::FOCUSED));
        assert!(state.contains(StateSet::EMPTY));
    }

    #[test]
    fn set_toggles_bits() {
        let mut state = StateSet::EMPTY;
        state.set(StateSet::CHECKED, true);
        assert!(state.contains(StateSet::CHECKED));
        state.set(StateSet::CHECKED, false);
        assert!(state.is_empty());
    }
}
