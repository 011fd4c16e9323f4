//! Catalog of the cooling modes understood by fw-fanctrl

/// A named fan-control profile
#[derive(Debug, PartialEq, Eq)]
pub struct Mode {
    id: &'static str,
    display_name: &'static str,
    icon: &'static str,
}

impl Mode {
    const fn new(id: &'static str, display_name: &'static str, icon: &'static str) -> Self {
        Self {
            id,
            display_name,
            icon,
        }
    }

    /// Stable key passed to and reported by fw-fanctrl
    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn display_name(&self) -> &'static str {
        self.display_name
    }

    /// Symbolic icon name shown while this mode is active
    pub fn icon(&self) -> &'static str {
        self.icon
    }
}

/// Supported modes, in menu order
static MODES: [Mode; 7] = [
    Mode::new("laziest", "Super Quiet", "network-cellular-signal-none-symbolic"),
    Mode::new("lazy", "Quiet", "network-cellular-signal-weak-symbolic"),
    Mode::new("medium", "Normal", "network-cellular-signal-ok-symbolic"),
    Mode::new("agile", "Somewhat noisy", "network-cellular-signal-good-symbolic"),
    Mode::new("very-agile", "Very Agile", "network-cellular-signal-excellent-symbolic"),
    Mode::new("deaf", "Super Fan", "network-cellular-acquiring-symbolic"),
    Mode::new("aeolus", "Take Off", "weather-windy-symbolic"),
];

pub fn all_modes() -> &'static [Mode] {
    &MODES
}

/// Exact, case-sensitive lookup by mode id
pub fn find_by_id(id: &str) -> Option<&'static Mode> {
    MODES.iter().find(|mode| mode.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_order() {
        let ids: Vec<&str> = all_modes().iter().map(Mode::id).collect();
        assert_eq!(
            ids,
            ["laziest", "lazy", "medium", "agile", "very-agile", "deaf", "aeolus"]
        );
    }

    #[test]
    fn test_find_by_id() {
        let mode = find_by_id("lazy").unwrap();
        assert_eq!(mode.display_name(), "Quiet");
        assert_eq!(mode.icon(), "network-cellular-signal-weak-symbolic");
        assert!(std::ptr::eq(mode, &all_modes()[1]));
    }

    #[test]
    fn test_find_by_id_is_exact() {
        assert!(find_by_id("Lazy").is_none());
        assert!(find_by_id("lazy\n").is_none());
        assert!(find_by_id(" lazy").is_none());
        assert!(find_by_id("").is_none());
    }
}
