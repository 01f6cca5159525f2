//! Load areas and the lifecycle events bound to them.

use std::fmt;

/// The page context an asset loads in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Area {
    /// Visitor-facing pages.
    #[default]
    Front,
    /// Administration screens.
    Admin,
    /// The login screen.
    Login,
    /// The customizer controls.
    Customizer,
    /// Block assets, front and editor.
    Block,
    /// The block editor only.
    BlockEditor,
}

impl Area {
    /// Every area, in table order.
    pub const ALL: [Area; 6] = [
        Area::Front,
        Area::Admin,
        Area::Login,
        Area::Customizer,
        Area::Block,
        Area::BlockEditor,
    ];

    /// The configuration name of the area.
    pub fn name(self) -> &'static str {
        match self {
            Area::Front => "front",
            Area::Admin => "admin",
            Area::Login => "login",
            Area::Customizer => "customizer",
            Area::Block => "block",
            Area::BlockEditor => "block_editor",
        }
    }

    /// The host lifecycle event fired when assets for this area are due.
    pub fn event(self) -> &'static str {
        match self {
            Area::Front => "assets-for-visitors",
            Area::Admin => "assets-for-admin",
            Area::Login => "assets-for-login",
            Area::Customizer => "assets-for-customizer",
            Area::Block => "assets-for-blocks",
            Area::BlockEditor => "assets-for-block-editor",
        }
    }

    /// Look an area up by its configuration name.
    pub fn from_name(name: &str) -> Option<Area> {
        Area::ALL.into_iter().find(|area| area.name() == name)
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where an inline payload attaches relative to the asset's own tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Position {
    Before,
    #[default]
    After,
}

impl Position {
    pub fn name(self) -> &'static str {
        match self {
            Position::Before => "before",
            Position::After => "after",
        }
    }

    pub fn from_name(name: &str) -> Option<Position> {
        match name {
            "before" => Some(Position::Before),
            "after" => Some(Position::After),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_table() {
        assert_eq!(Area::Front.event(), "assets-for-visitors");
        assert_eq!(Area::Admin.event(), "assets-for-admin");
        assert_eq!(Area::Login.event(), "assets-for-login");
        assert_eq!(Area::Customizer.event(), "assets-for-customizer");
        assert_eq!(Area::Block.event(), "assets-for-blocks");
        assert_eq!(Area::BlockEditor.event(), "assets-for-block-editor");
    }

    #[test]
    fn test_name_round_trip() {
        for area in Area::ALL {
            assert_eq!(Area::from_name(area.name()), Some(area));
        }
        assert_eq!(Area::from_name("erea"), None);
        assert_eq!(Area::from_name("Front"), None);
    }

    #[test]
    fn test_position_names() {
        assert_eq!(Position::from_name("before"), Some(Position::Before));
        assert_eq!(Position::from_name("after"), Some(Position::After));
        assert_eq!(Position::from_name("middle"), None);
        assert_eq!(Position::default(), Position::After);
    }
}
