//! Curated list of popular Turtle WoW addons.

use camino::Utf8Path;

/// A curated addon with the folder name the game expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendedAddon {
    pub name: &'static str,
    pub reference: &'static str,
    pub folder_name: &'static str,
}

impl RecommendedAddon {
    /// Whether the addon's folder exists under `root`.
    pub fn is_installed(&self, root: &Utf8Path) -> bool {
        root.join(self.folder_name).is_dir()
    }
}

pub const RECOMMENDED_ADDONS: &[RecommendedAddon] = &[
    RecommendedAddon {
        name: "pfQuest",
        reference: "https://github.com/shagu/pfQuest/archive/refs/heads/master.zip",
        folder_name: "pfQuest",
    },
    RecommendedAddon {
        name: "pfQuest-Turtle",
        reference: "https://github.com/shagu/pfQuest-turtle/archive/refs/heads/master.zip",
        folder_name: "pfQuest-turtle",
    },
    RecommendedAddon {
        name: "BigWigs",
        reference: "https://github.com/CosminPOP/BigWigs/archive/refs/heads/master.zip",
        folder_name: "BigWigs",
    },
    RecommendedAddon {
        name: "ShaguTweaks",
        reference: "https://github.com/shagu/ShaguTweaks/archive/refs/heads/master.zip",
        folder_name: "ShaguTweaks",
    },
    RecommendedAddon {
        name: "Auctionator",
        reference: "https://github.com/nimeral/AuctionatorVanilla/archive/refs/heads/master.zip",
        folder_name: "Auctionator",
    },
    RecommendedAddon {
        name: "Aux",
        reference: "https://github.com/gwetchen/aux-addon/archive/refs/heads/master.zip",
        folder_name: "aux-addon",
    },
];

/// Look up a recommended addon by display name, ignoring case.
pub fn find_recommended(name: &str) -> Option<&'static RecommendedAddon> {
    RECOMMENDED_ADDONS
        .iter()
        .find(|addon| addon.name.eq_ignore_ascii_case(name.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::validate_folder_name;
    use crate::reference::is_archive_url;

    #[test]
    fn test_find_recommended_ignores_case() {
        let addon = find_recommended("  pfquest-turtle ").unwrap();
        assert_eq!(addon.folder_name, "pfQuest-turtle");
        assert!(find_recommended("Questie").is_none());
    }

    #[test]
    fn test_recommended_entries_are_installable() {
        for addon in RECOMMENDED_ADDONS {
            assert!(is_archive_url(addon.reference), "{}", addon.name);
            assert!(validate_folder_name(addon.folder_name).is_ok(), "{}", addon.name);
        }
    }
}
