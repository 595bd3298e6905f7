//! The fixed pose catalog.
//!
//! Poses are identified by a short stable name; the instruction is the text
//! sent to the image model when a layer does not yet have that pose cached.

/// A named camera/body-position variant of the current outfit image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pose {
    pub name: &'static str,
    pub instruction: &'static str,
}

/// All poses offered by the pose selector, in display order.
///
/// Index 0 is the default pose every new layer is seeded with.
pub const POSES: &[Pose] = &[
    Pose {
        name: "front",
        instruction: "Full frontal view, hands on hips",
    },
    Pose {
        name: "three-quarter",
        instruction: "Slightly turned, 3/4 view",
    },
    Pose {
        name: "side",
        instruction: "Side profile view",
    },
    Pose {
        name: "jump",
        instruction: "Jumping shot, mid-air",
    },
    Pose {
        name: "walk",
        instruction: "Walking towards camera",
    },
    Pose {
        name: "lean",
        instruction: "Leaning against a wall",
    },
];

/// The pose every freshly generated layer starts in.
pub fn default_pose() -> Pose {
    POSES[0]
}

/// Looks up a pose by its display name (case-insensitive).
pub fn find_pose(name: &str) -> Option<Pose> {
    POSES.iter().copied().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// Looks up a pose by selector index.
pub fn pose_at(index: usize) -> Option<Pose> {
    POSES.get(index).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pose_is_first() {
        assert_eq!(default_pose().name, POSES[0].name);
    }

    #[test]
    fn test_find_pose_case_insensitive() {
        assert_eq!(find_pose("SIDE").unwrap().instruction, "Side profile view");
        assert!(find_pose("handstand").is_none());
    }

    #[test]
    fn test_pose_names_are_unique() {
        for (i, a) in POSES.iter().enumerate() {
            for b in &POSES[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }
}
